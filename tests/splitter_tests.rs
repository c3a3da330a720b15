use longsum::core::config::AppConfig;
use longsum::pipeline::splitter::RecursiveCharacterSplitter;

fn sample_text() -> String {
    let mut paragraphs = Vec::new();
    for p in 0..10 {
        let lines: Vec<String> = (0..5)
            .map(|l| format!("line {:02} lorem ipsum dolor", p * 5 + l))
            .collect();
        paragraphs.push(lines.join("\n"));
    }
    paragraphs.join("\n\n")
}

#[test]
fn test_line_breaks_with_overlap() {
    let splitter = RecursiveCharacterSplitter::new(12, 5).unwrap();
    let chunks = splitter.split_text("aaaa\nbbbb\ncccc\ndddd\neeee");
    assert_eq!(
        chunks,
        vec!["aaaa\nbbbb", "bbbb\ncccc", "cccc\ndddd", "dddd\neeee"]
    );
}

#[test]
fn test_paragraphs_become_separate_chunks() {
    let text = format!("{}\n\n{}\n\n{}", "a".repeat(30), "b".repeat(30), "c".repeat(30));
    let splitter = RecursiveCharacterSplitter::new(50, 10).unwrap();
    assert_eq!(
        splitter.split_text(&text),
        vec!["a".repeat(30), "b".repeat(30), "c".repeat(30)]
    );
}

#[test]
fn test_long_paragraph_falls_back_to_line_breaks() {
    let splitter = RecursiveCharacterSplitter::new(12, 0).unwrap();
    assert_eq!(
        splitter.split_text("aa\n\nbbbb\ncccc\ndddd"),
        vec!["aa", "bbbb\ncccc", "dddd"]
    );
}

#[test]
fn test_unbreakable_text_is_kept_whole() {
    let splitter = RecursiveCharacterSplitter::new(10, 0).unwrap();
    let chunks = splitter.split_text(&"x".repeat(20));
    assert_eq!(chunks, vec!["x".repeat(20)]);
}

#[test]
fn test_character_separator_breaks_long_runs() {
    let splitter = RecursiveCharacterSplitter::new(10, 0)
        .unwrap()
        .with_separators(["\n\n", "\n", ""])
        .unwrap();
    let chunks = splitter.split_text(&"x".repeat(25));
    assert_eq!(chunks, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
}

#[test]
fn test_chunks_respect_size_and_keep_order() {
    let text = sample_text();
    let splitter = RecursiveCharacterSplitter::new(100, 20).unwrap();
    let chunks = splitter.split_text(&text);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 100, "chunk too long: {chunk:?}");
        assert_eq!(chunk.trim(), chunk);
    }

    // Every line survives, and first appearances are in input order.
    let mut last_seen = 0;
    for n in 0..50 {
        let line = format!("line {n:02} lorem ipsum dolor");
        let position = chunks
            .iter()
            .position(|c| c.contains(&line))
            .unwrap_or_else(|| panic!("missing {line}"));
        assert!(position >= last_seen);
        last_seen = position;
    }
}

#[test]
fn test_lengths_are_counted_in_characters() {
    let splitter = RecursiveCharacterSplitter::new(10, 0).unwrap();
    assert_eq!(
        splitter.split_text("ññññ\nüüüü\nçççç"),
        vec!["ññññ\nüüüü", "çççç"]
    );
}

#[test]
fn test_create_documents_indexes_and_skips_blank_input() {
    let splitter = RecursiveCharacterSplitter::new(12, 0).unwrap();
    let docs = splitter.create_documents("aa\n\nbbbb\ncccc\ndddd");
    assert_eq!(docs.len(), 3);
    assert_eq!(
        docs.iter().map(|d| d.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(docs[1].page_content, "bbbb\ncccc");

    assert!(splitter.create_documents("  \n\n \n ").is_empty());
    assert!(splitter.create_documents("").is_empty());
}

#[test]
fn test_default_config_splitter() {
    let splitter = RecursiveCharacterSplitter::from_config(&AppConfig::default()).unwrap();
    assert_eq!(splitter.chunk_size(), 5000);
    assert_eq!(splitter.chunk_overlap(), 350);

    let short = "A short document.\n\nWith two paragraphs.";
    assert_eq!(splitter.split_text(short), vec![short.to_string()]);
}
