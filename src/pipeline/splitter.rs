//! Recursive character splitter.
//!
//! Text is cut on the coarsest separator that occurs in it (paragraph breaks before line
//! breaks). Pieces are then packed back together into chunks of at most `chunk_size`
//! characters, with up to `chunk_overlap` trailing characters repeated at the start of the
//! next chunk. Pieces that are still too long are split again with the finer separators.
//! Lengths are measured in `char`s, not bytes.

use std::collections::VecDeque;

use tracing::{debug, instrument, warn};

use crate::core::config::AppConfig;
use crate::core::models::Document;
use crate::errors::SummarizerError;

pub const DEFAULT_SEPARATORS: [&str; 2] = ["\n\n", "\n"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveCharacterSplitter {
    separators: Vec<String>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveCharacterSplitter {
    /// # Errors
    ///
    /// Returns `ConfigError` if `chunk_size` is zero or `chunk_overlap` is not smaller than it.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, SummarizerError> {
        if chunk_size == 0 {
            return Err(SummarizerError::ConfigError(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(SummarizerError::ConfigError(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            separators: DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect(),
            chunk_size,
            chunk_overlap,
        })
    }

    /// # Errors
    ///
    /// See [`RecursiveCharacterSplitter::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SummarizerError> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Replaces the separator list, coarsest first. An empty string splits into characters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty list.
    pub fn with_separators<I, S>(mut self, separators: I) -> Result<Self, SummarizerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let separators: Vec<String> = separators.into_iter().map(Into::into).collect();
        if separators.is_empty() {
            return Err(SummarizerError::ConfigError(
                "at least one separator is required".to_string(),
            ));
        }
        self.separators = separators;
        Ok(self)
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Splits `text` into ordered documents, skipping chunks that are only whitespace.
    #[instrument(level = "debug", skip(self, text), fields(text_chars = text.chars().count()))]
    #[must_use]
    pub fn create_documents(&self, text: &str) -> Vec<Document> {
        let documents: Vec<Document> = self
            .split_text(text)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .enumerate()
            .map(|(index, page_content)| Document {
                page_content,
                index,
            })
            .collect();

        debug!(chunk_count = documents.len(), "Split text into documents");
        documents
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let (separator, remaining) = choose_separator(text, separators);
        let splits = split_keeping_separator(text, separator);

        let mut good_splits: Vec<&str> = Vec::new();
        for split in splits {
            if char_len(split) < self.chunk_size {
                good_splits.push(split);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() {
                final_chunks.push(split.to_string());
            } else {
                final_chunks.extend(self.split_recursive(split, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Packs small pieces into chunks, carrying a tail of at most `chunk_overlap` characters.
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &split in splits {
            let len = char_len(split);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        chunk_chars = total,
                        chunk_size = self.chunk_size,
                        "Created a chunk longer than the configured size"
                    );
                }

                if !current.is_empty() {
                    if let Some(doc) = join_pieces(&current) {
                        docs.push(doc);
                    }

                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }

            current.push_back(split);
            total += len;
        }

        if let Some(doc) = join_pieces(&current) {
            docs.push(doc);
        }

        docs
    }
}

/// First separator present in `text` (an empty separator always matches), else the last one.
/// Also returns the finer separators left for recursion.
fn choose_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator.as_str(), &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }
    (separators.last().map_or("", String::as_str), &[])
}

/// Splits before every occurrence of `separator`, so each piece after the first starts
/// with it. Empty pieces are dropped.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[start..idx]);
        start = idx;
    }
    pieces.push(&text[start..]);
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

fn join_pieces(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
