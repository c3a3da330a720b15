use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info, instrument};

use crate::ai::client::{GeneratorFactory, TextGenerator, estimate_tokens};
use crate::ai::prompt_builder::PromptSet;
use crate::core::config::{AppConfig, DEFAULT_REDUCE_TOKEN_MAX};
use crate::core::models::{Document, Language, SummaryOutcome, SummaryRequest};
use crate::core::validation::validate_request;
use crate::errors::SummarizerError;
use crate::pipeline::splitter::RecursiveCharacterSplitter;

/// Joins summaries before they are handed to the combine prompt.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Map-reduce summarizer: one call per chunk, then recursive combining down to one summary.
pub struct MapReduceSummarizer {
    generator: Arc<dyn TextGenerator>,
    prompts: PromptSet,
    splitter: RecursiveCharacterSplitter,
    reduce_token_max: usize,
    max_collapse_rounds: usize,
    map_concurrency: usize,
}

impl MapReduceSummarizer {
    #[must_use]
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        prompts: PromptSet,
        splitter: RecursiveCharacterSplitter,
    ) -> Self {
        Self {
            generator,
            prompts,
            splitter,
            reduce_token_max: DEFAULT_REDUCE_TOKEN_MAX,
            max_collapse_rounds: 4,
            map_concurrency: 4,
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the configured chunk sizes are inconsistent.
    pub fn from_config(
        generator: Arc<dyn TextGenerator>,
        language: Language,
        config: &AppConfig,
    ) -> Result<Self, SummarizerError> {
        Ok(Self::new(
            generator,
            PromptSet::for_language(language),
            RecursiveCharacterSplitter::from_config(config)?,
        )
        .with_reduce_token_max(config.reduce_token_max)
        .with_max_collapse_rounds(config.max_collapse_rounds)
        .with_map_concurrency(config.map_concurrency))
    }

    #[must_use]
    pub fn with_reduce_token_max(mut self, reduce_token_max: usize) -> Self {
        self.reduce_token_max = reduce_token_max;
        self
    }

    #[must_use]
    pub fn with_max_collapse_rounds(mut self, max_collapse_rounds: usize) -> Self {
        self.max_collapse_rounds = max_collapse_rounds;
        self
    }

    #[must_use]
    pub fn with_map_concurrency(mut self, map_concurrency: usize) -> Self {
        self.map_concurrency = map_concurrency.max(1);
        self
    }

    /// Splits `text` and runs the full map-reduce over the resulting chunks.
    ///
    /// # Errors
    ///
    /// `EmptyDocument` if the text yields no chunks, otherwise the first generation or
    /// reduction failure.
    pub async fn summarize(&self, text: &str) -> Result<SummaryOutcome, SummarizerError> {
        let documents = self.splitter.create_documents(text);
        self.summarize_documents(&documents).await
    }

    /// # Errors
    ///
    /// See [`MapReduceSummarizer::summarize`].
    #[instrument(level = "info", skip(self, documents), fields(chunk_count = documents.len()))]
    pub async fn summarize_documents(
        &self,
        documents: &[Document],
    ) -> Result<SummaryOutcome, SummarizerError> {
        if documents.is_empty() {
            return Err(SummarizerError::EmptyDocument);
        }

        let chunk_summaries = self.map(documents).await?;
        info!(
            chunk_count = chunk_summaries.len(),
            "Summarized all chunks"
        );

        let (collapsed, collapse_rounds) = self.collapse(chunk_summaries.clone()).await?;
        let summary = self.combine(&collapsed).await?;

        info!(collapse_rounds, summary_chars = summary.chars().count(), "Combined summaries");

        Ok(SummaryOutcome {
            summary,
            chunk_count: documents.len(),
            chunk_summaries,
            collapse_rounds,
        })
    }

    async fn map(&self, documents: &[Document]) -> Result<Vec<String>, SummarizerError> {
        let prompts: Vec<(usize, String)> = documents
            .iter()
            .map(|doc| (doc.index, self.prompts.map.render(&doc.page_content)))
            .collect();

        stream::iter(prompts.into_iter().map(|(index, prompt)| {
            let generator = Arc::clone(&self.generator);
            async move {
                let summary = generator.generate(&prompt).await?;
                debug!(chunk = index, "Chunk summarized");
                Ok::<_, SummarizerError>(summary.trim().to_string())
            }
        }))
        .buffered(self.map_concurrency)
        .try_collect()
        .await
    }

    /// Repeatedly merges groups of summaries until the combine prompt fits `reduce_token_max`.
    async fn collapse(
        &self,
        summaries: Vec<String>,
    ) -> Result<(Vec<String>, usize), SummarizerError> {
        let mut current = summaries;
        let mut rounds = 0;

        while self.prompt_length(&current) > self.reduce_token_max {
            if rounds == self.max_collapse_rounds {
                return Err(SummarizerError::CollapseExhausted(rounds));
            }

            let groups = split_into_groups(
                &current,
                |group| self.prompt_length(group),
                self.reduce_token_max,
            )?;
            debug!(round = rounds + 1, groups = groups.len(), "Collapsing summaries");

            let prompts: Vec<String> = groups
                .into_iter()
                .map(|group| self.combine_prompt(&group))
                .collect();
            current = stream::iter(prompts.into_iter().map(|prompt| self.generate_owned(prompt)))
                .buffered(self.map_concurrency)
                .try_collect()
                .await?;
            rounds += 1;
        }

        Ok((current, rounds))
    }

    async fn combine(&self, summaries: &[String]) -> Result<String, SummarizerError> {
        self.generate_owned(self.combine_prompt(summaries)).await
    }

    fn combine_prompt(&self, summaries: &[String]) -> String {
        self.prompts
            .combine
            .render(&summaries.join(DOCUMENT_SEPARATOR))
    }

    /// Owns its prompt and generator handle; borrows nothing from `self`.
    fn generate_owned(
        &self,
        prompt: String,
    ) -> impl Future<Output = Result<String, SummarizerError>> + Send + use<> {
        let generator = Arc::clone(&self.generator);
        async move {
            let generated = generator.generate(&prompt).await?;
            Ok(generated.trim().to_string())
        }
    }

    /// Estimated tokens of the combine prompt built from `summaries`.
    #[must_use]
    pub fn prompt_length(&self, summaries: &[String]) -> usize {
        estimate_tokens(&self.combine_prompt(summaries))
    }
}

/// Partitions `summaries` greedily into consecutive groups whose measured length stays
/// within `token_max`.
///
/// A summary that is too large on its own after the first one still gets a group of its own
/// and is shortened by the next combine call.
///
/// # Errors
///
/// Returns `SummaryTooLarge` when the first summary alone exceeds the limit.
pub fn split_into_groups<F>(
    summaries: &[String],
    length_of: F,
    token_max: usize,
) -> Result<Vec<Vec<String>>, SummarizerError>
where
    F: Fn(&[String]) -> usize,
{
    let mut groups = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for summary in summaries {
        current.push(summary.clone());
        let tokens = length_of(&current);
        if tokens <= token_max {
            continue;
        }

        if current.len() == 1 {
            return Err(SummarizerError::SummaryTooLarge {
                tokens,
                max: token_max,
            });
        }
        let carried = current.split_off(current.len() - 1);
        groups.push(std::mem::replace(&mut current, carried));
    }

    if !current.is_empty() {
        groups.push(current);
    }
    Ok(groups)
}

/// Validates a request, then summarizes it with a generator bound to the request's key.
///
/// Returns the word count alongside the outcome.
///
/// # Errors
///
/// Validation errors come first; after that, any pipeline failure.
pub async fn summarize_request(
    factory: &dyn GeneratorFactory,
    config: &AppConfig,
    request: &SummaryRequest,
) -> Result<(usize, SummaryOutcome), SummarizerError> {
    let word_count = validate_request(&request.text, &request.api_key, config.max_words)?;

    let summarizer = MapReduceSummarizer::from_config(
        factory.generator(&request.api_key),
        request.language,
        config,
    )?;

    info!(
        word_count,
        language = request.language.code(),
        "Starting summarization"
    );
    let outcome = summarizer.summarize(&request.text).await?;
    Ok((word_count, outcome))
}
