/// Longsum - summarizes long plain-text documents with an OpenAI model.
///
/// The user supplies their own API key and a `.txt` file through a small web page (English or
/// Spanish). The text is split into overlapping chunks, each chunk is summarized, and the partial
/// summaries are combined (collapsing them first if they are too long) into one final summary.
///
/// # Architecture
///
/// - `core`: configuration, request models and input validation
/// - `ai`: prompt templates and the `OpenAI` Responses API client
/// - `pipeline`: the recursive character splitter and the map-reduce summarizer
/// - `api`: the axum router, form/JSON handlers and maud views
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use longsum::ai::client::LlmClient;
/// use longsum::core::config::AppConfig;
/// use longsum::core::models::{ApiKey, Language};
/// use longsum::pipeline::MapReduceSummarizer;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     longsum::setup_logging();
///
///     let config = AppConfig::default();
///     let client = LlmClient::new(
///         ApiKey::new("sk-..."),
///         None,
///         config.openai_model.clone(),
///     );
///     let summarizer = MapReduceSummarizer::from_config(Arc::new(client), Language::English, &config)?;
///
///     let text = std::fs::read_to_string("article.txt")?;
///     let outcome = summarizer.summarize(&text).await?;
///     println!("{} chunks -> {}", outcome.chunk_count, outcome.summary);
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod pipeline;

/// Configure structured JSON logging.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more than once is
/// harmless; only the first call installs a subscriber.
///
/// # Example
///
/// ```
/// longsum::setup_logging();
/// longsum::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
