//! LLM (`OpenAI`) API client module
//!
//! Encapsulates all LLM API interactions used by the summarization pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::core::config::AppConfig;
use crate::core::models::ApiKey;
use crate::errors::SummarizerError;

const TOKEN_BUFFER: usize = 250;
const RETRY_MAX_DELAY: Duration = Duration::from_secs(8);

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Anything that turns a fully rendered prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the text could not be generated.
    async fn generate(&self, prompt: &str) -> Result<String, SummarizerError>;
}

/// Produces a generator bound to the credential supplied with a request.
pub trait GeneratorFactory: Send + Sync {
    fn generator(&self, api_key: &ApiKey) -> Arc<dyn TextGenerator>;
}

/// LLM API client for generating summaries
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: ApiKey,
    org_id: Option<String>,
    model_name: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: usize,
    context_window: usize,
    max_retries: usize,
    retry_base: Duration,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &self.api_key)
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    #[must_use]
    pub fn new(api_key: ApiKey, org_id: Option<String>, model_name: String) -> Self {
        let defaults = AppConfig::default();
        Self {
            http: Client::new(),
            api_key,
            org_id,
            model_name,
            base_url: defaults.openai_base_url,
            temperature: defaults.temperature,
            max_output_tokens: defaults.max_output_tokens,
            context_window: defaults.context_window,
            max_retries: defaults.max_retries,
            retry_base: Duration::from_millis(500),
        }
    }

    /// Builds a client from application config, reusing a shared HTTP connection pool.
    #[must_use]
    pub fn from_config(http: Client, config: &AppConfig, api_key: ApiKey) -> Self {
        Self {
            http,
            api_key,
            org_id: config.openai_org_id.clone(),
            model_name: config.openai_model.clone(),
            base_url: config.openai_base_url.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            context_window: config.context_window,
            max_retries: config.max_retries,
            retry_base: Duration::from_millis(500),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// First backoff delay; later attempts double it, with jitter.
    #[must_use]
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    #[must_use]
    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn build_prompt(&self, rendered: &str) -> Vec<ChatCompletionMessage> {
        vec![ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(rendered.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }]
    }

    /// Sends a prompt to the Responses API and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns `PromptTooLarge` without a network call if the prompt cannot fit the context
    /// window, and HTTP/API errors once retries are exhausted.
    pub async fn generate_summary(
        &self,
        prompt: Vec<ChatCompletionMessage>,
    ) -> Result<String, SummarizerError> {
        #[cfg(feature = "debug-logs")]
        info!("Using prompt:\n{:?}", prompt);

        let estimated_input_tokens = prompt
            .iter()
            .filter_map(message_text)
            .map(estimate_tokens)
            .sum::<usize>();

        debug!(estimated_input_tokens, "Estimated input tokens");

        let required = estimated_input_tokens
            .saturating_add(self.max_output_tokens)
            .saturating_add(TOKEN_BUFFER);
        if required > self.context_window {
            return Err(SummarizerError::PromptTooLarge {
                estimated: estimated_input_tokens,
                limit: self.context_window,
            });
        }

        let request_body = json!({
            "model": self.model_name,
            "input": build_responses_input(&prompt),
            "temperature": self.temperature,
            "max_output_tokens": self.max_output_tokens
        });

        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.retry_base.as_millis().try_into().unwrap_or(u64::MAX) / 2)
            .max_delay(RETRY_MAX_DELAY)
            .map(jitter)
            .take(self.max_retries);

        RetryIf::start(
            strategy,
            || self.send_once(&request_body),
            |e: &SummarizerError| {
                let retry = e.is_retryable();
                if retry {
                    warn!(error = %e, "Retrying OpenAI request");
                }
                retry
            },
        )
        .await
    }

    async fn send_once(&self, request_body: &Value) -> Result<String, SummarizerError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key.expose())
            .parse()
            .map_err(|e| SummarizerError::OpenAIError(format!("Invalid Authorization header: {e}")))?;
        headers.insert("Authorization", auth_value);

        let content_type_value = "application/json"
            .parse()
            .map_err(|e| SummarizerError::OpenAIError(format!("Invalid Content-Type header: {e}")))?;
        headers.insert("Content-Type", content_type_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                SummarizerError::OpenAIError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        let response = self
            .http
            .post(self.endpoint())
            .headers(headers)
            .json(request_body)
            .send()
            .await
            .map_err(|e| SummarizerError::HttpError(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(SummarizerError::OpenAIStatus {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_json: Value = response.json().await.map_err(|e| {
            SummarizerError::OpenAIError(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let text = extract_output_text(&response_json)
            .ok_or_else(|| SummarizerError::OpenAIError("No text in response".to_string()))?;

        info!(output_chars = text.chars().count(), "OpenAI response received");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, SummarizerError> {
        self.generate_summary(self.build_prompt(prompt)).await
    }
}

/// Production factory: one shared `reqwest::Client`, one `LlmClient` per request credential.
#[derive(Debug, Clone)]
pub struct OpenAiFactory {
    http: Client,
    config: AppConfig,
}

impl OpenAiFactory {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, SummarizerError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                SummarizerError::HttpError(format!("Failed to build OpenAI HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }
}

impl GeneratorFactory for OpenAiFactory {
    fn generator(&self, api_key: &ApiKey) -> Arc<dyn TextGenerator> {
        Arc::new(LlmClient::from_config(
            self.http.clone(),
            &self.config,
            api_key.clone(),
        ))
    }
}

/// Reads `output_text`, falling back to concatenating every `output_text` content part.
#[must_use]
pub fn extract_output_text(response_json: &Value) -> Option<String> {
    if let Some(text) = response_json.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let mut collected: Vec<String> = Vec::new();
    for item in response_json
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        for part in item
            .get("content")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let is_output_text = part
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t == "output_text");
            if !is_output_text {
                continue;
            }
            if let Some(s) = part.get("text").and_then(Value::as_str) {
                collected.push(s.to_string());
            } else if let Some(s) = part
                .get("text")
                .and_then(|t| t.get("value"))
                .and_then(Value::as_str)
            {
                collected.push(s.to_string());
            }
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n"))
    }
}

fn message_text(message: &ChatCompletionMessage) -> Option<&str> {
    match &message.content {
        Content::Text(text) => Some(text.as_str()),
        _ => None,
    }
}

/// Responses API `input`: one user item with a single `input_text` part per text message.
pub(crate) fn build_responses_input(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(message_text)
        .map(|text| {
            json!({
                "role": "user",
                "content": [{ "type": "input_text", "text": text }]
            })
        })
        .collect()
}
