use serde::{Deserialize, Serialize};
use std::fmt;

/// Language variant of the summarizer. Selects UI copy and the combine prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
        }
    }

    /// Parses a language code, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "es" | "spanish" | "español" => Some(Language::Spanish),
            _ => None,
        }
    }
}

/// A user-supplied OpenAI secret key. Never printed in full.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct ApiKey(String);

impl ApiKey {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for ApiKey {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("ApiKey(<empty>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

/// One bounded piece of the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub page_content: String,
    pub index: usize,
}

/// A request to summarize a full text, as received from the browser form or the JSON API.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRequest {
    pub api_key: ApiKey,
    pub text: String,
    #[serde(default)]
    pub language: Language,
}

/// Result of a complete map-reduce run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryOutcome {
    pub summary: String,
    pub chunk_summaries: Vec<String>,
    pub chunk_count: usize,
    pub collapse_rounds: usize,
}

/// JSON body returned by the summarize API.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub correlation_id: String,
    pub language: Language,
    pub word_count: usize,
    #[serde(flatten)]
    pub outcome: SummaryOutcome,
}
