use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Uploaded file is not valid UTF-8 text: {0}")]
    InvalidEncoding(String),

    #[error("Only plain-text (.txt) files can be summarized, got '{0}'")]
    UnsupportedFileType(String),

    #[error("The uploaded document is empty")]
    EmptyDocument,

    #[error("Document has {words} words; the maximum length is {max} words")]
    TooManyWords { words: usize, max: usize },

    #[error("Upload exceeds the {max_bytes}-byte limit")]
    UploadTooLarge { max_bytes: usize },

    #[error("An OpenAI API key is required")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("OpenAI API error (status {status}): {body}")]
    OpenAIStatus { status: u16, body: String },

    #[error("Failed to access OpenAI API: {0}")]
    OpenAIError(String),

    #[error("Prompt of ~{estimated} tokens does not fit the {limit}-token context window")]
    PromptTooLarge { estimated: usize, limit: usize },

    #[error("A single summary of ~{tokens} tokens exceeds the {max}-token reduce budget")]
    SummaryTooLarge { tokens: usize, max: usize },

    #[error("Summaries still exceed the reduce budget after {0} collapse rounds")]
    CollapseExhausted(usize),
}

impl SummarizerError {
    /// HTTP status used when this error is surfaced to a caller.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            SummarizerError::ParseError(_)
            | SummarizerError::InvalidEncoding(_)
            | SummarizerError::EmptyDocument => 400,
            SummarizerError::MissingApiKey => 401,
            SummarizerError::TooManyWords { .. } | SummarizerError::UploadTooLarge { .. } => 413,
            SummarizerError::UnsupportedFileType(_) => 415,
            SummarizerError::PromptTooLarge { .. }
            | SummarizerError::SummaryTooLarge { .. }
            | SummarizerError::CollapseExhausted(_) => 422,
            SummarizerError::HttpError(_)
            | SummarizerError::OpenAIStatus { .. }
            | SummarizerError::OpenAIError(_) => 502,
            SummarizerError::ConfigError(_) => 500,
        }
    }

    /// Short machine-readable name for JSON error bodies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SummarizerError::ParseError(_) => "parse_error",
            SummarizerError::InvalidEncoding(_) => "invalid_encoding",
            SummarizerError::UnsupportedFileType(_) => "unsupported_file_type",
            SummarizerError::EmptyDocument => "empty_document",
            SummarizerError::TooManyWords { .. } => "too_many_words",
            SummarizerError::UploadTooLarge { .. } => "upload_too_large",
            SummarizerError::MissingApiKey => "missing_api_key",
            SummarizerError::ConfigError(_) => "config_error",
            SummarizerError::HttpError(_) => "http_error",
            SummarizerError::OpenAIStatus { .. } => "openai_status",
            SummarizerError::OpenAIError(_) => "openai_error",
            SummarizerError::PromptTooLarge { .. } => "prompt_too_large",
            SummarizerError::SummaryTooLarge { .. } => "summary_too_large",
            SummarizerError::CollapseExhausted(_) => "collapse_exhausted",
        }
    }

    /// Transport failures, rate limiting and server-side errors are worth another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SummarizerError::HttpError(_) => true,
            SummarizerError::OpenAIStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SummarizerError {
    fn from(error: reqwest::Error) -> Self {
        SummarizerError::HttpError(error.to_string())
    }
}
