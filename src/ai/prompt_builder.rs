use crate::core::models::Language;
use crate::errors::SummarizerError;

/// Placeholder every summarization template must contain.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Per-chunk prompt, also the English combine prompt.
pub const CONCISE_SUMMARY_TEMPLATE: &str =
    "Write a concise summary of the following:\n\n\n\"{text}\"\n\n\nCONCISE SUMMARY:";

pub const SPANISH_COMBINE_TEMPLATE: &str = "Resume el siguiente texto en español:\n{text}";

/// A prompt with a single `{text}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// # Errors
    ///
    /// Returns `ConfigError` when the template has no `{text}` placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self, SummarizerError> {
        let template = template.into();
        if !template.contains(TEXT_PLACEHOLDER) {
            return Err(SummarizerError::ConfigError(format!(
                "Prompt template is missing the {TEXT_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self { template })
    }

    fn from_static(template: &'static str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    #[must_use]
    pub fn render(&self, text: &str) -> String {
        self.template
            .replace(TEXT_PLACEHOLDER, &sanitize_document_text(text))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }
}

/// The map and combine prompts used for one language variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub map: PromptTemplate,
    pub combine: PromptTemplate,
}

impl PromptSet {
    /// Chunks are always summarized with the English prompt; only the final merge is localized.
    #[must_use]
    pub fn for_language(language: Language) -> Self {
        let combine = match language {
            Language::English => CONCISE_SUMMARY_TEMPLATE,
            Language::Spanish => SPANISH_COMBINE_TEMPLATE,
        };
        Self {
            map: PromptTemplate::from_static(CONCISE_SUMMARY_TEMPLATE),
            combine: PromptTemplate::from_static(combine),
        }
    }
}

/// Strips control characters other than newlines and tabs.
#[must_use]
pub fn sanitize_document_text(raw: &str) -> String {
    raw.chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect()
}
