//! Server-rendered pages for the English and Spanish variants.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::core::models::Language;
use crate::errors::SummarizerError;
use crate::pipeline::CANONICAL_FAILURE_MESSAGE;

pub const API_KEY_HELP_URL: &str =
    "https://help.openai.com/en/articles/4936850-where-do-i-find-my-secret-api-key";
pub const CONTACT_URL: &str = "https://aiaccelera.com";

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
.intro{display:flex;gap:2rem}.warning{background:#fff4e5;border-left:4px solid #f0a020;padding:.75rem}\
.summary{white-space:pre-wrap;line-height:1.5}label{display:block;margin:.5rem 0}";

/// UI copy for one language variant.
#[derive(Debug, Clone, Copy)]
pub struct Strings {
    pub title: &'static str,
    pub header: &'static str,
    pub intro: &'static str,
    pub contact_prefix: &'static str,
    pub contact_suffix: &'static str,
    pub key_heading: &'static str,
    pub key_label: &'static str,
    pub key_placeholder: &'static str,
    pub upload_heading: &'static str,
    pub file_label: &'static str,
    pub submit: &'static str,
    pub summary_heading: &'static str,
    pub missing_key: &'static str,
    pub instructions: &'static str,
    pub here: &'static str,
    pub too_long: &'static str,
    pub empty: &'static str,
    pub not_text: &'static str,
    pub bad_encoding: &'static str,
    pub upload_too_large: &'static str,
    pub failure: &'static str,
}

pub const ENGLISH: Strings = Strings {
    title: "AI Long Text Summarizer",
    header: "AI Long Text Summarizer",
    intro: "ChatGPT cannot summarize long texts. Now you can do it with this app.",
    contact_prefix: "Contact with ",
    contact_suffix: " to build your AI Projects",
    key_heading: "Enter Your OpenAI API Key",
    key_label: "OpenAI API Key",
    key_placeholder: "Ex: sk-2twmA8tfCb8un4...",
    upload_heading: "Upload the text file you want to summarize",
    file_label: "Choose a file",
    submit: "Summarize",
    summary_heading: "Here is your Summary:",
    missing_key: "Please insert OpenAI API Key.",
    instructions: "Instructions",
    here: "here",
    too_long: "Please enter a shorter file. The maximum length is {max} words.",
    empty: "The uploaded file is empty.",
    not_text: "Please upload a plain-text (.txt) file.",
    bad_encoding: "The uploaded file is not valid UTF-8 text.",
    upload_too_large: "The file is too large. The maximum size is {max} KB.",
    failure: CANONICAL_FAILURE_MESSAGE,
};

pub const SPANISH: Strings = Strings {
    title: "Resumen de Texto en Español",
    header: "AI Resumen de Textos en Español",
    intro: "Esta app permite resumir textos largos usando inteligencia artificial. \
            Ideal para estudiantes, investigadores y curiosos.",
    contact_prefix: "Contacto: ",
    contact_suffix: "",
    key_heading: "Ingresa tu clave de OpenAI",
    key_label: "Clave OpenAI",
    key_placeholder: "Ej: sk-...",
    upload_heading: "Sube el archivo de texto que deseas resumir",
    file_label: "Selecciona un archivo (.txt)",
    submit: "Resumir",
    summary_heading: "Aquí está tu resumen:",
    missing_key: "Por favor ingresa tu clave de OpenAI.",
    instructions: "Instrucciones",
    here: "aquí",
    too_long: "Por favor sube un archivo más corto. El límite es {max} palabras.",
    empty: "El archivo subido está vacío.",
    not_text: "Por favor sube un archivo de texto plano (.txt).",
    bad_encoding: "El archivo subido no es texto UTF-8 válido.",
    upload_too_large: "El archivo es demasiado grande. El tamaño máximo es {max} KB.",
    failure: "Lo siento, no pude generar un resumen en este momento. Inténtalo de nuevo más tarde.",
};

#[must_use]
pub fn strings(language: Language) -> &'static Strings {
    match language {
        Language::English => &ENGLISH,
        Language::Spanish => &SPANISH,
    }
}

/// What goes under the summary heading.
#[derive(Debug)]
pub enum PageState<'a> {
    Empty,
    Summary(&'a str),
    Warning(&'a SummarizerError),
}

/// Localized user-facing text for an error. Upstream failures collapse to one generic message.
#[must_use]
pub fn warning_text(language: Language, err: &SummarizerError) -> String {
    let s = strings(language);
    match err {
        SummarizerError::MissingApiKey => s.missing_key.to_string(),
        SummarizerError::TooManyWords { max, .. } => {
            s.too_long.replace("{max}", &format_limit(language, *max))
        }
        SummarizerError::UploadTooLarge { max_bytes } => s
            .upload_too_large
            .replace("{max}", &format_limit(language, (*max_bytes / 1024).max(1))),
        SummarizerError::EmptyDocument => s.empty.to_string(),
        SummarizerError::UnsupportedFileType(_) => s.not_text.to_string(),
        SummarizerError::InvalidEncoding(_) => s.bad_encoding.to_string(),
        SummarizerError::ParseError(msg) => msg.clone(),
        _ => s.failure.to_string(),
    }
}

/// English writes the limit bare ("20000"); Spanish groups thousands with a dot ("20.000").
fn format_limit(language: Language, max: usize) -> String {
    let digits = max.to_string();
    match language {
        Language::English => digits,
        Language::Spanish => {
            let mut grouped = String::new();
            for (i, ch) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    grouped.push('.');
                }
                grouped.push(ch);
            }
            grouped
        }
    }
}

fn warning(language: Language, err: &SummarizerError) -> Markup {
    let s = strings(language);
    html! {
        div.warning role="alert" {
            "⚠️ " (warning_text(language, err))
            @if matches!(err, SummarizerError::MissingApiKey) {
                " " (s.instructions) " "
                a href=(API_KEY_HELP_URL) target="_blank" rel="noopener" { (s.here) }
            }
        }
    }
}

#[must_use]
pub fn page(language: Language, state: &PageState<'_>) -> Markup {
    let s = strings(language);
    html! {
        (DOCTYPE)
        html lang=(language.code()) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (s.title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { (s.header) }
                div.intro {
                    p { (s.intro) }
                    p {
                        (s.contact_prefix)
                        a href=(CONTACT_URL) target="_blank" rel="noopener" { "AI Accelera" }
                        (s.contact_suffix)
                    }
                }
                form method="post" action=(format!("/summarize?lang={}", language.code()))
                    enctype="multipart/form-data" {
                    input type="hidden" name="language" value=(language.code());
                    h2 { (s.key_heading) }
                    label for="api_key" { (s.key_label) }
                    input type="password" id="api_key" name="api_key"
                        placeholder=(s.key_placeholder) autocomplete="off";
                    h2 { (s.upload_heading) }
                    label for="file" { (s.file_label) }
                    input type="file" id="file" name="file" accept=".txt,text/plain";
                    p { button type="submit" { (s.submit) } }
                }
                h3 { (s.summary_heading) }
                @match state {
                    PageState::Empty => {}
                    PageState::Summary(summary) => {
                        div.summary { (summary) }
                    }
                    PageState::Warning(err) => {
                        (warning(language, err))
                    }
                }
            }
        }
    }
}
