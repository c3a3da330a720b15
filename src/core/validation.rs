//! Input checks applied before any text reaches the model.

use std::path::Path;

use crate::core::models::ApiKey;
use crate::errors::SummarizerError;

/// Counts words the way the limit has always been enforced: pieces between single spaces,
/// empty pieces included. Newlines do not separate words.
#[must_use]
pub fn count_words(text: &str) -> usize {
    text.split(' ').count()
}

/// # Errors
///
/// Returns `InvalidEncoding` if the upload is not strict UTF-8.
pub fn decode_upload(bytes: &[u8]) -> Result<String, SummarizerError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| SummarizerError::InvalidEncoding(e.to_string()))
}

/// Only `.txt` uploads are accepted.
///
/// # Errors
///
/// Returns `UnsupportedFileType` for any other extension, including none.
pub fn check_file_name(file_name: &str) -> Result<(), SummarizerError> {
    let is_txt = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

    if is_txt {
        Ok(())
    } else {
        Err(SummarizerError::UnsupportedFileType(file_name.to_string()))
    }
}

/// Validates a document and credential, returning the word count on success.
///
/// Checks run in a fixed order: word limit, emptiness, then credential presence.
///
/// # Errors
///
/// `TooManyWords`, `EmptyDocument` or `MissingApiKey`.
pub fn validate_request(
    text: &str,
    api_key: &ApiKey,
    max_words: usize,
) -> Result<usize, SummarizerError> {
    let words = count_words(text);
    if words > max_words {
        return Err(SummarizerError::TooManyWords {
            words,
            max: max_words,
        });
    }

    if text.trim().is_empty() {
        return Err(SummarizerError::EmptyDocument);
    }

    if api_key.is_blank() {
        return Err(SummarizerError::MissingApiKey);
    }

    Ok(words)
}
