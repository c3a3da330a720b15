use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

use crate::core::models::{ApiKey, Language, SummaryRequest};
use crate::core::validation::{check_file_name, decode_upload};
use crate::errors::SummarizerError;

/// Raw fields of the upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub api_key: ApiKey,
    pub language: Language,
    pub file_name: Option<String>,
    pub file_bytes: Option<Vec<u8>>,
}

impl UploadForm {
    /// Browsers submit an empty, unnamed part when no file was chosen.
    #[must_use]
    pub fn has_file(&self) -> bool {
        let named = self.file_name.as_deref().is_some_and(|n| !n.is_empty());
        let non_empty = self.file_bytes.as_ref().is_some_and(|b| !b.is_empty());
        named || non_empty
    }

    /// Turns the form into a request, or `None` when no file was uploaded.
    ///
    /// # Errors
    ///
    /// `UnsupportedFileType` for non-`.txt` names and `InvalidEncoding` for non-UTF-8 content.
    pub fn into_request(self) -> Result<Option<SummaryRequest>, SummarizerError> {
        if !self.has_file() {
            return Ok(None);
        }

        if let Some(name) = self.file_name.as_deref().filter(|n| !n.is_empty()) {
            check_file_name(name)?;
        }

        let text = decode_upload(self.file_bytes.as_deref().unwrap_or_default())?;
        Ok(Some(SummaryRequest {
            api_key: self.api_key,
            text,
            language: self.language,
        }))
    }
}

/// Reads the `api_key`, `language` and `file` parts into `form`; other parts are ignored.
///
/// Fields read before a failure stay in `form`, so the caller still knows the language.
///
/// # Errors
///
/// `UploadTooLarge` once the body passes `max_upload_bytes`, `ParseError` for any other
/// malformed multipart stream.
pub async fn read_upload_form(
    mut multipart: Multipart,
    form: &mut UploadForm,
    max_upload_bytes: usize,
) -> Result<(), SummarizerError> {
    let fail = |what: &str, e: MultipartError| multipart_error(what, &e, max_upload_bytes);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| fail("Invalid multipart body", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "api_key" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| fail("Failed to read api_key", e))?;
                form.api_key = ApiKey::new(raw);
            }
            "language" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| fail("Failed to read language", e))?;
                form.language = Language::from_code(&raw).unwrap_or(form.language);
            }
            "file" => {
                form.file_name = field.file_name().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| fail("Failed to read uploaded file", e))?;
                form.file_bytes = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    Ok(())
}

/// Body-limit failures surface as 413 from axum; everything else is a malformed request.
pub fn multipart_error(
    what: &str,
    error: &MultipartError,
    max_upload_bytes: usize,
) -> SummarizerError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SummarizerError::UploadTooLarge {
            max_bytes: max_upload_bytes,
        }
    } else {
        SummarizerError::ParseError(format!("{what}: {error}"))
    }
}
