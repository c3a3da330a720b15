//! HTTP handlers. Thin adapters between axum extractors and the summarization pipeline.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use maud::Markup;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{Span, info};
use uuid::Uuid;

use super::views::{self, PageState};
use super::parsing::{self, UploadForm};
use super::{AppState, helpers};
use crate::core::models::{Language, SummaryRequest, SummaryResponse};
use crate::errors::SummarizerError;
use crate::pipeline::summarize_request;

fn new_correlation_id() -> String {
    let correlation_id = Uuid::new_v4().to_string();
    Span::current().record("correlation_id", correlation_id.as_str());
    correlation_id
}

/// English landing page.
pub async fn index() -> Markup {
    views::page(Language::English, &PageState::Empty)
}

/// Spanish landing page.
pub async fn index_es() -> Markup {
    views::page(Language::Spanish, &PageState::Empty)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `?lang=` on the form action, so the page language is known even if the body is unreadable.
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    lang: Option<String>,
}

impl FormQuery {
    fn language(&self) -> Language {
        self.lang
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or_default()
    }
}

/// Handles the browser form: reads the upload, summarizes it and renders the page again
/// with either the summary or a warning.
#[tracing::instrument(level = "info", skip_all, fields(correlation_id = tracing::field::Empty))]
pub async fn summarize_form(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
    multipart: Multipart,
) -> (StatusCode, Markup) {
    new_correlation_id();

    let mut form = UploadForm {
        language: query.language(),
        ..UploadForm::default()
    };
    if let Err(e) =
        parsing::read_upload_form(multipart, &mut form, state.config.max_upload_bytes).await
    {
        return warning_page(form.language, &e);
    }
    let language = form.language;

    let request = match form.into_request() {
        Ok(Some(request)) => request,
        Ok(None) => {
            info!("Form submitted without a file");
            return (StatusCode::OK, views::page(language, &PageState::Empty));
        }
        Err(e) => return warning_page(language, &e),
    };

    match summarize_request(state.generators.as_ref(), &state.config, &request).await {
        Ok((word_count, outcome)) => {
            info!(
                word_count,
                chunk_count = outcome.chunk_count,
                "Rendered summary page"
            );
            (
                StatusCode::OK,
                views::page(language, &PageState::Summary(&outcome.summary)),
            )
        }
        Err(e) => warning_page(language, &e),
    }
}

fn warning_page(language: Language, err: &SummarizerError) -> (StatusCode, Markup) {
    let status = helpers::page_status(err);
    helpers::log_error(err);
    (status, views::page(language, &PageState::Warning(err)))
}

/// JSON variant of the summarize flow.
#[tracing::instrument(level = "info", skip_all, fields(correlation_id = tracing::field::Empty))]
pub async fn summarize_json(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = new_correlation_id();

    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return helpers::error_response(&SummarizerError::UploadTooLarge {
                max_bytes: state.config.max_upload_bytes,
            });
        }
        Err(rejection) => {
            return helpers::error_response(&SummarizerError::ParseError(rejection.body_text()));
        }
    };

    match summarize_request(state.generators.as_ref(), &state.config, &request).await {
        Ok((word_count, outcome)) => helpers::ok_json(&SummaryResponse {
            correlation_id,
            language: request.language,
            word_count,
            outcome,
        }),
        Err(e) => helpers::error_response(&e),
    }
}
