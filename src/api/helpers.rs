//! Common helper functions for API handlers.
//!
//! Response builders shared by the JSON endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::errors::SummarizerError;

/// Returns a 200 OK response with a JSON body.
pub fn ok_json<T: Serialize>(body: &T) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, kind: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": message, "kind": kind }))).into_response()
}

/// Maps a pipeline error onto a JSON error response, logging it at a level matching its cause.
#[must_use]
pub fn error_response(err: &SummarizerError) -> Response {
    log_error(err);
    err_response(err.status_code(), err.kind(), &err.to_string())
}

/// Upstream and server faults log at error level, client mistakes at warn.
pub fn log_error(err: &SummarizerError) {
    if err.status_code() >= 500 {
        error!(error = %err, kind = err.kind(), "Summarization failed");
    } else {
        warn!(error = %err, kind = err.kind(), "Rejected summarization request");
    }
}

/// Status code for an HTML page reporting `err`.
#[must_use]
pub fn page_status(err: &SummarizerError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
