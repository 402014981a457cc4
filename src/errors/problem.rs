//! Problem details responses
//!
//! Request failures are reported as `application/problem+json` documents in
//! the RFC 9457 shape: `type`, `title`, `status`, an optional `detail` and a
//! per-response `traceId`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// Title used for every unhandled failure
pub const UNEXPECTED_ERROR_TITLE: &str = "An unexpected error occurred.";
/// Media type of problem responses
pub const PROBLEM_JSON: &str = "application/problem+json";

const INTERNAL_SERVER_ERROR_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.6.1";

/// A structured error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// URI identifying the problem type
    #[serde(rename = "type")]
    pub problem_type: String,

    /// Short, human-readable summary
    pub title: String,

    /// HTTP status code
    pub status: u16,

    /// Diagnostic detail; left out of the body when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Identifier to correlate this response with server logs
    pub trace_id: String,
}

impl ProblemDetails {
    /// The generic 500 problem, optionally carrying `detail`
    pub fn unexpected(detail: Option<String>) -> Self {
        Self {
            problem_type: INTERNAL_SERVER_ERROR_TYPE.to_owned(),
            title: UNEXPECTED_ERROR_TITLE.to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, PROBLEM_JSON)],
            Json(self),
        )
            .into_response()
    }
}
