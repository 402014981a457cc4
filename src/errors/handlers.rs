//! Centralized error endpoint

use super::{panic::PanicReport, problem::ProblemDetails};
use crate::{
    catalog::state::SharedState,
    config::Environment,
    router::endpoints::{self, ERROR},
};
use axum::{extract::State, Router};

/// Creates the `/error` route
pub fn routes() -> Router<SharedState> {
    endpoints::register(Router::new(), &ERROR, error)
}

/// Endpoint: /error (any method)
/// Reports an unexpected failure. Hidden from the API documentation.
async fn error(State(state): State<SharedState>) -> ProblemDetails {
    unexpected_error(state.environment(), None)
}

/// Builds the problem response for an unexpected failure.
///
/// The stack trace is only attached in development; production never leaks
/// internal detail.
pub fn unexpected_error(environment: Environment, failure: Option<&PanicReport>) -> ProblemDetails {
    let detail = failure
        .filter(|_| environment.is_development())
        .and_then(|report| report.backtrace.clone());
    ProblemDetails::unexpected(detail)
}
