//! Unhandled panic responses
//!
//! `tower-http`'s `CatchPanicLayer` turns a panicking handler into a
//! response through [`UnhandledPanic`]. Development answers with a
//! diagnostic page carrying the panic message and stack trace; production
//! answers with the same problem document `/error` serves.
//!
//! The stack trace has to be captured while the panic is still unwinding,
//! so [`install_backtrace_capture`] adds a panic hook that stores it in a
//! thread-local slot. The slot is read back on the same thread by
//! [`UnhandledPanic::response_for_panic`].

use super::handlers::unexpected_error;
use crate::config::Environment;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::{any::Any, backtrace::Backtrace, cell::RefCell, panic, sync::Once};
use tower_http::catch_panic::ResponseForPanic;

thread_local! {
    static CAPTURED_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Installs the backtrace-capturing panic hook once per process.
///
/// The previously installed hook still runs afterwards.
pub fn install_backtrace_capture() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            CAPTURED_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

fn take_captured_backtrace() -> Option<String> {
    CAPTURED_BACKTRACE.with(|slot| slot.borrow_mut().take())
}

/// What is known about a panic once it has been caught
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicReport {
    /// The panic message, when the payload was a string
    pub message: String,

    /// Stack trace captured by the panic hook, if installed
    pub backtrace: Option<String>,
}

impl PanicReport {
    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_owned()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "panic payload is not a string".to_owned()
        };

        Self {
            message,
            backtrace: take_captured_backtrace(),
        }
    }
}

/// Converts caught panics into responses for the current environment
#[derive(Debug, Clone, Copy)]
pub struct UnhandledPanic {
    environment: Environment,
}

impl UnhandledPanic {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

impl ResponseForPanic for UnhandledPanic {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let report = PanicReport::from_payload(err.as_ref());
        tracing::error!(panic = %report.message, "unhandled panic while processing request");

        if self.environment.is_development() {
            developer_page(&report)
        } else {
            unexpected_error(self.environment, Some(&report)).into_response()
        }
    }
}

/// Plain-text diagnostic page shown in development
fn developer_page(report: &PanicReport) -> Response {
    let trace = report.backtrace.as_deref().unwrap_or("<unavailable>");
    let page = format!(
        "An unhandled panic occurred while processing the request.\n\n\
         Panic: {}\n\n\
         Stack trace:\n{trace}\n",
        report.message
    );

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        page,
    )
        .into_response()
}
