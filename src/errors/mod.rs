//! Error Reporting Module
//!
//! - Problem details response body
//! - Panic capture and the development diagnostic page
//! - The centralized `/error` endpoint

pub mod handlers;
pub mod panic;
pub mod problem;

pub use handlers::{routes, unexpected_error};
pub use panic::{install_backtrace_capture, PanicReport, UnhandledPanic};
pub use problem::{ProblemDetails, PROBLEM_JSON, UNEXPECTED_ERROR_TITLE};
