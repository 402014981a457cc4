//! Request pipeline stages
//!
//! The stages owned by this crate. Compression, tracing and panic capture
//! come straight from `tower-http` and are wired in [`crate::router`].

pub mod cache;
pub mod cors;

pub use cache::{response_cache, ResponseCache};
pub use cors::cors_layer;
