//! Catalog State Management
//!
//! This module holds the application state shared by every request handler.

use super::provider::Catalog;
use crate::config::{Environment, ServerConfig};
use std::sync::Arc;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state: the frozen catalog plus the startup configuration
///
/// Nothing in here is written after construction, so handlers read it
/// without any locking.
#[derive(Debug)]
pub struct AppState {
    /// The product catalog, built once at startup
    pub catalog: Catalog,

    /// Configuration the server was started with
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig, catalog: Catalog) -> Self {
        Self { catalog, config }
    }

    /// Wraps the state for sharing across the router
    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    pub fn environment(&self) -> Environment {
        self.config.environment
    }
}
