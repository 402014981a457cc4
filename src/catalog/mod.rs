//! Product Catalog Domain Module
//!
//! This module contains everything behind `GET /api/products`:
//! - Domain models (Category, Product)
//! - The catalog provider and its fixed seed data
//! - Application state shared with handlers
//! - REST API handlers

pub mod handlers;
pub mod models;
pub mod provider;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::{Category, Product};
pub use provider::{Catalog, CatalogError};
pub use state::{AppState, SharedState};
