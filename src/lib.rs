//! InventoryHub Catalog Library
//!
//! This library provides the read-only product catalog API consumed by the
//! InventoryHub web client.

// Domain modules
pub mod catalog;
pub mod errors;

// Infrastructure
pub mod config;
pub mod docs;
pub mod logging;
pub mod middleware;
pub mod router;
