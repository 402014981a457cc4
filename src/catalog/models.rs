//! Catalog Domain Models
//!
//! This module contains the records served by the catalog endpoint.

use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

// =============================================================================
// Catalog Domain Models
// =============================================================================

/// A named grouping that one or more products belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Category {
    /// Category identifier
    pub id: u32,

    /// Display name (e.g. "Electronics")
    pub name: String,
}

impl Category {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A single catalog entry
///
/// Products never own their category; every product in a given category
/// points at the same shared instance.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Product {
    /// Product identifier, unique within the catalog
    pub id: u32,

    /// Display name
    pub name: String,

    /// Unit price, never negative
    #[schema(example = 1200.5)]
    pub price: f64,

    /// Units in stock
    pub stock: u32,

    /// The category this product is listed under
    pub category: Arc<Category>,
}

impl Product {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        price: f64,
        stock: u32,
        category: &Arc<Category>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock,
            category: Arc::clone(category),
        }
    }
}
