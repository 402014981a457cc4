//! REST API handlers for the product catalog

use super::{models::Product, provider::Catalog, state::SharedState};
use crate::router::endpoints::{self, GET_PRODUCTS};
use axum::{extract::State, Json, Router};

/// Creates routes for catalog operations
pub fn routes() -> Router<SharedState> {
    endpoints::register(Router::new(), &GET_PRODUCTS, get_products)
}

/// Endpoint: GET /api/products
/// Returns the full product catalog.
#[utoipa::path(
    get,
    path = "/api/products",
    operation_id = "GetProducts",
    tag = "products",
    responses(
        (status = 200, description = "Every product in the catalog, with its category", body = Vec<Product>)
    )
)]
pub async fn get_products(State(state): State<SharedState>) -> Json<Catalog> {
    tracing::debug!(count = state.catalog.len(), "serving product catalog");
    Json(state.catalog.clone())
}
