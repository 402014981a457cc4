//! OpenAPI documentation
//!
//! [`ApiDoc`] describes every documented route. The JSON document and the
//! Swagger UI are only mounted in development.

use crate::catalog::{
    models::{Category, Product},
    state::SharedState,
};
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Swagger UI mount point
pub const SWAGGER_UI_PATH: &str = "/swagger";
/// Machine-readable OpenAPI document
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI document for the catalog API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "InventoryHub API",
        description = "Read-only product catalog consumed by the InventoryHub web client."
    ),
    paths(crate::catalog::handlers::get_products),
    components(schemas(Product, Category)),
    tags((name = "products", description = "Product catalog"))
)]
pub struct ApiDoc;

/// Swagger UI plus the OpenAPI JSON it renders
pub fn routes() -> Router<SharedState> {
    Router::new().merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
}
