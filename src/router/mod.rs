//! Routing module for the InventoryHub API

pub mod endpoints;

use crate::{
    catalog::state::SharedState,
    errors::{install_backtrace_capture, UnhandledPanic},
    middleware::{cors_layer, response_cache, ResponseCache},
};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer};

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    create_app_router_with(state, Router::new())
}

/// Like [`create_app_router`], with `extra_routes` mounted behind the same
/// middleware pipeline.
pub fn create_app_router_with(state: SharedState, extra_routes: Router<SharedState>) -> Router {
    let environment = state.environment();
    let config = &state.config;

    // Routes
    let mut routes = Router::new()
        .merge(crate::catalog::routes())
        .merge(crate::errors::routes());
    if environment.is_development() {
        install_backtrace_capture();
        routes = routes.merge(crate::docs::routes());
    }

    // Middleware, outermost first. Compression wraps the cache so stored
    // bodies stay uncompressed; the cache wraps CORS so its `Vary: origin`
    // keeps per-origin answers apart. Panic responses are built below CORS
    // and get the same CORS headers as any other response.
    let pipeline = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            ResponseCache::new(config.response_cache),
            response_cache,
        ))
        .layer(cors_layer(config.allowed_origin.clone()))
        .layer(CatchPanicLayer::custom(UnhandledPanic::new(environment)));

    routes.merge(extra_routes).layer(pipeline).with_state(state)
}
