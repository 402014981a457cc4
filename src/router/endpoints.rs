//! Route registration table
//!
//! Every route the server exposes is described by an [`EndpointSpec`], which
//! carries the metadata that would otherwise be scattered over handler
//! attributes: which methods it answers, how long clients and the response
//! cache may keep its output, and whether it shows up in the API docs.

use crate::catalog::state::SharedState;
use axum::{
    handler::Handler,
    http::{header, HeaderValue},
    routing::{any, on, MethodFilter},
    Router,
};
use std::time::Duration;
use tower_http::set_header::SetResponseHeaderLayer;

/// Static description of one route
#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    /// Operation name, also used as the OpenAPI operation id
    pub name: &'static str,

    /// Accepted methods; `None` answers every method
    pub method: Option<MethodFilter>,

    /// Route path
    pub path: &'static str,

    /// Public cache lifetime stamped on successful responses
    pub cache_duration: Option<Duration>,

    /// Whether the route is listed in the OpenAPI document
    pub documented: bool,
}

impl EndpointSpec {
    /// `Cache-Control` value for this route, if it is cacheable
    pub fn cache_control(&self) -> Option<HeaderValue> {
        let duration = self.cache_duration?;
        HeaderValue::from_str(&format!("public,max-age={}", duration.as_secs())).ok()
    }
}

/// `GET /api/products`
pub const GET_PRODUCTS: EndpointSpec = EndpointSpec {
    name: "GetProducts",
    method: Some(MethodFilter::GET),
    path: "/api/products",
    cache_duration: Some(Duration::from_secs(30)),
    documented: true,
};

/// Target of the production error handler
pub const ERROR: EndpointSpec = EndpointSpec {
    name: "Error",
    method: None,
    path: "/error",
    cache_duration: None,
    documented: false,
};

/// Every route the application registers
pub const ENDPOINTS: &[EndpointSpec] = &[GET_PRODUCTS, ERROR];

/// Adds `handler` to `router` as described by `endpoint`.
pub fn register<H, T>(
    router: Router<SharedState>,
    endpoint: &EndpointSpec,
    handler: H,
) -> Router<SharedState>
where
    H: Handler<T, SharedState>,
    T: 'static,
{
    let mut method_router = match endpoint.method {
        Some(filter) => on(filter, handler),
        None => any(handler),
    };

    if let Some(value) = endpoint.cache_control() {
        method_router = method_router.layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            value,
        ));
    }

    router.route(endpoint.path, method_router)
}
