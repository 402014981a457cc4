//! Integration tests for the InventoryHub HTTP API
//!
//! These tests drive the fully assembled router, middleware included:
//! - Product catalog endpoint and its caching headers
//! - Response cache reuse
//! - CORS policy
//! - Response compression
//! - Panic handling in development and production
//! - API documentation exposure

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

// Import from the main crate
use inventory_hub::catalog::{AppState, Catalog};
use inventory_hub::config::ServerConfig;
use inventory_hub::errors::{PROBLEM_JSON, UNEXPECTED_ERROR_TITLE};
use inventory_hub::router::{create_app_router, create_app_router_with};

const CLIENT_ORIGIN: &str = "http://localhost:5238";

fn state_for(config: ServerConfig) -> inventory_hub::catalog::SharedState {
    let catalog = Catalog::seeded().expect("seed catalog is valid");
    AppState::new(config, catalog).shared()
}

/// Helper function to create a production app instance
fn create_production_app() -> Router {
    create_app_router(state_for(ServerConfig::default()))
}

/// Helper function to create a development app instance
fn create_development_app() -> Router {
    create_app_router(state_for(ServerConfig::development()))
}

async fn always_panics() -> &'static str {
    panic!("catalog exploded")
}

/// App with an extra `/boom` route that panics, behind the real pipeline
fn create_panicking_app(config: ServerConfig) -> Router {
    let extra = Router::new().route("/boom", get(always_panics));
    create_app_router_with(state_for(config), extra)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get_request_with(uri: &str, name: header::HeaderName, value: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

/// Sends a request and returns the response head plus its body bytes
async fn send(app: &Router, request: Request<Body>) -> (Response<()>, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (Response::from_parts(parts, ()), bytes.to_vec())
}

fn json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

// =============================================================================
// Catalog endpoint
// =============================================================================

#[tokio::test]
async fn test_get_products_returns_full_catalog() {
    let app = create_production_app();

    let (response, body) = send(&app, get_request("/api/products")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let products = json(&body);
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 12);

    let laptop = &products[0];
    assert_eq!(laptop["id"], 1);
    assert_eq!(laptop["name"], "Laptop");
    assert_eq!(laptop["price"], 1200.5);
    assert_eq!(laptop["stock"], 25);
    assert_eq!(laptop["category"]["id"], 101);
    assert_eq!(laptop["category"]["name"], "Electronics");

    let notebook = &products[11];
    assert_eq!(notebook["name"], "Notebook");
    assert_eq!(notebook["category"]["name"], "Office Supplies");
}

#[tokio::test]
async fn test_get_products_declares_thirty_second_cache() {
    let app = create_production_app();

    let (response, _) = send(&app, get_request("/api/products")).await;

    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public,max-age=30"
    );
}

#[tokio::test]
async fn test_get_products_is_idempotent() {
    let app = create_production_app();

    let mut payloads = Vec::new();
    for _ in 0..5 {
        let (response, body) = send(&app, get_request("/api/products")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(&body).as_array().unwrap().len(), 12);
        payloads.push(body);
    }

    assert!(payloads.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_products_rejects_other_methods() {
    let app = create_production_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Response cache
// =============================================================================

#[tokio::test]
async fn test_repeated_requests_are_served_from_cache() {
    let app = create_production_app();

    let (first, first_body) = send(&app, get_request("/api/products")).await;
    let (second, second_body) = send(&app, get_request("/api/products")).await;

    assert!(first.headers().get(header::AGE).is_none());
    assert!(second.headers().get(header::AGE).is_some(), "second response comes from the cache");
    assert_eq!(first_body, second_body);
    assert_eq!(
        first.headers().get(header::CACHE_CONTROL),
        second.headers().get(header::CACHE_CONTROL)
    );
}

#[tokio::test]
async fn test_client_no_cache_forces_fresh_response() {
    let app = create_production_app();

    send(&app, get_request("/api/products")).await;
    let (response, _) = send(
        &app,
        get_request_with("/api/products", header::CACHE_CONTROL, "no-cache"),
    )
    .await;

    assert!(response.headers().get(header::AGE).is_none());
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_allowed_origin_receives_cors_headers() {
    let app = create_production_app();

    let (response, _) = send(
        &app,
        get_request_with("/api/products", header::ORIGIN, CLIENT_ORIGIN),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        CLIENT_ORIGIN
    );
}

#[tokio::test]
async fn test_other_origin_lacks_cors_headers() {
    let app = create_production_app();

    let (response, _) = send(
        &app,
        get_request_with("/api/products", header::ORIGIN, "http://evil.example"),
    )
    .await;

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cached_response_does_not_leak_cors_to_other_origin() {
    let app = create_production_app();

    // Prime the cache from the allowed origin
    send(
        &app,
        get_request_with("/api/products", header::ORIGIN, CLIENT_ORIGIN),
    )
    .await;

    let (foreign, _) = send(
        &app,
        get_request_with("/api/products", header::ORIGIN, "http://evil.example"),
    )
    .await;
    assert!(foreign
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());

    let (cached, _) = send(
        &app,
        get_request_with("/api/products", header::ORIGIN, CLIENT_ORIGIN),
    )
    .await;
    assert!(cached.headers().get(header::AGE).is_some());
    assert_eq!(
        cached
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        CLIENT_ORIGIN
    );
}

#[tokio::test]
async fn test_preflight_from_allowed_origin() {
    let app = create_production_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/products")
        .header(header::ORIGIN, CLIENT_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(&app, request).await;

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        CLIENT_ORIGIN
    );
}

// =============================================================================
// Compression
// =============================================================================

#[tokio::test]
async fn test_gzip_is_negotiated() {
    let app = create_production_app();

    for _ in 0..2 {
        let (response, body) = send(
            &app,
            get_request_with("/api/products", header::ACCEPT_ENCODING, "gzip"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_ENCODING).unwrap(), "gzip");
        assert_eq!(&body[..2], &[0x1f, 0x8b], "gzip magic bytes");
    }
}

#[tokio::test]
async fn test_brotli_is_negotiated() {
    let app = create_production_app();

    let (response, _) = send(
        &app,
        get_request_with("/api/products", header::ACCEPT_ENCODING, "br"),
    )
    .await;

    assert_eq!(response.headers().get(header::CONTENT_ENCODING).unwrap(), "br");
    let vary: Vec<&str> = response
        .headers()
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert!(vary.iter().any(|v| v.to_ascii_lowercase().contains("accept-encoding")));
}

#[tokio::test]
async fn test_identity_when_no_encoding_requested() {
    let app = create_production_app();

    let (response, body) = send(&app, get_request("/api/products")).await;

    assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    assert_eq!(json(&body).as_array().unwrap().len(), 12);
}

// =============================================================================
// Error handling
// =============================================================================

#[tokio::test]
async fn test_production_panic_yields_generic_problem() {
    let app = create_panicking_app(ServerConfig::default());

    let (response, body) = send(&app, get_request("/boom")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        PROBLEM_JSON
    );

    let problem = json(&body);
    assert_eq!(problem["title"], UNEXPECTED_ERROR_TITLE);
    assert_eq!(problem["status"], 500);
    assert!(problem.get("detail").is_none() || problem["detail"].is_null());
    assert!(!String::from_utf8_lossy(&body).contains("catalog exploded"));
}

#[tokio::test]
async fn test_development_panic_shows_stack_trace() {
    let app = create_panicking_app(ServerConfig::development());

    let (response, body) = send(&app, get_request("/boom")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("catalog exploded"));
    assert!(page.contains("Stack trace:"));
    assert!(!page.contains("<unavailable>"), "backtrace captured by the panic hook");
}

#[tokio::test]
async fn test_panic_problem_carries_cors_headers() {
    let app = create_panicking_app(ServerConfig::default());

    let (response, _) = send(&app, get_request_with("/boom", header::ORIGIN, CLIENT_ORIGIN)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        CLIENT_ORIGIN
    );
}

#[tokio::test]
async fn test_development_panic_page_carries_cors_headers() {
    let app = create_panicking_app(ServerConfig::development());

    let (response, _) = send(&app, get_request_with("/boom", header::ORIGIN, CLIENT_ORIGIN)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        CLIENT_ORIGIN
    );
}

#[tokio::test]
async fn test_server_keeps_serving_after_panic() {
    let app = create_panicking_app(ServerConfig::default());

    send(&app, get_request("/boom")).await;
    let (response, _) = send(&app, get_request("/api/products")).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_error_route_returns_problem_for_any_method() {
    let app = create_production_app();

    for method in [Method::GET, Method::POST, Method::PUT] {
        let request = Request::builder()
            .method(method.clone())
            .uri("/error")
            .body(Body::empty())
            .unwrap();
        let (response, body) = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{method}");
        let problem = json(&body);
        assert_eq!(problem["title"], UNEXPECTED_ERROR_TITLE);
        assert!(problem.get("detail").is_none());
        assert!(problem["traceId"].is_string());
    }
}

// =============================================================================
// API documentation
// =============================================================================

#[tokio::test]
async fn test_openapi_document_served_in_development() {
    let app = create_development_app();

    let (response, body) = send(&app, get_request("/api-docs/openapi.json")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json(&body);
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/products"));
    assert!(!paths.contains_key("/error"), "error route is hidden from the docs");
    assert_eq!(paths["/api/products"]["get"]["operationId"], "GetProducts");
}

#[tokio::test]
async fn test_swagger_ui_mounted_in_development() {
    let app = create_development_app();

    let (response, _) = send(&app, get_request("/swagger/")).await;

    assert_ne!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_documentation_absent_in_production() {
    let app = create_production_app();

    let (doc, _) = send(&app, get_request("/api-docs/openapi.json")).await;
    let (ui, _) = send(&app, get_request("/swagger/")).await;

    assert_eq!(doc.status(), StatusCode::NOT_FOUND);
    assert_eq!(ui.status(), StatusCode::NOT_FOUND);
}
