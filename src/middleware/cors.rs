//! Cross-origin policy
//!
//! Exactly one origin (the companion web client) may call the API, with any
//! header and any method. Requests from other origins get no
//! `Access-Control-Allow-Origin` header, which browsers treat as a refusal.

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Builds the CORS layer for `allowed_origin`
pub fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([allowed_origin]))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt; // for `oneshot`

    const CLIENT_ORIGIN: &str = "http://localhost:5238";

    fn app() -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(cors_layer(HeaderValue::from_static(CLIENT_ORIGIN)))
    }

    #[tokio::test]
    async fn allowed_origin_is_echoed() {
        let request = Request::builder()
            .uri("/ping")
            .header(header::ORIGIN, CLIENT_ORIGIN)
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

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
    async fn other_origins_get_no_allow_origin_header() {
        let request = Request::builder()
            .uri("/ping")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn preflight_allows_any_method_and_header() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/ping")
            .header(header::ORIGIN, CLIENT_ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-custom")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let headers = response.headers();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), CLIENT_ORIGIN);
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(), "*");
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), "*");
    }
}
