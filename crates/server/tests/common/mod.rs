//! Shared test helpers.

pub mod server;

use axum::body::{Body, Bytes};
use axum::http::{header, Request, Response};
use axum::Router;
use tower::ServiceExt;

/// Send a request through the router.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("request failed")
}

/// Build a JSON POST request.
#[allow(dead_code)]
pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body to bytes.
#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body is not valid JSON")
}

/// Strip scheme and authority from a transfer URL, keeping the request path.
#[allow(dead_code)]
pub fn url_path(url: &str) -> String {
    let mut parts = url.splitn(4, '/');
    let tail = parts.nth(3).expect("not an absolute URL");
    format!("/{tail}")
}
