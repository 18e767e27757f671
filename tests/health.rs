mod common;

use axum::http::StatusCode;
use common::{TestApp, get};

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Health check");
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["backend"], "memory");
}

#[tokio::test]
async fn unknown_paths_use_the_envelope() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/api/nope", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"]["path"], "/api/nope");
}

#[tokio::test]
async fn catalog_lists_form_options() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/api/catalog", None)).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["sizes"].as_array().map(Vec::len), Some(5));
    assert!(data["colors"].as_array().unwrap().iter().any(|c| c == "Other"));
    assert_eq!(data["max_rental_days"], 7);
}
