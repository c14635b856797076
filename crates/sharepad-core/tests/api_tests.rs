//! Integration tests for the sync HTTP API.

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sharepad_core::datauri::encode_data_uri;
use sharepad_core::web::{router, AppState, WebServerConfig};
use sharepad_core::{SharedPayload, SharedStore};
use tower::ServiceExt;

fn app_with(config: WebServerConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::with_store(config, SharedStore::new()));
    (router(Arc::clone(&state)), state)
}

fn app() -> (Router, Arc<AppState>) {
    app_with(WebServerConfig::default())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get(app: &Router, path: &str) -> (StatusCode, Vec<u8>) {
    send(app, Request::get(path).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, path: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let request = Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

fn payload(body: &[u8]) -> SharedPayload {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_fetch_on_fresh_server_is_empty() {
    let (app, _) = app();
    let (status, body) = get(&app, "/api/text").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "text": "" }));
}

#[tokio::test]
async fn test_update_then_fetch() {
    let (app, _) = app();

    let (status, body) = post(&app, "/api/text", r#"{"text":"hello"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload(&body).text, "hello");

    let (_, body) = get(&app, "/api/text").await;
    assert_eq!(payload(&body).text, "hello");
}

#[tokio::test]
async fn test_update_merges_fields() {
    let (app, state) = app();
    let image = encode_data_uri(b"fake", "image/png");

    post(&app, "/api/text", r#"{"text":"hello"}"#).await;
    let (_, body) = post(&app, "/api/text", json!({ "image": image }).to_string()).await;

    let merged = payload(&body);
    assert_eq!(merged.text, "hello");
    assert_eq!(merged.image.as_deref(), Some(image.as_str()));
    assert_eq!(state.store.read().await, merged);
}

#[tokio::test]
async fn test_null_image_clears() {
    let (app, _) = app();

    post(&app, "/api/text", r#"{"text":"keep","image":"data:image/png;base64,AAAA"}"#).await;
    let (status, body) = post(&app, "/api/text", r#"{"image":null}"#).await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "text": "keep" }));
}

#[tokio::test]
async fn test_empty_object_is_noop() {
    let (app, _) = app();

    post(&app, "/api/text", r#"{"text":"same"}"#).await;
    let (status, body) = post(&app, "/api/text", "{}").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload(&body).text, "same");
}

#[tokio::test]
async fn test_malformed_body_rejected_and_store_untouched() {
    let (app, state) = app();
    post(&app, "/api/text", r#"{"text":"before"}"#).await;

    for body in ["not json", "[1,2]", r#"{"text":42}"#, ""] {
        let (status, response) = post(&app, "/api/text", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");

        let error: Value = serde_json::from_slice(&response).unwrap();
        assert_eq!(error["code"], "E001");
        assert_eq!(error["message"], "Request body must be a JSON object");
        assert!(error["details"].is_string(), "body {body:?}");
    }

    assert_eq!(state.store.read().await.text, "before");
}

#[tokio::test]
async fn test_content_type_not_required() {
    let (app, _) = app();
    let request = Request::post("/api/text")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"text":"plain"}"#))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload(&body).text, "plain");
}

#[tokio::test]
async fn test_sync_alias_shares_store() {
    let (app, _) = app();

    post(&app, "/sync", r#"{"text":"via alias"}"#).await;
    let (_, body) = get(&app, "/api/text").await;
    assert_eq!(payload(&body).text, "via alias");
}

#[tokio::test]
async fn test_large_image_accepted_by_default() {
    let (app, _) = app();
    let image = encode_data_uri(&vec![7u8; 6 * 1024 * 1024], "image/png");

    let (status, body) = post(&app, "/api/text", json!({ "image": image }).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload(&body).image.map(|i| i.len()), Some(image.len()));
}

#[tokio::test]
async fn test_enforced_image_limit() {
    let (app, state) = app_with(WebServerConfig {
        enforce_image_limit: true,
        max_image_bytes: 16,
        ..Default::default()
    });

    let big = encode_data_uri(&[0u8; 17], "image/png");
    let (status, body) = post(&app, "/api/text", json!({ "image": big }).to_string()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], "E002");

    let (status, _) = post(&app, "/api/text", r#"{"image":"not-a-uri"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(state.store.read().await.image.is_none());

    let small = encode_data_uri(&[0u8; 16], "image/png");
    let (status, _) = post(&app, "/api/text", json!({ "image": small }).to_string()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_body_limit() {
    let (app, state) = app_with(WebServerConfig {
        max_body_bytes: 64,
        ..Default::default()
    });

    let body = json!({ "text": "x".repeat(128) }).to_string();
    let (status, _) = post(&app, "/api/text", body).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(state.store.read().await.text, "");
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = get(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["version"], sharepad_core::VERSION);
}

#[tokio::test]
async fn test_network_info() {
    let (app, _) = app_with(WebServerConfig {
        port: 9321,
        localhost_only: true,
        ..Default::default()
    });
    let (_, body) = get(&app, "/api/network").await;

    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["port"], 9321);
    assert_eq!(value["addresses"], json!(["http://localhost:9321"]));
    assert!(value["device_name"].is_string());
}

#[tokio::test]
async fn test_qr_is_svg() {
    let (app, _) = app();
    let response = app
        .clone()
        .oneshot(Request::get("/api/qr").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
}

#[tokio::test]
async fn test_index_page_served() {
    let (app, _) = app();
    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("/api/text"));
}
