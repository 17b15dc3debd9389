//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::panic)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use pod_tracker::api;
use pod_tracker::app_state::AppState;
use pod_tracker::config::TrackerConfig;
use pod_tracker::domain::{EventBus, PodRegistry};
use pod_tracker::persistence::{MemoryStore, PodStore};
use pod_tracker::service::{LogLimits, PodService};

/// Service over an in-memory store with the given retention cap.
pub fn service(max_entries: usize) -> Arc<PodService> {
    let store: Arc<dyn PodStore> = Arc::new(MemoryStore::new());
    Arc::new(PodService::new(
        Arc::new(PodRegistry::new()),
        store,
        EventBus::new(256),
        LogLimits {
            max_entries,
            fetch_page_size: max_entries,
        },
    ))
}

/// Full application router over a fresh in-memory service.
pub fn app() -> Router {
    app_with(service(100))
}

/// Full application router over `service`.
pub fn app_with(service: Arc<PodService>) -> Router {
    api::build_app(AppState::new(service), &TrackerConfig::default())
}

/// Sends one request and returns the status and decoded JSON body
/// (`Null` for an empty body).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
    let Ok(request) = builder.body(body) else {
        panic!("request should build");
    };
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    if bytes.is_empty() {
        return (status, serde_json::Value::Null);
    }
    let Ok(json) = serde_json::from_slice(&bytes) else {
        panic!("body should be JSON: {}", String::from_utf8_lossy(&bytes));
    };
    (status, json)
}

/// Extracts a string field or panics.
pub fn str_field<'a>(value: &'a serde_json::Value, key: &str) -> &'a str {
    let Some(s) = value.get(key).and_then(serde_json::Value::as_str) else {
        panic!("missing string field {key} in {value}");
    };
    s
}

/// Extracts an integer field or panics.
pub fn i64_field(value: &serde_json::Value, key: &str) -> i64 {
    let Some(n) = value.get(key).and_then(serde_json::Value::as_i64) else {
        panic!("missing integer field {key} in {value}");
    };
    n
}

/// Extracts an array field or panics.
pub fn array_field<'a>(value: &'a serde_json::Value, key: &str) -> &'a Vec<serde_json::Value> {
    let Some(a) = value.get(key).and_then(serde_json::Value::as_array) else {
        panic!("missing array field {key} in {value}");
    };
    a
}

/// Finds the cell for `column` in an item response.
pub fn cell<'a>(item: &'a serde_json::Value, column: &str) -> &'a serde_json::Value {
    let Some(found) = array_field(item, "cells")
        .iter()
        .find(|c| c.get("column").and_then(serde_json::Value::as_str) == Some(column))
    else {
        panic!("no cell {column} in {item}");
    };
    found
}
