//! End-to-end tests of the REST surface, driven through the router
//! with `tower::ServiceExt::oneshot`.

#![allow(clippy::panic)]

mod common;

use axum::Router;
use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{app, app_with, array_field, cell, i64_field, send, service, str_field};

async fn create_pod(app: &Router, name: &str) -> String {
    let (status, body) = send(app, "POST", "/api/v1/pods", Some(json!({"name": name}))).await;
    assert_eq!(status, StatusCode::CREATED);
    str_field(&body, "pod_id").to_string()
}

async fn add_column(app: &Router, pod: &str, name: &str, ty: &str) {
    let (status, _) = send(
        app,
        "POST",
        &format!("/api/v1/pods/{pod}/columns"),
        Some(json!({"name": name, "type": ty})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn create_item(app: &Router, pod: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/v1/pods/{pod}/items"),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    i64_field(&body, "item_id")
}

/// Pod with `reps: number`, `duration: time`, `notes: text` and one item.
async fn workout(app: &Router) -> (String, i64) {
    let pod = create_pod(app, "gym").await;
    add_column(app, &pod, "reps", "number").await;
    add_column(app, &pod, "duration", "time").await;
    add_column(app, &pod, "notes", "text").await;
    let item = create_item(app, &pod, "squat").await;
    (pod, item)
}

#[tokio::test]
async fn health_reports_loaded_pods() {
    let app = app();
    create_pod(&app, "gym").await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(str_field(&body, "status"), "healthy");
    assert_eq!(i64_field(&body, "pods"), 1);
}

#[tokio::test]
async fn new_item_resolves_every_column_to_null() {
    let app = app();
    let (pod, item) = workout(&app).await;

    let (status, body) = send(&app, "GET", &format!("/api/v1/pods/{pod}/items/{item}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let cells = array_field(&body, "cells");
    assert_eq!(cells.len(), 3);
    for c in cells {
        assert_eq!(c.get("value"), Some(&Value::Null));
        assert_eq!(c.get("overridden"), Some(&json!(false)));
    }
}

#[tokio::test]
async fn typed_edit_text_edit_and_clear() {
    let app = app();
    let (pod, item) = workout(&app).await;
    let uri = format!("/api/v1/pods/{pod}/items/{item}/values/reps");

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"value": 5, "actor": "ana"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cell(&body, "reps").get("value"), Some(&json!(5)));
    assert_eq!(cell(&body, "reps").get("overridden"), Some(&json!(true)));

    // Unparsable free text degrades to a Null override.
    let (status, body) = send(&app, "PUT", &uri, Some(json!({"text": "lots"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cell(&body, "reps").get("value"), Some(&Value::Null));
    assert_eq!(cell(&body, "reps").get("overridden"), Some(&json!(true)));

    let (status, state) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.get("overridden"), Some(&json!(true)));

    let (status, body) = send(&app, "DELETE", &format!("{uri}?actor=ana"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cell(&body, "reps").get("overridden"), Some(&json!(false)));

    let (_, state) = send(&app, "GET", &uri, None).await;
    assert_eq!(state.get("overridden"), Some(&json!(false)));
}

#[tokio::test]
async fn typed_edit_of_wrong_kind_is_rejected() {
    let app = app();
    let (pod, item) = workout(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/pods/{pod}/items/{item}/values/reps"),
        Some(json!({"value": "5"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let Some(code) = body.pointer("/error/code").and_then(Value::as_i64) else {
        panic!("error body expected: {body}");
    };
    assert_eq!(code, 2006);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/pods/{pod}/items/{item}/values/reps"),
        Some(json!({"value": 5, "text": "5"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn schema_errors_map_to_status_codes() {
    let app = app();
    let (pod, item) = workout(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/pods/{pod}/columns"),
        Some(json!({"name": "reps", "type": "text"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body.pointer("/error/code"), Some(&json!(2003)));

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/pods/{pod}/items/{item}/values/weight"),
        Some(json!({"value": 80})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, "GET", &format!("/api/v1/pods/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.pointer("/error/code"), Some(&json!(2001)));

    let (status, _) = send(&app, "GET", &format!("/api/v1/pods/{pod}/items/99"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn visible_columns_follow_display_order_and_drop_unknown() {
    let app = app();
    let (pod, item) = workout(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/pods/{pod}/visible-columns"),
        Some(json!({"columns": ["duration", "bogus", "reps"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("columns"), Some(&json!(["reps", "duration"])));

    let (_, compact) = send(
        &app,
        "GET",
        &format!("/api/v1/pods/{pod}/items/{item}/compact"),
        None,
    )
    .await;
    let names: Vec<&str> = array_field(&compact, "cells")
        .iter()
        .filter_map(|c| c.get("column").and_then(Value::as_str))
        .collect();
    assert_eq!(names, ["reps", "duration"]);

    let (_, detail) = send(&app, "GET", &format!("/api/v1/pods/{pod}"), None).await;
    assert_eq!(detail.get("visible_columns"), Some(&json!(["reps", "duration"])));
    assert_eq!(array_field(&detail, "columns").len(), 3);
}

#[tokio::test]
async fn log_orders_most_recent_first_and_skips_unobserved() {
    let app = app();
    let (pod, item) = workout(&app).await;
    let log_uri = format!("/api/v1/pods/{pod}/items/{item}/logs");

    for (at, reps) in [
        ("2026-03-02T10:00:00Z", 5),
        ("2026-03-01T10:00:00Z", 3),
        ("2026-03-03T10:00:00Z", 8),
    ] {
        let (status, entry) = send(
            &app,
            "POST",
            &log_uri,
            Some(json!({
                "values": {"reps": reps, "duration": "00:45:00"},
                "skipped": ["notes"],
                "logged_at": at,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(values) = entry.get("values").and_then(Value::as_object) else {
            panic!("values expected: {entry}");
        };
        assert!(!values.contains_key("notes"));
    }

    let (status, body) = send(&app, "GET", &format!("/api/v1/pods/{pod}/logs"), None).await;
    assert_eq!(status, StatusCode::OK);
    let reps: Vec<i64> = array_field(&body, "data")
        .iter()
        .filter_map(|e| e.pointer("/values/reps").and_then(Value::as_i64))
        .collect();
    assert_eq!(reps, [8, 5, 3]);

    let (_, limited) = send(&app, "GET", &format!("/api/v1/pods/{pod}/logs?limit=1"), None).await;
    assert_eq!(array_field(&limited, "data").len(), 1);

    // Logging never touches item values.
    let (_, item_body) = send(&app, "GET", &format!("/api/v1/pods/{pod}/items/{item}"), None).await;
    assert_eq!(cell(&item_body, "reps").get("value"), Some(&Value::Null));
}

#[tokio::test]
async fn column_both_submitted_and_skipped_is_rejected() {
    let app = app();
    let (pod, item) = workout(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/pods/{pod}/items/{item}/logs"),
        Some(json!({"values": {"reps": 5}, "skipped": ["reps"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trend_survives_column_and_item_removal() {
    let app = app();
    let (pod, item) = workout(&app).await;
    let log_uri = format!("/api/v1/pods/{pod}/items/{item}/logs");

    for (at, duration) in [
        ("2026-03-01T10:00:00Z", Value::from("00:30:00")),
        ("2026-03-02T10:00:00Z", Value::Null),
        ("2026-03-03T10:00:00Z", Value::from("00:45:00")),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &log_uri,
            Some(json!({"values": {"duration": duration}, "logged_at": at})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    // An entry that skipped `duration` is not an observation.
    let (status, _) = send(
        &app,
        "POST",
        &log_uri,
        Some(json!({"values": {"reps": 1}, "skipped": ["duration"], "logged_at": "2026-03-04T10:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/pods/{pod}/columns/duration"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/pods/{pod}/items/{item}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, trend) = send(
        &app,
        "GET",
        &format!("/api/v1/pods/{pod}/items/{item}/trend/duration"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let values: Vec<&Value> = array_field(&trend, "points")
        .iter()
        .filter_map(|p| p.get("value"))
        .collect();
    assert_eq!(values, [&json!("00:30:00"), &Value::Null, &json!("00:45:00")]);
    assert_eq!(trend.pointer("/summary/observations"), Some(&json!(3)));
    assert_eq!(trend.pointer("/summary/null_observations"), Some(&json!(1)));
    assert_eq!(trend.pointer("/summary/change"), Some(&json!(900)));
}

#[tokio::test]
async fn retention_cap_bounds_the_working_set() {
    let app = app_with(service(3));
    let (pod, item) = workout(&app).await;

    for day in 1..=5 {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/pods/{pod}/items/{item}/logs"),
            Some(json!({"values": {"reps": day}, "logged_at": format!("2026-03-0{day}T08:00:00Z")})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, "GET", &format!("/api/v1/pods/{pod}/logs"), None).await;
    let reps: Vec<i64> = array_field(&body, "data")
        .iter()
        .filter_map(|e| e.pointer("/values/reps").and_then(Value::as_i64))
        .collect();
    assert_eq!(reps, [5, 4, 3]);
}

#[tokio::test]
async fn pods_list_paginates_and_filters() {
    let app = app();
    for name in ["Gym", "Garden", "Reading", "gymnastics"] {
        create_pod(&app, name).await;
    }

    let (status, body) = send(&app, "GET", "/api/v1/pods?per_page=3&page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(array_field(&body, "data").len(), 1);
    assert_eq!(body.pointer("/pagination/total"), Some(&json!(4)));
    assert_eq!(body.pointer("/pagination/total_pages"), Some(&json!(2)));

    let (_, filtered) = send(&app, "GET", "/api/v1/pods?name=gym", None).await;
    assert_eq!(array_field(&filtered, "data").len(), 2);
}

#[tokio::test]
async fn load_reseeds_pod_from_store() {
    let svc = service(100);
    let app = app_with(std::sync::Arc::clone(&svc));
    let (pod, item) = workout(&app).await;
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/pods/{pod}/items/{item}/values/notes"),
        Some(json!({"value": "deep"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, summary) = send(&app, "POST", &format!("/api/v1/pods/{pod}/load"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(i64_field(&summary, "item_count"), 1);
    assert_eq!(i64_field(&summary, "column_count"), 3);

    let (_, item_body) = send(&app, "GET", &format!("/api/v1/pods/{pod}/items/{item}"), None).await;
    assert_eq!(cell(&item_body, "notes").get("value"), Some(&json!("deep")));

    let (status, outcome) = send(&app, "POST", &format!("/api/v1/pods/{pod}/logs/refresh"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(i64_field(&outcome, "inserted"), 0);
}

#[tokio::test]
async fn deleted_pod_is_gone() {
    let app = app();
    let pod = create_pod(&app, "temp").await;
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/pods/{pod}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/v1/pods/{pod}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
