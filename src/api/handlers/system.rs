//! System endpoints: health check and column type catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::ColumnType;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` when the server answers.
    pub status: String,
    /// Server time (RFC 3339).
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Number of loaded pods.
    pub pods: usize,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp and the number of loaded pods.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            pods: state.pod_service.registry().len().await,
        }),
    )
}

/// Supported column type info.
#[derive(Debug, Serialize, ToSchema)]
pub struct ColumnTypeInfo {
    /// Type name used in requests.
    pub column_type: ColumnType,
    /// What the type holds.
    pub description: &'static str,
    /// Example wire value.
    pub example: serde_json::Value,
}

/// `GET /config/column-types`: List supported column types.
#[utoipa::path(
    get,
    path = "/config/column-types",
    tag = "System",
    summary = "List column types",
    description = "Returns every column type a pod schema can declare, with an example of its wire form.",
    responses(
        (status = 200, description = "Column type catalog", body = Vec<ColumnTypeInfo>),
    )
)]
pub async fn column_types_handler() -> impl IntoResponse {
    let types = vec![
        ColumnTypeInfo {
            column_type: ColumnType::Text,
            description: "Free text, kept verbatim",
            example: serde_json::json!("felt strong"),
        },
        ColumnTypeInfo {
            column_type: ColumnType::Number,
            description: "Signed 64-bit integer",
            example: serde_json::json!(12),
        },
        ColumnTypeInfo {
            column_type: ColumnType::Time,
            description: "Time of day or duration as HH:MM:SS",
            example: serde_json::json!("00:45:00"),
        },
    ];
    (StatusCode::OK, Json(types))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/column-types", get(column_types_handler))
}
