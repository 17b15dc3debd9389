//! Activity log handlers: log, list, refresh.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::decode_wire;
use crate::api::dto::{
    LogActivityRequest, LogEntryDto, LogListResponse, LogQueryParams, RefreshLogResponse,
};
use crate::app_state::AppState;
use crate::domain::{ColumnValue, ItemId, PodId};
use crate::error::{ErrorResponse, TrackerError};
use crate::service::{LogQuery, NewActivity};

/// `POST /pods/{id}/items/{item_id}/logs`: Record an activity.
///
/// # Errors
///
/// Returns [`TrackerError::ItemNotFound`], [`TrackerError::UnknownColumn`],
/// [`TrackerError::TypeMismatch`], [`TrackerError::InvalidRequest`] for a
/// column both submitted and skipped, [`TrackerError::PodNotFound`] or a
/// store failure.
#[utoipa::path(
    post,
    path = "/api/v1/pods/{id}/items/{item_id}/logs",
    tag = "Activity log",
    summary = "Log an activity",
    description = "Appends an immutable snapshot of the observed columns. Columns listed in `skipped` are omitted from the snapshot; `null` values are recorded as explicit null observations. The store assigns the authoritative timestamp. Item values are not changed.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("item_id" = i64, Path, description = "Item id within the pod"),
    ),
    request_body = LogActivityRequest,
    responses(
        (status = 201, description = "Activity logged", body = LogEntryDto),
        (status = 400, description = "Column both submitted and skipped", body = ErrorResponse),
        (status = 404, description = "Pod, item or column not found", body = ErrorResponse),
        (status = 422, description = "Value does not match the column type", body = ErrorResponse),
        (status = 502, description = "Store rejected the entry", body = ErrorResponse),
    )
)]
pub async fn log_activity(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(uuid::Uuid, i64)>,
    Json(req): Json<LogActivityRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let pod_id = PodId::from_uuid(id);
    let types = state.pod_service.column_types(pod_id).await?;

    let mut values: HashMap<String, ColumnValue> = HashMap::with_capacity(req.values.len());
    for (column, wire) in &req.values {
        let column_type = types
            .get(column)
            .copied()
            .ok_or_else(|| TrackerError::UnknownColumn(column.clone()))?;
        values.insert(column.clone(), decode_wire(column, wire, column_type)?);
    }

    let entry = state
        .pod_service
        .log_activity(
            pod_id,
            NewActivity {
                item_id: ItemId::new(item_id),
                values,
                skipped: req.skipped.into_iter().collect(),
                notes: req.notes,
                logged_at: req.logged_at,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(LogEntryDto::from(entry))))
}

/// `GET /pods/{id}/logs`: Recent activity, most recent first.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
#[utoipa::path(
    get,
    path = "/api/v1/pods/{id}/logs",
    tag = "Activity log",
    summary = "List log entries",
    description = "Returns entries of the in-memory working set ordered most recent first (ties by insertion, newest first), optionally filtered by item and lower time bound.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        LogQueryParams,
    ),
    responses(
        (status = 200, description = "Log entries", body = LogListResponse),
        (status = 404, description = "Pod not found", body = ErrorResponse),
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(params): Query<LogQueryParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let query = LogQuery {
        item_id: params.item_id.map(ItemId::new),
        since: params.since,
        limit: params.limit,
    };
    let entries = state
        .pod_service
        .recent_log(PodId::from_uuid(id), query)
        .await?;
    Ok(Json(LogListResponse {
        data: entries.into_iter().map(LogEntryDto::from).collect(),
    }))
}

/// `POST /pods/{id}/logs/refresh`: Merge the store's latest page.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] or a store failure.
#[utoipa::path(
    post,
    path = "/api/v1/pods/{id}/logs/refresh",
    tag = "Activity log",
    summary = "Refresh the log from the store",
    description = "Fetches the most recent page from the store, inserts unknown entries, re-sorts known entries on their authoritative timestamps and applies the retention cap.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
    ),
    responses(
        (status = 200, description = "Merge outcome", body = RefreshLogResponse),
        (status = 404, description = "Pod not found", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn refresh_logs(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TrackerError> {
    let outcome = state.pod_service.refresh_log(PodId::from_uuid(id)).await?;
    Ok(Json(RefreshLogResponse::from(outcome)))
}

/// Activity log routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pods/{id}/items/{item_id}/logs", post(log_activity))
        .route("/pods/{id}/logs", get(list_logs))
        .route("/pods/{id}/logs/refresh", post(refresh_logs))
}
