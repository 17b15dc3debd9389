//! Schema handlers: add and remove columns, set the visible set.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, post, put};
use axum::{Json, Router};

use crate::api::dto::{AddColumnRequest, ColumnDto, SetVisibleColumnsRequest, VisibleColumnsResponse};
use crate::app_state::AppState;
use crate::domain::PodId;
use crate::error::{ErrorResponse, TrackerError};

/// `POST /pods/{id}/columns`: Append a column.
///
/// # Errors
///
/// Returns [`TrackerError::DuplicateColumn`], [`TrackerError::PodNotFound`]
/// or a store failure.
#[utoipa::path(
    post,
    path = "/api/v1/pods/{id}/columns",
    tag = "Columns",
    summary = "Add a column",
    description = "Appends a typed column to the pod schema. Every existing item receives a null default for it. Names are case-sensitive and unique within the pod.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
    ),
    request_body = AddColumnRequest,
    responses(
        (status = 201, description = "Column added", body = ColumnDto),
        (status = 400, description = "Invalid name or type", body = ErrorResponse),
        (status = 404, description = "Pod not found", body = ErrorResponse),
        (status = 409, description = "Column already exists", body = ErrorResponse),
    )
)]
pub async fn add_column(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AddColumnRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let def = state
        .pod_service
        .add_column(PodId::from_uuid(id), &req.name, req.column_type)
        .await?;
    Ok((StatusCode::CREATED, Json(ColumnDto::from(def))))
}

/// `DELETE /pods/{id}/columns/{name}`: Remove a column.
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`], [`TrackerError::PodNotFound`]
/// or a store failure.
#[utoipa::path(
    delete,
    path = "/api/v1/pods/{id}/columns/{name}",
    tag = "Columns",
    summary = "Remove a column",
    description = "Removes the column from the schema, the visible set and every item. Log entries that observed it keep their value.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("name" = String, Path, description = "Column name"),
    ),
    responses(
        (status = 204, description = "Column removed"),
        (status = 404, description = "Pod or column not found", body = ErrorResponse),
    )
)]
pub async fn remove_column(
    State(state): State<AppState>,
    Path((id, name)): Path<(uuid::Uuid, String)>,
) -> Result<impl IntoResponse, TrackerError> {
    state
        .pod_service
        .remove_column(PodId::from_uuid(id), &name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /pods/{id}/visible-columns`: Replace the visible column set.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] or a store failure.
#[utoipa::path(
    put,
    path = "/api/v1/pods/{id}/visible-columns",
    tag = "Columns",
    summary = "Set visible columns",
    description = "Replaces the visible column set. Unknown names are silently dropped; the response lists the retained names in display order.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
    ),
    request_body = SetVisibleColumnsRequest,
    responses(
        (status = 200, description = "Visible set updated", body = VisibleColumnsResponse),
        (status = 404, description = "Pod not found", body = ErrorResponse),
    )
)]
pub async fn set_visible_columns(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SetVisibleColumnsRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let columns = state
        .pod_service
        .set_visible_columns(PodId::from_uuid(id), &req.columns)
        .await?;
    Ok(Json(VisibleColumnsResponse { columns }))
}

/// Column routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pods/{id}/columns", post(add_column))
        .route("/pods/{id}/columns/{name}", delete(remove_column))
        .route("/pods/{id}/visible-columns", put(set_visible_columns))
}
