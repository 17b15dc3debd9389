//! Item handlers: create, list, get, compact view, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreateItemRequest, ItemListResponse, ItemResponse};
use crate::app_state::AppState;
use crate::domain::{ItemId, PodId};
use crate::error::{ErrorResponse, TrackerError};

/// `POST /pods/{id}/items`: Create an item.
///
/// # Errors
///
/// Returns [`TrackerError`] on a blank name, a missing pod or a store
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/pods/{id}/items",
    tag = "Items",
    summary = "Create an item",
    description = "Creates an item with a null default for every current column and no overrides.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
    ),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Blank name", body = ErrorResponse),
        (status = 404, description = "Pod not found", body = ErrorResponse),
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let view = state
        .pod_service
        .create_item(PodId::from_uuid(id), &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(ItemResponse::from(view))))
}

/// `GET /pods/{id}/items`: All items with effective values.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
#[utoipa::path(
    get,
    path = "/api/v1/pods/{id}/items",
    tag = "Items",
    summary = "List items",
    description = "Returns every item of the pod with each column resolved to its effective value (override, else default, else null).",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
    ),
    responses(
        (status = 200, description = "Items", body = ItemListResponse),
        (status = 404, description = "Pod not found", body = ErrorResponse),
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TrackerError> {
    let views = state.pod_service.list_items(PodId::from_uuid(id)).await?;
    Ok(Json(ItemListResponse {
        data: views.into_iter().map(ItemResponse::from).collect(),
    }))
}

/// `GET /pods/{id}/items/{item_id}`: One item with effective values.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] or [`TrackerError::ItemNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/pods/{id}/items/{item_id}",
    tag = "Items",
    summary = "Get an item",
    description = "Returns one item with every column resolved.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("item_id" = i64, Path, description = "Item id within the pod"),
    ),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 404, description = "Pod or item not found", body = ErrorResponse),
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(uuid::Uuid, i64)>,
) -> Result<impl IntoResponse, TrackerError> {
    let view = state
        .pod_service
        .item_view(PodId::from_uuid(id), ItemId::new(item_id))
        .await?;
    Ok(Json(ItemResponse::from(view)))
}

/// `GET /pods/{id}/items/{item_id}/compact`: Visible columns only.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] or [`TrackerError::ItemNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/pods/{id}/items/{item_id}/compact",
    tag = "Items",
    summary = "Get the compact view of an item",
    description = "Returns the item restricted to the pod's visible columns, in display order.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("item_id" = i64, Path, description = "Item id within the pod"),
    ),
    responses(
        (status = 200, description = "Compact item", body = ItemResponse),
        (status = 404, description = "Pod or item not found", body = ErrorResponse),
    )
)]
pub async fn get_item_compact(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(uuid::Uuid, i64)>,
) -> Result<impl IntoResponse, TrackerError> {
    let view = state
        .pod_service
        .compact_view(PodId::from_uuid(id), ItemId::new(item_id))
        .await?;
    Ok(Json(ItemResponse::from(view)))
}

/// `DELETE /pods/{id}/items/{item_id}`: Remove an item.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`], [`TrackerError::ItemNotFound`]
/// or a store failure.
#[utoipa::path(
    delete,
    path = "/api/v1/pods/{id}/items/{item_id}",
    tag = "Items",
    summary = "Delete an item",
    description = "Removes the item. Its activity log entries are kept.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("item_id" = i64, Path, description = "Item id within the pod"),
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Pod or item not found", body = ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(uuid::Uuid, i64)>,
) -> Result<impl IntoResponse, TrackerError> {
    state
        .pod_service
        .remove_item(PodId::from_uuid(id), ItemId::new(item_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pods/{id}/items", get(list_items).post(create_item))
        .route("/pods/{id}/items/{item_id}", get(get_item).delete(delete_item))
        .route("/pods/{id}/items/{item_id}/compact", get(get_item_compact))
}
