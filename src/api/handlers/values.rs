//! Value handlers: write and clear user overrides.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::put;
use axum::{Json, Router};

use super::decode_wire;
use crate::api::dto::{
    ANONYMOUS_ACTOR, ActorParams, EditValueRequest, ItemResponse, OverrideStateResponse,
};
use crate::app_state::AppState;
use crate::domain::{ItemId, PodId};
use crate::error::{ErrorResponse, TrackerError};

/// `PUT /pods/{id}/items/{item_id}/values/{column}`: Write an override.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] unless exactly one of `value`
/// and `text` is given, [`TrackerError::TypeMismatch`] for a typed value
/// of the wrong kind, [`TrackerError::UnknownColumn`],
/// [`TrackerError::ItemNotFound`], [`TrackerError::PodNotFound`] or a
/// store failure.
#[utoipa::path(
    put,
    path = "/api/v1/pods/{id}/items/{item_id}/values/{column}",
    tag = "Values",
    summary = "Edit a value",
    description = "Stores a user override for one cell. A typed `value` must match the column type (`null` stores an explicit null override). Free `text` is coerced to the column type and degrades to null when it does not parse. Returns the item with its effective values.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("item_id" = i64, Path, description = "Item id within the pod"),
        ("column" = String, Path, description = "Column name"),
    ),
    request_body = EditValueRequest,
    responses(
        (status = 200, description = "Override stored", body = ItemResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Pod, item or column not found", body = ErrorResponse),
        (status = 422, description = "Value does not match the column type", body = ErrorResponse),
    )
)]
pub async fn edit_value(
    State(state): State<AppState>,
    Path((id, item_id, column)): Path<(uuid::Uuid, i64, String)>,
    Json(req): Json<EditValueRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let pod_id = PodId::from_uuid(id);
    let item_id = ItemId::new(item_id);
    let actor = req.actor.as_deref().unwrap_or(ANONYMOUS_ACTOR);

    let view = match (req.value, req.text) {
        (Some(wire), None) => {
            let types = state.pod_service.column_types(pod_id).await?;
            let column_type = types
                .get(&column)
                .copied()
                .ok_or_else(|| TrackerError::UnknownColumn(column.clone()))?;
            let value = decode_wire(&column, &wire, column_type)?;
            state
                .pod_service
                .edit_value(pod_id, item_id, &column, value, actor)
                .await?
        }
        (None, Some(text)) => {
            state
                .pod_service
                .edit_value_text(pod_id, item_id, &column, &text, actor)
                .await?
        }
        _ => {
            return Err(TrackerError::InvalidRequest(
                "exactly one of 'value' and 'text' is required".to_string(),
            ));
        }
    };
    Ok(Json(ItemResponse::from(view)))
}

/// `GET /pods/{id}/items/{item_id}/values/{column}`: Override state.
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`], [`TrackerError::ItemNotFound`]
/// or [`TrackerError::PodNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/pods/{id}/items/{item_id}/values/{column}",
    tag = "Values",
    summary = "Get the override state of a cell",
    description = "Reports whether the cell carries a user override and, if so, its value.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("item_id" = i64, Path, description = "Item id within the pod"),
        ("column" = String, Path, description = "Column name"),
    ),
    responses(
        (status = 200, description = "Override state", body = OverrideStateResponse),
        (status = 404, description = "Pod, item or column not found", body = ErrorResponse),
    )
)]
pub async fn get_override(
    State(state): State<AppState>,
    Path((id, item_id, column)): Path<(uuid::Uuid, i64, String)>,
) -> Result<impl IntoResponse, TrackerError> {
    let override_state = state
        .pod_service
        .override_state(PodId::from_uuid(id), ItemId::new(item_id), &column)
        .await?;
    Ok(Json(OverrideStateResponse::new(column, &override_state)))
}

/// `DELETE /pods/{id}/items/{item_id}/values/{column}`: Clear an override.
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`], [`TrackerError::ItemNotFound`],
/// [`TrackerError::PodNotFound`] or a store failure.
#[utoipa::path(
    delete,
    path = "/api/v1/pods/{id}/items/{item_id}/values/{column}",
    tag = "Values",
    summary = "Clear an override",
    description = "Removes the user override so the default value shows through again. Clearing a cell without an override is a no-op.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("item_id" = i64, Path, description = "Item id within the pod"),
        ("column" = String, Path, description = "Column name"),
        ActorParams,
    ),
    responses(
        (status = 200, description = "Override cleared", body = ItemResponse),
        (status = 404, description = "Pod, item or column not found", body = ErrorResponse),
    )
)]
pub async fn clear_override(
    State(state): State<AppState>,
    Path((id, item_id, column)): Path<(uuid::Uuid, i64, String)>,
    Query(params): Query<ActorParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let actor = params.actor.as_deref().unwrap_or(ANONYMOUS_ACTOR);
    let view = state
        .pod_service
        .clear_override(PodId::from_uuid(id), ItemId::new(item_id), &column, actor)
        .await?;
    Ok(Json(ItemResponse::from(view)))
}

/// Value routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/pods/{id}/items/{item_id}/values/{column}",
        put(edit_value).get(get_override).delete(clear_override),
    )
}
