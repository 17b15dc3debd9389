//! Pod handlers: create, list, get, delete, load.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreatePodRequest, PodDetailResponse, PodListParams, PodListResponse, PodSummaryDto,
};
use crate::app_state::AppState;
use crate::domain::PodId;
use crate::error::{ErrorResponse, TrackerError};

/// `POST /pods`: Create an empty pod.
///
/// # Errors
///
/// Returns [`TrackerError`] on a blank name or a store failure.
#[utoipa::path(
    post,
    path = "/api/v1/pods",
    tag = "Pods",
    summary = "Create a pod",
    description = "Creates an empty pod with no columns, no items and an empty activity log.",
    request_body = CreatePodRequest,
    responses(
        (status = 201, description = "Pod created", body = PodSummaryDto),
        (status = 400, description = "Blank name", body = ErrorResponse),
        (status = 502, description = "Store rejected the pod", body = ErrorResponse),
    )
)]
pub async fn create_pod(
    State(state): State<AppState>,
    Json(req): Json<CreatePodRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let summary = state.pod_service.create_pod(&req.name).await?;
    Ok((StatusCode::CREATED, Json(PodSummaryDto::from(summary))))
}

/// `GET /pods`: List loaded pods with pagination and an optional name filter.
///
/// # Errors
///
/// Infallible in practice; the signature matches the other handlers.
#[utoipa::path(
    get,
    path = "/api/v1/pods",
    tag = "Pods",
    summary = "List pods",
    description = "Returns a paginated list of loaded pods ordered by creation time, optionally filtered by a case-insensitive name substring.",
    params(PodListParams),
    responses(
        (status = 200, description = "Paginated pod list", body = PodListResponse),
    )
)]
pub async fn list_pods(
    State(state): State<AppState>,
    Query(params): Query<PodListParams>,
) -> Result<impl IntoResponse, TrackerError> {
    let summaries = state.pod_service.list_pods(params.name.as_deref()).await;
    let (page, pagination) = params.pagination().paginate(summaries);
    Ok(Json(PodListResponse {
        data: page.into_iter().map(PodSummaryDto::from).collect(),
        pagination,
    }))
}

/// `GET /pods/{id}`: Pod metadata and schema.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
#[utoipa::path(
    get,
    path = "/api/v1/pods/{id}",
    tag = "Pods",
    summary = "Get pod details",
    description = "Returns the pod's metadata, its columns in display order and the visible column set.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
    ),
    responses(
        (status = 200, description = "Pod details", body = PodDetailResponse),
        (status = 404, description = "Pod not found", body = ErrorResponse),
    )
)]
pub async fn get_pod(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TrackerError> {
    let detail = state.pod_service.get_pod(PodId::from_uuid(id)).await?;
    Ok(Json(PodDetailResponse::from(detail)))
}

/// `DELETE /pods/{id}`: Remove a pod with its items and log.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] or a store failure.
#[utoipa::path(
    delete,
    path = "/api/v1/pods/{id}",
    tag = "Pods",
    summary = "Delete a pod",
    description = "Removes the pod, its schema, its items and its activity log.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
    ),
    responses(
        (status = 204, description = "Pod deleted"),
        (status = 404, description = "Pod not found", body = ErrorResponse),
        (status = 502, description = "Store rejected the deletion", body = ErrorResponse),
    )
)]
pub async fn delete_pod(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TrackerError> {
    state.pod_service.remove_pod(PodId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /pods/{id}/load`: (Re)load a pod from the store.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] if the store does not know the
/// pod, or a store failure.
#[utoipa::path(
    post,
    path = "/api/v1/pods/{id}/load",
    tag = "Pods",
    summary = "Load a pod from the store",
    description = "Seeds the in-memory pod from the store: schema, items and the most recent page of the activity log. Any in-memory copy is replaced.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
    ),
    responses(
        (status = 200, description = "Pod loaded", body = PodSummaryDto),
        (status = 404, description = "Pod not found in the store", body = ErrorResponse),
        (status = 502, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn load_pod(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TrackerError> {
    let summary = state.pod_service.load_pod(PodId::from_uuid(id)).await?;
    Ok(Json(PodSummaryDto::from(summary)))
}

/// Pod routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pods", post(create_pod).get(list_pods))
        .route("/pods/{id}", get(get_pod).delete(delete_pod))
        .route("/pods/{id}/load", post(load_pod))
}
