//! Trend handler.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::TrendResponse;
use crate::app_state::AppState;
use crate::domain::{ItemId, PodId};
use crate::error::{ErrorResponse, TrackerError};

/// `GET /pods/{id}/items/{item_id}/trend/{column}`: Series and summary.
///
/// # Errors
///
/// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
#[utoipa::path(
    get,
    path = "/api/v1/pods/{id}/items/{item_id}/trend/{column}",
    tag = "Trends",
    summary = "Trend of one item column",
    description = "Projects the activity log onto one (item, column) pair: every entry that observed the column, oldest first, plus counts, extrema and change for number and time columns. Entries that skipped the column are omitted; null observations are included. Removed items and columns keep their history.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pod UUID"),
        ("item_id" = i64, Path, description = "Item id within the pod"),
        ("column" = String, Path, description = "Column name"),
    ),
    responses(
        (status = 200, description = "Trend", body = TrendResponse),
        (status = 404, description = "Pod not found", body = ErrorResponse),
    )
)]
pub async fn get_trend(
    State(state): State<AppState>,
    Path((id, item_id, column)): Path<(uuid::Uuid, i64, String)>,
) -> Result<impl IntoResponse, TrackerError> {
    let report = state
        .pod_service
        .trend_summary(PodId::from_uuid(id), ItemId::new(item_id), &column)
        .await?;
    Ok(Json(TrendResponse::from(report)))
}

/// Trend routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pods/{id}/items/{item_id}/trend/{column}", get(get_trend))
}
