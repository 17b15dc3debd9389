//! Pod request and response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{ColumnDto, PaginationMeta, PaginationParams};
use crate::domain::{PodDetail, PodId, PodSummary};

/// Request body for `POST /pods`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePodRequest {
    /// Display name of the pod.
    pub name: String,
}

/// Query parameters for `GET /pods`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PodListParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default)]
    pub per_page: Option<u32>,
    /// Case-insensitive name substring.
    #[serde(default)]
    pub name: Option<String>,
}

impl PodListParams {
    /// Pagination part of the query.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Pod summary in list and create responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PodSummaryDto {
    /// Pod identifier.
    pub pod_id: PodId,
    /// Pod name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of columns.
    pub column_count: usize,
    /// Number of items.
    pub item_count: usize,
    /// Entries in the activity log working set.
    pub log_entries: usize,
}

impl From<PodSummary> for PodSummaryDto {
    fn from(s: PodSummary) -> Self {
        Self {
            pod_id: s.pod_id,
            name: s.name,
            created_at: s.created_at,
            column_count: s.column_count,
            item_count: s.item_count,
            log_entries: s.log_entries,
        }
    }
}

/// Paginated pod list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PodListResponse {
    /// Pods on this page.
    pub data: Vec<PodSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Full pod description including its schema.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PodDetailResponse {
    /// Pod identifier.
    pub pod_id: PodId,
    /// Pod name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub last_modified_at: DateTime<Utc>,
    /// Columns in display order.
    pub columns: Vec<ColumnDto>,
    /// Visible column names in display order.
    pub visible_columns: Vec<String>,
    /// Number of items.
    pub item_count: usize,
    /// Entries in the activity log working set.
    pub log_entries: usize,
}

impl From<PodDetail> for PodDetailResponse {
    fn from(d: PodDetail) -> Self {
        Self {
            pod_id: d.summary.pod_id,
            name: d.summary.name,
            created_at: d.summary.created_at,
            last_modified_at: d.last_modified_at,
            columns: d.columns.into_iter().map(ColumnDto::from).collect(),
            visible_columns: d.visible_columns,
            item_count: d.summary.item_count,
            log_entries: d.summary.log_entries,
        }
    }
}
