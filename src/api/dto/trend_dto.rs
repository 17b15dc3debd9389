//! Trend projection DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ColumnValue, ItemId, TrendPoint, TrendSummary};
use crate::service::TrendReport;

/// One observation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrendPointDto {
    /// When the observation was logged.
    pub logged_at: DateTime<Utc>,
    /// Observed value in wire form.
    pub value: serde_json::Value,
}

impl From<TrendPoint> for TrendPointDto {
    fn from(p: TrendPoint) -> Self {
        Self {
            logged_at: p.logged_at,
            value: p.value.to_wire(),
        }
    }
}

/// Aggregates over a series.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrendSummaryDto {
    /// Number of observations, `Null` included.
    pub observations: usize,
    /// Observations that recorded `Null`.
    pub null_observations: usize,
    /// Oldest observation.
    pub first_at: Option<DateTime<Utc>>,
    /// Newest observation.
    pub last_at: Option<DateTime<Utc>>,
    /// Newest value.
    pub latest: Option<serde_json::Value>,
    /// Smallest scalar value.
    pub min: Option<serde_json::Value>,
    /// Largest scalar value.
    pub max: Option<serde_json::Value>,
    /// Newest minus oldest scalar (seconds for time columns).
    pub change: Option<i64>,
}

fn wire(value: Option<ColumnValue>) -> Option<serde_json::Value> {
    value.as_ref().map(ColumnValue::to_wire)
}

impl From<TrendSummary> for TrendSummaryDto {
    fn from(s: TrendSummary) -> Self {
        Self {
            observations: s.observations,
            null_observations: s.null_observations,
            first_at: s.first_at,
            last_at: s.last_at,
            latest: wire(s.latest),
            min: wire(s.min),
            max: wire(s.max),
            change: s.change,
        }
    }
}

/// Series plus summary for one item column.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrendResponse {
    /// Item the series belongs to.
    pub item_id: ItemId,
    /// Column name.
    pub column: String,
    /// Observations, oldest first.
    pub points: Vec<TrendPointDto>,
    /// Aggregates.
    pub summary: TrendSummaryDto,
}

impl From<TrendReport> for TrendResponse {
    fn from(r: TrendReport) -> Self {
        Self {
            item_id: r.item_id,
            column: r.column,
            points: r.points.into_iter().map(TrendPointDto::from).collect(),
            summary: r.summary.into(),
        }
    }
}
