//! Activity log DTOs.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ActivityLogEntry, ItemId, LogEntryId, MergeOutcome, PodId};

/// Request body for `POST /pods/{id}/items/{item_id}/logs`.
///
/// Columns named in `values` are recorded with the given wire value
/// (`null` is recorded as an explicit `Null` observation). Columns in
/// `skipped` are left out of the snapshot entirely.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LogActivityRequest {
    /// Observed values keyed by column name, in wire form.
    #[serde(default)]
    pub values: HashMap<String, serde_json::Value>,
    /// Columns that were not observed.
    #[serde(default)]
    pub skipped: Vec<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Client-side timestamp. The store may replace it.
    #[serde(default)]
    pub logged_at: Option<DateTime<Utc>>,
}

/// One activity log entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogEntryDto {
    /// Entry identifier.
    pub entry_id: LogEntryId,
    /// Owning pod.
    pub pod_id: PodId,
    /// Item the entry belongs to.
    pub item_id: ItemId,
    /// Authoritative timestamp.
    pub logged_at: DateTime<Utc>,
    /// Observed values keyed by column name, in wire form.
    pub values: BTreeMap<String, serde_json::Value>,
    /// Free-form notes.
    pub notes: String,
}

impl From<ActivityLogEntry> for LogEntryDto {
    fn from(e: ActivityLogEntry) -> Self {
        Self {
            entry_id: e.id,
            pod_id: e.pod_id,
            item_id: e.item_id,
            logged_at: e.logged_at,
            values: e
                .column_snapshot
                .iter()
                .map(|(column, value)| (column.clone(), value.to_wire()))
                .collect(),
            notes: e.notes,
        }
    }
}

/// Query parameters for `GET /pods/{id}/logs`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogQueryParams {
    /// Only entries of this item.
    #[serde(default)]
    pub item_id: Option<i64>,
    /// Only entries logged at or after this instant.
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of entries returned.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Log entries, most recent first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogListResponse {
    /// Matching entries.
    pub data: Vec<LogEntryDto>,
}

/// Result of a log refresh.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshLogResponse {
    /// Entries that were not held yet.
    pub inserted: usize,
    /// Held entries whose timestamp changed.
    pub reconciled: usize,
    /// Entries evicted by the retention cap.
    pub evicted: usize,
}

impl From<MergeOutcome> for RefreshLogResponse {
    fn from(o: MergeOutcome) -> Self {
        Self {
            inserted: o.inserted,
            reconciled: o.reconciled,
            evicted: o.evicted,
        }
    }
}
