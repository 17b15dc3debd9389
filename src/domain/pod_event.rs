//! Domain events reflecting pod state mutations.
//!
//! Every committed mutation emits a [`PodEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::value::{ColumnType, ColumnValue};
use super::{ItemId, LogEntryId, PodId};

/// Domain event emitted after every committed mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PodEvent {
    /// A pod was created.
    PodCreated {
        /// Pod identifier.
        pod_id: PodId,
        /// Pod name.
        name: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A pod was (re)seeded from the store, replacing any loaded copy.
    PodLoaded {
        /// Pod identifier.
        pod_id: PodId,
        /// Pod name.
        name: String,
        /// Whether an in-memory copy was replaced.
        replaced: bool,
        /// Items after the load.
        item_count: usize,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A pod was removed.
    PodRemoved {
        /// Pod identifier.
        pod_id: PodId,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A column was appended to the schema.
    ColumnAdded {
        /// Pod identifier.
        pod_id: PodId,
        /// Column name.
        column: String,
        /// Declared type.
        column_type: ColumnType,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A column was removed from the schema and every item.
    ColumnRemoved {
        /// Pod identifier.
        pod_id: PodId,
        /// Column name.
        column: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The visible column set was replaced.
    VisibleColumnsChanged {
        /// Pod identifier.
        pod_id: PodId,
        /// Retained visible names in display order.
        columns: Vec<String>,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An item was created.
    ItemCreated {
        /// Pod identifier.
        pod_id: PodId,
        /// New item.
        item_id: ItemId,
        /// Item name.
        name: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An item was removed.
    ItemRemoved {
        /// Pod identifier.
        pod_id: PodId,
        /// Removed item.
        item_id: ItemId,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user override was written.
    ItemValueEdited {
        /// Pod identifier.
        pod_id: PodId,
        /// Edited item.
        item_id: ItemId,
        /// Column name.
        column: String,
        /// New override value.
        value: ColumnValue,
        /// Who made the edit.
        actor: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user override was removed.
    ItemOverrideCleared {
        /// Pod identifier.
        pod_id: PodId,
        /// Edited item.
        item_id: ItemId,
        /// Column name.
        column: String,
        /// Who cleared it.
        actor: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An activity was recorded in the log.
    ActivityLogged {
        /// Pod identifier.
        pod_id: PodId,
        /// Item the activity belongs to.
        item_id: ItemId,
        /// Log entry identifier.
        entry_id: LogEntryId,
        /// Authoritative activity timestamp.
        logged_at: DateTime<Utc>,
        /// Observed column names (skipped columns are absent).
        columns: Vec<String>,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Entries were evicted from the log working set.
    LogPruned {
        /// Pod identifier.
        pod_id: PodId,
        /// Number of evicted entries.
        evicted: usize,
        /// Remaining entries.
        retained: usize,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl PodEvent {
    /// Returns the pod ID associated with this event.
    #[must_use]
    pub fn pod_id(&self) -> PodId {
        match self {
            Self::PodCreated { pod_id, .. }
            | Self::PodLoaded { pod_id, .. }
            | Self::PodRemoved { pod_id, .. }
            | Self::ColumnAdded { pod_id, .. }
            | Self::ColumnRemoved { pod_id, .. }
            | Self::VisibleColumnsChanged { pod_id, .. }
            | Self::ItemCreated { pod_id, .. }
            | Self::ItemRemoved { pod_id, .. }
            | Self::ItemValueEdited { pod_id, .. }
            | Self::ItemOverrideCleared { pod_id, .. }
            | Self::ActivityLogged { pod_id, .. }
            | Self::LogPruned { pod_id, .. } => *pod_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PodCreated { .. } => "pod_created",
            Self::PodLoaded { .. } => "pod_loaded",
            Self::PodRemoved { .. } => "pod_removed",
            Self::ColumnAdded { .. } => "column_added",
            Self::ColumnRemoved { .. } => "column_removed",
            Self::VisibleColumnsChanged { .. } => "visible_columns_changed",
            Self::ItemCreated { .. } => "item_created",
            Self::ItemRemoved { .. } => "item_removed",
            Self::ItemValueEdited { .. } => "item_value_edited",
            Self::ItemOverrideCleared { .. } => "item_override_cleared",
            Self::ActivityLogged { .. } => "activity_logged",
            Self::LogPruned { .. } => "log_pruned",
        }
    }
}
