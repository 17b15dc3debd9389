//! Domain layer: the dynamic tabular model, pod registry and event system.
//!
//! Leaves first: [`value`] (cell values and coercion), [`schema`] (column
//! definitions), [`item`] and [`resolver`] (two-tier item values),
//! [`activity_log`] (time-ordered journal), [`trend`] (projections over
//! the journal), then the [`pod`] aggregate that owns one collection and
//! the [`pod_registry`] that holds them all.

pub mod activity_log;
pub mod event_bus;
pub mod ids;
pub mod item;
pub mod pod;
pub mod pod_event;
pub mod pod_registry;
pub mod resolver;
pub mod schema;
pub mod trend;
pub mod value;

pub use activity_log::{ActivityLog, ActivityLogEntry, DEFAULT_MAX_ENTRIES, MergeOutcome};
pub use event_bus::EventBus;
pub use ids::{ItemId, LogEntryId, PodId};
pub use item::{Item, OverrideState};
pub use pod::{CellView, ColumnDef, ItemRecord, ItemView, PodDetail, PodSeed, PodState, PodSummary};
pub use pod_event::PodEvent;
pub use pod_registry::{PodHandle, PodRegistry};
pub use schema::{Column, ColumnKey, Schema};
pub use trend::{TrendPoint, TrendSummary};
pub use value::{ColumnType, ColumnValue, TimeOfDay};
