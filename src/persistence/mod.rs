//! Persistence layer: the authoritative store behind the in-memory pods.
//!
//! [`PodStore`] is the collaborator contract the service drives. Every
//! mutation is confirmed by the store before the in-memory pod commits
//! it; a failed call leaves the pod untouched. Two implementations are
//! provided: [`MemoryStore`] (in-process, used when persistence is
//! disabled and in tests) and [`PostgresPersistence`] (`sqlx`).

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ActivityLogEntry, ColumnDef, ColumnValue, ItemId, ItemRecord, PodId, PodSeed};
use crate::error::TrackerError;

pub use memory::MemoryStore;
pub use postgres::PostgresPersistence;

/// A user override write sent to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEdit {
    /// Owning pod.
    pub pod_id: PodId,
    /// Edited item.
    pub item_id: ItemId,
    /// Column name.
    pub column: String,
    /// New override value.
    pub value: ColumnValue,
    /// Who made the edit.
    pub actor: String,
}

/// Authoritative storage for pods, items and the activity log.
///
/// Implementations must be thread-safe; the service calls them while
/// holding a pod's write lock, so calls for one pod never overlap.
#[async_trait]
pub trait PodStore: Send + Sync + std::fmt::Debug {
    /// Loads every stored pod with up to `log_limit` recent log entries
    /// each (most recent first).
    async fn load_pods(&self, log_limit: usize) -> Result<Vec<PodSeed>, TrackerError>;

    /// Loads one pod with up to `log_limit` recent log entries.
    ///
    /// Returns [`TrackerError::PodNotFound`] if the store does not know it.
    async fn load_pod(&self, pod_id: PodId, log_limit: usize) -> Result<PodSeed, TrackerError>;

    /// Stores a new, empty pod.
    async fn persist_pod(
        &self,
        pod_id: PodId,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), TrackerError>;

    /// Deletes a pod with its schema, items and log.
    async fn delete_pod(&self, pod_id: PodId) -> Result<(), TrackerError>;

    /// Appends a column and backfills a `Null` default on every item.
    async fn persist_column_added(
        &self,
        pod_id: PodId,
        column: &ColumnDef,
    ) -> Result<(), TrackerError>;

    /// Removes a column from the schema, the visible set and every item.
    /// Logged snapshots are left as they are.
    async fn persist_column_removed(&self, pod_id: PodId, name: &str) -> Result<(), TrackerError>;

    /// Replaces the visible column set.
    async fn persist_visible_columns(
        &self,
        pod_id: PodId,
        names: &[String],
    ) -> Result<(), TrackerError>;

    /// Stores a new item.
    async fn persist_item(&self, pod_id: PodId, item: &ItemRecord) -> Result<(), TrackerError>;

    /// Deletes an item. Its log entries stay.
    async fn delete_item(&self, pod_id: PodId, item_id: ItemId) -> Result<(), TrackerError>;

    /// Writes a user override.
    async fn persist_value_edit(&self, edit: &ValueEdit) -> Result<(), TrackerError>;

    /// Removes a user override.
    async fn persist_override_cleared(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
        actor: &str,
    ) -> Result<(), TrackerError>;

    /// Stores a log entry and returns the authoritative `logged_at`.
    async fn persist_log_entry(
        &self,
        entry: &ActivityLogEntry,
    ) -> Result<DateTime<Utc>, TrackerError>;

    /// Fetches up to `limit` of the most recent log entries of a pod,
    /// most recent first.
    async fn fetch_recent_log(
        &self,
        pod_id: PodId,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, TrackerError>;
}
