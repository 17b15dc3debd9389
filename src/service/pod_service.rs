//! Pod service: orchestrates pod operations and emits events.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::trend;
use crate::domain::{
    ActivityLogEntry, ColumnDef, ColumnType, ColumnValue, EventBus, ItemId, ItemView,
    MergeOutcome, OverrideState, PodDetail, PodEvent, PodId, PodRegistry, PodState, PodSummary,
    TrendPoint, TrendSummary, DEFAULT_MAX_ENTRIES,
};
use crate::error::TrackerError;
use crate::persistence::{PodStore, ValueEdit};

/// Bounds on each pod's in-memory activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLimits {
    /// Retention cap of the working set.
    pub max_entries: usize,
    /// Entries fetched from the store on load and refresh.
    pub fetch_page_size: usize,
}

impl Default for LogLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            fetch_page_size: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// An activity submitted for logging.
#[derive(Debug, Clone)]
pub struct NewActivity {
    /// Item the activity belongs to.
    pub item_id: ItemId,
    /// Submitted values by column name.
    pub values: HashMap<String, ColumnValue>,
    /// Columns deliberately not observed.
    pub skipped: HashSet<String>,
    /// Free-form notes.
    pub notes: String,
    /// Client-side timestamp; the store's answer is authoritative.
    pub logged_at: Option<DateTime<Utc>>,
}

/// Filter over the log working set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogQuery {
    /// Only entries for this item.
    pub item_id: Option<ItemId>,
    /// Only entries logged at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// At most this many entries.
    pub limit: Option<usize>,
}

/// Series and summary for one (item, column) pair.
#[derive(Debug, Clone)]
pub struct TrendReport {
    /// Item the series belongs to.
    pub item_id: ItemId,
    /// Column name.
    pub column: String,
    /// Observations, oldest first.
    pub points: Vec<TrendPoint>,
    /// Aggregates over `points`.
    pub summary: TrendSummary,
}

/// Orchestration layer for all pod operations.
///
/// Owns references to [`PodRegistry`] for in-memory state, the
/// [`PodStore`] collaborator for durability and [`EventBus`] for event
/// emission. Every mutation follows the same pattern: acquire the pod's
/// write lock, stage (validate without mutating), persist through the
/// store, commit to the pod, release the lock, emit events. A store
/// failure returns before the commit, so the pod is left as it was.
#[derive(Debug, Clone)]
pub struct PodService {
    registry: Arc<PodRegistry>,
    store: Arc<dyn PodStore>,
    event_bus: EventBus,
    limits: LogLimits,
}

fn store_failure(pod_id: PodId, op: &'static str) -> impl Fn(&TrackerError) {
    move |err| tracing::warn!(%pod_id, op, error = %err, "store rejected mutation, pod unchanged")
}

fn validate_name(raw: &str, what: &str) -> Result<String, TrackerError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(TrackerError::InvalidRequest(format!(
            "{what} name must not be empty"
        )));
    }
    Ok(name.to_string())
}

impl PodService {
    /// Creates a new `PodService`.
    #[must_use]
    pub fn new(
        registry: Arc<PodRegistry>,
        store: Arc<dyn PodStore>,
        event_bus: EventBus,
        limits: LogLimits,
    ) -> Self {
        Self {
            registry,
            store,
            event_bus,
            limits,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`PodRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<PodRegistry> {
        &self.registry
    }

    /// Returns the log limits in force.
    #[must_use]
    pub const fn limits(&self) -> LogLimits {
        self.limits
    }

    // ── Pods ────────────────────────────────────────────────────────────

    /// Loads every pod the store knows into the registry. Used at startup.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] if the store cannot be
    /// read, or a schema error if a stored pod is inconsistent.
    pub async fn restore_pods(&self) -> Result<usize, TrackerError> {
        let seeds = self.store.load_pods(self.limits.fetch_page_size).await?;
        let mut restored = 0_usize;
        for seed in seeds {
            let pod = PodState::from_seed(seed, self.limits.max_entries)?;
            self.registry.replace(pod).await;
            restored = restored.saturating_add(1);
        }
        tracing::info!(restored, "pods restored from store");
        Ok(restored)
    }

    /// Creates an empty pod.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank name or
    /// [`TrackerError::PersistenceError`] if the store rejects it.
    pub async fn create_pod(&self, name: &str) -> Result<PodSummary, TrackerError> {
        let name = validate_name(name, "pod")?;
        let pod = PodState::new(PodId::new(), name.clone());
        let pod_id = pod.pod_id;

        self.store
            .persist_pod(pod_id, &name, pod.created_at)
            .await
            .inspect_err(store_failure(pod_id, "persist_pod"))?;

        let summary = PodSummary::from(&pod);
        self.registry.insert(pod).await?;

        let _ = self.event_bus.publish(PodEvent::PodCreated {
            pod_id,
            name: name.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, name = %name, "pod created");
        Ok(summary)
    }

    /// (Re)loads a pod from the store, replacing any in-memory copy.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if the store does not know
    /// the pod, or [`TrackerError::PersistenceError`].
    pub async fn load_pod(&self, pod_id: PodId) -> Result<PodSummary, TrackerError> {
        let seed = self
            .store
            .load_pod(pod_id, self.limits.fetch_page_size)
            .await?;
        let pod = PodState::from_seed(seed, self.limits.max_entries)?;
        let summary = PodSummary::from(&pod);
        let replaced = self.registry.replace(pod).await;

        let _ = self.event_bus.publish(PodEvent::PodLoaded {
            pod_id,
            name: summary.name.clone(),
            replaced,
            item_count: summary.item_count,
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, replaced, items = summary.item_count, "pod loaded");
        Ok(summary)
    }

    /// Removes a pod with its schema, items and log.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] or
    /// [`TrackerError::PersistenceError`].
    pub async fn remove_pod(&self, pod_id: PodId) -> Result<(), TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.write().await;
        self.store
            .delete_pod(pod_id)
            .await
            .inspect_err(store_failure(pod_id, "delete_pod"))?;
        drop(pod);
        self.registry.remove(pod_id).await?;

        let _ = self.event_bus.publish(PodEvent::PodRemoved {
            pod_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, "pod removed");
        Ok(())
    }

    /// Summaries of all loaded pods, optionally filtered by name.
    pub async fn list_pods(&self, name_filter: Option<&str>) -> Vec<PodSummary> {
        self.registry.list(name_filter).await
    }

    /// Metadata and schema of one pod.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
    pub async fn get_pod(&self, pod_id: PodId) -> Result<PodDetail, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.read().await;
        Ok(pod.detail())
    }

    /// Declared type of every current column, keyed by name. Callers use
    /// it to decode wire values, which are not self-describing.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
    pub async fn column_types(
        &self,
        pod_id: PodId,
    ) -> Result<HashMap<String, ColumnType>, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.read().await;
        Ok(pod
            .schema()
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.column_type))
            .collect())
    }

    // ── Schema ──────────────────────────────────────────────────────────

    /// Appends a column; every existing item gets a `Null` default.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateColumn`],
    /// [`TrackerError::InvalidRequest`], [`TrackerError::PodNotFound`] or
    /// [`TrackerError::PersistenceError`].
    pub async fn add_column(
        &self,
        pod_id: PodId,
        name: &str,
        column_type: ColumnType,
    ) -> Result<ColumnDef, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        let column = pod.stage_add_column(name, column_type)?;
        let def = ColumnDef::from(&column);
        self.store
            .persist_column_added(pod_id, &def)
            .await
            .inspect_err(store_failure(pod_id, "persist_column_added"))?;
        pod.commit_add_column(column)?;
        drop(pod);

        let _ = self.event_bus.publish(PodEvent::ColumnAdded {
            pod_id,
            column: def.name.clone(),
            column_type: def.column_type,
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, column = %def.name, column_type = %def.column_type, "column added");
        Ok(def)
    }

    /// Removes a column from the schema, the visible set and every item.
    /// Logged snapshots keep it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownColumn`], [`TrackerError::PodNotFound`]
    /// or [`TrackerError::PersistenceError`].
    pub async fn remove_column(&self, pod_id: PodId, name: &str) -> Result<(), TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        let column = pod.stage_remove_column(name)?;
        self.store
            .persist_column_removed(pod_id, &column.name)
            .await
            .inspect_err(store_failure(pod_id, "persist_column_removed"))?;
        pod.commit_remove_column(&column.name)?;
        drop(pod);

        let _ = self.event_bus.publish(PodEvent::ColumnRemoved {
            pod_id,
            column: column.name.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, column = %column.name, "column removed");
        Ok(())
    }

    /// Replaces the visible column set. Unknown names are dropped; the
    /// retained names are returned in display order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] or
    /// [`TrackerError::PersistenceError`].
    pub async fn set_visible_columns(
        &self,
        pod_id: PodId,
        names: &[String],
    ) -> Result<Vec<String>, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        let retained = pod.resolve_visible(names);
        if retained.len() < names.len() {
            tracing::debug!(
                %pod_id,
                dropped = names.len().saturating_sub(retained.len()),
                "ignoring unknown visible column names"
            );
        }
        self.store
            .persist_visible_columns(pod_id, &retained)
            .await
            .inspect_err(store_failure(pod_id, "persist_visible_columns"))?;
        pod.set_visible_columns(&retained);
        drop(pod);

        let _ = self.event_bus.publish(PodEvent::VisibleColumnsChanged {
            pod_id,
            columns: retained.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, visible = retained.len(), "visible columns changed");
        Ok(retained)
    }

    // ── Items ───────────────────────────────────────────────────────────

    /// Creates an item with a `Null` default for every current column.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank name,
    /// [`TrackerError::PodNotFound`] or [`TrackerError::PersistenceError`].
    pub async fn create_item(&self, pod_id: PodId, name: &str) -> Result<ItemView, TrackerError> {
        let name = validate_name(name, "item")?;
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        let item = pod.stage_item(&name);
        let record = pod.item_record(&item);
        self.store
            .persist_item(pod_id, &record)
            .await
            .inspect_err(store_failure(pod_id, "persist_item"))?;
        let item_id = pod.commit_item(item)?;
        let view = pod.item_view(item_id, false)?;
        drop(pod);

        let _ = self.event_bus.publish(PodEvent::ItemCreated {
            pod_id,
            item_id,
            name: name.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, %item_id, name = %name, "item created");
        Ok(view)
    }

    /// Removes an item. Its log entries stay.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`], [`TrackerError::PodNotFound`]
    /// or [`TrackerError::PersistenceError`].
    pub async fn remove_item(&self, pod_id: PodId, item_id: ItemId) -> Result<(), TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        pod.item(item_id)?;
        self.store
            .delete_item(pod_id, item_id)
            .await
            .inspect_err(store_failure(pod_id, "delete_item"))?;
        pod.remove_item(item_id)?;
        drop(pod);

        let _ = self.event_bus.publish(PodEvent::ItemRemoved {
            pod_id,
            item_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, %item_id, "item removed");
        Ok(())
    }

    /// All items of a pod with every column resolved.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
    pub async fn list_items(&self, pod_id: PodId) -> Result<Vec<ItemView>, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.read().await;
        pod.items()
            .map(|item| pod.item_view(item.id, false))
            .collect()
    }

    /// One item with every column resolved.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] or [`TrackerError::ItemNotFound`].
    pub async fn item_view(&self, pod_id: PodId, item_id: ItemId) -> Result<ItemView, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.read().await;
        pod.item_view(item_id, false)
    }

    /// One item restricted to the visible columns.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] or [`TrackerError::ItemNotFound`].
    pub async fn compact_view(
        &self,
        pod_id: PodId,
        item_id: ItemId,
    ) -> Result<ItemView, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.read().await;
        pod.item_view(item_id, true)
    }

    /// Whether a column of an item carries a user override.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`], [`TrackerError::ItemNotFound`]
    /// or [`TrackerError::UnknownColumn`].
    pub async fn override_state(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
    ) -> Result<OverrideState, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.read().await;
        pod.override_state(item_id, column)
    }

    // ── Values ──────────────────────────────────────────────────────────

    /// Writes a typed user override.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::TypeMismatch`], [`TrackerError::UnknownColumn`],
    /// [`TrackerError::ItemNotFound`], [`TrackerError::PodNotFound`] or
    /// [`TrackerError::PersistenceError`].
    pub async fn edit_value(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
        value: ColumnValue,
        actor: &str,
    ) -> Result<ItemView, TrackerError> {
        self.write_override(pod_id, item_id, column, actor, |_| Ok(value))
            .await
    }

    /// Writes a free-text user override, coerced to the column's type.
    /// Text that does not parse is stored as a `Null` override.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownColumn`], [`TrackerError::ItemNotFound`],
    /// [`TrackerError::PodNotFound`] or [`TrackerError::PersistenceError`].
    pub async fn edit_value_text(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
        text: &str,
        actor: &str,
    ) -> Result<ItemView, TrackerError> {
        self.write_override(pod_id, item_id, column, actor, |pod| {
            pod.coerce_text(column, text)
        })
        .await
    }

    async fn write_override(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
        actor: &str,
        resolve: impl FnOnce(&PodState) -> Result<ColumnValue, TrackerError> + Send,
    ) -> Result<ItemView, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        let value = resolve(&pod)?;
        pod.stage_edit(item_id, column, &value)?;
        let edit = ValueEdit {
            pod_id,
            item_id,
            column: column.to_string(),
            value,
            actor: actor.to_string(),
        };
        self.store
            .persist_value_edit(&edit)
            .await
            .inspect_err(store_failure(pod_id, "persist_value_edit"))?;
        pod.apply_edit(item_id, column, edit.value.clone())?;
        let view = pod.item_view(item_id, false)?;
        drop(pod);

        tracing::info!(%pod_id, %item_id, column, actor, value = %edit.value, "item value edited");

        let _ = self.event_bus.publish(PodEvent::ItemValueEdited {
            pod_id,
            item_id,
            column: edit.column,
            value: edit.value,
            actor: edit.actor,
            timestamp: Utc::now(),
        });
        Ok(view)
    }

    /// Removes the user override so the default shows through again.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownColumn`], [`TrackerError::ItemNotFound`],
    /// [`TrackerError::PodNotFound`] or [`TrackerError::PersistenceError`].
    pub async fn clear_override(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
        actor: &str,
    ) -> Result<ItemView, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        if pod.override_state(item_id, column)? == OverrideState::NoOverride {
            return pod.item_view(item_id, false);
        }
        self.store
            .persist_override_cleared(pod_id, item_id, column, actor)
            .await
            .inspect_err(store_failure(pod_id, "persist_override_cleared"))?;
        pod.clear_override(item_id, column)?;
        let view = pod.item_view(item_id, false)?;
        drop(pod);

        let _ = self.event_bus.publish(PodEvent::ItemOverrideCleared {
            pod_id,
            item_id,
            column: column.to_string(),
            actor: actor.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(%pod_id, %item_id, column, actor, "item override cleared");
        Ok(view)
    }

    // ── Activity log ────────────────────────────────────────────────────

    /// Records an activity. The store assigns the authoritative
    /// `logged_at`; the entry is inserted at its sorted position under
    /// that timestamp, then the working set is capped. Item values are
    /// not touched.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`], [`TrackerError::UnknownColumn`],
    /// [`TrackerError::TypeMismatch`], [`TrackerError::InvalidRequest`] for a
    /// column both submitted and skipped, [`TrackerError::PodNotFound`] or
    /// [`TrackerError::PersistenceError`].
    pub async fn log_activity(
        &self,
        pod_id: PodId,
        activity: NewActivity,
    ) -> Result<ActivityLogEntry, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        let staged = pod.stage_log_entry(
            activity.item_id,
            activity.values,
            &activity.skipped,
            activity.notes,
            activity.logged_at.unwrap_or_else(Utc::now),
        )?;
        let logged_at = self
            .store
            .persist_log_entry(&staged)
            .await
            .inspect_err(store_failure(pod_id, "persist_log_entry"))?;
        if logged_at != staged.logged_at {
            tracing::debug!(%pod_id, entry_id = %staged.id.as_uuid(), "store reassigned logged_at");
        }
        let entry = staged.with_logged_at(logged_at);
        let evicted = pod.record_activity(entry.clone(), self.limits.max_entries);
        let retained = pod.log().len();
        drop(pod);

        let _ = self.event_bus.publish(PodEvent::ActivityLogged {
            pod_id,
            item_id: entry.item_id,
            entry_id: entry.id,
            logged_at: entry.logged_at,
            columns: entry.column_snapshot.keys().cloned().collect(),
            timestamp: Utc::now(),
        });
        self.publish_pruned(pod_id, evicted, retained);

        tracing::info!(
            %pod_id,
            item_id = %entry.item_id,
            observed = entry.column_snapshot.len(),
            "activity logged"
        );
        Ok(entry)
    }

    /// Merges the store's most recent page into the working set,
    /// adopting authoritative timestamps for entries already held.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] or
    /// [`TrackerError::PersistenceError`].
    pub async fn refresh_log(&self, pod_id: PodId) -> Result<MergeOutcome, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let mut pod = handle.write().await;

        let page = self
            .store
            .fetch_recent_log(pod_id, self.limits.fetch_page_size)
            .await?;
        let outcome = pod.merge_log_page(page, self.limits.max_entries);
        let retained = pod.log().len();
        drop(pod);

        self.publish_pruned(pod_id, outcome.evicted, retained);

        tracing::debug!(
            %pod_id,
            inserted = outcome.inserted,
            reconciled = outcome.reconciled,
            evicted = outcome.evicted,
            "log refreshed"
        );
        Ok(outcome)
    }

    fn publish_pruned(&self, pod_id: PodId, evicted: usize, retained: usize) {
        if evicted == 0 {
            return;
        }
        let _ = self.event_bus.publish(PodEvent::LogPruned {
            pod_id,
            evicted,
            retained,
            timestamp: Utc::now(),
        });
        tracing::debug!(%pod_id, evicted, retained, "log working set pruned");
    }

    /// Entries of the working set in display order (most recent first).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
    pub async fn recent_log(
        &self,
        pod_id: PodId,
        query: LogQuery,
    ) -> Result<Vec<ActivityLogEntry>, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.read().await;
        let log = pod.log();
        let entries: Box<dyn Iterator<Item = &ActivityLogEntry>> = match query.since {
            Some(since) => Box::new(log.entries_since(since)),
            None => Box::new(log.entries()),
        };
        Ok(entries
            .filter(|e| query.item_id.is_none_or(|id| e.item_id == id))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    // ── Trends ──────────────────────────────────────────────────────────

    /// Observations of one column on one item, oldest first. Removed
    /// items and columns still have a history.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
    pub async fn series(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
    ) -> Result<Vec<TrendPoint>, TrackerError> {
        let handle = self.registry.get(pod_id).await?;
        let pod = handle.read().await;
        Ok(pod.series(item_id, column))
    }

    /// Series plus aggregates for one (item, column) pair.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if the pod is not loaded.
    pub async fn trend_summary(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
    ) -> Result<TrendReport, TrackerError> {
        let points = self.series(pod_id, item_id, column).await?;
        let summary = trend::summarize(&points);
        Ok(TrendReport {
            item_id,
            column: column.to_string(),
            points,
            summary,
        })
    }
}
