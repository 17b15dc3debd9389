//! Pod aggregate: schema, item table and activity log of one collection.
//!
//! Each pod in the registry is stored as a [`PodState`] behind its own
//! lock. Mutations that must be confirmed by the persistence collaborator
//! are split into a `stage_*` step (validation only, no mutation) and a
//! `commit_*` step, so a failed persist leaves the pod untouched.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity_log::{ActivityLog, ActivityLogEntry, MergeOutcome, build_snapshot};
use super::item::{Item, OverrideState};
use super::resolver;
use super::schema::{Column, ColumnKey, Schema};
use super::trend::{self, TrendPoint};
use super::value::{ColumnType, ColumnValue};
use super::{ItemId, PodId};
use crate::error::TrackerError;

/// Column definition as exchanged with the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl From<&Column> for ColumnDef {
    fn from(column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            column_type: column.column_type,
        }
    }
}

/// Item as exchanged with the persistence collaborator, keyed by column
/// name instead of interned key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Baseline values.
    pub default_values: BTreeMap<String, ColumnValue>,
    /// User overrides.
    pub user_values: BTreeMap<String, ColumnValue>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to rebuild a pod: schema, items and the recent log
/// (most recent first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodSeed {
    /// Pod identifier.
    pub pod_id: PodId,
    /// Pod name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Columns in display order.
    pub columns: Vec<ColumnDef>,
    /// Visible column names.
    pub visible_columns: Vec<String>,
    /// Items in id order.
    pub items: Vec<ItemRecord>,
    /// Lowest id never handed out, including ids of removed items.
    pub next_item_id: ItemId,
    /// Recent activity, most recent first.
    pub recent_log: Vec<ActivityLogEntry>,
}

/// One resolved cell of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    /// Column name.
    pub column: String,
    /// Column type.
    pub column_type: ColumnType,
    /// Effective value.
    pub value: ColumnValue,
    /// Whether the value comes from a user override.
    pub overridden: bool,
}

/// Resolved view of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// Item identifier.
    pub item_id: ItemId,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
    /// Cells in display order.
    pub cells: Vec<CellView>,
}

/// Pod metadata together with its schema.
#[derive(Debug, Clone)]
pub struct PodDetail {
    /// Counts and timestamps.
    pub summary: PodSummary,
    /// Last mutation timestamp.
    pub last_modified_at: DateTime<Utc>,
    /// Columns in display order.
    pub columns: Vec<ColumnDef>,
    /// Visible column names in display order.
    pub visible_columns: Vec<String>,
}

/// Lightweight summary of a pod for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PodSummary {
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
    /// Entries in the log working set.
    pub log_entries: usize,
}

impl From<&PodState> for PodSummary {
    fn from(pod: &PodState) -> Self {
        Self {
            pod_id: pod.pod_id,
            name: pod.name.clone(),
            created_at: pod.created_at,
            column_count: pod.schema.len(),
            item_count: pod.items.len(),
            log_entries: pod.log.len(),
        }
    }
}

/// In-memory state of one pod.
#[derive(Debug)]
pub struct PodState {
    /// Pod identifier (immutable after creation).
    pub pod_id: PodId,
    /// Pod name.
    pub name: String,
    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub last_modified_at: DateTime<Utc>,
    schema: Schema,
    items: BTreeMap<ItemId, Item>,
    next_item_id: ItemId,
    log: ActivityLog,
}

impl PodState {
    /// Creates an empty pod.
    #[must_use]
    pub fn new(pod_id: PodId, name: String) -> Self {
        let now = Utc::now();
        Self {
            pod_id,
            name,
            created_at: now,
            last_modified_at: now,
            schema: Schema::new(),
            items: BTreeMap::new(),
            next_item_id: ItemId::new(1),
            log: ActivityLog::new(),
        }
    }

    /// Rebuilds a pod from collaborator data. Item values naming columns
    /// that are no longer in the schema are dropped; the log is capped at
    /// `max_log_entries`.
    ///
    /// The next item id is the highest of the seed's high-water mark and
    /// one past every id seen in the items or the log, so a removed item's
    /// id is never reissued.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateColumn`] if the seed repeats a
    /// column name, or [`TrackerError::InvalidRequest`] if it repeats an
    /// item id.
    pub fn from_seed(seed: PodSeed, max_log_entries: usize) -> Result<Self, TrackerError> {
        let schema = Schema::from_parts(
            seed.columns.into_iter().map(|c| (c.name, c.column_type)),
            seed.visible_columns,
        )?;
        let mut pod = Self {
            pod_id: seed.pod_id,
            name: seed.name,
            created_at: seed.created_at,
            last_modified_at: Utc::now(),
            schema,
            items: BTreeMap::new(),
            next_item_id: ItemId::new(1),
            log: ActivityLog::new(),
        };
        for record in seed.items {
            let item = pod.item_from_record(record);
            pod.commit_item(item)?;
        }
        let logged_max = seed.recent_log.iter().map(|e| e.item_id.next()).max();
        pod.next_item_id = pod
            .next_item_id
            .max(seed.next_item_id)
            .max(logged_max.unwrap_or(pod.next_item_id));
        let evicted = pod.log.seed(seed.recent_log, max_log_entries);
        if evicted > 0 {
            tracing::debug!(pod_id = %pod.pod_id, evicted, "seed log exceeded retention cap");
        }
        Ok(pod)
    }

    fn item_from_record(&self, record: ItemRecord) -> Item {
        let intern = |values: BTreeMap<String, ColumnValue>| {
            values
                .into_iter()
                .filter_map(|(name, value)| match self.schema.column(&name) {
                    Some(c) if value.fits(c.column_type) => Some((c.key, value)),
                    _ => {
                        tracing::debug!(pod_id = %self.pod_id, column = %name, "dropping stale item value");
                        None
                    }
                })
                .collect::<HashMap<_, _>>()
        };
        Item {
            id: record.id,
            name: record.name,
            default_values: intern(record.default_values),
            user_values: intern(record.user_values),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Converts an item to its name-keyed collaborator form.
    #[must_use]
    pub fn item_record(&self, item: &Item) -> ItemRecord {
        let by_name = |values: &HashMap<ColumnKey, ColumnValue>| {
            values
                .iter()
                .filter_map(|(key, value)| {
                    self.schema
                        .column_by_key(*key)
                        .map(|c| (c.name.clone(), value.clone()))
                })
                .collect::<BTreeMap<_, _>>()
        };
        ItemRecord {
            id: item.id,
            name: item.name.clone(),
            default_values: by_name(&item.default_values),
            user_values: by_name(&item.user_values),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }

    fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }

    // ── Schema registry ─────────────────────────────────────────────────

    /// The pod schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validates a new column without applying it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateColumn`] or
    /// [`TrackerError::InvalidRequest`].
    pub fn stage_add_column(
        &self,
        name: &str,
        column_type: ColumnType,
    ) -> Result<Column, TrackerError> {
        self.schema.prepare_column(name, column_type)
    }

    /// Appends a staged column and gives every existing item a `Null`
    /// default for it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateColumn`] if the name was taken
    /// since staging.
    pub fn commit_add_column(&mut self, column: Column) -> Result<Column, TrackerError> {
        let committed = column.clone();
        let key = self.schema.insert_column(column)?;
        for item in self.items.values_mut() {
            item.default_values.insert(key, ColumnValue::Null);
        }
        self.touch();
        Ok(committed)
    }

    /// Stage + commit in one step, for callers without a collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateColumn`] or
    /// [`TrackerError::InvalidRequest`].
    pub fn add_column(&mut self, name: &str, column_type: ColumnType) -> Result<Column, TrackerError> {
        let column = self.stage_add_column(name, column_type)?;
        self.commit_add_column(column)
    }

    /// Validates a column removal without applying it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownColumn`] if the column does not exist.
    pub fn stage_remove_column(&self, name: &str) -> Result<Column, TrackerError> {
        self.schema.require(name).cloned()
    }

    /// Removes a column from the schema, the visible set and every item.
    /// Logged snapshots are history and keep the column.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownColumn`] if the column does not exist.
    pub fn commit_remove_column(&mut self, name: &str) -> Result<Column, TrackerError> {
        let column = self.schema.remove_column(name)?;
        for item in self.items.values_mut() {
            item.forget_column(column.key);
        }
        self.touch();
        Ok(column)
    }

    /// Replaces the visible set, silently dropping unknown names.
    /// Returns the retained names in display order.
    pub fn set_visible_columns<V, S>(&mut self, names: V) -> Vec<String>
    where
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kept = self.schema.set_visible_columns(names);
        self.touch();
        kept
    }

    // ── Items ───────────────────────────────────────────────────────────

    /// Items in id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Number of items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Looks up an item.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`] if the item does not exist.
    pub fn item(&self, item_id: ItemId) -> Result<&Item, TrackerError> {
        self.items.get(&item_id).ok_or(TrackerError::ItemNotFound {
            pod_id: *self.pod_id.as_uuid(),
            item_id: item_id.get(),
        })
    }

    /// Builds (but does not insert) a new item with `Null` defaults for
    /// every current column.
    #[must_use]
    pub fn stage_item(&self, name: &str) -> Item {
        resolver::initialize_item(&self.schema, self.next_item_id, name)
    }

    /// Inserts a staged or seeded item.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] if the id is taken.
    pub fn commit_item(&mut self, item: Item) -> Result<ItemId, TrackerError> {
        let id = item.id;
        if self.items.contains_key(&id) {
            return Err(TrackerError::InvalidRequest(format!(
                "item {id} already exists in pod {}",
                self.pod_id
            )));
        }
        if id >= self.next_item_id {
            self.next_item_id = id.next();
        }
        self.items.insert(id, item);
        self.touch();
        Ok(id)
    }

    /// Removes an item. Its log entries stay in the log.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`] if the item does not exist.
    pub fn remove_item(&mut self, item_id: ItemId) -> Result<Item, TrackerError> {
        self.item(item_id)?;
        let item = self
            .items
            .remove(&item_id)
            .ok_or_else(|| TrackerError::Internal(format!("item {item_id} vanished")))?;
        self.touch();
        Ok(item)
    }

    // ── Item values ─────────────────────────────────────────────────────

    /// Effective value of a column on an item.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`] if the item does not exist.
    pub fn effective_value(
        &self,
        item_id: ItemId,
        column_name: &str,
    ) -> Result<ColumnValue, TrackerError> {
        Ok(resolver::effective_value(
            &self.schema,
            self.item(item_id)?,
            column_name,
        ))
    }

    /// Override state of a column on an item.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`] or [`TrackerError::UnknownColumn`].
    pub fn override_state(
        &self,
        item_id: ItemId,
        column_name: &str,
    ) -> Result<OverrideState, TrackerError> {
        resolver::override_state(&self.schema, self.item(item_id)?, column_name)
    }

    /// Resolved cells of an item in display order, optionally limited to
    /// the visible columns.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`] if the item does not exist.
    pub fn cells(&self, item_id: ItemId, visible_only: bool) -> Result<Vec<CellView>, TrackerError> {
        let item = self.item(item_id)?;
        Ok(self
            .schema
            .columns()
            .iter()
            .filter(|c| !visible_only || self.schema.is_visible(c.key))
            .map(|c| CellView {
                column: c.name.clone(),
                column_type: c.column_type,
                value: item.effective(c.key).clone(),
                overridden: item.user_values.contains_key(&c.key),
            })
            .collect())
    }

    /// Resolved view of an item, optionally limited to visible columns.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`] if the item does not exist.
    pub fn item_view(&self, item_id: ItemId, visible_only: bool) -> Result<ItemView, TrackerError> {
        let item = self.item(item_id)?;
        Ok(ItemView {
            item_id,
            name: item.name.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
            cells: self.cells(item_id, visible_only)?,
        })
    }

    /// Metadata and schema of the pod.
    #[must_use]
    pub fn detail(&self) -> PodDetail {
        PodDetail {
            summary: PodSummary::from(self),
            last_modified_at: self.last_modified_at,
            columns: self.schema.columns().iter().map(ColumnDef::from).collect(),
            visible_columns: self.schema.visible_column_names(),
        }
    }

    /// Names among `requested` that exist in the schema, in display
    /// order. This is what [`Self::set_visible_columns`] would retain.
    #[must_use]
    pub fn resolve_visible<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        let wanted: HashSet<&str> = requested.iter().map(AsRef::as_ref).collect();
        self.schema
            .columns()
            .iter()
            .filter(|c| wanted.contains(c.name.as_str()))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Coerces free text for `column_name` (degrading to `Null`).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownColumn`] if the column does not exist.
    pub fn coerce_text(&self, column_name: &str, text: &str) -> Result<ColumnValue, TrackerError> {
        let column = self.schema.require(column_name)?;
        Ok(ColumnValue::parse(text, column.column_type))
    }

    /// Validates an edit without applying it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`], [`TrackerError::UnknownColumn`]
    /// or [`TrackerError::TypeMismatch`].
    pub fn stage_edit(
        &self,
        item_id: ItemId,
        column_name: &str,
        value: &ColumnValue,
    ) -> Result<(), TrackerError> {
        self.item(item_id)?;
        resolver::validate_value(&self.schema, column_name, value)
    }

    /// Writes a user override. Returns the previous override state.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`], [`TrackerError::UnknownColumn`]
    /// or [`TrackerError::TypeMismatch`]; nothing changes on error.
    pub fn apply_edit(
        &mut self,
        item_id: ItemId,
        column_name: &str,
        value: ColumnValue,
    ) -> Result<OverrideState, TrackerError> {
        let pod_id = *self.pod_id.as_uuid();
        let item = self.items.get_mut(&item_id).ok_or(TrackerError::ItemNotFound {
            pod_id,
            item_id: item_id.get(),
        })?;
        let previous = resolver::apply_edit(&self.schema, item, column_name, value)?;
        self.touch();
        Ok(previous)
    }

    /// Removes a user override. Returns the previous override state.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`] or [`TrackerError::UnknownColumn`].
    pub fn clear_override(
        &mut self,
        item_id: ItemId,
        column_name: &str,
    ) -> Result<OverrideState, TrackerError> {
        let pod_id = *self.pod_id.as_uuid();
        let item = self.items.get_mut(&item_id).ok_or(TrackerError::ItemNotFound {
            pod_id,
            item_id: item_id.get(),
        })?;
        let previous = resolver::clear_override(&self.schema, item, column_name)?;
        self.touch();
        Ok(previous)
    }

    /// Puts back an override state captured from an edit, for callers
    /// rolling back after a failed persist.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`] or [`TrackerError::UnknownColumn`].
    pub fn revert_override(
        &mut self,
        item_id: ItemId,
        column_name: &str,
        state: OverrideState,
    ) -> Result<(), TrackerError> {
        let schema = &self.schema;
        let pod_id = *self.pod_id.as_uuid();
        let item = self.items.get_mut(&item_id).ok_or(TrackerError::ItemNotFound {
            pod_id,
            item_id: item_id.get(),
        })?;
        resolver::restore_override(schema, item, column_name, state)
    }

    // ── Activity log ────────────────────────────────────────────────────

    /// The log working set.
    #[must_use]
    pub const fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Builds a log entry for an item without recording it.
    ///
    /// The snapshot covers every schema column except `skipped`; columns
    /// without a submitted value are recorded as `Null`. Skipped names
    /// that are not in the schema are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ItemNotFound`], [`TrackerError::UnknownColumn`]
    /// for a submitted value naming an unknown column, or
    /// [`TrackerError::TypeMismatch`]. A column that is both submitted
    /// and skipped is an [`TrackerError::InvalidRequest`].
    pub fn stage_log_entry(
        &self,
        item_id: ItemId,
        mut submitted: HashMap<String, ColumnValue>,
        skipped: &HashSet<String>,
        notes: String,
        logged_at: DateTime<Utc>,
    ) -> Result<ActivityLogEntry, TrackerError> {
        self.item(item_id)?;
        for (name, value) in &submitted {
            resolver::validate_value(&self.schema, name, value)?;
            if skipped.contains(name) {
                return Err(TrackerError::InvalidRequest(format!(
                    "column {name} is both submitted and skipped"
                )));
            }
        }
        let values = self.schema.columns().iter().map(|c| {
            let value = submitted.remove(&c.name).unwrap_or(ColumnValue::Null);
            (c.name.clone(), value)
        });
        let snapshot = build_snapshot(values, skipped);
        Ok(ActivityLogEntry::new(
            self.pod_id,
            item_id,
            logged_at,
            snapshot,
            notes,
        ))
    }

    /// Inserts an entry at its sorted position, then evicts beyond
    /// `max_entries`. Returns the number of evicted entries. Item values
    /// are never touched.
    pub fn record_activity(&mut self, entry: ActivityLogEntry, max_entries: usize) -> usize {
        self.log.append(entry);
        let evicted = self.log.prune(max_entries);
        self.touch();
        evicted
    }

    /// Merges an authoritative page into the log working set.
    pub fn merge_log_page(
        &mut self,
        entries: Vec<ActivityLogEntry>,
        max_entries: usize,
    ) -> MergeOutcome {
        let outcome = self.log.merge_page(entries, max_entries);
        self.touch();
        outcome
    }

    /// Trend series for one (item, column) pair, oldest first. Works for
    /// removed items and columns too, since the log keeps their history.
    #[must_use]
    pub fn series(&self, item_id: ItemId, column_name: &str) -> Vec<TrendPoint> {
        trend::series(self.log.entries(), item_id, column_name)
    }
}
