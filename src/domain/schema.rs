//! Per-pod column schema.
//!
//! A [`Schema`] is the ordered list of typed columns of one pod plus the
//! subset of columns shown in compact views. Column names are interned to
//! a [`ColumnKey`] on creation; keys are never reused within a schema, so
//! a key held by an item can never alias a later column of the same name.
//!
//! Item migration on add/remove is done by [`super::PodState`], which owns
//! both the schema and the item table.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::value::ColumnType;
use crate::error::TrackerError;

/// Interned column handle, unique within one schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ColumnKey(u32);

impl ColumnKey {
    /// Returns the raw key.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// A named, typed slot in a pod schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Interned key.
    #[serde(skip)]
    pub key: ColumnKey,
    /// Column name (case-sensitive, immutable).
    pub name: String,
    /// Declared value type (immutable).
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Ordered column definitions plus the visible subset.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<Column>,
    by_name: HashMap<String, ColumnKey>,
    visible: HashSet<ColumnKey>,
    next_key: u32,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a schema from persisted column definitions (display order)
    /// and visible names. Unknown visible names are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateColumn`] if a name repeats, or
    /// [`TrackerError::InvalidRequest`] for an empty name.
    pub fn from_parts<I, V, S>(columns: I, visible: V) -> Result<Self, TrackerError>
    where
        I: IntoIterator<Item = (String, ColumnType)>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self::new();
        for (name, column_type) in columns {
            let column = schema.prepare_column(&name, column_type)?;
            schema.insert_column(column)?;
        }
        schema.set_visible_columns(visible);
        Ok(schema)
    }

    /// Columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Looks up a column by exact name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        let key = self.by_name.get(name)?;
        self.column_by_key(*key)
    }

    /// Looks up a column by key.
    #[must_use]
    pub fn column_by_key(&self, key: ColumnKey) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Looks up a column by name, failing with a schema violation.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownColumn`] if the name is not defined.
    pub fn require(&self, name: &str) -> Result<&Column, TrackerError> {
        self.column(name)
            .ok_or_else(|| TrackerError::UnknownColumn(name.to_string()))
    }

    /// Returns `true` if a column with this exact name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Validates a new column without mutating the schema (stage step).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateColumn`] if the name already exists,
    /// or [`TrackerError::InvalidRequest`] if it is blank.
    pub fn prepare_column(&self, name: &str, column_type: ColumnType) -> Result<Column, TrackerError> {
        if name.trim().is_empty() {
            return Err(TrackerError::InvalidRequest(
                "column name must not be empty".to_string(),
            ));
        }
        if self.contains(name) {
            return Err(TrackerError::DuplicateColumn(name.to_string()));
        }
        Ok(Column {
            key: ColumnKey(self.next_key),
            name: name.to_string(),
            column_type,
        })
    }

    /// Appends a prepared column (commit step).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DuplicateColumn`] if the name or key was
    /// taken after the column was prepared.
    pub fn insert_column(&mut self, column: Column) -> Result<ColumnKey, TrackerError> {
        if self.contains(&column.name) || self.column_by_key(column.key).is_some() {
            return Err(TrackerError::DuplicateColumn(column.name));
        }
        let key = column.key;
        self.next_key = self.next_key.max(key.0.saturating_add(1));
        self.by_name.insert(column.name.clone(), key);
        self.columns.push(column);
        Ok(key)
    }

    /// Removes a column from the ordered list and from the visible set.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownColumn`] if the name is not defined.
    pub fn remove_column(&mut self, name: &str) -> Result<Column, TrackerError> {
        let key = self
            .by_name
            .remove(name)
            .ok_or_else(|| TrackerError::UnknownColumn(name.to_string()))?;
        self.visible.remove(&key);
        let position = self
            .columns
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| TrackerError::Internal(format!("column index out of sync: {name}")))?;
        Ok(self.columns.remove(position))
    }

    /// Replaces the visible set. Names not in the schema are silently
    /// dropped. Returns the retained names in display order.
    pub fn set_visible_columns<V, S>(&mut self, names: V) -> Vec<String>
    where
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.visible = names
            .into_iter()
            .filter_map(|n| self.by_name.get(n.as_ref()).copied())
            .collect();
        self.visible_column_names()
    }

    /// Returns `true` if the column is in the visible set.
    #[must_use]
    pub fn is_visible(&self, key: ColumnKey) -> bool {
        self.visible.contains(&key)
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| self.visible.contains(&c.key))
    }

    /// Visible column names in display order.
    #[must_use]
    pub fn visible_column_names(&self) -> Vec<String> {
        self.visible_columns().map(|c| c.name.clone()).collect()
    }
}
