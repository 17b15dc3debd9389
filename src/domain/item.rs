//! Items and their two-tier value maps.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::ItemId;
use super::schema::ColumnKey;
use super::value::ColumnValue;

static NULL: ColumnValue = ColumnValue::Null;

/// A row of a pod.
///
/// `default_values` is the baseline set at creation or schema migration;
/// `user_values` holds only the columns the user has explicitly edited.
/// Both maps are keyed by interned [`ColumnKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Item identifier, unique within the pod.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Baseline ("factory") values.
    pub default_values: HashMap<ColumnKey, ColumnValue>,
    /// Per-item overrides entered by the user.
    pub user_values: HashMap<ColumnKey, ColumnValue>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last value edit.
    pub updated_at: DateTime<Utc>,
}

/// Whether a column carries a user override.
///
/// `Override(ColumnValue::Null)` and `NoOverride` are distinct: the first
/// hides the default, the second lets it show through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideState {
    /// The default (or `Null`) is in effect.
    NoOverride,
    /// The user entered this value.
    Override(ColumnValue),
}

impl Item {
    /// Effective value: override, then default, then `Null`.
    #[must_use]
    pub fn effective(&self, key: ColumnKey) -> &ColumnValue {
        self.user_values
            .get(&key)
            .or_else(|| self.default_values.get(&key))
            .unwrap_or(&NULL)
    }

    /// Override state for a column.
    #[must_use]
    pub fn override_state(&self, key: ColumnKey) -> OverrideState {
        self.user_values
            .get(&key)
            .map_or(OverrideState::NoOverride, |v| OverrideState::Override(v.clone()))
    }

    /// Drops every trace of a column from both tiers.
    pub fn forget_column(&mut self, key: ColumnKey) {
        self.default_values.remove(&key);
        self.user_values.remove(&key);
    }
}
