//! Database row models and their conversions into domain records.
//!
//! Column values are stored as JSONB in their self-describing tagged
//! form (`{"type": "number", "value": 3}`) so snapshots that mention a
//! removed column stay decodable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::domain::{
    ActivityLogEntry, ColumnDef, ColumnType, ColumnValue, ItemId, ItemRecord, LogEntryId, PodId,
};
use crate::error::TrackerError;

/// A row of the `pods` table.
#[derive(Debug, Clone)]
pub struct PodRow {
    /// Pod identifier.
    pub pod_id: Uuid,
    /// Pod name.
    pub name: String,
    /// Visible column names as a JSONB array.
    pub visible_columns: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Lowest item id never handed out.
    pub next_item_id: i64,
}

/// A row of the `pod_columns` table.
#[derive(Debug, Clone)]
pub struct ColumnRow {
    /// Column name.
    pub name: String,
    /// Column type name (`text`, `number`, `time`).
    pub column_type: String,
}

/// A row of the `items` table.
#[derive(Debug, Clone)]
pub struct ItemRow {
    /// Item identifier within the pod.
    pub item_id: i64,
    /// Display name.
    pub name: String,
    /// Baseline values as JSONB.
    pub default_values: serde_json::Value,
    /// User overrides as JSONB.
    pub user_values: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A row of the `activity_log` table.
#[derive(Debug, Clone)]
pub struct LogRow {
    /// Entry identifier.
    pub entry_id: Uuid,
    /// Owning pod.
    pub pod_id: Uuid,
    /// Item the entry belongs to.
    pub item_id: i64,
    /// Authoritative timestamp.
    pub logged_at: DateTime<Utc>,
    /// Snapshot as JSONB.
    pub column_snapshot: serde_json::Value,
    /// Free-form notes.
    pub notes: String,
}

pub(crate) fn decode_json<T: DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<T, TrackerError> {
    serde_json::from_value(value)
        .map_err(|e| TrackerError::PersistenceError(format!("corrupt {what}: {e}")))
}

pub(crate) fn encode_json<T: serde::Serialize>(
    value: &T,
    what: &str,
) -> Result<serde_json::Value, TrackerError> {
    serde_json::to_value(value)
        .map_err(|e| TrackerError::PersistenceError(format!("cannot encode {what}: {e}")))
}

impl PodRow {
    /// Decodes the visible column list.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] if the JSON is malformed.
    pub fn visible_names(&self) -> Result<Vec<String>, TrackerError> {
        decode_json(self.visible_columns.clone(), "visible columns")
    }
}

impl TryFrom<ColumnRow> for ColumnDef {
    type Error = TrackerError;

    fn try_from(row: ColumnRow) -> Result<Self, Self::Error> {
        let column_type: ColumnType = row.column_type.parse().map_err(|_| {
            TrackerError::PersistenceError(format!(
                "column {} has unknown type {}",
                row.name, row.column_type
            ))
        })?;
        Ok(Self {
            name: row.name,
            column_type,
        })
    }
}

impl TryFrom<ItemRow> for ItemRecord {
    type Error = TrackerError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let default_values: BTreeMap<String, ColumnValue> =
            decode_json(row.default_values, "item defaults")?;
        let user_values: BTreeMap<String, ColumnValue> =
            decode_json(row.user_values, "item overrides")?;
        Ok(Self {
            id: ItemId::new(row.item_id),
            name: row.name,
            default_values,
            user_values,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<LogRow> for ActivityLogEntry {
    type Error = TrackerError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LogEntryId::from_uuid(row.entry_id),
            item_id: ItemId::new(row.item_id),
            pod_id: PodId::from_uuid(row.pod_id),
            logged_at: row.logged_at,
            column_snapshot: decode_json(row.column_snapshot, "log snapshot")?,
            notes: row.notes,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_row_decodes_tagged_values() {
        let row = ItemRow {
            item_id: 3,
            name: "squat".to_string(),
            default_values: json!({"sets": {"type": "null"}}),
            user_values: json!({"sets": {"type": "number", "value": 5}}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let Ok(record) = ItemRecord::try_from(row) else {
            panic!("row should decode");
        };
        assert_eq!(record.id, ItemId::new(3));
        assert_eq!(record.default_values.get("sets"), Some(&ColumnValue::Null));
        assert_eq!(record.user_values.get("sets"), Some(&ColumnValue::Number(5)));
    }

    #[test]
    fn unknown_column_type_is_a_persistence_error() {
        let row = ColumnRow {
            name: "mood".to_string(),
            column_type: "emoji".to_string(),
        };
        assert!(matches!(
            ColumnDef::try_from(row),
            Err(TrackerError::PersistenceError(_))
        ));
    }

    #[test]
    fn corrupt_snapshot_is_a_persistence_error() {
        let row = LogRow {
            entry_id: Uuid::new_v4(),
            pod_id: Uuid::new_v4(),
            item_id: 1,
            logged_at: Utc::now(),
            column_snapshot: json!(["not", "a", "map"]),
            notes: String::new(),
        };
        assert!(ActivityLogEntry::try_from(row).is_err());
    }
}
