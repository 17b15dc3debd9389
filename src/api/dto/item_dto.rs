//! Item, cell and value-edit DTOs.
//!
//! Values travel in their wire form: text and times as strings
//! (`"HH:MM:SS"`), numbers as integers, unset as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::present;
use crate::domain::{CellView, ColumnType, ItemId, ItemView, OverrideState};

/// Request body for `POST /pods/{id}/items`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    /// Display name of the item.
    pub name: String,
}

/// One resolved cell.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CellDto {
    /// Column name.
    pub column: String,
    /// Declared column type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Effective value in wire form.
    pub value: serde_json::Value,
    /// Effective value as edit text.
    pub display: String,
    /// `true` if the value comes from a user override.
    pub overridden: bool,
}

impl From<CellView> for CellDto {
    fn from(c: CellView) -> Self {
        Self {
            value: c.value.to_wire(),
            display: c.value.to_display_string(),
            column: c.column,
            column_type: c.column_type,
            overridden: c.overridden,
        }
    }
}

/// An item with its resolved cells.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemResponse {
    /// Item identifier within the pod.
    pub item_id: ItemId,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last value edit.
    pub updated_at: DateTime<Utc>,
    /// Cells in display order.
    pub cells: Vec<CellDto>,
}

impl From<ItemView> for ItemResponse {
    fn from(v: ItemView) -> Self {
        Self {
            item_id: v.item_id,
            name: v.name,
            created_at: v.created_at,
            updated_at: v.updated_at,
            cells: v.cells.into_iter().map(CellDto::from).collect(),
        }
    }
}

/// All items of a pod.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemListResponse {
    /// Items in creation order.
    pub data: Vec<ItemResponse>,
}

/// Request body for `PUT /pods/{id}/items/{item_id}/values/{column}`.
///
/// Exactly one of `value` and `text` must be present. `value` is strict
/// and must match the column type (`null` sets an explicit `Null`
/// override); `text` is coerced and degrades to `Null` when it does not
/// parse.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EditValueRequest {
    /// Typed wire value.
    #[serde(default, deserialize_with = "present")]
    pub value: Option<serde_json::Value>,
    /// Free text to coerce.
    #[serde(default)]
    pub text: Option<String>,
    /// Who performs the edit.
    #[serde(default)]
    pub actor: Option<String>,
}

/// Override state of one cell.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OverrideStateResponse {
    /// Column name.
    pub column: String,
    /// `true` if a user override is present.
    pub overridden: bool,
    /// The override in wire form, when present. May itself be `null`.
    pub override_value: Option<serde_json::Value>,
}

impl OverrideStateResponse {
    /// Builds the response for `column`.
    #[must_use]
    pub fn new(column: String, state: &OverrideState) -> Self {
        match state {
            OverrideState::NoOverride => Self {
                column,
                overridden: false,
                override_value: None,
            },
            OverrideState::Override(value) => Self {
                column,
                overridden: true,
                override_value: Some(value.to_wire()),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ColumnValue;

    #[test]
    fn explicit_null_is_distinct_from_absent() {
        let Ok(with_null) = serde_json::from_str::<EditValueRequest>(r#"{"value": null}"#) else {
            panic!("body should parse");
        };
        assert_eq!(with_null.value, Some(serde_json::Value::Null));

        let Ok(text_only) = serde_json::from_str::<EditValueRequest>(r#"{"text": "12"}"#) else {
            panic!("body should parse");
        };
        assert!(text_only.value.is_none());
        assert_eq!(text_only.text.as_deref(), Some("12"));
    }

    #[test]
    fn cell_uses_wire_form() {
        let Ok(value) = ColumnValue::time(0, 45, 0) else {
            panic!("valid time");
        };
        let dto = CellDto::from(CellView {
            column: "duration".to_string(),
            column_type: ColumnType::Time,
            value,
            overridden: true,
        });
        assert_eq!(dto.value, serde_json::json!("00:45:00"));
        assert_eq!(dto.display, "00:45:00");
    }
}
