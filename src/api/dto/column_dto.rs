//! Column and visible-set DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ColumnDef, ColumnType};

/// Request body for `POST /pods/{id}/columns`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddColumnRequest {
    /// Column name, unique within the pod (case-sensitive).
    pub name: String,
    /// Declared type, fixed for the column's lifetime.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// A column definition.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ColumnDto {
    /// Column name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl From<ColumnDef> for ColumnDto {
    fn from(c: ColumnDef) -> Self {
        Self {
            name: c.name,
            column_type: c.column_type,
        }
    }
}

/// Request body for `PUT /pods/{id}/visible-columns`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetVisibleColumnsRequest {
    /// Requested visible names. Unknown names are dropped.
    pub columns: Vec<String>,
}

/// The visible set after an update.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisibleColumnsResponse {
    /// Retained names in display order.
    pub columns: Vec<String>,
}
