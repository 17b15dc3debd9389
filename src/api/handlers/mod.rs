//! REST endpoint handlers organized by resource.

pub mod columns;
pub mod items;
pub mod logs;
pub mod pods;
pub mod system;
pub mod trends;
pub mod values;

use axum::Router;

use crate::app_state::AppState;
use crate::domain::{ColumnType, ColumnValue};
use crate::error::TrackerError;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pods::routes())
        .merge(columns::routes())
        .merge(items::routes())
        .merge(values::routes())
        .merge(logs::routes())
        .merge(trends::routes())
}

/// Decodes a wire value for `column`. A JSON value of the wrong kind is a
/// [`TrackerError::TypeMismatch`]; a string that is not a valid time or a
/// non-integer number is a [`TrackerError::InvalidRequest`].
pub(crate) fn decode_wire(
    column: &str,
    wire: &serde_json::Value,
    column_type: ColumnType,
) -> Result<ColumnValue, TrackerError> {
    use serde_json::Value;

    let found = match (column_type, wire) {
        (_, Value::Null)
        | (ColumnType::Text | ColumnType::Time, Value::String(_))
        | (ColumnType::Number, Value::Number(_)) => None,
        (_, Value::String(_)) => Some("text"),
        (_, Value::Number(_)) => Some("number"),
        (_, Value::Bool(_)) => Some("boolean"),
        (_, Value::Array(_)) => Some("array"),
        (_, Value::Object(_)) => Some("object"),
    };
    if let Some(found) = found {
        return Err(TrackerError::TypeMismatch {
            column: column.to_string(),
            expected: column_type,
            found,
        });
    }
    ColumnValue::from_wire(wire, column_type)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn matching_kinds_decode() {
        assert!(matches!(
            decode_wire("reps", &json!(12), ColumnType::Number),
            Ok(ColumnValue::Number(12))
        ));
        assert!(matches!(
            decode_wire("reps", &json!(null), ColumnType::Number),
            Ok(ColumnValue::Null)
        ));
        assert!(matches!(
            decode_wire("duration", &json!("00:45:00"), ColumnType::Time),
            Ok(ColumnValue::Time(_))
        ));
    }

    #[test]
    fn wrong_kind_is_a_type_mismatch() {
        assert!(matches!(
            decode_wire("reps", &json!("12"), ColumnType::Number),
            Err(TrackerError::TypeMismatch { found: "text", .. })
        ));
        assert!(matches!(
            decode_wire("notes", &json!(true), ColumnType::Text),
            Err(TrackerError::TypeMismatch { found: "boolean", .. })
        ));
    }

    #[test]
    fn malformed_time_is_invalid_request() {
        assert!(matches!(
            decode_wire("duration", &json!("45 minutes"), ColumnType::Time),
            Err(TrackerError::InvalidRequest(_))
        ));
    }
}
