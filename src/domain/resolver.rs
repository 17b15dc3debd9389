//! Item value resolution: merging the default and user tiers, and
//! routing edits into the user tier.
//!
//! Reads are pure. Edits only ever touch `user_values`; defaults change
//! only at item creation or schema migration.

use std::collections::HashMap;

use chrono::Utc;

use super::item::{Item, OverrideState};
use super::schema::Schema;
use super::value::ColumnValue;
use super::ItemId;
use crate::error::TrackerError;

/// Builds a new item with one `Null` default per current column and no
/// overrides.
#[must_use]
pub fn initialize_item(schema: &Schema, id: ItemId, name: &str) -> Item {
    let now = Utc::now();
    Item {
        id,
        name: name.to_string(),
        default_values: schema
            .columns()
            .iter()
            .map(|c| (c.key, ColumnValue::Null))
            .collect(),
        user_values: HashMap::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Effective value of `column_name` on `item`.
///
/// Precedence: user override, then default, then `Null`. A name that is
/// not in the schema resolves to `Null`.
#[must_use]
pub fn effective_value(schema: &Schema, item: &Item, column_name: &str) -> ColumnValue {
    schema
        .column(column_name)
        .map_or(ColumnValue::Null, |c| item.effective(c.key).clone())
}

/// Checks that `value` may be written to `column_name`.
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`] if the column does not exist or
/// [`TrackerError::TypeMismatch`] if the variant does not match its type.
pub fn validate_value(
    schema: &Schema,
    column_name: &str,
    value: &ColumnValue,
) -> Result<(), TrackerError> {
    let column = schema.require(column_name)?;
    if !value.fits(column.column_type) {
        return Err(TrackerError::TypeMismatch {
            column: column_name.to_string(),
            expected: column.column_type,
            found: value.variant_name(),
        });
    }
    Ok(())
}

/// Writes `value` as the user override for `column_name`.
///
/// Returns the previous override state so a caller can revert.
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`] or [`TrackerError::TypeMismatch`];
/// the item is unchanged on error.
pub fn apply_edit(
    schema: &Schema,
    item: &mut Item,
    column_name: &str,
    value: ColumnValue,
) -> Result<OverrideState, TrackerError> {
    validate_value(schema, column_name, &value)?;
    let key = schema.require(column_name)?.key;
    let previous = item.override_state(key);
    item.user_values.insert(key, value);
    item.updated_at = Utc::now();
    Ok(previous)
}

/// Parses free text for `column_name` and writes it as the override.
/// Unparsable text degrades to `Null`.
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`] if the column does not exist.
pub fn apply_text_edit(
    schema: &Schema,
    item: &mut Item,
    column_name: &str,
    text: &str,
) -> Result<ColumnValue, TrackerError> {
    let column_type = schema.require(column_name)?.column_type;
    let value = ColumnValue::parse(text, column_type);
    apply_edit(schema, item, column_name, value.clone())?;
    Ok(value)
}

/// Removes the user override so the default shows through again.
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`] if the column does not exist.
pub fn clear_override(
    schema: &Schema,
    item: &mut Item,
    column_name: &str,
) -> Result<OverrideState, TrackerError> {
    let key = schema.require(column_name)?.key;
    let previous = item.override_state(key);
    if item.user_values.remove(&key).is_some() {
        item.updated_at = Utc::now();
    }
    Ok(previous)
}

/// Restores an override state captured by [`apply_edit`] or
/// [`clear_override`].
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`] if the column does not exist.
pub fn restore_override(
    schema: &Schema,
    item: &mut Item,
    column_name: &str,
    state: OverrideState,
) -> Result<(), TrackerError> {
    let key = schema.require(column_name)?.key;
    match state {
        OverrideState::NoOverride => {
            item.user_values.remove(&key);
        }
        OverrideState::Override(v) => {
            item.user_values.insert(key, v);
        }
    }
    Ok(())
}

/// Override state for `column_name`.
///
/// # Errors
///
/// Returns [`TrackerError::UnknownColumn`] if the column does not exist.
pub fn override_state(
    schema: &Schema,
    item: &Item,
    column_name: &str,
) -> Result<OverrideState, TrackerError> {
    Ok(item.override_state(schema.require(column_name)?.key))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::value::ColumnType;

    fn schema() -> Schema {
        let Ok(schema) = Schema::from_parts(
            [
                ("sets".to_string(), ColumnType::Number),
                ("duration".to_string(), ColumnType::Time),
            ],
            Vec::<String>::new(),
        ) else {
            panic!("valid schema");
        };
        schema
    }

    #[test]
    fn new_item_defaults_every_column_to_null() {
        let schema = schema();
        let item = initialize_item(&schema, ItemId::new(1), "squat");
        assert_eq!(item.default_values.len(), 2);
        assert!(item.default_values.values().all(ColumnValue::is_null));
        assert!(item.user_values.is_empty());
    }

    #[test]
    fn precedence_override_then_default_then_null() {
        let schema = schema();
        let mut item = initialize_item(&schema, ItemId::new(1), "squat");
        let Some(key) = schema.column("sets").map(|c| c.key) else {
            panic!("sets exists");
        };
        item.default_values.insert(key, ColumnValue::Number(10));
        assert_eq!(effective_value(&schema, &item, "sets"), ColumnValue::Number(10));

        let Ok(prev) = apply_edit(&schema, &mut item, "sets", ColumnValue::Number(12)) else {
            panic!("edit should apply");
        };
        assert_eq!(prev, OverrideState::NoOverride);
        assert_eq!(effective_value(&schema, &item, "sets"), ColumnValue::Number(12));
        assert_eq!(item.default_values.get(&key), Some(&ColumnValue::Number(10)));

        assert_eq!(effective_value(&schema, &item, "missing"), ColumnValue::Null);
    }

    #[test]
    fn mismatched_variant_is_rejected() {
        let schema = schema();
        let mut item = initialize_item(&schema, ItemId::new(1), "squat");
        let result = apply_edit(&schema, &mut item, "sets", ColumnValue::Text("n/a".to_string()));
        assert!(matches!(result, Err(TrackerError::TypeMismatch { .. })));
        assert!(item.user_values.is_empty());
    }

    #[test]
    fn text_edit_degrades_to_null_override() {
        let schema = schema();
        let mut item = initialize_item(&schema, ItemId::new(1), "squat");
        let Ok(value) = apply_text_edit(&schema, &mut item, "sets", "n/a") else {
            panic!("text edits never fail on coercion");
        };
        assert_eq!(value, ColumnValue::Null);
        assert_eq!(
            override_state(&schema, &item, "sets").ok(),
            Some(OverrideState::Override(ColumnValue::Null))
        );
    }

    #[test]
    fn unknown_column_edit_is_a_schema_violation() {
        let schema = schema();
        let mut item = initialize_item(&schema, ItemId::new(1), "squat");
        let Err(err) = apply_edit(&schema, &mut item, "pace", ColumnValue::Null) else {
            panic!("unknown column must fail");
        };
        assert!(err.is_schema_violation());
    }

    #[test]
    fn null_override_and_no_override_are_distinct() {
        let schema = schema();
        let mut item = initialize_item(&schema, ItemId::new(1), "squat");
        let Some(key) = schema.column("sets").map(|c| c.key) else {
            panic!("sets exists");
        };
        item.default_values.insert(key, ColumnValue::Number(5));

        let _ = apply_edit(&schema, &mut item, "sets", ColumnValue::Null);
        assert_eq!(effective_value(&schema, &item, "sets"), ColumnValue::Null);

        let Ok(prev) = clear_override(&schema, &mut item, "sets") else {
            panic!("clear should succeed");
        };
        assert_eq!(prev, OverrideState::Override(ColumnValue::Null));
        assert_eq!(effective_value(&schema, &item, "sets"), ColumnValue::Number(5));
    }

    #[test]
    fn restore_reverts_an_edit() {
        let schema = schema();
        let mut item = initialize_item(&schema, ItemId::new(1), "squat");
        let Ok(prev) = apply_edit(&schema, &mut item, "sets", ColumnValue::Number(3)) else {
            panic!("edit should apply");
        };
        assert!(restore_override(&schema, &mut item, "sets", prev).is_ok());
        assert!(item.user_values.is_empty());
    }
}
