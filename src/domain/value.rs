//! Cell values: the closed set of variants a column can hold.
//!
//! A [`ColumnValue`] is resolved at runtime against a [`ColumnType`].
//! Free-text edits are coerced with [`ColumnValue::parse`], which never
//! fails: input that does not fit the declared type degrades to
//! [`ColumnValue::Null`]. Callers that need strict validation use
//! [`ColumnValue::parse_strict`] first.
//!
//! Two encodings exist:
//!
//! - the **wire** form ([`ColumnValue::to_wire`] / [`ColumnValue::from_wire`]):
//!   `Text` → string, `Number` → integer, `Time` → `"HH:MM:SS"`, `Null` → `null`.
//!   It is not self-describing, so decoding needs the column type.
//! - the **stored** form (serde derive): `{"type": "time", "value": "00:45:00"}`.
//!   Used for persisted snapshots, which must stay decodable after the
//!   column they reference has been removed from the schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::TrackerError;

/// Declared type of a column. Fixed for the lifetime of the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Free text.
    Text,
    /// Signed integer.
    Number,
    /// Time of day / duration as `HH:MM:SS`.
    Time,
}

impl ColumnType {
    /// Returns the lowercase type name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "time" => Ok(Self::Time),
            other => Err(TrackerError::InvalidColumnType(other.to_string())),
        }
    }
}

/// A range-checked `HH:MM:SS` value.
///
/// Components outside `0..=23`, `0..=59`, `0..=59` are rejected on
/// construction, never clamped. Serializes as the zero-padded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl TimeOfDay {
    /// Creates a time value.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidTime`] if any component is out of range.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, TrackerError> {
        if hours > 23 || minutes > 59 || seconds > 59 {
            return Err(TrackerError::InvalidTime {
                hours,
                minutes,
                seconds,
            });
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Hours component (0–23).
    #[must_use]
    pub const fn hours(&self) -> u8 {
        self.hours
    }

    /// Minutes component (0–59).
    #[must_use]
    pub const fn minutes(&self) -> u8 {
        self.minutes
    }

    /// Seconds component (0–59).
    #[must_use]
    pub const fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Total number of seconds since `00:00:00`.
    #[must_use]
    pub const fn total_seconds(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    /// Strict `HH:MM:SS` parse: exactly three colon-separated groups of
    /// exactly two ASCII digits each, all components in range.
    #[must_use]
    pub fn parse_hms(text: &str) -> Option<Self> {
        let mut parts = text.split(':');
        let hours = two_digits(parts.next()?)?;
        let minutes = two_digits(parts.next()?)?;
        let seconds = two_digits(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Self::new(hours, minutes, seconds).ok()
    }
}

fn two_digits(part: &str) -> Option<u8> {
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hms(&value).ok_or_else(|| {
            TrackerError::InvalidRequest(format!("invalid time '{value}', expected HH:MM:SS"))
        })
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A single cell value. Exactly one case is active.
///
/// Equality is structural and variant-aware: `Number(3) != Text("3")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ColumnValue {
    /// Free text.
    Text(String),
    /// Signed integer.
    Number(i64),
    /// `HH:MM:SS` time.
    Time(TimeOfDay),
    /// Explicitly unset. Distinct from an absent entry.
    Null,
}

impl ColumnValue {
    /// Builds a `Time` value from its components.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidTime`] if any component is out of range.
    pub fn time(hours: u8, minutes: u8, seconds: u8) -> Result<Self, TrackerError> {
        TimeOfDay::new(hours, minutes, seconds).map(Self::Time)
    }

    /// Coerces free text into a value of the declared type.
    ///
    /// Empty input is `Null` for every type. Input that does not parse as
    /// the declared type also yields `Null`; this is a deliberate
    /// degradation, not an error. Text is kept verbatim; numbers and
    /// times are parsed after trimming surrounding whitespace.
    #[must_use]
    pub fn parse(text: &str, column_type: ColumnType) -> Self {
        if text.is_empty() {
            return Self::Null;
        }
        match column_type {
            ColumnType::Time => TimeOfDay::parse_hms(text.trim()).map_or(Self::Null, Self::Time),
            ColumnType::Number => text.trim().parse::<i64>().map_or(Self::Null, Self::Number),
            ColumnType::Text => Self::Text(text.to_string()),
        }
    }

    /// Like [`ColumnValue::parse`] but reports input that would have
    /// degraded to `Null`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] when non-empty input does
    /// not parse as `column_type`.
    pub fn parse_strict(text: &str, column_type: ColumnType) -> Result<Self, TrackerError> {
        let value = Self::parse(text, column_type);
        if value.is_null() && !text.is_empty() {
            return Err(TrackerError::InvalidRequest(format!(
                "'{text}' is not a valid {column_type} value"
            )));
        }
        Ok(value)
    }

    /// Renders the value as edit text. Inverse of [`ColumnValue::parse`]
    /// for `Number` and `Time`.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Time(t) => t.to_string(),
            Self::Null => String::new(),
        }
    }

    /// Returns `true` for [`ColumnValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The column type this value belongs to, or `None` for `Null`.
    #[must_use]
    pub const fn value_type(&self) -> Option<ColumnType> {
        match self {
            Self::Text(_) => Some(ColumnType::Text),
            Self::Number(_) => Some(ColumnType::Number),
            Self::Time(_) => Some(ColumnType::Time),
            Self::Null => None,
        }
    }

    /// Variant name, used in error messages.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Time(_) => "time",
            Self::Null => "null",
        }
    }

    /// Returns `true` if this value may be stored in a column of `column_type`.
    #[must_use]
    pub fn fits(&self, column_type: ColumnType) -> bool {
        self.value_type().is_none_or(|t| t == column_type)
    }

    /// Numeric projection used by trend analytics: the integer for
    /// `Number`, total seconds for `Time`, `None` otherwise.
    #[must_use]
    pub fn as_scalar(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Time(t) => Some(i64::from(t.total_seconds())),
            Self::Text(_) | Self::Null => None,
        }
    }

    /// Encodes the value in its wire form.
    #[must_use]
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Number(n) => serde_json::Value::from(*n),
            Self::Time(t) => serde_json::Value::String(t.to_string()),
            Self::Null => serde_json::Value::Null,
        }
    }

    /// Decodes a wire value for a column of `column_type`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] if the JSON shape does not
    /// match the column type (wire decoding is strict, unlike text parsing).
    pub fn from_wire(
        value: &serde_json::Value,
        column_type: ColumnType,
    ) -> Result<Self, TrackerError> {
        match (column_type, value) {
            (_, serde_json::Value::Null) => Ok(Self::Null),
            (ColumnType::Text, serde_json::Value::String(s)) => Ok(Self::Text(s.clone())),
            (ColumnType::Number, serde_json::Value::Number(n)) => n
                .as_i64()
                .map(Self::Number)
                .ok_or_else(|| TrackerError::InvalidRequest(format!("not an integer: {n}"))),
            (ColumnType::Time, serde_json::Value::String(s)) => TimeOfDay::parse_hms(s)
                .map(Self::Time)
                .ok_or_else(|| {
                    TrackerError::InvalidRequest(format!("invalid time '{s}', expected HH:MM:SS"))
                }),
            (t, other) => Err(TrackerError::InvalidRequest(format!(
                "expected {t} wire value, got {other}"
            ))),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input_is_null_for_every_type() {
        for t in [ColumnType::Text, ColumnType::Number, ColumnType::Time] {
            assert_eq!(ColumnValue::parse("", t), ColumnValue::Null);
        }
    }

    #[test]
    fn time_parse_is_strict() {
        let Ok(expected) = ColumnValue::time(0, 45, 0) else {
            panic!("valid time");
        };
        assert_eq!(ColumnValue::parse("00:45:00", ColumnType::Time), expected);
        assert_eq!(ColumnValue::parse("0:45:00", ColumnType::Time), ColumnValue::Null);
        assert_eq!(ColumnValue::parse("24:00:00", ColumnType::Time), ColumnValue::Null);
        assert_eq!(ColumnValue::parse("12:00", ColumnType::Time), ColumnValue::Null);
        assert_eq!(ColumnValue::parse("12:00:00:00", ColumnType::Time), ColumnValue::Null);
        assert_eq!(ColumnValue::parse("+1:00:00", ColumnType::Time), ColumnValue::Null);
    }

    #[test]
    fn number_parse_degrades_to_null() {
        assert_eq!(
            ColumnValue::parse("42", ColumnType::Number),
            ColumnValue::Number(42)
        );
        assert_eq!(
            ColumnValue::parse(" -7 ", ColumnType::Number),
            ColumnValue::Number(-7)
        );
        assert_eq!(ColumnValue::parse("4.2", ColumnType::Number), ColumnValue::Null);
        assert_eq!(ColumnValue::parse("n/a", ColumnType::Number), ColumnValue::Null);
    }

    #[test]
    fn text_is_kept_verbatim() {
        assert_eq!(
            ColumnValue::parse(" 12 ", ColumnType::Text),
            ColumnValue::Text(" 12 ".to_string())
        );
    }

    #[test]
    fn parse_strict_reports_degradation() {
        assert!(ColumnValue::parse_strict("abc", ColumnType::Number).is_err());
        assert!(matches!(
            ColumnValue::parse_strict("", ColumnType::Number),
            Ok(ColumnValue::Null)
        ));
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        assert!(TimeOfDay::new(24, 0, 0).is_err());
        assert!(TimeOfDay::new(0, 60, 0).is_err());
        assert!(TimeOfDay::new(0, 0, 60).is_err());
        assert!(TimeOfDay::new(23, 59, 59).is_ok());
    }

    #[test]
    fn display_strings() {
        let Ok(t) = ColumnValue::time(7, 5, 3) else {
            panic!("valid time");
        };
        assert_eq!(t.to_display_string(), "07:05:03");
        assert_eq!(ColumnValue::Number(-12).to_display_string(), "-12");
        assert_eq!(ColumnValue::Null.to_display_string(), "");
    }

    #[test]
    fn equality_is_variant_aware() {
        assert_ne!(ColumnValue::Number(3), ColumnValue::Text("3".to_string()));
    }

    #[test]
    fn wire_decoding_is_type_directed() {
        let wire = serde_json::json!("00:10:00");
        assert!(matches!(
            ColumnValue::from_wire(&wire, ColumnType::Time),
            Ok(ColumnValue::Time(_))
        ));
        assert!(matches!(
            ColumnValue::from_wire(&wire, ColumnType::Text),
            Ok(ColumnValue::Text(_))
        ));
        assert!(ColumnValue::from_wire(&wire, ColumnType::Number).is_err());
        assert!(matches!(
            ColumnValue::from_wire(&serde_json::Value::Null, ColumnType::Number),
            Ok(ColumnValue::Null)
        ));
    }

    #[test]
    fn stored_form_is_self_describing() {
        let Ok(v) = ColumnValue::time(0, 45, 0) else {
            panic!("valid time");
        };
        let Ok(json) = serde_json::to_value(&v) else {
            panic!("serialization failed");
        };
        assert_eq!(json, serde_json::json!({"type": "time", "value": "00:45:00"}));
        let Ok(back) = serde_json::from_value::<ColumnValue>(json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, v);

        let bad = serde_json::json!({"type": "time", "value": "25:00:00"});
        assert!(serde_json::from_value::<ColumnValue>(bad).is_err());
    }

    proptest! {
        #[test]
        fn number_round_trips(n in any::<i64>()) {
            let v = ColumnValue::Number(n);
            prop_assert_eq!(ColumnValue::parse(&v.to_display_string(), ColumnType::Number), v);
        }

        #[test]
        fn time_round_trips(h in 0u8..24, m in 0u8..60, s in 0u8..60) {
            let Ok(v) = ColumnValue::time(h, m, s) else {
                panic!("in-range time rejected");
            };
            prop_assert_eq!(ColumnValue::parse(&v.to_display_string(), ColumnType::Time), v);
        }
    }
}
