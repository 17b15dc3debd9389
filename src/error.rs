//! Tracker error types with HTTP status code mapping.
//!
//! [`TrackerError`] is the central error type. Each variant maps to a
//! specific HTTP status code and structured JSON error response.
//!
//! Coercion of free text into `Null` and eviction of old log entries are
//! deliberate behaviours and never surface here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2003,
///     "message": "column already exists: reps",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category                  | HTTP Status                      |
/// |-----------|---------------------------|----------------------------------|
/// | 1000–1999 | Validation                | 400 Bad Request                  |
/// | 2000–2999 | Schema / Not Found        | 404 / 409 Conflict / 422         |
/// | 3000–3999 | Server / Collaborator     | 500 / 502 Bad Gateway            |
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown column type name.
    #[error("invalid column type: {0}")]
    InvalidColumnType(String),

    /// A time value with an out-of-range component.
    #[error("invalid time {hours:02}:{minutes:02}:{seconds:02}: components out of range")]
    InvalidTime {
        /// Hours as given.
        hours: u8,
        /// Minutes as given.
        minutes: u8,
        /// Seconds as given.
        seconds: u8,
    },

    /// Pod with the given ID was not found.
    #[error("pod not found: {0}")]
    PodNotFound(uuid::Uuid),

    /// Item was not found in the pod.
    #[error("item {item_id} not found in pod {pod_id}")]
    ItemNotFound {
        /// Pod that was searched.
        pod_id: uuid::Uuid,
        /// Missing item.
        item_id: i64,
    },

    /// A column with the same name already exists in the pod.
    #[error("column already exists: {0}")]
    DuplicateColumn(String),

    /// The referenced column is not part of the pod schema.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// The referenced activity log entry is not in the working set.
    #[error("log entry not found: {0}")]
    LogEntryNotFound(uuid::Uuid),

    /// A value variant does not match the column's declared type.
    #[error("column {column} expects {expected} values, got {found}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Declared column type.
        expected: crate::domain::ColumnType,
        /// Variant that was submitted.
        found: &'static str,
    },

    /// The persistence collaborator failed. In-memory state is unchanged.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidColumnType(_) => 1002,
            Self::InvalidTime { .. } => 1003,
            Self::PodNotFound(_) => 2001,
            Self::ItemNotFound { .. } => 2002,
            Self::DuplicateColumn(_) => 2003,
            Self::UnknownColumn(_) => 2004,
            Self::LogEntryNotFound(_) => 2005,
            Self::TypeMismatch { .. } => 2006,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidColumnType(_) | Self::InvalidTime { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::PodNotFound(_)
            | Self::ItemNotFound { .. }
            | Self::UnknownColumn(_)
            | Self::LogEntryNotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateColumn(_) => StatusCode::CONFLICT,
            Self::TypeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PersistenceError(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for errors that violate the pod schema: duplicate
    /// column names, edits naming unknown columns, and values whose
    /// variant does not match the column type.
    #[must_use]
    pub const fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateColumn(_) | Self::UnknownColumn(_) | Self::TypeMismatch { .. }
        )
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for TrackerError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnType;

    #[test]
    fn schema_violations_are_classified() {
        assert!(TrackerError::DuplicateColumn("reps".to_string()).is_schema_violation());
        assert!(TrackerError::UnknownColumn("reps".to_string()).is_schema_violation());
        assert!(
            TrackerError::TypeMismatch {
                column: "reps".to_string(),
                expected: ColumnType::Number,
                found: "text",
            }
            .is_schema_violation()
        );
        assert!(!TrackerError::PersistenceError("down".to_string()).is_schema_violation());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            TrackerError::DuplicateColumn("x".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            TrackerError::PersistenceError("x".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            TrackerError::InvalidTime {
                hours: 25,
                minutes: 0,
                seconds: 0
            }
            .error_code(),
            1003
        );
    }

    #[test]
    fn into_response_sets_status() {
        let response = TrackerError::UnknownColumn("pace".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
