//! # Error Types
//!
//! Failures raised by the pure reporting layer.
//!
//! ```text
//!   ValidationError ──► CoreError ──► DbError ──► ApiError ──► { code, message }
//!   (bad input)         (bad data)    (storage)   (HTTP status)
//! ```
//!
//! Validation failures reach the client as `validation_failed`; anything else
//! from this crate is reported as `bad_request`.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised while interpreting stored data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Enum text in a tenant row that this build doesn't know, usually a
    /// book written by a newer POS client or edited by hand.
    #[error("Unknown {kind} value: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Stored date that isn't `YYYY-MM-DD`.
    #[error("Invalid date '{value}' in {field}")]
    InvalidDate { field: String, value: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        CoreError::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected input, phrased for display next to the offending field.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Empty or whitespace-only.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} needs {min} or more characters")]
    TooShort { field: String, min: usize },

    #[error("{field} allows at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric input outside `min..=max`.
    #[error("{field} must lie in {min}..={max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Parsed but malformed: bad date, stray characters in a code.
    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// `from` later than `to`.
    #[error("date range is inverted: {from} is after {to}")]
    InvertedRange { from: String, to: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
