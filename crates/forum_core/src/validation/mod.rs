//! Field normalization rules shared by every entity record.
//!
//! # Responsibility
//! - Turn a raw candidate value into a normalized, storage-safe value.
//! - Reject unacceptable input with a typed [`ValidationError`].
//!
//! # Invariants
//! - Every rule is a pure function of its input (plus the injected clock for
//!   [`timestamp_or_now`]).
//! - Rules never touch storage; a rejection here never reaches SQL.
//!
//! # See also
//! - `model` for the entity constructors that call these rules in field order.

mod datetime;
mod raw;
mod text;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use datetime::{format_timestamp, timestamp, timestamp_or_now, TIMESTAMP_FORMAT};
pub use raw::RawValue;
pub use text::{bounded_text, sanitize_text};

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rejection raised by a normalization rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value cannot be interpreted as the expected type.
    InvalidType {
        expected: &'static str,
        found: String,
    },
    /// Value parsed but falls outside the accepted range or length.
    OutOfRange(String),
    /// Value is empty (or empty after sanitizing).
    InvalidInput(String),
    /// Timestamp text does not match `YYYY-MM-DD HH:MM:SS`.
    InvalidFormat(String),
    /// Timestamp components do not form a real calendar date.
    InvalidCalendarDate(String),
    /// Timestamp components do not form a valid wall-clock time.
    InvalidTime(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidType { expected, found } => {
                write!(f, "expected {expected}, got {found}")
            }
            Self::OutOfRange(message) => write!(f, "value out of range: {message}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidFormat(value) => {
                write!(f, "`{value}` does not match YYYY-MM-DD HH:MM:SS")
            }
            Self::InvalidCalendarDate(value) => write!(f, "`{value}` is not a Gregorian date"),
            Self::InvalidTime(value) => write!(f, "`{value}` is not a valid wall-clock time"),
        }
    }
}

impl Error for ValidationError {}

/// Normalizes an identifier that may still be unassigned.
///
/// `RawValue::Null` passes through as `None` (not yet assigned by storage).
pub fn optional_identifier(raw: &RawValue) -> ValidationResult<Option<i64>> {
    if raw.is_null() {
        return Ok(None);
    }
    positive_identifier(raw).map(Some)
}

/// Normalizes a required positive integer identifier.
///
/// # Errors
/// - `InvalidType` when the value is null or does not parse as an integer.
/// - `OutOfRange` when the parsed value is `<= 0`.
pub fn positive_identifier(raw: &RawValue) -> ValidationResult<i64> {
    let value = raw.to_integer("positive integer")?;
    if value <= 0 {
        return Err(ValidationError::OutOfRange(format!(
            "identifier {value} must be positive"
        )));
    }
    Ok(value)
}

/// Normalizes a vote value.
///
/// `RawValue::Null` passes through as `None`; any other value must be exactly
/// `-1` or `+1`.
pub fn signed_unit_vote(raw: &RawValue) -> ValidationResult<Option<i8>> {
    if raw.is_null() {
        return Ok(None);
    }
    match raw.to_integer("vote integer")? {
        1 => Ok(Some(1)),
        -1 => Ok(Some(-1)),
        other => Err(ValidationError::OutOfRange(format!(
            "vote {other} is not 1 or -1"
        ))),
    }
}
