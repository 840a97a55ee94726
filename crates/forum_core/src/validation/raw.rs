//! Untyped candidate values accepted by the normalization rules.

use super::{ValidationError, ValidationResult};
use chrono::NaiveDateTime;
use rusqlite::types::Value;

/// A raw field value as supplied by a caller or read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Absent value; meaning depends on the rule (unassigned, "now", ...).
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    /// Already-structured timestamp.
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short description used in `InvalidType` rejections.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Integer(value) => format!("integer {value}"),
            Self::Float(value) => format!("float {value}"),
            Self::Text(value) => format!("text `{}`", truncate_for_message(value)),
            Self::Timestamp(value) => format!("timestamp {value}"),
            Self::Bytes(value) => format!("{} bytes of binary data", value.len()),
        }
    }

    pub(crate) fn to_integer(&self, expected: &'static str) -> ValidationResult<i64> {
        match self {
            Self::Integer(value) => Ok(*value),
            Self::Text(text) => text.trim().parse::<i64>().map_err(|_| {
                ValidationError::InvalidType {
                    expected,
                    found: self.describe(),
                }
            }),
            _ => Err(ValidationError::InvalidType {
                expected,
                found: self.describe(),
            }),
        }
    }
}

fn truncate_for_message(value: &str) -> String {
    const MAX_CHARS: usize = 32;
    let mut truncated = value.chars().take(MAX_CHARS).collect::<String>();
    if value.chars().count() > MAX_CHARS {
        truncated.push_str("...");
    }
    truncated
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i8> for RawValue {
    fn from(value: i8) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Integer(value) => Self::Integer(value),
            Value::Real(value) => Self::Float(value),
            Value::Text(value) => Self::Text(value),
            Value::Blob(value) => Self::Bytes(value),
        }
    }
}
