//! Entity records for the forum: users, comments and votes.
//!
//! # Responsibility
//! - Hold validated field values for one persisted (or to-be-persisted) row.
//! - Route every construction and mutation through `crate::validation`.
//!
//! # Invariants
//! - Records reference each other only by integer identifier.
//! - A storage-assigned identity never changes once set.
//! - Construction is fail-fast: the first rejected field aborts it.

pub mod comment;
pub mod user;
pub mod vote;

use crate::validation::{format_timestamp, ValidationError, ValidationResult};
use chrono::NaiveDateTime;
use serde::Serializer;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned integer identity.
pub type RecordId = i64;

pub type FieldResult<T> = Result<T, FieldError>;

/// A validation rejection tagged with the entity and field it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub entity: &'static str,
    pub field: &'static str,
    pub error: ValidationError,
}

impl FieldError {
    pub fn new(entity: &'static str, field: &'static str, error: ValidationError) -> Self {
        Self {
            entity,
            field,
            error,
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.entity, self.field, self.error)
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

pub(crate) trait InField<T> {
    fn in_field(self, entity: &'static str, field: &'static str) -> FieldResult<T>;
}

impl<T> InField<T> for ValidationResult<T> {
    fn in_field(self, entity: &'static str, field: &'static str) -> FieldResult<T> {
        self.map_err(|error| FieldError::new(entity, field, error))
    }
}

pub(crate) fn serialize_timestamp<S: Serializer>(
    value: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(value))
}
