//! Storage-handle capability used by the persistence adapters.
//!
//! # Responsibility
//! - Describe the prepare/bind/execute/fetch surface adapters depend on.
//! - Carry storage-layer failures as [`StorageError`].
//!
//! # Invariants
//! - Every call prepares, binds and runs exactly one statement and releases
//!   it before returning, on success and on error.
//! - Values are always bound positionally; SQL text never embeds user input.

pub mod schema;
mod sqlite;

use crate::model::{FieldError, RecordId};
use crate::validation::RawValue;
use rusqlite::types::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use sqlite::SqliteStorage;

/// One fetched row: column name to value.
pub type Row = BTreeMap<String, Value>;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure raised by a storage handle or while materializing its rows.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// Failure reported by a non-SQLite handle implementation.
    Backend(String),
    /// Schema version of the connection is not the one this build reads.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A fetched row did not pass field validation.
    InvalidRow {
        table: &'static str,
        error: FieldError,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "storage backend error: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidRow { table, error } => {
                write!(f, "invalid persisted row in `{table}`: {error}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidRow { error, .. } => Some(error),
            Self::Backend(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Statement-level access to relational storage.
///
/// Implementations own statement lifetime: a statement acquired inside a call
/// must be released before the call returns.
pub trait StorageHandle {
    /// Verifies the handle is initialized and usable.
    fn ensure_ready(&self) -> StorageResult<()>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> StorageResult<usize>;

    /// Runs an insert statement and returns the identity storage assigned.
    fn insert(&self, sql: &str, params: &[Value]) -> StorageResult<RecordId>;

    /// Runs a query and returns its rows in storage iteration order.
    fn fetch_rows(&self, sql: &str, params: &[Value]) -> StorageResult<Vec<Row>>;
}

/// Reads one column of `row` as a raw value; a missing column reads as null.
pub fn column(row: &Row, name: &str) -> RawValue {
    row.get(name).cloned().map_or(RawValue::Null, RawValue::from)
}
