//! Persistence adapters binding entity records to storage.
//!
//! # Responsibility
//! - Issue parameterized insert/update/delete/find statements per entity.
//! - Translate storage failures and precondition violations into [`RepoError`].
//!
//! # Invariants
//! - The storage handle is checked before any other logic in every call.
//! - Precondition violations abort before a statement is issued.
//! - Read paths re-validate every row; one invalid row fails the whole find.
//! - Delete leaves the in-memory record untouched; callers discard it.

pub mod comment_repo;
pub mod user_repo;
pub mod vote_repo;

use crate::model::{FieldError, FieldResult};
use crate::storage::{Row, StorageError, StorageHandle};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Adapter-level error taxonomy.
#[derive(Debug)]
pub enum RepoError {
    /// A search value failed normalization; no statement was issued.
    Validation(FieldError),
    /// The storage handle is not initialized or not usable.
    InvalidHandle(StorageError),
    AlreadyExists { entity: &'static str },
    CannotUpdateUnpersisted { entity: &'static str },
    CannotDeleteUnpersisted { entity: &'static str },
    /// The statement ran but matched no row for the record's identity.
    NotFound { entity: &'static str, key: String },
    Storage(StorageError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidHandle(err) => write!(f, "invalid storage handle: {err}"),
            Self::AlreadyExists { entity } => write!(f, "this {entity} already exists"),
            Self::CannotUpdateUnpersisted { entity } => {
                write!(f, "unable to update a {entity} that does not exist")
            }
            Self::CannotDeleteUnpersisted { entity } => {
                write!(f, "unable to delete a {entity} that does not exist")
            }
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidHandle(err) | Self::Storage(err) => Some(err),
            Self::AlreadyExists { .. }
            | Self::CannotUpdateUnpersisted { .. }
            | Self::CannotDeleteUnpersisted { .. }
            | Self::NotFound { .. } => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<FieldError> for RepoError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

/// Insert/update/delete contract shared by every adapter.
pub trait RecordRepository {
    type Record;

    /// Inserts an unpersisted record and writes the assigned identity back.
    fn insert(&self, record: &mut Self::Record) -> RepoResult<()>;
    /// Rewrites the row identified by the record's identity.
    fn update(&self, record: &Self::Record) -> RepoResult<()>;
    /// Deletes the row identified by the record's identity.
    fn delete(&self, record: &Self::Record) -> RepoResult<()>;
}

/// Result of a find operation.
///
/// Zero rows are reported as `Empty`, one row as `One` (not wrapped in a
/// collection), more rows as `Many` in storage iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindResult<T> {
    Empty,
    One(T),
    Many(Vec<T>),
}

impl<T> FindResult<T> {
    fn from_vec(mut records: Vec<T>) -> Self {
        match records.len() {
            0 => Self::Empty,
            1 => records.pop().map_or(Self::Empty, Self::One),
            _ => Self::Many(records),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the record when exactly one matched.
    pub fn one(self) -> Option<T> {
        match self {
            Self::One(record) => Some(record),
            Self::Empty | Self::Many(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Empty => Vec::new(),
            Self::One(record) => vec![record],
            Self::Many(records) => records,
        }
    }
}

fn ensure_handle(handle: &dyn StorageHandle) -> RepoResult<()> {
    handle.ensure_ready().map_err(RepoError::InvalidHandle)
}

fn materialize<T>(
    rows: Vec<Row>,
    table: &'static str,
    parse: impl Fn(&Row) -> FieldResult<T>,
) -> RepoResult<FindResult<T>> {
    let records = rows
        .iter()
        .map(|row| {
            parse(row).map_err(|error| RepoError::Storage(StorageError::InvalidRow { table, error }))
        })
        .collect::<RepoResult<Vec<T>>>()?;
    Ok(FindResult::from_vec(records))
}

/// Builds a `LIKE ... ESCAPE '\'` pattern matching values containing `value`.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
