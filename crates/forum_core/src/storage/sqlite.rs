//! SQLite implementation of [`StorageHandle`].

use super::{schema, Row, StorageError, StorageHandle, StorageResult};
use crate::model::RecordId;
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Storage handle over a migrated SQLite connection.
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorage<'conn> {
    /// Wraps a connection after checking schema version and required tables.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for a foreign schema.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        schema::verify(conn)?;
        Ok(Self { conn })
    }
}

impl StorageHandle for SqliteStorage<'_> {
    fn ensure_ready(&self) -> StorageResult<()> {
        schema::ensure_version(self.conn)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> StorageResult<usize> {
        let mut stmt = self.conn.prepare(sql).map_err(log_failure("prepare"))?;
        let changed = stmt
            .execute(params_from_iter(params.iter()))
            .map_err(log_failure("execute"))?;
        Ok(changed)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> StorageResult<RecordId> {
        let mut stmt = self.conn.prepare(sql).map_err(log_failure("prepare"))?;
        stmt.execute(params_from_iter(params.iter()))
            .map_err(log_failure("execute"))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn fetch_rows(&self, sql: &str, params: &[Value]) -> StorageResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql).map_err(log_failure("prepare"))?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(log_failure("query"))?;
        let mut fetched = Vec::new();
        while let Some(row) = rows.next().map_err(log_failure("fetch"))? {
            let mut values = Row::new();
            for (index, name) in names.iter().enumerate() {
                values.insert(name.clone(), row.get::<_, Value>(index)?);
            }
            fetched.push(values);
        }

        Ok(fetched)
    }
}

fn log_failure(step: &'static str) -> impl Fn(rusqlite::Error) -> StorageError {
    move |err| {
        warn!("event=storage_statement module=storage status=error step={step} error={err}");
        StorageError::Sqlite(err)
    }
}
