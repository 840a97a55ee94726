//! Forum schema: ordered DDL steps and the checks a connection must pass
//! before adapters may touch it.
//!
//! # Invariants
//! - Step `n` (1-based) brings `PRAGMA user_version` from `n - 1` to `n`.
//! - A connection is ready only at exactly [`SCHEMA_VERSION`] with every
//!   table and column in [`REQUIRED_COLUMNS`] present.

use super::{StorageError, StorageResult};
use log::{debug, info};
use rusqlite::Connection;

const STEPS: &[&str] = &[include_str!("sql/0001_init.sql")];

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = STEPS.len() as u32;

/// Columns adapters bind by name, grouped by table.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("users", &["userId", "email", "username"]),
    (
        "comments",
        &["commentId", "userId", "commentContent", "commentDate"],
    ),
    ("vote", &["userId", "commentId", "timeRecorded", "vote"]),
];

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn user_version(conn: &Connection) -> StorageResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Brings an older forum schema up to [`SCHEMA_VERSION`] in one transaction.
///
/// # Errors
/// - `UninitializedConnection` when the database is newer than this build.
pub fn upgrade(conn: &mut Connection) -> StorageResult<()> {
    let found = user_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(StorageError::UninitializedConnection {
            expected_version: SCHEMA_VERSION,
            actual_version: found,
        });
    }

    let pending = usize::try_from(found)
        .ok()
        .and_then(|applied| STEPS.get(applied..))
        .unwrap_or_default();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (offset, sql) in pending.iter().enumerate() {
        tx.execute_batch(sql)?;
        debug!(
            "event=schema_step module=storage status=ok step={}",
            found as usize + offset + 1
        );
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    info!(
        "event=schema_upgrade module=storage status=ok from_version={found} to_version={SCHEMA_VERSION}"
    );
    Ok(())
}

/// Fails unless the connection sits at exactly [`SCHEMA_VERSION`].
pub fn ensure_version(conn: &Connection) -> StorageResult<()> {
    let actual_version = user_version(conn)?;
    if actual_version != SCHEMA_VERSION {
        return Err(StorageError::UninitializedConnection {
            expected_version: SCHEMA_VERSION,
            actual_version,
        });
    }
    Ok(())
}

/// Checks version plus every required table and column.
///
/// # Errors
/// - `UninitializedConnection` on a version mismatch.
/// - `MissingRequiredTable` / `MissingRequiredColumn` for a foreign schema.
pub fn verify(conn: &Connection) -> StorageResult<()> {
    ensure_version(conn)?;
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(StorageError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(StorageError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StorageResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
