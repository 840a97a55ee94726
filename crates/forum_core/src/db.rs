//! Connection bootstrap for the forum database.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and the configured busy
//!   timeout.
//! - Returned connections pass `storage::schema::verify`, so
//!   `SqliteStorage::try_new` succeeds on them.

use crate::config::DatabaseConfig;
use crate::storage::{schema, StorageResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) a forum database file.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> StorageResult<Connection> {
    open_logged("file", DEFAULT_BUSY_TIMEOUT, || Connection::open(path))
}

/// Opens a private in-memory forum database.
pub fn open_db_in_memory() -> StorageResult<Connection> {
    open_logged("memory", DEFAULT_BUSY_TIMEOUT, Connection::open_in_memory)
}

/// Opens the database described by `config`.
///
/// A config without `path` opens an in-memory database.
pub fn open_with_config(config: &DatabaseConfig) -> StorageResult<Connection> {
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
    match &config.path {
        Some(path) => open_logged("file", busy_timeout, || Connection::open(path)),
        None => open_logged("memory", busy_timeout, Connection::open_in_memory),
    }
}

fn open_logged(
    mode: &str,
    busy_timeout: Duration,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StorageResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = open()
        .map_err(Into::into)
        .and_then(|mut conn| prepare_connection(&mut conn, busy_timeout).map(|()| conn));
    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn prepare_connection(conn: &mut Connection, busy_timeout: Duration) -> StorageResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    schema::upgrade(conn)?;
    schema::verify(conn)
}
