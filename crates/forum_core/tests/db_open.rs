use forum_core::db::{open_db, open_db_in_memory, open_with_config};
use forum_core::storage::schema::{self, SCHEMA_VERSION};
use forum_core::{DatabaseConfig, SqliteStorage, StorageError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_forum_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "comments");
    assert_table_exists(&conn, "vote");
}

#[test]
fn opened_connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forum.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), SCHEMA_VERSION);
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), SCHEMA_VERSION);
    assert_table_exists(&conn_second, "comments");
}

#[test]
fn open_with_config_uses_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config = DatabaseConfig {
        path: Some(path.clone()),
        busy_timeout_ms: 250,
    };

    let conn = open_with_config(&config).unwrap();
    assert_table_exists(&conn, "users");
    assert!(path.exists());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        StorageError::UninitializedConnection {
            expected_version,
            actual_version,
        } => {
            assert_eq!(actual_version, 999);
            assert_eq!(expected_version, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn upgrade_is_a_no_op_on_current_schema() {
    let mut conn = open_db_in_memory().unwrap();
    schema::upgrade(&mut conn).unwrap();

    assert_eq!(schema::user_version(&conn).unwrap(), SCHEMA_VERSION);
    assert!(SqliteStorage::try_new(&conn).is_ok());
}

#[test]
fn opening_database_with_foreign_schema_reports_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE users (userId INTEGER PRIMARY KEY, email TEXT);
         CREATE TABLE comments (commentId INTEGER PRIMARY KEY, userId INTEGER,
             commentContent TEXT, commentDate TEXT);
         CREATE TABLE vote (userId INTEGER, commentId INTEGER, timeRecorded TEXT, vote INTEGER);
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        StorageError::MissingRequiredColumn { table, column } => {
            assert_eq!(table, "users");
            assert_eq!(column, "username");
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
