#![allow(dead_code)]

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use forum_core::{Row, StorageError, StorageHandle, StorageResult};
use mockable::MockClock;
use rusqlite::types::Value;
use std::cell::RefCell;

/// Clock pinned to one local wall-clock instant.
pub fn clock_at(naive: NaiveDateTime) -> MockClock {
    let local_now = Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("fixture time should exist in the local timezone");
    let mut clock = MockClock::new();
    clock.expect_local().return_const(local_now);
    clock.expect_utc().return_const(local_now.with_timezone(&Utc));
    clock
}

pub fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .expect("valid fixture timestamp")
}

pub fn fixture_clock() -> MockClock {
    clock_at(ts(2024, 6, 1, 12, 0, 0))
}

/// One statement the double was asked to run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub op: &'static str,
    pub sql: String,
    pub params: Vec<Value>,
}

/// Storage double that records every call and replays canned results.
#[derive(Default)]
pub struct RecordingStorage {
    pub calls: RefCell<Vec<RecordedCall>>,
    pub rows: Vec<Row>,
    pub next_id: i64,
    pub affected: usize,
    pub fail_with: Option<String>,
    pub not_ready: bool,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            affected: 1,
            ..Self::default()
        }
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::new()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn uninitialized() -> Self {
        Self {
            not_ready: true,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls.borrow().last().cloned().expect("at least one call")
    }

    fn record(&self, op: &'static str, sql: &str, params: &[Value]) -> StorageResult<()> {
        self.calls.borrow_mut().push(RecordedCall {
            op,
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        match &self.fail_with {
            Some(message) => Err(StorageError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

impl StorageHandle for RecordingStorage {
    fn ensure_ready(&self) -> StorageResult<()> {
        if self.not_ready {
            return Err(StorageError::Backend("handle not initialized".to_string()));
        }
        Ok(())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> StorageResult<usize> {
        self.record("execute", sql, params)?;
        Ok(self.affected)
    }

    fn insert(&self, sql: &str, params: &[Value]) -> StorageResult<i64> {
        self.record("insert", sql, params)?;
        Ok(self.next_id)
    }

    fn fetch_rows(&self, sql: &str, params: &[Value]) -> StorageResult<Vec<Row>> {
        self.record("fetch_rows", sql, params)?;
        Ok(self.rows.clone())
    }
}

pub fn row(columns: &[(&str, Value)]) -> Row {
    columns
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}
