//! Vote persistence adapter over the `vote` table.
//!
//! Votes are keyed by `(userId, commentId)`; persisted state is tracked by
//! `Vote::is_persisted`, not by the vote value.

use super::{ensure_handle, materialize, FindResult, RecordRepository, RepoError, RepoResult};
use crate::model::vote::Vote;
use crate::model::{FieldError, FieldResult, InField};
use crate::storage::{column, Row, StorageHandle};
use crate::validation::{
    format_timestamp, positive_identifier, signed_unit_vote, timestamp, RawValue, ValidationError,
};
use log::{debug, info, warn};
use mockable::DefaultClock;
use rusqlite::types::Value;

const ENTITY: &str = "vote";
const TABLE: &str = "vote";
const VOTE_SELECT_SQL: &str = "SELECT userId, commentId, timeRecorded, vote FROM vote";

/// Adapter for [`Vote`] records.
pub struct VoteRepository<'h> {
    handle: &'h dyn StorageHandle,
}

impl<'h> VoteRepository<'h> {
    pub fn new(handle: &'h dyn StorageHandle) -> Self {
        Self { handle }
    }

    /// Votes with exactly the given value (`1` or `-1`).
    pub fn find_by_vote(&self, value: impl Into<RawValue>) -> RepoResult<FindResult<Vote>> {
        ensure_handle(self.handle)?;
        let value = require_value(signed_unit_vote(&value.into()).in_field(ENTITY, "vote")?)?;
        self.find(
            &format!("{VOTE_SELECT_SQL} WHERE vote = ?1"),
            Value::Integer(i64::from(value)),
        )
    }

    /// Every vote cast by the given user.
    pub fn find_by_user_id(&self, user_id: impl Into<RawValue>) -> RepoResult<FindResult<Vote>> {
        ensure_handle(self.handle)?;
        let user_id = positive_identifier(&user_id.into()).in_field(ENTITY, "userId")?;
        self.find(
            &format!("{VOTE_SELECT_SQL} WHERE userId = ?1"),
            Value::Integer(user_id),
        )
    }

    /// Every vote cast on the given comment.
    pub fn find_by_comment_id(
        &self,
        comment_id: impl Into<RawValue>,
    ) -> RepoResult<FindResult<Vote>> {
        ensure_handle(self.handle)?;
        let comment_id =
            positive_identifier(&comment_id.into()).in_field(ENTITY, "commentId")?;
        self.find(
            &format!("{VOTE_SELECT_SQL} WHERE commentId = ?1"),
            Value::Integer(comment_id),
        )
    }

    fn find(&self, sql: &str, param: Value) -> RepoResult<FindResult<Vote>> {
        let rows = self.handle.fetch_rows(sql, &[param])?;
        debug!("event=vote_find module=repo status=ok rows={}", rows.len());
        materialize(rows, TABLE, vote_from_row)
    }
}

impl RecordRepository for VoteRepository<'_> {
    type Record = Vote;

    fn insert(&self, vote: &mut Vote) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        if vote.is_persisted() {
            warn!("event=vote_insert module=repo status=rejected reason=already_exists");
            return Err(RepoError::AlreadyExists { entity: ENTITY });
        }

        self.handle.insert(
            "INSERT INTO vote (userId, commentId, timeRecorded, vote) VALUES (?1, ?2, ?3, ?4)",
            &[
                Value::Integer(vote.user_id()),
                Value::Integer(vote.comment_id()),
                Value::Text(format_timestamp(&vote.recorded_at())),
                value_param(vote.value()),
            ],
        )?;
        vote.mark_persisted();
        info!(
            "event=vote_insert module=repo status=ok user_id={} comment_id={}",
            vote.user_id(),
            vote.comment_id()
        );
        Ok(())
    }

    fn update(&self, vote: &Vote) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        if !vote.is_persisted() {
            return Err(RepoError::CannotUpdateUnpersisted { entity: ENTITY });
        }

        let changed = self.handle.execute(
            "UPDATE vote SET timeRecorded = ?1, vote = ?2 WHERE userId = ?3 AND commentId = ?4",
            &[
                Value::Text(format_timestamp(&vote.recorded_at())),
                value_param(vote.value()),
                Value::Integer(vote.user_id()),
                Value::Integer(vote.comment_id()),
            ],
        )?;
        ensure_changed(changed, vote)?;
        info!(
            "event=vote_update module=repo status=ok user_id={} comment_id={}",
            vote.user_id(),
            vote.comment_id()
        );
        Ok(())
    }

    fn delete(&self, vote: &Vote) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        if !vote.is_persisted() {
            return Err(RepoError::CannotDeleteUnpersisted { entity: ENTITY });
        }

        let changed = self.handle.execute(
            "DELETE FROM vote WHERE userId = ?1 AND commentId = ?2",
            &[Value::Integer(vote.user_id()), Value::Integer(vote.comment_id())],
        )?;
        ensure_changed(changed, vote)?;
        info!(
            "event=vote_delete module=repo status=ok user_id={} comment_id={}",
            vote.user_id(),
            vote.comment_id()
        );
        Ok(())
    }
}

fn value_param(value: Option<i8>) -> Value {
    value.map_or(Value::Null, |value| Value::Integer(i64::from(value)))
}

fn ensure_changed(changed: usize, vote: &Vote) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: ENTITY,
            key: format!("({}, {})", vote.user_id(), vote.comment_id()),
        });
    }
    Ok(())
}

fn require_value(value: Option<i8>) -> FieldResult<i8> {
    value.ok_or_else(|| {
        FieldError::new(
            ENTITY,
            "vote",
            ValidationError::InvalidType {
                expected: "vote integer",
                found: "null".to_string(),
            },
        )
    })
}

fn vote_from_row(row: &Row) -> FieldResult<Vote> {
    let user_id = positive_identifier(&column(row, "userId")).in_field(ENTITY, "userId")?;
    let comment_id =
        positive_identifier(&column(row, "commentId")).in_field(ENTITY, "commentId")?;
    let recorded_at =
        timestamp(&column(row, "timeRecorded")).in_field(ENTITY, "timeRecorded")?;
    let mut vote = Vote::new(
        user_id,
        comment_id,
        recorded_at,
        column(row, "vote"),
        &DefaultClock,
    )?;
    require_value(vote.value())?;
    vote.mark_persisted();
    Ok(vote)
}
