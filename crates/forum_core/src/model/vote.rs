//! Vote record.
//!
//! A vote is identified by the `(user_id, comment_id)` pair. Whether the vote
//! has been written to storage is tracked separately from its value, so a
//! `value` of `None` only means "no value cast yet".
//!
//! # Invariants
//! - `value` is `Some(1)`, `Some(-1)` or `None`; never `0`.
//! - The identity pair is fixed at construction.

use super::{serialize_timestamp, FieldResult, InField, RecordId};
use crate::validation::{positive_identifier, signed_unit_vote, timestamp_or_now, RawValue};
use chrono::NaiveDateTime;
use mockable::Clock;
use serde::Serialize;

const ENTITY: &str = "vote";

/// One user's up/down vote on one comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vote {
    #[serde(rename = "userId")]
    user_id: RecordId,
    #[serde(rename = "commentId")]
    comment_id: RecordId,
    #[serde(rename = "timeRecorded", serialize_with = "serialize_timestamp")]
    recorded_at: NaiveDateTime,
    #[serde(rename = "vote")]
    value: Option<i8>,
    #[serde(skip)]
    persisted: bool,
}

impl Vote {
    /// Builds an unpersisted vote, validating `user_id`, `comment_id`,
    /// `recorded_at` and `value` in that order.
    pub fn new(
        user_id: impl Into<RawValue>,
        comment_id: impl Into<RawValue>,
        recorded_at: impl Into<RawValue>,
        value: impl Into<RawValue>,
        clock: &dyn Clock,
    ) -> FieldResult<Self> {
        let user_id = positive_identifier(&user_id.into()).in_field(ENTITY, "userId")?;
        let comment_id = positive_identifier(&comment_id.into()).in_field(ENTITY, "commentId")?;
        let recorded_at =
            timestamp_or_now(&recorded_at.into(), clock).in_field(ENTITY, "timeRecorded")?;
        let value = signed_unit_vote(&value.into()).in_field(ENTITY, "vote")?;

        Ok(Self {
            user_id,
            comment_id,
            recorded_at,
            value,
            persisted: false,
        })
    }

    pub fn user_id(&self) -> RecordId {
        self.user_id
    }

    pub fn comment_id(&self) -> RecordId {
        self.comment_id
    }

    pub fn recorded_at(&self) -> NaiveDateTime {
        self.recorded_at
    }

    pub fn value(&self) -> Option<i8> {
        self.value
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn set_recorded_at(
        &mut self,
        recorded_at: impl Into<RawValue>,
        clock: &dyn Clock,
    ) -> FieldResult<()> {
        self.recorded_at =
            timestamp_or_now(&recorded_at.into(), clock).in_field(ENTITY, "timeRecorded")?;
        Ok(())
    }

    pub fn set_value(&mut self, value: impl Into<RawValue>) -> FieldResult<()> {
        self.value = signed_unit_vote(&value.into()).in_field(ENTITY, "vote")?;
        Ok(())
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.persisted = true;
    }
}
