//! Comment record.
//!
//! # Invariants
//! - `comment_id` is `None` exactly while the comment is not persisted.
//! - `author_id` references `users.userId`; only storage enforces it.
//! - `content` is non-empty and at most 15000 characters after normalization.

use super::{serialize_timestamp, FieldResult, InField, RecordId};
use crate::validation::{
    bounded_text, optional_identifier, positive_identifier, timestamp_or_now, RawValue,
};
use chrono::NaiveDateTime;
use mockable::Clock;
use serde::Serialize;

const ENTITY: &str = "comment";

/// A comment posted by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    #[serde(rename = "commentId")]
    comment_id: Option<RecordId>,
    #[serde(rename = "userId")]
    author_id: RecordId,
    #[serde(rename = "commentContent")]
    content: String,
    #[serde(rename = "commentDate", serialize_with = "serialize_timestamp")]
    created_at: NaiveDateTime,
}

impl Comment {
    pub const CONTENT_MAX_CHARS: usize = 15_000;

    /// Builds a comment from raw field values, validated in declared order:
    /// `comment_id`, `author_id`, `content`, `created_at`.
    ///
    /// A null `created_at` takes the current time from `clock`.
    pub fn new(
        comment_id: impl Into<RawValue>,
        author_id: impl Into<RawValue>,
        content: impl Into<RawValue>,
        created_at: impl Into<RawValue>,
        clock: &dyn Clock,
    ) -> FieldResult<Self> {
        let comment_id = optional_identifier(&comment_id.into()).in_field(ENTITY, "commentId")?;
        let author_id = positive_identifier(&author_id.into()).in_field(ENTITY, "userId")?;
        let content = bounded_text(&content.into(), Self::CONTENT_MAX_CHARS)
            .in_field(ENTITY, "commentContent")?;
        let created_at =
            timestamp_or_now(&created_at.into(), clock).in_field(ENTITY, "commentDate")?;

        Ok(Self {
            comment_id,
            author_id,
            content,
            created_at,
        })
    }

    pub fn comment_id(&self) -> Option<RecordId> {
        self.comment_id
    }

    pub fn author_id(&self) -> RecordId {
        self.author_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn is_persisted(&self) -> bool {
        self.comment_id.is_some()
    }

    pub fn set_author_id(&mut self, author_id: impl Into<RawValue>) -> FieldResult<()> {
        self.author_id = positive_identifier(&author_id.into()).in_field(ENTITY, "userId")?;
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<RawValue>) -> FieldResult<()> {
        self.content = bounded_text(&content.into(), Self::CONTENT_MAX_CHARS)
            .in_field(ENTITY, "commentContent")?;
        Ok(())
    }

    /// Replaces the creation time; null means "now" according to `clock`.
    pub fn set_created_at(
        &mut self,
        created_at: impl Into<RawValue>,
        clock: &dyn Clock,
    ) -> FieldResult<()> {
        self.created_at =
            timestamp_or_now(&created_at.into(), clock).in_field(ENTITY, "commentDate")?;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, comment_id: RecordId) {
        self.comment_id = Some(comment_id);
    }
}
