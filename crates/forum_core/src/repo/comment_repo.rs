//! Comment persistence adapter over the `comments` table.

use super::{
    contains_pattern, ensure_handle, materialize, FindResult, RecordRepository, RepoError,
    RepoResult,
};
use crate::model::comment::Comment;
use crate::model::{FieldResult, InField, RecordId};
use crate::storage::{column, Row, StorageHandle};
use crate::validation::{bounded_text, format_timestamp, positive_identifier, timestamp, RawValue};
use log::{debug, info, warn};
use mockable::DefaultClock;
use rusqlite::types::Value;

const ENTITY: &str = "comment";
const TABLE: &str = "comments";
const COMMENT_SELECT_SQL: &str =
    "SELECT commentId, userId, commentContent, commentDate FROM comments";

/// Adapter for [`Comment`] records.
pub struct CommentRepository<'h> {
    handle: &'h dyn StorageHandle,
}

impl<'h> CommentRepository<'h> {
    pub fn new(handle: &'h dyn StorageHandle) -> Self {
        Self { handle }
    }

    /// Exact match on `commentId`.
    pub fn find_by_comment_id(
        &self,
        comment_id: impl Into<RawValue>,
    ) -> RepoResult<FindResult<Comment>> {
        ensure_handle(self.handle)?;
        let comment_id =
            positive_identifier(&comment_id.into()).in_field(ENTITY, "commentId")?;
        self.find(
            &format!("{COMMENT_SELECT_SQL} WHERE commentId = ?1"),
            Value::Integer(comment_id),
        )
    }

    /// Every comment written by the given user.
    pub fn find_by_author_id(
        &self,
        author_id: impl Into<RawValue>,
    ) -> RepoResult<FindResult<Comment>> {
        ensure_handle(self.handle)?;
        let author_id = positive_identifier(&author_id.into()).in_field(ENTITY, "userId")?;
        self.find(
            &format!("{COMMENT_SELECT_SQL} WHERE userId = ?1"),
            Value::Integer(author_id),
        )
    }

    /// Comments whose content contains the normalized search value.
    pub fn find_by_content(&self, content: impl Into<RawValue>) -> RepoResult<FindResult<Comment>> {
        ensure_handle(self.handle)?;
        let content = bounded_text(&content.into(), Comment::CONTENT_MAX_CHARS)
            .in_field(ENTITY, "commentContent")?;
        self.find(
            &format!("{COMMENT_SELECT_SQL} WHERE commentContent LIKE ?1 ESCAPE '\\'"),
            Value::Text(contains_pattern(&content)),
        )
    }

    fn find(&self, sql: &str, param: Value) -> RepoResult<FindResult<Comment>> {
        let rows = self.handle.fetch_rows(sql, &[param])?;
        debug!("event=comment_find module=repo status=ok rows={}", rows.len());
        materialize(rows, TABLE, comment_from_row)
    }
}

impl RecordRepository for CommentRepository<'_> {
    type Record = Comment;

    fn insert(&self, comment: &mut Comment) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        if comment.is_persisted() {
            warn!("event=comment_insert module=repo status=rejected reason=already_exists");
            return Err(RepoError::AlreadyExists { entity: ENTITY });
        }

        let comment_id = self.handle.insert(
            "INSERT INTO comments (userId, commentContent, commentDate) VALUES (?1, ?2, ?3)",
            &[
                Value::Integer(comment.author_id()),
                Value::Text(comment.content().to_string()),
                Value::Text(format_timestamp(&comment.created_at())),
            ],
        )?;
        comment.assign_id(comment_id);
        info!("event=comment_insert module=repo status=ok comment_id={comment_id}");
        Ok(())
    }

    fn update(&self, comment: &Comment) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        let comment_id = comment
            .comment_id()
            .ok_or(RepoError::CannotUpdateUnpersisted { entity: ENTITY })?;

        let changed = self.handle.execute(
            "UPDATE comments
             SET userId = ?1, commentContent = ?2, commentDate = ?3
             WHERE commentId = ?4",
            &[
                Value::Integer(comment.author_id()),
                Value::Text(comment.content().to_string()),
                Value::Text(format_timestamp(&comment.created_at())),
                Value::Integer(comment_id),
            ],
        )?;
        ensure_changed(changed, comment_id)?;
        info!("event=comment_update module=repo status=ok comment_id={comment_id}");
        Ok(())
    }

    fn delete(&self, comment: &Comment) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        let comment_id = comment
            .comment_id()
            .ok_or(RepoError::CannotDeleteUnpersisted { entity: ENTITY })?;

        let changed = self.handle.execute(
            "DELETE FROM comments WHERE commentId = ?1",
            &[Value::Integer(comment_id)],
        )?;
        ensure_changed(changed, comment_id)?;
        info!("event=comment_delete module=repo status=ok comment_id={comment_id}");
        Ok(())
    }
}

fn ensure_changed(changed: usize, comment_id: RecordId) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: ENTITY,
            key: comment_id.to_string(),
        });
    }
    Ok(())
}

fn comment_from_row(row: &Row) -> FieldResult<Comment> {
    let comment_id =
        positive_identifier(&column(row, "commentId")).in_field(ENTITY, "commentId")?;
    let author_id = positive_identifier(&column(row, "userId")).in_field(ENTITY, "userId")?;
    let content = bounded_text(&column(row, "commentContent"), Comment::CONTENT_MAX_CHARS)
        .in_field(ENTITY, "commentContent")?;
    // A null date must not be replaced by "now" when reading back.
    let created_at = timestamp(&column(row, "commentDate")).in_field(ENTITY, "commentDate")?;
    Comment::new(comment_id, author_id, content, created_at, &DefaultClock)
}
