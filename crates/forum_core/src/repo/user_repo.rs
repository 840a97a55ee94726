//! User persistence adapter over the `users` table.

use super::{
    contains_pattern, ensure_handle, materialize, FindResult, RecordRepository, RepoError,
    RepoResult,
};
use crate::model::user::User;
use crate::model::{FieldResult, InField, RecordId};
use crate::storage::{column, Row, StorageHandle};
use crate::validation::{bounded_text, positive_identifier, RawValue};
use log::{debug, info, warn};
use rusqlite::types::Value;

const ENTITY: &str = "user";
const TABLE: &str = "users";
const USER_SELECT_SQL: &str = "SELECT userId, email, username FROM users";

/// Adapter for [`User`] records.
pub struct UserRepository<'h> {
    handle: &'h dyn StorageHandle,
}

impl<'h> UserRepository<'h> {
    pub fn new(handle: &'h dyn StorageHandle) -> Self {
        Self { handle }
    }

    /// Exact match on `userId`.
    pub fn find_by_user_id(&self, user_id: impl Into<RawValue>) -> RepoResult<FindResult<User>> {
        ensure_handle(self.handle)?;
        let user_id = positive_identifier(&user_id.into()).in_field(ENTITY, "userId")?;
        self.find(
            &format!("{USER_SELECT_SQL} WHERE userId = ?1"),
            Value::Integer(user_id),
        )
    }

    /// Exact match on the normalized email.
    pub fn find_by_email(&self, email: impl Into<RawValue>) -> RepoResult<FindResult<User>> {
        ensure_handle(self.handle)?;
        let email = bounded_text(&email.into(), User::EMAIL_MAX_CHARS).in_field(ENTITY, "email")?;
        self.find(
            &format!("{USER_SELECT_SQL} WHERE email = ?1"),
            Value::Text(email),
        )
    }

    /// Users whose username contains the normalized search value.
    pub fn find_by_username(&self, username: impl Into<RawValue>) -> RepoResult<FindResult<User>> {
        ensure_handle(self.handle)?;
        let username = bounded_text(&username.into(), User::USERNAME_MAX_CHARS)
            .in_field(ENTITY, "username")?;
        self.find(
            &format!("{USER_SELECT_SQL} WHERE username LIKE ?1 ESCAPE '\\'"),
            Value::Text(contains_pattern(&username)),
        )
    }

    fn find(&self, sql: &str, param: Value) -> RepoResult<FindResult<User>> {
        let rows = self.handle.fetch_rows(sql, &[param])?;
        debug!("event=user_find module=repo status=ok rows={}", rows.len());
        materialize(rows, TABLE, user_from_row)
    }
}

impl RecordRepository for UserRepository<'_> {
    type Record = User;

    fn insert(&self, user: &mut User) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        if user.is_persisted() {
            warn!("event=user_insert module=repo status=rejected reason=already_exists");
            return Err(RepoError::AlreadyExists { entity: ENTITY });
        }

        let user_id = self.handle.insert(
            "INSERT INTO users (email, username) VALUES (?1, ?2)",
            &[
                Value::Text(user.email().to_string()),
                Value::Text(user.username().to_string()),
            ],
        )?;
        user.assign_id(user_id);
        info!("event=user_insert module=repo status=ok user_id={user_id}");
        Ok(())
    }

    fn update(&self, user: &User) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        let user_id = user
            .user_id()
            .ok_or(RepoError::CannotUpdateUnpersisted { entity: ENTITY })?;

        let changed = self.handle.execute(
            "UPDATE users SET email = ?1, username = ?2 WHERE userId = ?3",
            &[
                Value::Text(user.email().to_string()),
                Value::Text(user.username().to_string()),
                Value::Integer(user_id),
            ],
        )?;
        ensure_changed(changed, user_id)?;
        info!("event=user_update module=repo status=ok user_id={user_id}");
        Ok(())
    }

    fn delete(&self, user: &User) -> RepoResult<()> {
        ensure_handle(self.handle)?;
        let user_id = user
            .user_id()
            .ok_or(RepoError::CannotDeleteUnpersisted { entity: ENTITY })?;

        let changed = self.handle.execute(
            "DELETE FROM users WHERE userId = ?1",
            &[Value::Integer(user_id)],
        )?;
        ensure_changed(changed, user_id)?;
        info!("event=user_delete module=repo status=ok user_id={user_id}");
        Ok(())
    }
}

fn ensure_changed(changed: usize, user_id: RecordId) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: ENTITY,
            key: user_id.to_string(),
        });
    }
    Ok(())
}

fn user_from_row(row: &Row) -> FieldResult<User> {
    let user_id = positive_identifier(&column(row, "userId")).in_field(ENTITY, "userId")?;
    User::new(user_id, column(row, "email"), column(row, "username"))
}
