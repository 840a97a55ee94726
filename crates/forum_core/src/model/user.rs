//! User record.
//!
//! # Invariants
//! - `user_id` is `None` until storage assigns it, then immutable.
//! - `email` is non-empty and at most 128 characters after normalization.
//! - `username` is non-empty and at most 32 characters after normalization.

use super::{FieldResult, InField, RecordId};
use crate::validation::{bounded_text, optional_identifier, RawValue};
use serde::Serialize;

const ENTITY: &str = "user";

/// Forum member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    user_id: Option<RecordId>,
    email: String,
    username: String,
}

impl User {
    pub const EMAIL_MAX_CHARS: usize = 128;
    pub const USERNAME_MAX_CHARS: usize = 32;

    /// Builds a user from raw field values, validated in declared order:
    /// `user_id`, `email`, `username`.
    ///
    /// Pass `RawValue::Null` (or `None`) as `user_id` for a user that has not
    /// been inserted yet.
    pub fn new(
        user_id: impl Into<RawValue>,
        email: impl Into<RawValue>,
        username: impl Into<RawValue>,
    ) -> FieldResult<Self> {
        let user_id = optional_identifier(&user_id.into()).in_field(ENTITY, "userId")?;
        let mut user = Self {
            user_id,
            email: String::new(),
            username: String::new(),
        };
        user.set_email(email)?;
        user.set_username(username)?;
        Ok(user)
    }

    pub fn user_id(&self) -> Option<RecordId> {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_persisted(&self) -> bool {
        self.user_id.is_some()
    }

    /// Replaces the email; the record is left unchanged on rejection.
    pub fn set_email(&mut self, email: impl Into<RawValue>) -> FieldResult<()> {
        self.email =
            bounded_text(&email.into(), Self::EMAIL_MAX_CHARS).in_field(ENTITY, "email")?;
        Ok(())
    }

    /// Replaces the username; the record is left unchanged on rejection.
    pub fn set_username(&mut self, username: impl Into<RawValue>) -> FieldResult<()> {
        self.username = bounded_text(&username.into(), Self::USERNAME_MAX_CHARS)
            .in_field(ENTITY, "username")?;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, user_id: RecordId) {
        self.user_id = Some(user_id);
    }
}
