//! Core domain logic for the forum store: users, comments and votes.
//! This crate is the single source of truth for field invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod storage;
pub mod validation;

pub use config::{ConfigError, DatabaseConfig, ForumConfig, LoggingConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::comment::Comment;
pub use model::user::User;
pub use model::vote::Vote;
pub use model::{FieldError, FieldResult, RecordId};
pub use repo::comment_repo::CommentRepository;
pub use repo::user_repo::UserRepository;
pub use repo::vote_repo::VoteRepository;
pub use repo::{FindResult, RecordRepository, RepoError, RepoResult};
pub use storage::{Row, SqliteStorage, StorageError, StorageHandle, StorageResult};
pub use validation::{RawValue, ValidationError, ValidationResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
