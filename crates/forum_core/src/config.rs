//! Runtime configuration for the forum store.
//!
//! # Responsibility
//! - Describe database and logging settings loaded from a TOML file.
//! - Supply defaults for every field so an empty file is a valid config.
//!
//! # Invariants
//! - A config that passed [`ForumConfig::validate`] can be handed to
//!   `db::open_with_config` and `logging::init_logging` unchanged.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid config value: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path; `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Rolling file log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace|debug|info|warn|error.
    pub level: String,
    /// Absolute directory for log files; logging stays off when unset.
    pub dir: Option<PathBuf>,
    pub max_file_size_bytes: u64,
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
            max_file_size_bytes: 10 * 1024 * 1024,
            max_files: 5,
        }
    }
}

impl ForumConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        crate::logging::normalize_level(&self.logging.level).map_err(ConfigError::Invalid)?;
        if self.logging.max_file_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "logging.max_file_size_bytes must be greater than zero".to_string(),
            ));
        }
        if self.logging.max_files == 0 {
            return Err(ConfigError::Invalid(
                "logging.max_files must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "logging.dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ForumConfig};
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ForumConfig::from_toml_str("").unwrap();
        assert_eq!(config, ForumConfig::default());
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ForumConfig::from_toml_str(
            r#"
            [database]
            path = "/tmp/forum.db"

            [logging]
            level = "WARN"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/forum.db")));
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = ForumConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("loud")));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = ForumConfig::from_toml_str("[logging]\ndir = \"logs\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("absolute")));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ForumConfig::from_toml_str("[database\npath = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
