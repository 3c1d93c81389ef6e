//! Core runtime configuration.
//!
//! # Responsibility
//! - Declare the tunables hosts may override (logging, storage, pacing).
//! - Parse and validate JSON configuration documents.
//!
//! # Invariants
//! - A validated config has a positive session ttl and a non-empty storage
//!   key prefix.

use crate::logging::default_log_level;
use crate::session::{session_ttl, DEFAULT_SESSION_TTL_HOURS};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_RENDER_DELAY_MS: u64 = 300;
const DEFAULT_STORAGE_KEY_PREFIX: &str = "journalEntries";

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidSessionTtl(i64),
    EmptyStorageKeyPrefix,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::InvalidSessionTtl(hours) => {
                write!(f, "session_ttl_hours must be positive and in range, got {hours}")
            }
            Self::EmptyStorageKeyPrefix => write!(f, "storage_key_prefix cannot be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Host-supplied configuration. Every field is optional in the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalConfig {
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// SQLite storage file. In-memory storage when unset.
    pub db_path: Option<PathBuf>,
    pub session_ttl_hours: i64,
    pub render_delay_ms: u64,
    pub storage_key_prefix: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            log_dir: None,
            db_path: None,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            render_delay_ms: DEFAULT_RENDER_DELAY_MS,
            storage_key_prefix: DEFAULT_STORAGE_KEY_PREFIX.to_string(),
        }
    }
}

impl JournalConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if session_ttl(self.session_ttl_hours).is_none() {
            return Err(ConfigError::InvalidSessionTtl(self.session_ttl_hours));
        }
        if self.storage_key_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKeyPrefix);
        }
        Ok(())
    }

    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn render_delay(&self) -> Duration {
        Duration::from_millis(self.render_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, JournalConfig};
    use crate::logging::default_log_level;
    use std::time::Duration;

    #[test]
    fn empty_document_uses_defaults() {
        let config = JournalConfig::from_json("{}").unwrap();
        assert_eq!(config, JournalConfig::default());
        assert_eq!(config.render_delay(), Duration::from_millis(300));
        assert_eq!(config.storage_key_prefix, "journalEntries");
        assert_eq!(config.effective_log_level(), default_log_level());
    }

    #[test]
    fn overrides_and_validation() {
        let config =
            JournalConfig::from_json(r#"{"log_level":"warn","session_ttl_hours":2}"#).unwrap();
        assert_eq!(config.effective_log_level(), "warn");
        assert_eq!(config.session_ttl_hours, 2);

        let err = JournalConfig::from_json(r#"{"session_ttl_hours":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSessionTtl(0)));
        let err = JournalConfig::from_json(r#"{"session_ttl_hours":9223372036854775807}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSessionTtl(i64::MAX)));
        let err = JournalConfig::from_json(r#"{"storage_key_prefix":" "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyStorageKeyPrefix));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            JournalConfig::from_json(r#"{"render_delay":5}"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
