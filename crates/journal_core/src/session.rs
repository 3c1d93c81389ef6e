//! Signed-in session record.
//!
//! # Responsibility
//! - Persist `{userId, email, createdAt, expiresAt}` under the `session` key.
//! - Discard expired or unreadable records on load.
//!
//! # Invariants
//! - `expires_at = created_at + ttl` with `ttl > 0`.
//! - `load` never returns an expired record.

use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, Duration, FixedOffset};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const SESSION_STORAGE_KEY: &str = "session";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub type UserId = Uuid;

#[derive(Debug)]
pub enum SessionError {
    InvalidEmail(String),
    InvalidTtl(i64),
    Storage(StorageError),
    Serialize(serde_json::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidTtl(hours) => {
                write!(f, "session ttl must be positive and representable, got {hours}h")
            }
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to encode session: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::InvalidEmail(_) | Self::InvalidTtl(_) => None,
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: UserId,
    pub email: String,
    pub created_at: DateTime<FixedOffset>,
    pub expires_at: DateTime<FixedOffset>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<FixedOffset>) -> bool {
        self.expires_at <= now
    }
}

/// Session lifetime for `hours`, or `None` when it is not positive or does
/// not fit a `chrono` duration.
pub fn session_ttl(hours: i64) -> Option<Duration> {
    if hours <= 0 {
        return None;
    }
    Duration::try_hours(hours)
}

/// Returns `true` for `local@domain.tld` shaped addresses.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Session persistence over the shared key-value backend.
pub struct SessionStore<S: KeyValueStore> {
    storage: S,
    ttl: Duration,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Creates a store with the default 24-hour lifetime.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_ttl_hours(storage: S, hours: i64) -> Result<Self, SessionError> {
        let ttl = session_ttl(hours).ok_or(SessionError::InvalidTtl(hours))?;
        Ok(Self { storage, ttl })
    }

    /// Writes a fresh session for an authenticated user.
    pub fn start(
        &self,
        user_id: UserId,
        email: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<SessionRecord, SessionError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(SessionError::InvalidEmail(email.to_string()));
        }
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(SessionError::InvalidTtl(self.ttl.num_hours()))?;
        let record = SessionRecord {
            user_id,
            email: email.to_string(),
            created_at: now,
            expires_at,
        };
        self.storage
            .set(SESSION_STORAGE_KEY, &serde_json::to_string(&record)?)?;
        info!(
            "event=session_start module=session status=ok user_id={} expires_at={}",
            record.user_id,
            record.expires_at.to_rfc3339()
        );
        Ok(record)
    }

    /// Returns the live session, discarding missing, corrupt or expired ones.
    pub fn load(&self, now: DateTime<FixedOffset>) -> Option<SessionRecord> {
        let raw = match self.storage.get(SESSION_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("event=session_load module=session status=error error={err}");
                return None;
            }
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) if !record.is_expired(now) => Some(record),
            Ok(record) => {
                info!(
                    "event=session_load module=session status=expired user_id={}",
                    record.user_id
                );
                self.discard();
                None
            }
            Err(err) => {
                warn!("event=session_load module=session status=corrupt error={err}");
                self.discard();
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.storage.remove(SESSION_STORAGE_KEY)?;
        Ok(())
    }

    fn discard(&self) {
        if let Err(err) = self.storage.remove(SESSION_STORAGE_KEY) {
            warn!("event=session_discard module=session status=error error={err}");
        }
    }
}
