use chrono::{DateTime, Duration, FixedOffset, Utc};
use journal_core::session::SESSION_STORAGE_KEY;
use journal_core::{KeyValueStore, MemoryKeyValueStore, SessionError, SessionStore};
use uuid::Uuid;

fn at(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap()
}

#[test]
fn session_expires_after_ttl() {
    let storage = MemoryKeyValueStore::new();
    let sessions = SessionStore::new(&storage);
    let start = at("2024-03-15T08:00:00+00:00");
    let user_id = Uuid::new_v4();

    let record = sessions.start(user_id, " me@example.com ", start).unwrap();
    assert_eq!(record.email, "me@example.com");
    assert_eq!(record.expires_at, start + Duration::hours(24));

    let live = sessions.load(start + Duration::hours(23)).unwrap();
    assert_eq!(live.user_id, user_id);

    assert!(sessions.load(start + Duration::hours(24)).is_none());
    // Expired records are removed from storage.
    assert_eq!(storage.get(SESSION_STORAGE_KEY).unwrap(), None);
}

#[test]
fn custom_ttl_must_be_positive_and_in_range() {
    let storage = MemoryKeyValueStore::new();
    assert!(matches!(
        SessionStore::with_ttl_hours(&storage, 0),
        Err(SessionError::InvalidTtl(0))
    ));

    assert!(matches!(
        SessionStore::with_ttl_hours(&storage, i64::MAX),
        Err(SessionError::InvalidTtl(i64::MAX))
    ));

    let sessions = SessionStore::with_ttl_hours(&storage, 2).unwrap();
    let start = at("2024-03-15T08:00:00+00:00");
    sessions.start(Uuid::new_v4(), "a@b.io", start).unwrap();
    assert!(sessions.load(start + Duration::hours(3)).is_none());
}

#[test]
fn invalid_email_is_rejected_without_writing() {
    let storage = MemoryKeyValueStore::new();
    let sessions = SessionStore::new(&storage);
    let err = sessions
        .start(Uuid::new_v4(), "not-an-email", at("2024-03-15T08:00:00+00:00"))
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidEmail(_)));
    assert!(storage.is_empty());
}

#[test]
fn corrupt_session_is_discarded() {
    let storage = MemoryKeyValueStore::new();
    storage.set(SESSION_STORAGE_KEY, "{\"userId\": 5}").unwrap();

    let sessions = SessionStore::new(&storage);
    assert!(sessions.load(at("2024-03-15T08:00:00+00:00")).is_none());
    assert!(storage.is_empty());
}

#[test]
fn stored_record_uses_camel_case_fields() {
    let storage = MemoryKeyValueStore::new();
    let sessions = SessionStore::new(&storage);
    sessions
        .start(Uuid::new_v4(), "me@example.com", at("2024-03-15T08:00:00+00:00"))
        .unwrap();

    let raw = storage.get(SESSION_STORAGE_KEY).unwrap().unwrap();
    for field in ["userId", "email", "createdAt", "expiresAt"] {
        assert!(raw.contains(field), "missing {field}");
    }
    sessions.clear().unwrap();
    assert!(storage.is_empty());
}

#[test]
fn expiry_past_the_calendar_range_is_an_error() {
    let storage = MemoryKeyValueStore::new();
    let sessions = SessionStore::new(&storage);
    let near_end = DateTime::<Utc>::MAX_UTC.fixed_offset() - Duration::hours(1);

    let err = sessions
        .start(Uuid::new_v4(), "me@example.com", near_end)
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidTtl(24)));
    assert!(storage.is_empty());
}
