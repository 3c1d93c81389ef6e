//! Reversible text masking for journal content at rest.
//!
//! # Responsibility
//! - Derive the per-session storage key from the user's credential.
//! - Mask and unmask strings with a cycled-key XOR plus base64.
//!
//! # Invariants
//! - `deobfuscate(obfuscate(x, k), k) == x` for every string `x`.
//! - Unmasking never fails: undecodable input is returned unchanged.
//! - The storage key salt differs from the verification digest salt.
//!
//! # Limitations
//! This is obfuscation, not encryption. There is no authentication tag and a
//! single known plaintext reveals the key stream.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::warn;
use sha2::{Digest, Sha256};
use std::fmt::{Debug, Formatter};

const STORAGE_KEY_SALT: &str = "journal_encryption_salt_2024";
const VERIFICATION_SALT: &str = "journal_app_salt_2024";
const STORAGE_KEY_HEX_CHARS: usize = 32;

/// Session-scoped masking key.
#[derive(Clone, PartialEq, Eq)]
pub struct ObfuscationKey(Vec<u8>);

impl ObfuscationKey {
    /// Derives the storage key: first 32 hex chars of `SHA-256(credential + salt)`.
    pub fn derive(credential: &str) -> Self {
        let digest = salted_hex_digest(credential, STORAGE_KEY_SALT);
        Self(digest[..STORAGE_KEY_HEX_CHARS].as_bytes().to_vec())
    }

    /// Wraps raw key material. Returns `None` for an empty key.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            None
        } else {
            Some(Self(bytes))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for ObfuscationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObfuscationKey(<{} bytes>)", self.0.len())
    }
}

/// Verification digest stored in the user registry. Full hex SHA-256.
pub fn credential_digest(credential: &str) -> String {
    salted_hex_digest(credential, VERIFICATION_SALT)
}

/// Masks `plaintext`. Empty input is returned as-is.
pub fn obfuscate(plaintext: &str, key: &ObfuscationKey) -> String {
    if plaintext.is_empty() {
        return String::new();
    }
    STANDARD.encode(xor_with_key(plaintext.as_bytes(), key))
}

/// Unmasks `ciphertext`, falling back to the input on any decode failure.
pub fn deobfuscate(ciphertext: &str, key: &ObfuscationKey) -> String {
    try_deobfuscate(ciphertext, key).unwrap_or_else(|| {
        warn!(
            "event=deobfuscate module=obfuscation status=fallback input_len={}",
            ciphertext.len()
        );
        ciphertext.to_string()
    })
}

/// Strict variant of [`deobfuscate`]. Returns `None` when input is not a
/// masked string under `key`.
pub fn try_deobfuscate(ciphertext: &str, key: &ObfuscationKey) -> Option<String> {
    if ciphertext.is_empty() {
        return Some(String::new());
    }
    let decoded = STANDARD.decode(ciphertext).ok()?;
    String::from_utf8(xor_with_key(&decoded, key)).ok()
}

fn xor_with_key(input: &[u8], key: &ObfuscationKey) -> Vec<u8> {
    input
        .iter()
        .zip(key.0.iter().cycle())
        .map(|(byte, key_byte)| byte ^ key_byte)
        .collect()
}

fn salted_hex_digest(credential: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(credential.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::{credential_digest, deobfuscate, obfuscate, try_deobfuscate, ObfuscationKey};

    #[test]
    fn round_trips_unicode_text() {
        let key = ObfuscationKey::derive("Secret123");
        for text in ["ok day", "ünïcödé 😊 journal", "a", "#work"] {
            let masked = obfuscate(text, &key);
            assert_ne!(masked, text);
            assert_eq!(deobfuscate(&masked, &key), text);
        }
    }

    #[test]
    fn empty_text_passes_through() {
        let key = ObfuscationKey::derive("Secret123");
        assert_eq!(obfuscate("", &key), "");
        assert_eq!(deobfuscate("", &key), "");
    }

    #[test]
    fn derived_key_is_32_hex_chars_and_stable() {
        let first = ObfuscationKey::derive("Secret123");
        let second = ObfuscationKey::derive("Secret123");
        assert_eq!(first, second);
        assert_eq!(first.as_bytes().len(), 32);
        assert!(first.as_bytes().iter().all(u8::is_ascii_hexdigit));
        assert_ne!(first, ObfuscationKey::derive("Secret124"));
    }

    #[test]
    fn storage_key_differs_from_verification_digest() {
        let key = ObfuscationKey::derive("Secret123");
        let digest = credential_digest("Secret123");
        assert_eq!(digest.len(), 64);
        assert!(!digest.as_bytes().starts_with(key.as_bytes()));
    }

    #[test]
    fn undecodable_input_is_returned_unchanged() {
        let key = ObfuscationKey::derive("Secret123");
        assert_eq!(deobfuscate("not base64 !!", &key), "not base64 !!");
        assert_eq!(try_deobfuscate("not base64 !!", &key), None);
    }

    #[test]
    fn foreign_key_never_panics() {
        let owner = ObfuscationKey::derive("owner");
        let other = ObfuscationKey::derive("intruder");
        let masked = obfuscate("dear diary, today was long", &owner);
        let result = deobfuscate(&masked, &other);
        assert!(!result.is_empty());
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(ObfuscationKey::from_bytes(Vec::new()).is_none());
        assert!(ObfuscationKey::from_bytes(b"k".to_vec()).is_some());
    }
}
