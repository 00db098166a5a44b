//! Signed principal tokens.
//!
//! The form service does not manage accounts itself; an authenticated caller
//! is identified by an opaque principal id carried in a bearer token. Tokens
//! are produced by [`TokenSigner::issue`] and checked by [`TokenSigner::verify`].
//!
//! ## Token format
//!
//! `principal:timestamp:signature`, where `timestamp` is the issue time in
//! seconds since the epoch encoded in base62, and `signature` is an
//! HMAC-SHA256 over `principal:timestamp` keyed by `formcraft.principal:secret`, encoded as
//! URL-safe base64 without padding.
//!
//! ## Key Rotation
//!
//! Fallback keys (`secret_key_fallbacks` in the settings) are tried in order
//! after the primary key when verifying, so a secret can be rotated without
//! invalidating tokens that are still in flight. Tokens are always issued
//! with the primary key.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{FormcraftError, FormcraftResult};
use crate::settings::Settings;

type HmacSha256 = Hmac<Sha256>;

const SEP: char = ':';

/// Mixed into the HMAC key so principal signatures are never valid elsewhere.
const SALT: &str = "formcraft.principal";

/// Issues and verifies timestamped principal tokens.
///
/// # Examples
///
/// ```
/// use formcraft_core::signing::TokenSigner;
///
/// let signer = TokenSigner::new("my-secret-key");
/// let token = signer.issue("user_42").unwrap();
/// assert_eq!(signer.verify(&token, Some(60)).unwrap(), "user_42");
/// ```
#[derive(Debug, Clone)]
pub struct TokenSigner {
    key: String,
    fallback_keys: Vec<String>,
}

impl TokenSigner {
    /// Creates a new signer with the given secret key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fallback_keys: Vec::new(),
        }
    }

    /// Creates a signer from `secret_key` and `secret_key_fallbacks`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.secret_key.clone())
            .with_fallback_keys(settings.secret_key_fallbacks.clone())
    }

    /// Sets fallback keys for key rotation.
    #[must_use]
    pub fn with_fallback_keys(mut self, keys: Vec<String>) -> Self {
        self.fallback_keys = keys;
        self
    }

    /// Issues a token for `principal`, stamped with the current time.
    pub fn issue(&self, principal: &str) -> FormcraftResult<String> {
        self.issue_at(principal, now_secs())
    }

    /// Issues a token for `principal` stamped with `issued_at` (seconds since epoch).
    pub fn issue_at(&self, principal: &str, issued_at: u64) -> FormcraftResult<String> {
        if principal.is_empty() {
            return Err(FormcraftError::BadRequest(
                "Principal must not be empty".to_string(),
            ));
        }
        let payload = format!("{principal}{SEP}{}", base62_encode(issued_at));
        let sig = self.make_signature(&payload, &self.key)?;
        Ok(format!("{payload}{SEP}{sig}"))
    }

    /// Verifies a token and returns the principal it was issued for.
    ///
    /// With `max_age` set, tokens older than that many seconds are rejected.
    pub fn verify(&self, token: &str, max_age: Option<u64>) -> FormcraftResult<String> {
        self.verify_at(token, max_age, now_secs())
    }

    /// Verifies a token as of `now` (seconds since epoch).
    pub fn verify_at(
        &self,
        token: &str,
        max_age: Option<u64>,
        now: u64,
    ) -> FormcraftResult<String> {
        let (payload, sig) = token
            .rsplit_once(SEP)
            .ok_or_else(|| unauthorized("Malformed token"))?;

        if !self.signature_matches(payload, sig)? {
            return Err(unauthorized("Token signature verification failed"));
        }

        let (principal, timestamp) = payload
            .rsplit_once(SEP)
            .ok_or_else(|| unauthorized("Token carries no timestamp"))?;
        if principal.is_empty() {
            return Err(unauthorized("Token carries no principal"));
        }

        if let Some(max_age) = max_age {
            let issued_at = base62_decode(timestamp)?;
            if now.saturating_sub(issued_at) > max_age {
                return Err(unauthorized("Token has expired"));
            }
        }

        Ok(principal.to_string())
    }

    fn signature_matches(&self, payload: &str, sig: &str) -> FormcraftResult<bool> {
        for key in std::iter::once(&self.key).chain(&self.fallback_keys) {
            if constant_time_eq(sig, &self.make_signature(payload, key)?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn make_signature(&self, value: &str, key: &str) -> FormcraftResult<String> {
        let salted_key = format!("{SALT}{SEP}{key}");
        let mut mac = HmacSha256::new_from_slice(salted_key.as_bytes())
            .map_err(|e| FormcraftError::ConfigurationError(format!("Invalid signing key: {e}")))?;
        mac.update(value.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

// ============================================================
// Helpers
// ============================================================

fn unauthorized(msg: &str) -> FormcraftError {
    FormcraftError::Unauthorized(msg.to_string())
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Base62 character set (digits + uppercase + lowercase).
const BASE62_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

fn base62_encode(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut chars = Vec::new();
    while n > 0 {
        chars.push(char::from(BASE62_CHARS[(n % 62) as usize]));
        n /= 62;
    }
    chars.iter().rev().collect()
}

fn base62_decode(s: &str) -> FormcraftResult<u64> {
    if s.is_empty() {
        return Err(unauthorized("Empty token timestamp"));
    }
    let mut result: u64 = 0;
    for c in s.bytes() {
        let digit = match c {
            b'0'..=b'9' => u64::from(c - b'0'),
            b'A'..=b'Z' => u64::from(c - b'A') + 10,
            b'a'..=b'z' => u64::from(c - b'a') + 36,
            _ => return Err(unauthorized("Invalid token timestamp")),
        };
        result = result
            .checked_mul(62)
            .and_then(|r| r.checked_add(digit))
            .ok_or_else(|| unauthorized("Token timestamp overflow"))?;
    }
    Ok(result)
}

/// Constant-time string comparison.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_issue_verify() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.issue_at("user_1", NOW).unwrap();
        assert!(token.starts_with("user_1:"));
        assert_eq!(signer.verify_at(&token, Some(60), NOW + 10).unwrap(), "user_1");
    }

    #[test]
    fn test_principal_with_separator() {
        let signer = TokenSigner::new("k");
        let token = signer.issue_at("org:team:alice", NOW).unwrap();
        assert_eq!(signer.verify_at(&token, None, NOW).unwrap(), "org:team:alice");
    }

    #[test]
    fn test_empty_principal_rejected() {
        let signer = TokenSigner::new("k");
        assert!(matches!(
            signer.issue_at("", NOW),
            Err(FormcraftError::BadRequest(_))
        ));
    }

    #[test]
    fn test_tampered_principal() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.issue_at("alice", NOW).unwrap();
        let forged = token.replacen("alice", "mallory", 1);
        let err = signer.verify_at(&forged, None, NOW).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_wrong_key() {
        let token = TokenSigner::new("key-a").issue_at("alice", NOW).unwrap();
        assert!(TokenSigner::new("key-b").verify_at(&token, None, NOW).is_err());
    }

    #[test]
    fn test_from_settings_accepts_rotated_key() {
        let token = TokenSigner::new("old-key").issue_at("alice", NOW).unwrap();
        let settings = Settings {
            secret_key: "new-key".into(),
            secret_key_fallbacks: vec!["old-key".into()],
            ..Settings::default()
        };
        let signer = TokenSigner::from_settings(&settings);
        assert_eq!(signer.verify_at(&token, None, NOW).unwrap(), "alice");

        let fresh = signer.issue_at("bob", NOW).unwrap();
        assert!(TokenSigner::new("old-key").verify_at(&fresh, None, NOW).is_err());
        assert!(TokenSigner::new("new-key").verify_at(&fresh, None, NOW).is_ok());
    }

    #[test]
    fn test_fallback_key() {
        let old = TokenSigner::new("old-key");
        let token = old.issue_at("alice", NOW).unwrap();

        let rotated = TokenSigner::new("new-key").with_fallback_keys(vec!["old-key".to_string()]);
        assert_eq!(rotated.verify_at(&token, None, NOW).unwrap(), "alice");
    }

    #[test]
    fn test_expired() {
        let signer = TokenSigner::new("k");
        let token = signer.issue_at("alice", NOW).unwrap();
        assert!(signer.verify_at(&token, Some(100), NOW + 100).is_ok());
        let err = signer.verify_at(&token, Some(100), NOW + 101).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_no_max_age_never_expires() {
        let signer = TokenSigner::new("k");
        let token = signer.issue_at("alice", 1).unwrap();
        assert!(signer.verify_at(&token, None, NOW).is_ok());
    }

    #[test]
    fn test_malformed() {
        let signer = TokenSigner::new("k");
        assert!(signer.verify("no-separator", None).is_err());
        assert!(signer.verify("", None).is_err());
    }

    #[test]
    fn test_issue_uses_clock() {
        let signer = TokenSigner::new("k");
        let token = signer.issue("alice").unwrap();
        assert_eq!(signer.verify(&token, Some(60)).unwrap(), "alice");
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_base62() {
        assert_eq!(base62_encode(0), "0");
        assert_eq!(base62_encode(61), "z");
        assert_eq!(base62_encode(62), "10");
        assert_eq!(base62_decode(&base62_encode(NOW)).unwrap(), NOW);
        assert!(base62_decode("!").is_err());
        assert!(base62_decode("").is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
    }
}
