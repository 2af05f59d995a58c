//! Access-token codec.
//!
//! Tokens are the opaque strings handed out after a successful lead
//! submission: a JSON payload (`email`, `issuedAt`, `exp`) run through
//! standard base64. The encoding is reversible and **unsigned** — any
//! holder of the string can decode and forge one. That is a deliberate
//! simulation limitation of the demo, not an oversight; a real deployment
//! would add an HMAC or asymmetric signature here.
//!
//! All functions are pure over their inputs: the codec never touches
//! storage or the system clock.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Decoded contents of an access token.
///
/// Wire keys are camelCase to stay decodable by (and from) the original
/// application's tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub email: String,
    /// Issue time, milliseconds since the Unix epoch.
    pub issued_at: u64,
    /// Expiry time, milliseconds since the Unix epoch. Always after
    /// `issued_at`.
    pub exp: u64,
}

/// Errors that can occur while decoding a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not valid base64: {0}")]
    Encoding(String),
    #[error("token payload is not a valid token structure: {0}")]
    Payload(String),
}

/// Encodes and decodes access tokens with a fixed time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCodec {
    ttl: Duration,
}

impl TokenCodec {
    /// TTL the original application hard-codes for demo tokens.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Build a token for `email` issued at `now_millis`, expiring one TTL
    /// later.
    pub fn issue(&self, email: &str, now_millis: u64) -> String {
        let payload = TokenPayload {
            email: email.to_string(),
            issued_at: now_millis,
            exp: now_millis + self.ttl.as_millis() as u64,
        };
        // TokenPayload serialization cannot fail: plain strings + integers.
        let json = serde_json::to_string(&payload).unwrap_or_default();
        BASE64.encode(json)
    }

    /// Reverse the encoding. Fails on anything that is not base64-wrapped
    /// JSON with the expected structure.
    pub fn decode(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let bytes = BASE64
            .decode(token.trim())
            .map_err(|err| TokenError::Encoding(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| TokenError::Payload(err.to_string()))
    }

    /// Whether `payload` has expired as of `now_millis`. A token is valid
    /// through its exact expiry instant.
    pub fn is_expired(&self, payload: &TokenPayload, now_millis: u64) -> bool {
        now_millis > payload.exp
    }
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_decode_round_trips() {
        let codec = TokenCodec::default();
        let token = codec.issue("jane@co.com", 1_000_000);

        let payload = codec.decode(&token).expect("token should decode");
        assert_eq!(payload.email, "jane@co.com");
        assert_eq!(payload.issued_at, 1_000_000);
        assert_eq!(payload.exp, 1_000_000 + 30 * 60 * 1_000);
    }

    #[test]
    fn decode_matches_original_wire_format() {
        // base64(JSON) with camelCase keys, exactly what the original
        // front-end produced via btoa(JSON.stringify(payload)).
        let raw = r#"{"email":"a@b.c","issuedAt":5,"exp":10}"#;
        let token = BASE64.encode(raw);

        let payload = TokenCodec::default().decode(&token).unwrap();
        assert_eq!(payload.email, "a@b.c");
        assert_eq!(payload.issued_at, 5);
        assert_eq!(payload.exp, 10);
    }

    #[test]
    fn decode_rejects_garbage() {
        let codec = TokenCodec::default();

        let err = codec.decode("!!not-base64!!").unwrap_err();
        assert!(matches!(err, TokenError::Encoding(_)));

        // Valid base64, but the payload is not a token.
        let err = codec.decode(&BASE64.encode("[1,2,3]")).unwrap_err();
        assert!(matches!(err, TokenError::Payload(_)));
    }

    #[test]
    fn expiry_is_monotonic() {
        let codec = TokenCodec::new(Duration::from_millis(100));
        let payload = codec.decode(&codec.issue("x@y.z", 1_000)).unwrap();

        // Fresh immediately after issuance, valid through the expiry
        // instant itself, expired strictly after.
        assert!(!codec.is_expired(&payload, 1_000));
        assert!(!codec.is_expired(&payload, 1_100));
        assert!(codec.is_expired(&payload, 1_101));
        assert!(codec.is_expired(&payload, 50_000));
    }

    #[test]
    fn exp_always_after_issued_at() {
        let codec = TokenCodec::new(Duration::from_secs(1));
        let payload = codec.decode(&codec.issue("x@y.z", 42)).unwrap();
        assert!(payload.exp > payload.issued_at);
    }
}
