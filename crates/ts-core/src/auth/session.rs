//! Signed session tokens.
//!
//! A token is `base64url(claims-json).hex(hmac-sha256(claims-json))`,
//! signed with a server-side secret. The server verifies the signature and
//! expiry on every request; nothing about a session is stored client-side
//! beyond the token itself, and nothing server-side at all.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Session token errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Malformed session token")]
    Malformed,

    #[error("Invalid session token signature")]
    BadSignature,

    #[error("Session expired")]
    Expired,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub reporter_id: i64,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Creates claims for a reporter with the given time-to-live.
    pub fn new(reporter_id: i64, email: impl Into<String>, ttl: Duration) -> Self {
        Self {
            reporter_id,
            email: email.into(),
            expires_at: Utc::now() + ttl,
        }
    }
}

/// Signing keys for session tokens.
///
/// The secret comes from configuration; if none is supplied a random
/// secret is generated at startup, which invalidates outstanding tokens
/// on restart.
#[derive(Clone)]
pub struct SessionKeys {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl SessionKeys {
    /// Creates keys from a configured secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Creates keys with a freshly generated random secret.
    pub fn generate() -> Self {
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self { secret }
    }

    /// Issues a signed token for the given claims.
    pub fn issue(&self, claims: &SessionClaims) -> String {
        let payload = serde_json::to_vec(claims).expect("session claims serialize");
        let encoded = URL_SAFE_NO_PAD.encode(&payload);

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(&payload);
        let signature = hex::encode(mac.finalize().into_bytes());

        format!("{}.{}", encoded, signature)
    }

    /// Verifies a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let (encoded, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| SessionError::Malformed)?;
        let expected = hex::decode(signature).map_err(|_| SessionError::Malformed)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(&payload);
        mac.verify_slice(&expected)
            .map_err(|_| SessionError::BadSignature)?;

        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| SessionError::Malformed)?;

        if claims.expires_at <= Utc::now() {
            return Err(SessionError::Expired);
        }

        Ok(claims)
    }
}
