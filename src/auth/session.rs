//! Session token handling
//!
//! Session tokens are signed HS256 tokens carrying the user id and the
//! user's uniquifier. The uniquifier scopes session validity: a token is
//! only honored while its embedded uniquifier matches the one stored on the
//! user row.

use crate::config::SecurityConfig;
use crate::core::models::User;
use crate::utils::error::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const ISSUER: &str = "cms-rs";

/// Session claims embedded in the signed token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: i32,
    /// Stable per-user identity token; must match the stored value
    pub uniquifier: String,
    /// Issued at timestamp
    pub iat: u64,
    /// Expiration timestamp
    pub exp: u64,
    /// Issuer
    pub iss: String,
}

/// Creates and verifies session tokens
#[derive(Clone)]
pub struct SessionHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for SessionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandler")
            .field("ttl_secs", &self.ttl_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionHandler {
    /// Create a session handler from the security configuration
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            ttl_secs: config.session_ttl_secs,
        }
    }

    /// Create a signed session token for a user
    pub fn create_token(&self, user: &User) -> Result<String> {
        let now = unix_now();
        let claims = SessionClaims {
            sub: user.id,
            uniquifier: user.uniquifier.clone(),
            iat: now,
            exp: now + self.ttl_secs,
            iss: ISSUER.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        debug!("Created session token for user {}", user.id);
        Ok(token)
    }

    /// Decode and verify a session token's signature, expiry and issuer
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
