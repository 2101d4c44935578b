// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session token issuance and validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use taskgate_core::ObjectId;
use tracing::debug;

use super::claims::SessionClaims;
use crate::error::{ApiError, ApiResult};

/// Default token lifetime (1 hour).
pub const DEFAULT_EXPIRATION_SECS: u64 = 3600;

/// Longest token lifetime the service will issue (365 days).
pub const MAX_EXPIRATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Algorithm used to sign new tokens.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted on validation. Anything outside the HMAC family is
/// rejected before the signature is checked.
pub const ACCEPTED_ALGORITHMS: &[Algorithm] = &[Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

// =============================================================================
// TokenConfig
// =============================================================================

/// Session token settings.
#[derive(Clone)]
pub struct TokenConfig {
    /// Signing key. Tokens cannot be issued or validated without one.
    pub secret: Option<String>,
    /// Token lifetime in seconds.
    pub expiration_secs: u64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl TokenConfig {
    /// Creates a configuration with the given key and default lifetime.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Sets the token lifetime.
    pub fn with_expiration_secs(mut self, secs: u64) -> Self {
        self.expiration_secs = secs;
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway_secs(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            leeway_secs: 0,
        }
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("expiration_secs", &self.expiration_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

// =============================================================================
// IssuedToken
// =============================================================================

/// A freshly signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded token.
    pub token: String,
    /// Claims the token carries.
    pub claims: SessionClaims,
}

impl IssuedToken {
    /// Returns the expiry time.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at().unwrap_or_else(Utc::now)
    }
}

// =============================================================================
// SessionTokenService
// =============================================================================

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and validates signed session tokens.
#[derive(Clone)]
pub struct SessionTokenService {
    keys: Option<Arc<Keys>>,
    validation: Arc<Validation>,
    expiration_secs: i64,
}

impl SessionTokenService {
    /// Creates a token service. A missing or empty key is accepted here and
    /// reported by [`issue`](Self::issue) and [`validate`](Self::validate).
    pub fn new(config: TokenConfig) -> Self {
        let keys = config
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|secret| {
                if secret.len() < 32 {
                    tracing::warn!("Session signing key is shorter than recommended (32 bytes)");
                }
                Arc::new(Keys {
                    encoding: EncodingKey::from_secret(secret.as_bytes()),
                    decoding: DecodingKey::from_secret(secret.as_bytes()),
                })
            });

        if config.expiration_secs > MAX_EXPIRATION_SECS {
            tracing::warn!(
                requested = config.expiration_secs,
                max = MAX_EXPIRATION_SECS,
                "Session token lifetime capped"
            );
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            keys,
            validation: Arc::new(validation),
            expiration_secs: config.expiration_secs.min(MAX_EXPIRATION_SECS) as i64,
        }
    }

    /// Returns `true` if a signing key is configured.
    pub fn has_key(&self) -> bool {
        self.keys.is_some()
    }

    /// Returns the token lifetime in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.expiration_secs
    }

    fn keys(&self) -> ApiResult<&Keys> {
        self.keys
            .as_deref()
            .ok_or_else(|| ApiError::configuration("Session signing key is not configured"))
    }

    /// Signs a new token for `user_id` carrying `role`.
    pub fn issue(&self, user_id: ObjectId, role: impl Into<String>) -> ApiResult<IssuedToken> {
        let claims = SessionClaims::new(user_id, role, self.expiration_secs);
        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Signs arbitrary claims.
    pub fn sign(&self, claims: &SessionClaims) -> ApiResult<String> {
        let keys = self.keys()?;
        encode(&Header::new(SIGNING_ALGORITHM), claims, &keys.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Malformed, tampered, wrongly signed and expired tokens all produce the
    /// same authentication error.
    pub fn validate(&self, token: &str) -> ApiResult<SessionClaims> {
        let keys = self.keys()?;
        decode::<SessionClaims>(token, &keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(reason = ?e.kind(), "Session token rejected");
                ApiError::invalid_session()
            })
    }
}

impl std::fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("has_key", &self.has_key())
            .field("algorithm", &SIGNING_ALGORITHM)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
