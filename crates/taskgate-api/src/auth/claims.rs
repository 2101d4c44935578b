// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskgate_core::ObjectId;
use uuid::Uuid;

/// Claims carried by a session token.
///
/// The user identifier travels in `iss`. Claims are never persisted; a
/// token stays valid until `exp` whatever happens server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User identifier (hex).
    pub iss: String,

    /// Role label copied at issuance.
    pub role: String,

    /// Unique token identifier.
    pub jti: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims for `user_id` valid for `lifetime_secs` from now.
    pub fn new(user_id: ObjectId, role: impl Into<String>, lifetime_secs: i64) -> Self {
        Self::issued_at(user_id, role, Utc::now(), lifetime_secs)
    }

    /// Creates claims issued at `now`.
    pub fn issued_at(
        user_id: ObjectId,
        role: impl Into<String>,
        now: DateTime<Utc>,
        lifetime_secs: i64,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            iss: user_id.to_hex(),
            role: role.into(),
            jti: Uuid::now_v7().to_string(),
            iat,
            exp: iat.saturating_add(lifetime_secs),
        }
    }

    /// Parses the user identifier.
    pub fn user_id(&self) -> Option<ObjectId> {
        ObjectId::parse_str(&self.iss).ok()
    }

    /// Returns the expiration time.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issue time.
    pub fn issued_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns the configured lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.exp.saturating_sub(self.iat)
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
