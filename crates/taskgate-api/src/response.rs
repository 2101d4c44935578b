// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskgate_core::{Task, User};

use crate::auth::IssuedToken;

// =============================================================================
// Health
// =============================================================================

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Readiness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Status of a system component.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    /// A healthy component.
    pub fn up(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: true,
            message: None,
        }
    }

    /// An unhealthy component with a reason.
    pub fn down(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: false,
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Always "Login successful".
    pub message: String,
    /// The session token, also set as a cookie.
    pub token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: i64,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl LoginResponse {
    /// Builds the response for a freshly issued token.
    pub fn new(issued: &IssuedToken) -> Self {
        Self {
            message: "Login successful".to_string(),
            token: issued.token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: issued.claims.lifetime_secs(),
            expires_at: issued.expires_at(),
        }
    }
}

/// A bare `{"message": ...}` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// Identifier (hex).
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Normalized email.
    pub email: String,
    /// Role identifier (hex).
    pub role: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role_id.to_hex(),
        }
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// Public view of a task.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Identifier (hex).
    #[serde(rename = "_id")]
    pub id: String,
    /// Title.
    pub name: String,
    /// Description.
    pub description: String,
    /// Completion flag.
    pub status: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_hex(),
            name: task.name,
            description: task.description,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
