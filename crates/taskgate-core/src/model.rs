// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persisted records.
//!
//! Each record type implements [`Model`], which binds it to a collection
//! name and exposes its `_id`. Records carry [`ObjectId::nil`] until the
//! store assigns an identifier on insert; a nil id is omitted when the
//! record is serialized.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::id::ObjectId;

// =============================================================================
// Model
// =============================================================================

/// A record stored in a named collection.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Logical collection name.
    const COLLECTION: &'static str;

    /// Returns the record identifier.
    fn id(&self) -> ObjectId;

    /// Sets the record identifier.
    fn set_id(&mut self, id: ObjectId);
}

macro_rules! impl_model {
    ($ty:ty, $collection:expr) => {
        impl Model for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> ObjectId {
                self.id
            }

            fn set_id(&mut self, id: ObjectId) {
                self.id = id;
            }
        }
    };
}

// =============================================================================
// User
// =============================================================================

/// An account that can log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "ObjectId::is_nil")]
    pub id: ObjectId,
    /// Display name.
    pub name: String,
    /// Login email, unique across users.
    pub email: String,
    /// Password hash in PHC string form.
    pub password: PasswordHash,
    /// The single role held by this user.
    #[serde(default, skip_serializing_if = "ObjectId::is_nil")]
    pub role_id: ObjectId,
}

impl_model!(User, "users");

impl User {
    /// Creates an unsaved user.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: PasswordHash,
        role_id: ObjectId,
    ) -> Self {
        Self {
            id: ObjectId::nil(),
            name: name.into(),
            email: email.into(),
            password,
            role_id,
        }
    }
}

/// Opaque password hash. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no hash is stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

// =============================================================================
// Permission
// =============================================================================

/// A named capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "ObjectId::is_nil")]
    pub id: ObjectId,
    /// Unique name, e.g. `create_task`.
    pub name: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
}

impl_model!(Permission, "permissions");

impl Permission {
    /// Creates an unsaved permission.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: ObjectId::nil(),
            name: name.into(),
            description: description.into(),
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// A named set of permission references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "ObjectId::is_nil")]
    pub id: ObjectId,
    /// Unique name, e.g. `admin`.
    pub name: String,
    /// Identifiers of the permissions granted by this role.
    #[serde(default)]
    pub permissions: Vec<ObjectId>,
}

impl_model!(Role, "roles");

impl Role {
    /// Creates an unsaved role.
    pub fn new(name: impl Into<String>, permissions: Vec<ObjectId>) -> Self {
        Self {
            id: ObjectId::nil(),
            name: name.into(),
            permissions,
        }
    }
}

// =============================================================================
// Task
// =============================================================================

/// The protected resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "ObjectId::is_nil")]
    pub id: ObjectId,
    /// Short title.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Completion flag.
    #[serde(default)]
    pub status: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl_model!(Task, "tasks");

impl Task {
    /// Creates an unsaved task stamped with the current time.
    pub fn new(name: impl Into<String>, description: impl Into<String>, status: bool) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::nil(),
            name: name.into(),
            description: description.into(),
            status,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsaved_record_omits_id() {
        let perm = Permission::new("view_task", "Allows viewing tasks");
        let value = serde_json::to_value(&perm).unwrap();
        assert!(value.get("_id").is_none());
        assert_eq!(value["name"], "view_task");
    }

    #[test]
    fn test_saved_record_uses_underscore_id() {
        let mut role = Role::new("user", vec![ObjectId::new()]);
        let id = ObjectId::new();
        role.set_id(id);

        let value = serde_json::to_value(&role).unwrap();
        assert_eq!(value["_id"], id.to_hex());

        let back: Role = serde_json::from_value(value).unwrap();
        assert_eq!(back, role);
    }

    #[test]
    fn test_password_hash_is_redacted() {
        let user = User::new("Alice", "a@x.com", PasswordHash::new("$argon2id$secret"), ObjectId::nil());
        let debug = format!("{:?}", user);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(User::COLLECTION, "users");
        assert_eq!(Role::COLLECTION, "roles");
        assert_eq!(Permission::COLLECTION, "permissions");
        assert_eq!(Task::COLLECTION, "tasks");
    }
}
