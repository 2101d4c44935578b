// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use serde::Serialize;
use taskgate_core::{ObjectId, Role, User};
use uuid::Uuid;

use super::claims::SessionClaims;
use super::permission::PermissionSet;

/// The caller of an authorized request.
///
/// Built by the RBAC resolver from persisted state after a successful check
/// and attached to the request by the guard.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    /// User identifier.
    pub user_id: ObjectId,
    /// User display name.
    pub user_name: String,
    /// Role identifier.
    pub role_id: ObjectId,
    /// Role name.
    pub role_name: String,
    /// Permission names held through the role.
    pub permissions: PermissionSet,
    /// Claims of the presented token.
    #[serde(skip)]
    pub claims: SessionClaims,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context from resolved records.
    pub fn new(user: &User, role: &Role, permissions: PermissionSet, claims: SessionClaims) -> Self {
        Self {
            user_id: user.id,
            user_name: user.name.clone(),
            role_id: role.id,
            role_name: role.name.clone(),
            permissions,
            claims,
            request_id: Uuid::now_v7(),
        }
    }

    /// Returns `true` if the caller holds `permission`.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the caller's role is `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.role_name == role
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskgate_core::PasswordHash;

    #[test]
    fn test_context_from_records() {
        let mut role = Role::new("user", Vec::new());
        role.id = ObjectId::new();
        let mut user = User::new("Alice", "a@x.com", PasswordHash::new("h"), role.id);
        user.id = ObjectId::new();
        let claims = SessionClaims::new(user.id, role.id.to_hex(), 60);
        let permissions: PermissionSet = ["view_task"].into_iter().collect();

        let ctx = AuthContext::new(&user, &role, permissions, claims);

        assert_eq!(ctx.user_id, user.id);
        assert!(ctx.has_role("user"));
        assert!(ctx.has_permission("view_task"));
        assert!(!ctx.has_permission("create_task"));

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["permissions"], serde_json::json!(["view_task"]));
        assert!(json.get("claims").is_none());
    }
}
