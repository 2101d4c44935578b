// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role-based access control.
//!
//! ```text
//! token ──validate──▶ claims.iss ──▶ User ──role_id──▶ Role ──permissions──▶ [Permission]
//!                                                                   │
//!                                              name == required ? allow : deny
//! ```
//!
//! Every step reads the store; nothing is cached between requests. The reads
//! are independent, so a decision reflects whatever each lookup saw.

use std::sync::Arc;

use taskgate_core::{Collection, DocumentStore, User};
use tracing::{debug, warn};

use super::catalog::Catalog;
use super::claims::SessionClaims;
use super::context::AuthContext;
use super::permission::PermissionSet;
use super::token::SessionTokenService;
use crate::error::{ApiError, ApiResult};

/// Decides whether a session may perform an operation.
#[derive(Debug, Clone)]
pub struct RbacResolver {
    tokens: SessionTokenService,
    users: Collection<User>,
    catalog: Catalog,
}

impl RbacResolver {
    /// Creates a resolver reading from `store`.
    pub fn new(store: Arc<dyn DocumentStore>, tokens: SessionTokenService) -> Self {
        Self {
            tokens,
            users: Collection::new(store.clone()),
            catalog: Catalog::new(store),
        }
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &SessionTokenService {
        &self.tokens
    }

    /// Validates `token` and loads the user it names.
    pub async fn authenticate(&self, token: &str) -> ApiResult<(SessionClaims, User)> {
        let claims = self.tokens.validate(token)?;
        let user_id = claims.user_id().ok_or_else(|| {
            debug!("Session token issuer is not a user id");
            ApiError::invalid_session()
        })?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("user"))?;

        Ok((claims, user))
    }

    /// Allows the request iff the session's role holds `permission`.
    pub async fn authorize(&self, token: &str, permission: &str) -> ApiResult<AuthContext> {
        let (claims, user) = self.authenticate(token).await?;

        let role = self
            .catalog
            .find_role_by_id(user.role_id)
            .await?
            .ok_or_else(|| ApiError::not_found("role"))?;

        let granted: PermissionSet = self
            .catalog
            .list_permissions_by_ids(&role.permissions)
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();

        if !granted.contains(permission) {
            warn!(
                user_id = %user.id,
                role = %role.name,
                permission = permission,
                "Authorization denied"
            );
            return Err(ApiError::forbidden(permission));
        }

        debug!(user_id = %user.id, permission = permission, "Authorization granted");
        Ok(AuthContext::new(&user, &role, granted, claims))
    }
}
