// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The authorization engine.
//!
//! - Credential store: registration and password verification
//! - Catalog: lookups over persisted permissions and roles
//! - Bootstrap seeder: idempotent catalog seeding
//! - Session tokens: signed, time-bounded claims and the session cookie
//! - RBAC resolver: user → role → permission checks

pub mod bootstrap;
mod catalog;
mod claims;
mod context;
mod cookie;
mod credentials;
pub mod password;
pub mod permission;
mod rbac;
mod token;

pub use bootstrap::{BootstrapReport, BootstrapSeeder, ADMIN_ROLE, USER_ROLE};
pub use catalog::Catalog;
pub use claims::SessionClaims;
pub use context::AuthContext;
pub use cookie::{SameSite, SessionCookie, DEFAULT_COOKIE_NAME};
pub use credentials::{normalize_email, CredentialStore, NewAccount};
pub use password::{PasswordHasher, PasswordParams};
pub use permission::{PermissionSet, TaskOperation};
pub use rbac::RbacResolver;
pub use token::{IssuedToken, SessionTokenService, TokenConfig};
