// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taskgate-api
//!
//! Authorization engine and HTTP API for taskgate.
//!
//! The [`auth`] module holds the engine: credential store, permission and
//! role catalog, bootstrap seeder, session token service and RBAC resolver.
//! The rest of the crate exposes it over axum: per-route guards, handlers,
//! error rendering and the server.
//!
//! ```text
//! request ─▶ Trace ─▶ Timeout ─▶ CORS ─▶ AuthorizeLayer(permission) ─▶ handler
//!                                              │
//!                                   RbacResolver::authorize
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;
pub mod tasks;

pub use auth::{
    AuthContext, BootstrapReport, BootstrapSeeder, Catalog, CredentialStore, NewAccount,
    PasswordHasher, PasswordParams, RbacResolver, SameSite, SessionCookie, SessionTokenService,
    TaskOperation, TokenConfig,
};
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use middleware::AuthorizeLayer;
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};
pub use tasks::{NewTask, TaskChanges, TaskService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
