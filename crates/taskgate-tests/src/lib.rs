// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taskgate Integration Tests
//!
//! Integration tests for the taskgate service and the helpers they share.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Signing keys, accounts and pre-seeded stores
//!   - `harness`: [`TestApp`](common::harness::TestApp), an in-process server
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p taskgate-tests
//!
//! # Run a specific suite
//! cargo test -p taskgate-tests --test integration_store
//! cargo test -p taskgate-tests --test integration_auth
//! cargo test -p taskgate-tests --test integration_api
//! cargo test -p taskgate-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Store Tests (`integration_store.rs`)
//! - Typed collections over the in-memory store
//! - Unique fields, filters, connection lifecycle
//!
//! ### Auth Tests (`integration_auth.rs`)
//! - Bootstrap idempotence
//! - Credential verification
//! - Token signing, expiry and key mismatch
//! - RBAC decisions derived from stored roles
//!
//! ### API Tests (`integration_api.rs`)
//! - Register, login, current user, logout over HTTP
//! - Guarded task routes
//! - Error bodies and status codes
//!
//! ### Config Tests (`integration_config.rs`)
//! - YAML, TOML and JSON files
//! - Placeholders and environment overrides
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use taskgate_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::spawn().await;
//!     let cookie = app.signup_and_login(&ALICE).await;
//!     let response = app.get("/api/tasks", Some(&cookie)).await;
//!     assert_eq!(response.status, StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
    pub use axum::http::StatusCode;
}
