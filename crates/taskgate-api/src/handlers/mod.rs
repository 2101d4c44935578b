// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness and readiness
//! - [`auth`]: registration, login, current user, logout
//! - [`tasks`]: guarded task CRUD

mod auth;
mod health;
mod tasks;

pub use auth::*;
pub use health::*;
pub use tasks::*;
