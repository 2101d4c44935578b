// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthorizeLayer`]: per-route session validation and permission check

mod authorize;

pub use authorize::{AuthorizeLayer, AuthorizeMiddleware};
