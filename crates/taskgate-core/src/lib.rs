// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taskgate-core
//!
//! Core types for the taskgate task service.
//!
//! This crate provides:
//!
//! - [`ObjectId`]: 12-byte document identifiers with a hex wire form
//! - [`model`]: persisted records (`User`, `Permission`, `Role`, `Task`)
//! - [`store`]: the document store abstraction and its backends
//! - [`error`]: store and identifier errors
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              Collection<T: Model>             │
//! │        (typed access, serde conversion)       │
//! └───────────────────────┬───────────────────────┘
//!                         │
//!              ┌──────────▼──────────┐
//!              │  dyn DocumentStore  │
//!              └──────────┬──────────┘
//!                ┌────────┴────────┐
//!                ▼                 ▼
//!         ┌────────────┐   ┌──────────────┐
//!         │ MemoryStore│   │ RocksDbStore │
//!         └────────────┘   └──────────────┘
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod id;
pub mod model;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{IdError, StoreError, StoreResult};
pub use id::ObjectId;
pub use model::{Model, PasswordHash, Permission, Role, Task, User};
pub use store::{Collection, Document, DocumentStore, Filter, MemoryStore};

#[cfg(feature = "rocksdb-backend")]
pub use store::RocksDbStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
