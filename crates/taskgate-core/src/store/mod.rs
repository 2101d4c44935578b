// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Document store abstraction.
//!
//! - [`DocumentStore`]: async find/insert/update/delete-by-filter over
//!   schema-less JSON documents grouped in named collections
//! - [`Filter`]: the query language understood by every backend
//! - [`Collection`]: typed access for [`Model`](crate::model::Model) records
//! - [`MemoryStore`]: process-local backend
//! - `RocksDbStore`: persistent backend (feature `rocksdb-backend`)

mod collection;
mod filter;
mod memory;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb;
mod traits;

pub use collection::Collection;
pub use filter::Filter;
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use self::rocksdb::RocksDbStore;
pub use traits::{Document, DocumentStore, ID_FIELD};
