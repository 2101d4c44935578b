// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory document store.
//!
//! Collections live in a single `parking_lot::RwLock`, so every operation
//! (including the unique-field check on insert) is atomic. Data is lost when
//! the store is dropped; use it for tests and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::traits::{apply_set, assign_id, unique_violation, Document, DocumentStore};
use super::Filter;
use crate::error::{StoreError, StoreResult};
use crate::id::ObjectId;

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    unique_fields: HashMap<String, Vec<String>>,
}

impl Inner {
    fn unique_for(&self, collection: &str) -> &[String] {
        self.unique_fields
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A thread-safe, non-persistent [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    connected: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty, disconnected store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .read()
            .collections
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Returns `true` if `collection` holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Removes every document from every collection.
    pub fn clear(&self) {
        self.inner.write().collections.clear();
    }

    fn check_connected(&self) -> StoreResult<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn connect(&self) -> StoreResult<()> {
        self.connected.store(true, Ordering::Release);
        debug!("Memory store connected");
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        self.connected.store(false, Ordering::Release);
        debug!("Memory store closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_connected()
    }

    async fn ensure_unique(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.check_connected()?;
        let mut inner = self.inner.write();
        let fields = inner.unique_fields.entry(collection.to_string()).or_default();
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        self.check_connected()?;
        let inner = self.inner.read();
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        self.check_connected()?;
        let inner = self.inner.read();
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<ObjectId> {
        self.check_connected()?;
        let id = assign_id(collection, &mut document)?;

        let mut inner = self.inner.write();
        let unique = inner.unique_for(collection).to_vec();
        let docs = inner.collections.entry(collection.to_string()).or_default();

        if let Some(field) = unique_violation(docs.iter(), &document, &unique) {
            return Err(StoreError::duplicate_key(collection, field));
        }
        docs.push(document);
        Ok(id)
    }

    async fn update_one(&self, collection: &str, filter: &Filter, set: Document) -> StoreResult<u64> {
        self.check_connected()?;
        let mut inner = self.inner.write();
        let unique = inner.unique_for(collection).to_vec();
        let Some(docs) = inner.collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(index) = docs.iter().position(|d| filter.matches(d)) else {
            return Ok(0);
        };

        let mut updated = docs[index].clone();
        apply_set(&mut updated, &set);
        if let Some(field) = unique_violation(docs.iter(), &updated, &unique) {
            return Err(StoreError::duplicate_key(collection, field));
        }
        docs[index] = updated;
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.check_connected()?;
        let mut inner = self.inner.write();
        let Some(docs) = inner.collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.check_connected()?;
        let inner = self.inner.read();
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }
}
