// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed collection access.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use super::traits::{Document, DocumentStore};
use super::Filter;
use crate::error::{StoreError, StoreResult};
use crate::id::ObjectId;
use crate::model::Model;

/// A handle to the collection that stores `T`.
///
/// Converts between `T` and [`Document`] with serde and forwards to the
/// shared store handle.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Model> Collection<T> {
    /// Creates a collection handle over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Returns the collection name.
    pub fn name(&self) -> &'static str {
        T::COLLECTION
    }

    /// Returns the underlying store handle.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Declares `field` unique.
    pub async fn ensure_unique(&self, field: &str) -> StoreResult<()> {
        self.store.ensure_unique(T::COLLECTION, field).await
    }

    /// Returns the first record matching `filter`.
    pub async fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(from_document)
            .transpose()
    }

    /// Returns the record with the given identifier.
    pub async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<T>> {
        self.find_one(&Filter::by_id(id)).await
    }

    /// Returns all records matching `filter`.
    pub async fn find(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    /// Inserts `record` and writes the assigned identifier back into it.
    pub async fn insert(&self, record: &mut T) -> StoreResult<ObjectId> {
        let document = to_document(record)?;
        let id = self.store.insert_one(T::COLLECTION, document).await?;
        record.set_id(id);
        Ok(id)
    }

    /// Sets fields on the record with the given identifier.
    ///
    /// Returns `false` if no such record exists.
    pub async fn update_by_id(&self, id: ObjectId, set: Document) -> StoreResult<bool> {
        let matched = self
            .store
            .update_one(T::COLLECTION, &Filter::by_id(id), set)
            .await?;
        Ok(matched > 0)
    }

    /// Deletes the record with the given identifier.
    ///
    /// Returns `false` if no such record exists.
    pub async fn delete_by_id(&self, id: ObjectId) -> StoreResult<bool> {
        let deleted = self
            .store
            .delete_one(T::COLLECTION, &Filter::by_id(id))
            .await?;
        Ok(deleted > 0)
    }

    /// Counts records matching `filter`.
    pub async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        self.store.count(T::COLLECTION, filter).await
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Model> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &T::COLLECTION)
            .field("backend", &self.store.backend())
            .finish()
    }
}

fn to_document<T: Model>(record: &T) -> StoreResult<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::serialization(format!(
            "{} record serialized to a non-object value: {}",
            T::COLLECTION,
            other
        ))),
    }
}

fn from_document<T: Model>(document: Document) -> StoreResult<T> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| StoreError::invalid_document(T::COLLECTION, e.to_string()))
}
