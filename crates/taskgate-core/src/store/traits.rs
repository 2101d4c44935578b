// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The [`DocumentStore`] trait and helpers shared by its backends.

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

use super::Filter;
use crate::error::{StoreError, StoreResult};
use crate::id::ObjectId;

/// A stored record: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, Value>;

/// Name of the identifier field.
pub const ID_FIELD: &str = "_id";

// =============================================================================
// DocumentStore Trait
// =============================================================================

/// Filter-based persistence over named collections.
///
/// A store handle is created once, connected explicitly, shared behind an
/// `Arc` by every component and closed at shutdown. Operations on a handle
/// that is not connected fail with [`StoreError::NotConnected`].
///
/// Individual operations are atomic. Nothing spans more than one call, so a
/// sequence of reads may observe writes made between them.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Opens the underlying storage.
    async fn connect(&self) -> StoreResult<()>;

    /// Releases the underlying storage. Closing twice is a no-op.
    async fn close(&self) -> StoreResult<()>;

    /// Returns `true` between `connect` and `close`.
    fn is_connected(&self) -> bool;

    /// Checks that the store can serve requests.
    async fn ping(&self) -> StoreResult<()>;

    /// Declares `field` unique within `collection`.
    ///
    /// Later inserts and updates that would duplicate an existing value fail
    /// with [`StoreError::DuplicateKey`].
    async fn ensure_unique(&self, collection: &str, field: &str) -> StoreResult<()>;

    /// Returns all documents matching `filter`, in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Returns the first document matching `filter`.
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    /// Inserts a document, assigning `_id` if it has none.
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<ObjectId>;

    /// Sets the top-level fields in `set` on the first matching document.
    ///
    /// Returns the number of matched documents (0 or 1). `_id` is never
    /// changed.
    async fn update_one(&self, collection: &str, filter: &Filter, set: Document) -> StoreResult<u64>;

    /// Deletes the first matching document and returns the number removed.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Counts matching documents.
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        Ok(self.find(collection, filter).await?.len() as u64)
    }
}

// =============================================================================
// Backend Helpers
// =============================================================================

/// Ensures `document` carries a valid `_id`, generating one when absent.
pub(crate) fn assign_id(collection: &str, document: &mut Document) -> StoreResult<ObjectId> {
    match document.get(ID_FIELD) {
        Some(Value::String(hex)) => ObjectId::parse_str(hex)
            .map_err(|e| StoreError::invalid_document(collection, e.to_string())),
        Some(other) => Err(StoreError::invalid_document(
            collection,
            format!("_id must be a hex string, got {}", other),
        )),
        None => {
            let id = ObjectId::new();
            document.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
            Ok(id)
        }
    }
}

/// Merges `set` into `document`, leaving `_id` untouched.
pub(crate) fn apply_set(document: &mut Document, set: &Document) {
    for (key, value) in set {
        if key != ID_FIELD {
            document.insert(key.clone(), value.clone());
        }
    }
}

/// Returns the first unique field for which `candidate` collides with a
/// document in `existing` other than itself.
pub(crate) fn unique_violation<'d, 'f>(
    existing: impl Iterator<Item = &'d Document> + Clone,
    candidate: &Document,
    unique_fields: &'f [String],
) -> Option<&'f str> {
    let candidate_id = candidate.get(ID_FIELD);
    unique_fields.iter().map(String::as_str).find(|field| {
        let Some(value) = candidate.get(*field) else {
            return false;
        };
        existing
            .clone()
            .filter(|doc| doc.get(ID_FIELD) != candidate_id)
            .any(|doc| doc.get(*field) == Some(value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_assign_id_generates_when_missing() {
        let mut d = doc(json!({"name": "x"}));
        let id = assign_id("c", &mut d).unwrap();
        assert_eq!(d[ID_FIELD], Value::String(id.to_hex()));
    }

    #[test]
    fn test_assign_id_keeps_existing() {
        let id = ObjectId::new();
        let mut d = doc(json!({"_id": id.to_hex()}));
        assert_eq!(assign_id("c", &mut d).unwrap(), id);
    }

    #[test]
    fn test_assign_id_rejects_malformed() {
        let mut d = doc(json!({"_id": 42}));
        assert!(assign_id("c", &mut d).is_err());
    }

    #[test]
    fn test_apply_set_preserves_id() {
        let mut d = doc(json!({"_id": "a", "name": "old", "status": false}));
        apply_set(&mut d, &doc(json!({"_id": "b", "name": "new"})));
        assert_eq!(d["_id"], "a");
        assert_eq!(d["name"], "new");
        assert_eq!(d["status"], false);
    }

    #[test]
    fn test_unique_violation() {
        let stored = vec![doc(json!({"_id": "1", "email": "a@x.com"}))];
        let fields = vec!["email".to_string()];

        let dup = doc(json!({"_id": "2", "email": "a@x.com"}));
        assert_eq!(unique_violation(stored.iter(), &dup, &fields), Some("email"));

        let same = doc(json!({"_id": "1", "email": "a@x.com"}));
        assert_eq!(unique_violation(stored.iter(), &same, &fields), None);

        let other = doc(json!({"_id": "3", "email": "b@x.com"}));
        assert_eq!(unique_violation(stored.iter(), &other, &fields), None);
    }
}
