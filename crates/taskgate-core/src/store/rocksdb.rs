// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! RocksDB-backed document store.
//!
//! Documents are stored as JSON under the key `{collection}/{id}`. A
//! collection is read with a forward scan from its key prefix. Writes are
//! serialized by a process-local lock so that unique-field checks and the
//! write that follows them are atomic.
//!
//! All RocksDB calls run on `tokio::task::spawn_blocking`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rocksdb::{BlockBasedOptions, DBCompressionType, Direction, IteratorMode, Options, DB};
use tracing::{debug, info};

use super::traits::{apply_set, assign_id, unique_violation, Document, DocumentStore};
use super::Filter;
use crate::error::{StoreError, StoreResult};
use crate::id::ObjectId;

/// A persistent [`DocumentStore`] backed by RocksDB.
#[derive(Debug)]
pub struct RocksDbStore {
    path: PathBuf,
    db: RwLock<Option<Arc<DB>>>,
    write_lock: Arc<Mutex<()>>,
    unique_fields: RwLock<HashMap<String, Vec<String>>>,
}

impl RocksDbStore {
    /// Creates a store rooted at `path`. Nothing is opened until `connect`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            db: RwLock::new(None),
            write_lock: Arc::new(Mutex::new(())),
            unique_fields: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the database directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&self) -> StoreResult<Arc<DB>> {
        self.db.read().clone().ok_or(StoreError::NotConnected)
    }

    fn unique_for(&self, collection: &str) -> Vec<String> {
        self.unique_fields
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn open_db(path: &Path) -> Result<DB, rocksdb::Error> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(DBCompressionType::Lz4);

        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);

        DB::open(&opts, path)
    }
}

fn key_prefix(collection: &str) -> String {
    format!("{}/", collection)
}

fn document_key(collection: &str, id: ObjectId) -> String {
    format!("{}/{}", collection, id.to_hex())
}

/// Reads every document of `collection` in key order.
fn scan(db: &DB, collection: &str) -> StoreResult<Vec<(Vec<u8>, Document)>> {
    let prefix = key_prefix(collection);
    let mut out = Vec::new();
    for item in db.iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward)) {
        let (key, value) = item.map_err(|e| StoreError::backend(e.to_string()))?;
        if !key.starts_with(prefix.as_bytes()) {
            break;
        }
        let document: Document = serde_json::from_slice(&value)
            .map_err(|e| StoreError::invalid_document(collection, e.to_string()))?;
        out.push((key.to_vec(), document));
    }
    Ok(out)
}

async fn blocking<T, F>(f: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StoreResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::backend(format!("Failed to spawn blocking task: {}", e)))?
}

#[async_trait]
impl DocumentStore for RocksDbStore {
    fn backend(&self) -> &'static str {
        "rocksdb"
    }

    async fn connect(&self) -> StoreResult<()> {
        if self.db.read().is_some() {
            return Ok(());
        }
        let path = self.path.clone();
        let db = blocking(move || {
            std::fs::create_dir_all(&path).map_err(|e| StoreError::backend(e.to_string()))?;
            RocksDbStore::open_db(&path).map_err(|e| StoreError::backend(e.to_string()))
        })
        .await?;

        *self.db.write() = Some(Arc::new(db));
        info!(path = %self.path.display(), "RocksDB store opened");
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        let db = self.db.write().take();
        if let Some(db) = db {
            blocking(move || db.flush().map_err(|e| StoreError::backend(e.to_string()))).await?;
            info!(path = %self.path.display(), "RocksDB store closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.db.read().is_some()
    }

    async fn ping(&self) -> StoreResult<()> {
        self.handle().map(|_| ())
    }

    async fn ensure_unique(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.handle()?;
        let mut fields = self.unique_fields.write();
        let entry = fields.entry(collection.to_string()).or_default();
        if !entry.iter().any(|f| f == field) {
            entry.push(field.to_string());
        }
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let db = self.handle()?;
        let collection = collection.to_string();
        let filter = filter.clone();
        blocking(move || {
            Ok(scan(&db, &collection)?
                .into_iter()
                .map(|(_, doc)| doc)
                .filter(|doc| filter.matches(doc))
                .collect())
        })
        .await
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<ObjectId> {
        let db = self.handle()?;
        let id = assign_id(collection, &mut document)?;
        let unique = self.unique_for(collection);
        let write_lock = self.write_lock.clone();
        let collection = collection.to_string();

        blocking(move || {
            let _guard = write_lock.lock();
            if !unique.is_empty() {
                let existing = scan(&db, &collection)?;
                let docs = existing.iter().map(|(_, d)| d);
                if let Some(field) = unique_violation(docs, &document, &unique) {
                    return Err(StoreError::duplicate_key(&collection, field));
                }
            }
            let bytes = serde_json::to_vec(&document)?;
            db.put(document_key(&collection, id), bytes)
                .map_err(|e| StoreError::backend(e.to_string()))?;
            debug!(collection = %collection, id = %id, "Document inserted");
            Ok(id)
        })
        .await
    }

    async fn update_one(&self, collection: &str, filter: &Filter, set: Document) -> StoreResult<u64> {
        let db = self.handle()?;
        let unique = self.unique_for(collection);
        let write_lock = self.write_lock.clone();
        let collection = collection.to_string();
        let filter = filter.clone();

        blocking(move || {
            let _guard = write_lock.lock();
            let existing = scan(&db, &collection)?;
            let Some((key, current)) = existing.iter().find(|(_, d)| filter.matches(d)) else {
                return Ok(0);
            };

            let mut updated = current.clone();
            apply_set(&mut updated, &set);
            let docs = existing.iter().map(|(_, d)| d);
            if let Some(field) = unique_violation(docs, &updated, &unique) {
                return Err(StoreError::duplicate_key(&collection, field));
            }

            let bytes = serde_json::to_vec(&updated)?;
            db.put(key, bytes)
                .map_err(|e| StoreError::backend(e.to_string()))?;
            Ok(1)
        })
        .await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let db = self.handle()?;
        let write_lock = self.write_lock.clone();
        let collection = collection.to_string();
        let filter = filter.clone();

        blocking(move || {
            let _guard = write_lock.lock();
            let existing = scan(&db, &collection)?;
            match existing.iter().find(|(_, d)| filter.matches(d)) {
                Some((key, _)) => {
                    db.delete(key)
                        .map_err(|e| StoreError::backend(e.to_string()))?;
                    Ok(1)
                }
                None => Ok(0),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = RocksDbStore::new(dir.path());
        store.connect().await.unwrap();
        let id = store
            .insert_one("permissions", doc(json!({"name": "view_task"})))
            .await
            .unwrap();
        store.close().await.unwrap();
        assert!(!store.is_connected());

        let reopened = RocksDbStore::new(dir.path());
        reopened.connect().await.unwrap();
        let found = reopened
            .find_one("permissions", &Filter::by_id(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["name"], "view_task");
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksDbStore::new(dir.path());
        store.connect().await.unwrap();

        store.insert_one("roles", doc(json!({"name": "admin"}))).await.unwrap();
        store.insert_one("roles2", doc(json!({"name": "other"}))).await.unwrap();

        let roles = store.find("roles", &Filter::all()).await.unwrap();
        assert_eq!(roles.len(), 1);
    }

    #[tokio::test]
    async fn test_unique_and_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksDbStore::new(dir.path());
        store.connect().await.unwrap();
        store.ensure_unique("users", "email").await.unwrap();

        store.insert_one("users", doc(json!({"email": "a@x.com"}))).await.unwrap();
        let err = store
            .insert_one("users", doc(json!({"email": "a@x.com"})))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());

        let matched = store
            .update_one("users", &Filter::eq("email", "a@x.com"), doc(json!({"name": "A"})))
            .await
            .unwrap();
        assert_eq!(matched, 1);
        assert_eq!(store.delete_one("users", &Filter::all()).await.unwrap(), 1);
        assert_eq!(store.count("users", &Filter::all()).await.unwrap(), 0);
    }
}
