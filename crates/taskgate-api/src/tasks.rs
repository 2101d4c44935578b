// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Task service.
//!
//! CRUD over the `tasks` collection. Identifiers arrive as hex strings from
//! the path; a malformed one is a validation failure, an unknown one is
//! `NotFound("task")`.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use taskgate_core::{Collection, Document, DocumentStore, Filter, ObjectId, Task};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult, ValidationErrors};

// =============================================================================
// Inputs
// =============================================================================

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    /// Short title; required.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Completion flag, `false` when omitted.
    #[serde(default)]
    pub status: Option<bool>,
}

/// A partial update. At least one field must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskChanges {
    /// New title.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New completion flag.
    pub status: Option<bool>,
}

impl TaskChanges {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }

    fn into_document(self) -> ApiResult<Document> {
        let mut set = Document::new();
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                let mut errors = ValidationErrors::new();
                errors.add("name", "must not be empty");
                return Err(ApiError::validation_with_errors("Invalid task", errors));
            }
            set.insert("name".into(), name.into());
        }
        if let Some(description) = self.description {
            set.insert("description".into(), description.into());
        }
        if let Some(status) = self.status {
            set.insert("status".into(), status.into());
        }
        set.insert(
            "updated_at".into(),
            serde_json::to_value(Utc::now())?,
        );
        Ok(set)
    }
}

// =============================================================================
// TaskService
// =============================================================================

/// Task operations over the document store.
#[derive(Clone)]
pub struct TaskService {
    tasks: Collection<Task>,
}

impl TaskService {
    /// Creates a service backed by `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tasks: Collection::new(store),
        }
    }

    /// Returns every task in insertion order.
    pub async fn list(&self) -> ApiResult<Vec<Task>> {
        Ok(self.tasks.find(&Filter::all()).await?)
    }

    /// Loads one task.
    pub async fn get(&self, id: &str) -> ApiResult<Task> {
        let id = parse_task_id(id)?;
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("task"))
    }

    /// Creates a task stamped with the current time.
    pub async fn create(&self, input: NewTask) -> ApiResult<Task> {
        let name = input.name.trim();
        if name.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("name", "is required");
            return Err(ApiError::validation_with_errors("Invalid task", errors));
        }

        let mut task = Task::new(name, input.description, input.status.unwrap_or(false));
        let id = self.tasks.insert(&mut task).await?;
        info!(task_id = %id, "Task created");
        Ok(task)
    }

    /// Applies `changes` to the task with hex identifier `id` and returns the
    /// stored result.
    pub async fn update(&self, id: &str, changes: TaskChanges) -> ApiResult<Task> {
        let id = parse_task_id(id)?;
        if changes.is_empty() {
            return Err(ApiError::validation(
                "At least one of name, description or status is required",
            ));
        }

        let set = changes.into_document()?;
        if !self.tasks.update_by_id(id, set).await? {
            return Err(ApiError::not_found("task"));
        }
        debug!(task_id = %id, "Task updated");

        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("task"))
    }

    /// Deletes the task with hex identifier `id`.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let id = parse_task_id(id)?;
        if !self.tasks.delete_by_id(id).await? {
            return Err(ApiError::not_found("task"));
        }
        info!(task_id = %id, "Task deleted");
        Ok(())
    }
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService")
            .field("collection", &self.tasks.name())
            .finish()
    }
}

fn parse_task_id(id: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| ApiError::validation(format!("Invalid task id: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskgate_core::MemoryStore;

    async fn service() -> TaskService {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        store.connect().await.unwrap();
        TaskService::new(store)
    }

    fn new_task(name: &str) -> NewTask {
        NewTask {
            name: name.to_string(),
            description: "desc".to_string(),
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let tasks = service().await;
        let created = tasks.create(new_task("write docs")).await.unwrap();

        assert!(!created.id.is_nil());
        assert!(!created.status);
        assert_eq!(created.created_at, created.updated_at);

        let all = tasks.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "write docs");
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let tasks = service().await;
        let err = tasks.create(new_task("   ")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_changes_fields() {
        let tasks = service().await;
        let created = tasks.create(new_task("draft")).await.unwrap();

        let updated = tasks
            .update(
                &created.id.to_hex(),
                TaskChanges {
                    status: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.status);
        assert_eq!(updated.name, "draft");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_requires_a_field() {
        let tasks = service().await;
        let created = tasks.create(new_task("draft")).await.unwrap();

        let err = tasks
            .update(&created.id.to_hex(), TaskChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids() {
        let tasks = service().await;
        let unknown = ObjectId::new().to_hex();

        let err = tasks.delete(&unknown).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));

        let err = tasks
            .update(
                &unknown,
                TaskChanges {
                    name: Some("x".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));

        let err = tasks.delete("not-an-id").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_task() {
        let tasks = service().await;
        let created = tasks.create(new_task("temp")).await.unwrap();

        tasks.delete(&created.id.to_hex()).await.unwrap();
        assert!(tasks.list().await.unwrap().is_empty());
        assert!(matches!(
            tasks.get(&created.id.to_hex()).await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
    }
}
