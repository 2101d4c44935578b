// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Read access to the persisted permission and role collections.

use std::sync::Arc;

use taskgate_core::{Collection, DocumentStore, Filter, ObjectId, Permission, Role};

use crate::error::ApiResult;

/// Lookups over `permissions` and `roles`.
#[derive(Debug, Clone)]
pub struct Catalog {
    permissions: Collection<Permission>,
    roles: Collection<Role>,
}

impl Catalog {
    /// Creates a catalog over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            permissions: Collection::new(store.clone()),
            roles: Collection::new(store),
        }
    }

    /// Declares permission and role names unique.
    pub async fn ensure_indexes(&self) -> ApiResult<()> {
        self.permissions.ensure_unique("name").await?;
        self.roles.ensure_unique("name").await?;
        Ok(())
    }

    /// Finds a permission by exact name.
    pub async fn find_permission_by_name(&self, name: &str) -> ApiResult<Option<Permission>> {
        Ok(self.permissions.find_one(&Filter::eq("name", name)).await?)
    }

    /// Lists every permission.
    pub async fn list_permissions(&self) -> ApiResult<Vec<Permission>> {
        Ok(self.permissions.find(&Filter::all()).await?)
    }

    /// Finds a role by exact name.
    pub async fn find_role_by_name(&self, name: &str) -> ApiResult<Option<Role>> {
        Ok(self.roles.find_one(&Filter::eq("name", name)).await?)
    }

    /// Finds a role by identifier.
    pub async fn find_role_by_id(&self, id: ObjectId) -> ApiResult<Option<Role>> {
        Ok(self.roles.find_by_id(id).await?)
    }

    /// Lists every role.
    pub async fn list_roles(&self) -> ApiResult<Vec<Role>> {
        Ok(self.roles.find(&Filter::all()).await?)
    }

    /// Loads the permissions whose identifiers are in `ids`.
    ///
    /// Identifiers that resolve to nothing are skipped.
    pub async fn list_permissions_by_ids(&self, ids: &[ObjectId]) -> ApiResult<Vec<Permission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.permissions.find(&Filter::id_in(ids)).await?)
    }

    pub(crate) async fn insert_permission(&self, permission: &mut Permission) -> ApiResult<ObjectId> {
        Ok(self.permissions.insert(permission).await?)
    }

    pub(crate) async fn insert_role(&self, role: &mut Role) -> ApiResult<ObjectId> {
        Ok(self.roles.insert(role).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskgate_core::MemoryStore;

    async fn catalog() -> Catalog {
        let store = Arc::new(MemoryStore::new());
        store.connect().await.unwrap();
        let catalog = Catalog::new(store);
        catalog.ensure_indexes().await.unwrap();
        catalog
    }

    #[tokio::test]
    async fn test_lookups() {
        let catalog = catalog().await;

        let mut view = Permission::new("view_task", "Allows viewing tasks");
        let mut create = Permission::new("create_task", "Allows creating tasks");
        let view_id = catalog.insert_permission(&mut view).await.unwrap();
        let create_id = catalog.insert_permission(&mut create).await.unwrap();

        let mut role = Role::new("user", vec![view_id]);
        let role_id = catalog.insert_role(&mut role).await.unwrap();

        assert_eq!(
            catalog.find_permission_by_name("view_task").await.unwrap().unwrap().id,
            view_id
        );
        assert!(catalog.find_permission_by_name("VIEW_TASK").await.unwrap().is_none());
        assert_eq!(catalog.list_permissions().await.unwrap().len(), 2);
        assert_eq!(catalog.find_role_by_name("user").await.unwrap().unwrap().id, role_id);
        assert_eq!(catalog.find_role_by_id(role_id).await.unwrap().unwrap().name, "user");
        assert!(catalog.find_role_by_id(ObjectId::new()).await.unwrap().is_none());

        let found = catalog
            .list_permissions_by_ids(&[create_id, ObjectId::new()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "create_task");
        assert!(catalog.list_permissions_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let catalog = catalog().await;
        catalog
            .insert_permission(&mut Permission::new("view_task", ""))
            .await
            .unwrap();
        let err = catalog
            .insert_permission(&mut Permission::new("view_task", ""))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");
    }
}
