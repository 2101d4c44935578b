// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Idempotent seeding of the permission and role catalog.
//!
//! ```text
//! 1. insert each catalog permission whose name is absent
//! 2. re-read all permissions to learn their identifiers
//! 3. admin = every permission, user = view_task only
//! 4. insert each catalog role whose name is absent
//! ```
//!
//! Roles that already exist are left as they are, including their
//! permission lists. A permission added to the catalog later is not granted
//! to existing roles.

use serde::Serialize;
use taskgate_core::{ObjectId, Permission, Role};
use tracing::{debug, info};

use super::catalog::Catalog;
use super::permission::{PermissionDef, PERMISSION_CATALOG, VIEW_TASK};
use crate::error::{ApiError, ApiResult};

/// Name of the role holding every permission.
pub const ADMIN_ROLE: &str = "admin";
/// Name of the role given to new accounts.
pub const USER_ROLE: &str = "user";

/// Which permissions a seeded role receives at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGrant {
    /// Every permission in the store.
    All,
    /// Only the named permissions.
    Only(&'static [&'static str]),
}

/// A role the bootstrap seeder guarantees to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDef {
    /// Unique name.
    pub name: &'static str,
    /// Permissions granted at creation.
    pub grant: RoleGrant,
}

/// The fixed role catalog, in seeding order.
pub const ROLE_CATALOG: &[RoleDef] = &[
    RoleDef {
        name: ADMIN_ROLE,
        grant: RoleGrant::All,
    },
    RoleDef {
        name: USER_ROLE,
        grant: RoleGrant::Only(&[VIEW_TASK]),
    },
];

/// Outcome of one seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Permissions inserted by this run.
    pub permissions_created: Vec<String>,
    /// Roles inserted by this run.
    pub roles_created: Vec<String>,
    /// Permissions in the store afterwards.
    pub permissions_total: usize,
    /// Catalog roles present afterwards.
    pub roles_total: usize,
}

impl BootstrapReport {
    /// Returns `true` if the run inserted nothing.
    pub fn is_noop(&self) -> bool {
        self.permissions_created.is_empty() && self.roles_created.is_empty()
    }
}

// =============================================================================
// BootstrapSeeder
// =============================================================================

/// Ensures the fixed permissions and roles exist.
#[derive(Debug, Clone)]
pub struct BootstrapSeeder {
    catalog: Catalog,
}

impl BootstrapSeeder {
    /// Creates a seeder writing through `catalog`.
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Runs the seeding procedure.
    pub async fn run(&self) -> ApiResult<BootstrapReport> {
        let mut report = BootstrapReport::default();

        for def in PERMISSION_CATALOG {
            if self.ensure_permission(def).await? {
                report.permissions_created.push(def.name.to_string());
            }
        }

        let permissions = self.catalog.list_permissions().await?;
        report.permissions_total = permissions.len();

        for def in ROLE_CATALOG {
            let grants = role_grants(def.grant, &permissions);
            if self.ensure_role(def.name, grants).await? {
                report.roles_created.push(def.name.to_string());
            }
        }
        report.roles_total = ROLE_CATALOG.len();

        info!(
            permissions_created = report.permissions_created.len(),
            roles_created = report.roles_created.len(),
            permissions_total = report.permissions_total,
            "Bootstrap complete"
        );
        Ok(report)
    }

    /// Inserts the permission unless one with the same name exists.
    async fn ensure_permission(&self, def: &PermissionDef) -> ApiResult<bool> {
        if self.catalog.find_permission_by_name(def.name).await?.is_some() {
            debug!(permission = def.name, "Permission already exists");
            return Ok(false);
        }

        let mut permission = Permission::new(def.name, def.description);
        match self.catalog.insert_permission(&mut permission).await {
            Ok(id) => {
                info!(permission = def.name, id = %id, "Permission created");
                Ok(true)
            }
            // Another process seeded it between the lookup and the insert.
            Err(ApiError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Inserts the role unless one with the same name exists.
    async fn ensure_role(&self, name: &str, permissions: Vec<ObjectId>) -> ApiResult<bool> {
        if self.catalog.find_role_by_name(name).await?.is_some() {
            debug!(role = name, "Role already exists");
            return Ok(false);
        }

        let granted = permissions.len();
        let mut role = Role::new(name, permissions);
        match self.catalog.insert_role(&mut role).await {
            Ok(id) => {
                info!(role = name, id = %id, permissions = granted, "Role created");
                Ok(true)
            }
            Err(ApiError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn role_grants(grant: RoleGrant, permissions: &[Permission]) -> Vec<ObjectId> {
    match grant {
        RoleGrant::All => permissions.iter().map(|p| p.id).collect(),
        RoleGrant::Only(names) => permissions
            .iter()
            .filter(|p| names.contains(&p.name.as_str()))
            .map(|p| p.id)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskgate_core::{DocumentStore, MemoryStore};

    async fn seeder() -> (Arc<MemoryStore>, Catalog, BootstrapSeeder) {
        let store = Arc::new(MemoryStore::new());
        store.connect().await.unwrap();
        let catalog = Catalog::new(store.clone());
        catalog.ensure_indexes().await.unwrap();
        (store, catalog.clone(), BootstrapSeeder::new(catalog))
    }

    #[tokio::test]
    async fn test_fresh_store() {
        let (_store, catalog, seeder) = seeder().await;
        let report = seeder.run().await.unwrap();

        assert_eq!(report.permissions_created.len(), 4);
        assert_eq!(report.roles_created, vec!["admin", "user"]);

        let admin = catalog.find_role_by_name("admin").await.unwrap().unwrap();
        let user = catalog.find_role_by_name("user").await.unwrap().unwrap();
        assert_eq!(admin.permissions.len(), 4);
        assert_eq!(user.permissions.len(), 1);

        let granted = catalog.list_permissions_by_ids(&user.permissions).await.unwrap();
        assert_eq!(granted[0].name, "view_task");
    }

    #[tokio::test]
    async fn test_repeated_runs_converge() {
        let (store, _catalog, seeder) = seeder().await;
        seeder.run().await.unwrap();

        for _ in 0..3 {
            let report = seeder.run().await.unwrap();
            assert!(report.is_noop());
        }
        assert_eq!(store.len("permissions"), 4);
        assert_eq!(store.len("roles"), 2);
    }

    #[tokio::test]
    async fn test_existing_role_is_not_resynced() {
        let (_store, catalog, seeder) = seeder().await;

        let mut stale = Role::new("admin", Vec::new());
        catalog.insert_role(&mut stale).await.unwrap();

        let report = seeder.run().await.unwrap();
        assert_eq!(report.roles_created, vec!["user"]);

        let admin = catalog.find_role_by_name("admin").await.unwrap().unwrap();
        assert!(admin.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_preexisting_permission_is_granted() {
        let (_store, catalog, seeder) = seeder().await;

        let mut view = Permission::new("view_task", "seeded elsewhere");
        let view_id = catalog.insert_permission(&mut view).await.unwrap();

        let report = seeder.run().await.unwrap();
        assert_eq!(report.permissions_created.len(), 3);

        let user = catalog.find_role_by_name("user").await.unwrap().unwrap();
        assert_eq!(user.permissions, vec![view_id]);
    }

    #[test]
    fn test_role_grants() {
        let mut view = Permission::new("view_task", "");
        view.id = ObjectId::new();
        let mut delete = Permission::new("delete_task", "");
        delete.id = ObjectId::new();
        let all = vec![view.clone(), delete.clone()];

        assert_eq!(role_grants(RoleGrant::All, &all), vec![view.id, delete.id]);
        assert_eq!(role_grants(RoleGrant::Only(&["view_task"]), &all), vec![view.id]);
        assert!(role_grants(RoleGrant::Only(&["View_Task"]), &all).is_empty());
    }
}
