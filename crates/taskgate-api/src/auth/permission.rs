// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission names and the operations they gate.
//!
//! Permissions are persisted records identified by name. Matching is exact
//! and case-sensitive; there are no wildcards and no implied permissions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Allows listing tasks.
pub const VIEW_TASK: &str = "view_task";
/// Allows creating tasks.
pub const CREATE_TASK: &str = "create_task";
/// Allows updating tasks.
pub const UPDATE_TASK: &str = "update_task";
/// Allows deleting tasks.
pub const DELETE_TASK: &str = "delete_task";

/// A permission the bootstrap seeder guarantees to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDef {
    /// Unique name.
    pub name: &'static str,
    /// Human readable description.
    pub description: &'static str,
}

/// The fixed permission catalog, in seeding order.
pub const PERMISSION_CATALOG: &[PermissionDef] = &[
    PermissionDef {
        name: VIEW_TASK,
        description: "Allows viewing tasks",
    },
    PermissionDef {
        name: CREATE_TASK,
        description: "Allows creating tasks",
    },
    PermissionDef {
        name: UPDATE_TASK,
        description: "Allows updating tasks",
    },
    PermissionDef {
        name: DELETE_TASK,
        description: "Allows deleting tasks",
    },
];

// =============================================================================
// TaskOperation
// =============================================================================

/// Protected task operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOperation {
    /// `GET /api/tasks`
    List,
    /// `POST /api/tasks`
    Create,
    /// `PUT /api/tasks/{id}`
    Update,
    /// `DELETE /api/tasks/{id}`
    Delete,
}

impl TaskOperation {
    /// Returns the permission an operation requires.
    ///
    /// Update is gated by `update_task`, the seeded name, rather than
    /// `update_task_status`, which no role can ever hold.
    pub fn required_permission(&self) -> &'static str {
        match self {
            TaskOperation::List => VIEW_TASK,
            TaskOperation::Create => CREATE_TASK,
            TaskOperation::Update => UPDATE_TASK,
            TaskOperation::Delete => DELETE_TASK,
        }
    }

    /// Returns all operations.
    pub fn all() -> &'static [TaskOperation] {
        &[
            TaskOperation::List,
            TaskOperation::Create,
            TaskOperation::Update,
            TaskOperation::Delete,
        ]
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskOperation::List => "list",
            TaskOperation::Create => "create",
            TaskOperation::Update => "update",
            TaskOperation::Delete => "delete",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Permission Set
// =============================================================================

/// A set of permission names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    names: BTreeSet<String>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission name.
    pub fn add(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Returns `true` if the set contains exactly `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns `true` if the set contains all of the given names.
    pub fn contains_all(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.contains(n))
    }

    /// Returns the number of permissions in the set.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
