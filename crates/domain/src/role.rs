use chrono::{DateTime, Utc};
use grantree_core::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission_tree::{PermissionTree, apply_patch};

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Named bundle of permissions that can be referenced by users.
///
/// Roles are never removed; [`Role::soft_delete`] only stamps `deleted_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    title: NonEmptyString,
    #[serde(default)]
    description: String,
    #[serde(default)]
    permissions: PermissionTree,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    deleted_at: Option<DateTime<Utc>>,
}

/// Field changes applied to an existing role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleUpdate {
    /// Replacement title.
    pub title: Option<NonEmptyString>,
    /// Replacement description.
    pub description: Option<String>,
    /// Partial tree deep-merged into the stored permissions.
    pub permissions: Option<PermissionTree>,
}

impl RoleUpdate {
    /// Returns whether the update carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.permissions.is_none()
    }
}

impl Role {
    /// Creates an active role stamped with `now`.
    #[must_use]
    pub fn new(
        title: NonEmptyString,
        description: Option<String>,
        permissions: PermissionTree,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RoleId::new(),
            title,
            description: description.unwrap_or_default(),
            permissions,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique trimmed title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the free-text description, empty when none was given.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the role permission tree.
    #[must_use]
    pub fn permissions(&self) -> &PermissionTree {
        &self.permissions
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the soft-delete timestamp, if any.
    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns whether the role has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Applies `update`, deep-merging any permission patch.
    ///
    /// Returns whether the permission tree must be persisted.
    pub fn apply_update(&mut self, update: RoleUpdate, now: DateTime<Utc>) -> bool {
        let mut permissions_changed = false;
        if let Some(patch) = update.permissions {
            let outcome = apply_patch(&self.permissions, &patch);
            permissions_changed = outcome.changed;
            self.permissions = outcome.tree;
        }

        if let Some(title) = update.title {
            self.title = title;
        }

        if let Some(description) = update.description {
            self.description = description;
        }

        self.updated_at = now;
        permissions_changed
    }

    /// Marks the role as deleted at `now`.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}
