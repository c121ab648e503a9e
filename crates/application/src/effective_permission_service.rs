//! Role resolution and effective permission calculation.
//!
//! Effective permissions are derived on every call from the current role
//! records and the caller-supplied override; nothing is cached, so role edits
//! are visible immediately to every user holding the role.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use grantree_core::AppResult;
use grantree_domain::{PermissionTree, Role, RoleId, RoleReference, User, merge, merge_all};

use crate::RoleRepository;

/// How soft-deleted roles take part in permission resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SoftDeletedRolePolicy {
    /// Soft-deleted roles contribute nothing.
    #[default]
    Exclude,
    /// Soft-deleted roles still contribute their permissions.
    Include,
}

impl SoftDeletedRolePolicy {
    /// Maps an "include soft-deleted" flag to a policy.
    #[must_use]
    pub fn from_include_flag(include: bool) -> Self {
        if include { Self::Include } else { Self::Exclude }
    }

    fn admits(self, role: &Role) -> bool {
        match self {
            Self::Include => true,
            Self::Exclude => !role.is_deleted(),
        }
    }
}

/// Role resolved from a reference, reduced to what permission callers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRole {
    /// Role identifier.
    pub role_id: RoleId,
    /// Role title.
    pub title: String,
    /// Role permission tree.
    pub permissions: PermissionTree,
}

impl From<Role> for ResolvedRole {
    fn from(role: Role) -> Self {
        Self {
            role_id: role.id(),
            title: role.title().as_str().to_owned(),
            permissions: role.permissions().clone(),
        }
    }
}

/// Role titles and the effective permission tree of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissions {
    /// Titles of contributing roles in resolution order.
    pub roles: Vec<String>,
    /// Role trees folded together with the user override on top.
    pub permissions: PermissionTree,
}

/// Application service resolving role references and effective permissions.
#[derive(Clone)]
pub struct EffectivePermissionService {
    role_repository: Arc<dyn RoleRepository>,
    soft_deleted_policy: SoftDeletedRolePolicy,
}

impl EffectivePermissionService {
    /// Creates a new service from a role repository and resolution policy.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        soft_deleted_policy: SoftDeletedRolePolicy,
    ) -> Self {
        Self {
            role_repository,
            soft_deleted_policy,
        }
    }

    /// Resolves a role reference into concrete roles.
    ///
    /// Identifiers without a stored role are dropped silently. Embedded roles
    /// are used as given without touching the store. A role listed twice is
    /// resolved once, at its first position. Store failures are
    /// returned unchanged.
    pub async fn resolve_roles(
        &self,
        reference: Option<&RoleReference>,
    ) -> AppResult<Vec<ResolvedRole>> {
        let roles = match reference {
            None => Vec::new(),
            Some(reference) if reference.is_empty() => Vec::new(),
            Some(RoleReference::Identifier(role_id)) => {
                let role = self.role_repository.find_by_id(*role_id).await?;
                if role.is_none() {
                    debug!(%role_id, "dropping reference to unknown role");
                }
                role.into_iter().collect()
            }
            Some(RoleReference::Identifiers(role_ids)) => self.find_in_order(role_ids).await?,
            Some(RoleReference::Embedded(role)) => vec![role.as_ref().clone()],
            Some(RoleReference::EmbeddedList(roles)) => first_occurrences(roles),
        };

        Ok(roles
            .into_iter()
            .filter(|role| {
                let admitted = self.soft_deleted_policy.admits(role);
                if !admitted {
                    debug!(role_id = %role.id(), "skipping soft-deleted role");
                }
                admitted
            })
            .map(ResolvedRole::from)
            .collect())
    }

    /// Computes effective permissions for a role reference and user override.
    ///
    /// Role trees are folded in resolution order, then `permissions_override`
    /// is merged on top. Because levels merge by maximum, an override can
    /// raise a role-granted level but never lower it.
    pub async fn compute_effective(
        &self,
        reference: Option<&RoleReference>,
        permissions_override: &PermissionTree,
    ) -> AppResult<PermissionTree> {
        let roles = self.resolve_roles(reference).await?;
        Ok(layer_override(&roles, permissions_override))
    }

    /// Resolves a user's roles and effective permissions in one pass.
    pub async fn effective_for_user(&self, user: &User) -> AppResult<EffectivePermissions> {
        let roles = self.resolve_roles(Some(user.roles())).await?;
        let permissions = layer_override(&roles, user.permissions_override());

        Ok(EffectivePermissions {
            roles: roles.into_iter().map(|role| role.title).collect(),
            permissions,
        })
    }

    async fn find_in_order(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: HashMap<RoleId, Role> = self
            .role_repository
            .find_by_ids(role_ids)
            .await?
            .into_iter()
            .map(|role| (role.id(), role))
            .collect();

        let mut seen = HashSet::with_capacity(role_ids.len());
        let mut roles = Vec::with_capacity(found.len());
        for role_id in role_ids {
            if !seen.insert(*role_id) {
                continue;
            }

            match found.remove(role_id) {
                Some(role) => roles.push(role),
                None => debug!(%role_id, "dropping reference to unknown role"),
            }
        }

        Ok(roles)
    }
}

fn first_occurrences(roles: &[Role]) -> Vec<Role> {
    let mut seen = HashSet::with_capacity(roles.len());
    roles
        .iter()
        .filter(|role| seen.insert(role.id()))
        .cloned()
        .collect()
}

fn layer_override(roles: &[ResolvedRole], permissions_override: &PermissionTree) -> PermissionTree {
    let aggregate = merge_all(roles.iter().map(|role| &role.permissions));
    merge(&aggregate, permissions_override)
}
