//! Role lifecycle ports and application service.
//!
//! Owns registration, listing, partial updates and soft deletion of roles.
//! Permission updates are deep-merged into the stored tree, so a caller can
//! adjust a single nested flag without resending the whole tree.

mod config;

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use grantree_core::{AppError, AppResult, NonEmptyString};
use grantree_domain::{PermissionTree, Role, RoleId, RoleUpdate};

use crate::RoleRepository;

pub use config::RoleListingConfig;

/// Input payload for registering a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRoleInput {
    /// Unique title; surrounding whitespace is removed.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Initial permission tree.
    pub permissions: PermissionTree,
}

/// Input payload for partially updating a role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Partial tree merged into the stored permissions.
    pub permissions: Option<PermissionTree>,
}

/// Raw role listing parameters as received from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleListQuery {
    /// One-based page number.
    pub page: Option<i64>,
    /// Requested page size.
    pub limit: Option<i64>,
    /// Case-insensitive keyword matched against title or description.
    pub keyword: Option<String>,
    /// Lists soft-deleted roles alongside active ones.
    pub include_deleted: bool,
}

/// Paging metadata for a role listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    /// Number of matching roles.
    pub total: usize,
    /// Returned page number.
    pub page: usize,
    /// Applied page size.
    pub limit: usize,
    /// Number of pages, at least one.
    pub total_pages: usize,
}

/// One page of active roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePage {
    /// Roles on the page, newest first.
    pub data: Vec<Role>,
    /// Paging metadata.
    pub meta: PageMeta,
}

/// Result of a partial role update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleUpdateOutcome {
    /// Stored role after the update.
    pub role: Role,
    /// Whether a non-empty permission patch was applied.
    pub permissions_changed: bool,
}

/// Application service for role lifecycle workflows.
#[derive(Clone)]
pub struct RoleService {
    repository: Arc<dyn RoleRepository>,
    listing: RoleListingConfig,
}

impl RoleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>, listing: RoleListingConfig) -> Self {
        Self {
            repository,
            listing,
        }
    }

    /// Registers a role with a unique title.
    ///
    /// Titles of soft-deleted roles stay reserved.
    pub async fn register_role(&self, input: RegisterRoleInput) -> AppResult<Role> {
        let title = NonEmptyString::new(input.title)
            .map_err(|_| AppError::Validation("role title is required".to_owned()))?;
        self.ensure_title_available(&title, None).await?;

        let role = Role::new(title, input.description, input.permissions, Utc::now());
        self.repository.create_role(role.clone()).await?;

        info!(role_id = %role.id(), title = role.title().as_str(), "registered role");
        Ok(role)
    }

    /// Lists roles with paging and optional keyword search.
    ///
    /// Soft-deleted roles are left out unless the query asks for them.
    pub async fn list_roles(&self, query: RoleListQuery) -> AppResult<RolePage> {
        let (page, search) = self
            .listing
            .normalize(query.page, query.limit, query.keyword, query.include_deleted);
        let limit = search.limit;
        let result = self.repository.search_roles(search).await?;

        Ok(RolePage {
            data: result.roles,
            meta: PageMeta {
                total: result.total,
                page,
                limit,
                total_pages: result.total.div_ceil(limit).max(1),
            },
        })
    }

    /// Returns a role by identifier, including soft-deleted roles.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.repository
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' not found")))
    }

    /// Partially updates a role.
    ///
    /// Permissions are deep-merged into the stored tree; title and description
    /// are overwritten when given.
    pub async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<RoleUpdateOutcome> {
        let title = input
            .title
            .map(NonEmptyString::new)
            .transpose()
            .map_err(|_| AppError::Validation("role title must not be blank".to_owned()))?;
        let update = RoleUpdate {
            title,
            description: input.description,
            permissions: input.permissions,
        };

        if update.is_empty() {
            return Err(AppError::Validation(
                "no data provided for update".to_owned(),
            ));
        }

        let mut role = self.get_role(role_id).await?;
        if let Some(title) = update.title.as_ref()
            && title != role.title()
        {
            self.ensure_title_available(title, Some(role_id)).await?;
        }

        let permissions_changed = role.apply_update(update, Utc::now());
        self.repository.save_role(role.clone()).await?;

        info!(%role_id, permissions_changed, "updated role");
        Ok(RoleUpdateOutcome {
            role,
            permissions_changed,
        })
    }

    /// Soft-deletes a role and returns it.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<Role> {
        let mut role = self.get_role(role_id).await?;
        role.soft_delete(Utc::now());
        self.repository.save_role(role.clone()).await?;

        info!(%role_id, "soft-deleted role");
        Ok(role)
    }

    async fn ensure_title_available(
        &self,
        title: &NonEmptyString,
        owner: Option<RoleId>,
    ) -> AppResult<()> {
        match self.repository.find_by_title(title.as_str()).await? {
            Some(existing) if Some(existing.id()) != owner => Err(AppError::Conflict(format!(
                "role '{}' already exists",
                title.as_str()
            ))),
            _ => Ok(()),
        }
    }
}
