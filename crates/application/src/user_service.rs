//! User management application service.
//!
//! Owns user registration, role assignment, partial updates of the personal
//! permission override and effective permission lookups.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use grantree_core::{AppError, AppResult};
use grantree_domain::{
    EmailAddress, PermissionTree, RoleReference, User, UserId, UserProfile, Username,
};

use crate::{EffectivePermissionService, EffectivePermissions, UserRepository};

/// Input payload for registering a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterUserInput {
    /// Login name.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Employee identifier.
    pub employee_id: String,
    /// Job position.
    pub position: String,
    /// First name.
    pub first_name: String,
    /// Optional middle name.
    pub middle_name: Option<String>,
    /// Last name.
    pub last_name: String,
    /// Initially held roles.
    pub roles: RoleReference,
    /// Initial personal permission override.
    pub permissions_override: PermissionTree,
}

/// Result of patching a user's permission override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideUpdateOutcome {
    /// User after the patch.
    pub user: User,
    /// Whether the patch was non-empty and the user was persisted.
    pub changed: bool,
}

/// Application service for user workflows.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    permissions: EffectivePermissionService,
}

impl UserService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn UserRepository>,
        permissions: EffectivePermissionService,
    ) -> Self {
        Self {
            repository,
            permissions,
        }
    }

    /// Registers a user with a unique username and email.
    pub async fn register_user(&self, input: RegisterUserInput) -> AppResult<User> {
        let username = Username::new(input.username)?;
        let email = EmailAddress::new(input.email)?;
        let profile = UserProfile::new(
            input.employee_id,
            input.position,
            input.first_name,
            input.middle_name,
            input.last_name,
        )?;

        if self
            .repository
            .find_by_username(username.as_str())
            .await?
            .is_some()
            || self
                .repository
                .find_by_email(email.as_str())
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(
                "username or email already in use".to_owned(),
            ));
        }

        let now = Utc::now();
        let mut user = User::new(username, email, profile, now);
        user.assign_roles(input.roles, now);
        user.patch_permissions_override(&input.permissions_override, now);
        self.repository.create_user(user.clone()).await?;

        info!(user_id = %user.id(), username = user.username().as_str(), "registered user");
        Ok(user)
    }

    /// Returns a user by identifier.
    pub async fn get_user(&self, user_id: UserId) -> AppResult<User> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    /// Replaces the roles held by a user.
    pub async fn assign_roles(&self, user_id: UserId, roles: RoleReference) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;
        user.assign_roles(roles, Utc::now());
        self.repository.save_user(user.clone()).await?;

        info!(%user_id, "assigned roles");
        Ok(user)
    }

    /// Deep-merges `patch` into the user's permission override.
    ///
    /// The user is persisted only for a non-empty patch.
    pub async fn update_permissions_override(
        &self,
        user_id: UserId,
        patch: &PermissionTree,
    ) -> AppResult<OverrideUpdateOutcome> {
        let mut user = self.get_user(user_id).await?;
        let changed = user.patch_permissions_override(patch, Utc::now());
        if changed {
            self.repository.save_user(user.clone()).await?;
            info!(%user_id, "updated permission override");
        } else {
            debug!(%user_id, "ignoring empty permission override patch");
        }

        Ok(OverrideUpdateOutcome { user, changed })
    }

    /// Returns role titles and effective permissions for a user.
    pub async fn effective_permissions(&self, user_id: UserId) -> AppResult<EffectivePermissions> {
        let user = self.get_user(user_id).await?;
        self.permissions.effective_for_user(&user).await
    }
}

#[cfg(test)]
mod tests;
