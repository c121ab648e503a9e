use std::collections::HashMap;
use std::path::Path;

use grantree_application::{
    RegisterRoleInput, RegisterUserInput, RoleListQuery, RoleService, UserService,
};
use grantree_core::{AppError, AppResult};
use grantree_domain::{PermissionTree, RoleId, RoleReference, User};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    roles: Vec<SeedRole>,
    #[serde(default)]
    users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
struct SeedRole {
    key: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    permissions: PermissionTree,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    username: String,
    email: String,
    employee_id: String,
    position: String,
    first_name: String,
    #[serde(default)]
    middle_name: Option<String>,
    last_name: String,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    permissions_override: PermissionTree,
}

impl SeedDocument {
    pub async fn read(path: &Path) -> AppResult<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read seed file '{}': {error}",
                path.display()
            ))
        })?;

        Self::parse(contents.as_str())
    }

    pub fn parse(contents: &str) -> AppResult<Self> {
        serde_json::from_str(contents)
            .map_err(|error| AppError::Validation(format!("invalid seed document: {error}")))
    }

    /// Registers seeded roles and users, returning the created users.
    pub async fn apply(
        self,
        role_service: &RoleService,
        user_service: &UserService,
    ) -> AppResult<Vec<User>> {
        let mut role_ids: HashMap<String, RoleId> = HashMap::with_capacity(self.roles.len());
        for seed_role in self.roles {
            let role = role_service
                .register_role(RegisterRoleInput {
                    title: seed_role.title,
                    description: seed_role.description,
                    permissions: seed_role.permissions,
                })
                .await?;
            if seed_role.deleted {
                role_service.delete_role(role.id()).await?;
            }
            role_ids.insert(seed_role.key, role.id());
        }

        let mut users = Vec::with_capacity(self.users.len());
        for seed_user in self.users {
            let roles = seed_user
                .roles
                .iter()
                .map(|key| {
                    role_ids.get(key).copied().ok_or_else(|| {
                        AppError::Validation(format!(
                            "user '{}' references unknown role key '{key}'",
                            seed_user.username
                        ))
                    })
                })
                .collect::<AppResult<Vec<RoleId>>>()?;

            let user = user_service
                .register_user(RegisterUserInput {
                    username: seed_user.username,
                    email: seed_user.email,
                    employee_id: seed_user.employee_id,
                    position: seed_user.position,
                    first_name: seed_user.first_name,
                    middle_name: seed_user.middle_name,
                    last_name: seed_user.last_name,
                    roles: RoleReference::Identifiers(roles),
                    permissions_override: seed_user.permissions_override,
                })
                .await?;
            users.push(user);
        }

        let active_roles = role_service.list_roles(RoleListQuery::default()).await?;
        info!(
            active_roles = active_roles.meta.total,
            users = users.len(),
            "seed applied"
        );

        Ok(users)
    }
}
