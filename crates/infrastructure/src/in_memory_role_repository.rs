use std::collections::HashMap;

use async_trait::async_trait;
use grantree_application::{RoleRepository, RoleSearch, RoleSearchPage};
use grantree_core::{AppError, AppResult};
use grantree_domain::{Role, RoleId};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory role repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    roles: RwLock<HashMap<RoleId, Role>>,
}

impl InMemoryRoleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
        }
    }
}

fn title_taken(roles: &HashMap<RoleId, Role>, role: &Role) -> bool {
    roles.values().any(|stored| {
        stored.id() != role.id() && stored.title().as_str() == role.title().as_str()
    })
}

fn matches_keyword(role: &Role, keyword: &str) -> bool {
    role.title().as_str().to_lowercase().contains(keyword)
        || role.description().to_lowercase().contains(keyword)
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&role_id).cloned())
    }

    async fn find_by_ids(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        Ok(role_ids
            .iter()
            .filter_map(|role_id| roles.get(role_id).cloned())
            .collect())
    }

    async fn find_by_title(&self, title: &str) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .find(|role| role.title().as_str() == title)
            .cloned())
    }

    async fn create_role(&self, role: Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        if roles.contains_key(&role.id()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.id()
            )));
        }

        if title_taken(&roles, &role) {
            return Err(AppError::Conflict(format!(
                "role title '{}' already exists",
                role.title().as_str()
            )));
        }

        debug!(role_id = %role.id(), "inserted role");
        roles.insert(role.id(), role);
        Ok(())
    }

    async fn save_role(&self, role: Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        if !roles.contains_key(&role.id()) {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.id()
            )));
        }

        if title_taken(&roles, &role) {
            return Err(AppError::Conflict(format!(
                "role title '{}' already exists",
                role.title().as_str()
            )));
        }

        roles.insert(role.id(), role);
        Ok(())
    }

    async fn search_roles(&self, search: RoleSearch) -> AppResult<RoleSearchPage> {
        let roles = self.roles.read().await;
        let keyword = search.keyword.map(|keyword| keyword.to_lowercase());

        let mut matching: Vec<&Role> = roles
            .values()
            .filter(|role| search.include_deleted || !role.is_deleted())
            .filter(|role| {
                keyword
                    .as_deref()
                    .is_none_or(|keyword| matches_keyword(role, keyword))
            })
            .collect();
        matching.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| left.title().as_str().cmp(right.title().as_str()))
        });

        let total = matching.len();
        let roles = matching
            .into_iter()
            .skip(search.offset)
            .take(search.limit)
            .cloned()
            .collect();

        Ok(RoleSearchPage { roles, total })
    }
}
