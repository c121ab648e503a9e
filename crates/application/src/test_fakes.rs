use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use grantree_core::{AppError, AppResult, NonEmptyString};
use grantree_domain::{PermissionTree, Role, RoleId, User, UserId};

use crate::{RoleRepository, RoleSearch, RoleSearchPage, UserRepository};

pub(crate) fn role(title: &str, permissions: PermissionTree) -> Role {
    Role::new(
        NonEmptyString::new(title).unwrap_or_else(|_| unreachable!()),
        None,
        permissions,
        Utc::now(),
    )
}

pub(crate) fn tree(value: serde_json::Value) -> PermissionTree {
    serde_json::from_value(value).unwrap_or_else(|error| panic!("invalid test tree: {error}"))
}

#[derive(Default)]
pub(crate) struct FakeRoleRepository {
    pub(crate) roles: Mutex<Vec<Role>>,
    pub(crate) unavailable: bool,
    pub(crate) lookups: Mutex<usize>,
}

impl FakeRoleRepository {
    pub(crate) fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles: Mutex::new(roles),
            ..Self::default()
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    async fn guard(&self) -> AppResult<()> {
        *self.lookups.lock().await += 1;
        if self.unavailable {
            return Err(AppError::Internal("role store unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.guard().await?;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.id() == role_id)
            .cloned())
    }

    async fn find_by_ids(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        self.guard().await?;
        // Reverse store order so callers cannot rely on it.
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .rev()
            .filter(|role| role_ids.contains(&role.id()))
            .cloned()
            .collect())
    }

    async fn find_by_title(&self, title: &str) -> AppResult<Option<Role>> {
        self.guard().await?;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.title().as_str() == title)
            .cloned())
    }

    async fn create_role(&self, role: Role) -> AppResult<()> {
        self.guard().await?;
        self.roles.lock().await.push(role);
        Ok(())
    }

    async fn save_role(&self, role: Role) -> AppResult<()> {
        self.guard().await?;
        let mut roles = self.roles.lock().await;
        let Some(stored) = roles.iter_mut().find(|stored| stored.id() == role.id()) else {
            return Err(AppError::NotFound(format!("role '{}'", role.id())));
        };
        *stored = role;
        Ok(())
    }

    async fn search_roles(&self, search: RoleSearch) -> AppResult<RoleSearchPage> {
        self.guard().await?;
        let roles = self.roles.lock().await;
        let matching: Vec<Role> = roles
            .iter()
            .rev()
            .filter(|role| search.include_deleted || !role.is_deleted())
            .filter(|role| {
                search.keyword.as_deref().is_none_or(|keyword| {
                    role.title().as_str().contains(keyword) || role.description().contains(keyword)
                })
            })
            .cloned()
            .collect();
        let total = matching.len();

        Ok(RoleSearchPage {
            roles: matching
                .into_iter()
                .skip(search.offset)
                .take(search.limit)
                .collect(),
            total,
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeUserRepository {
    pub(crate) users: Mutex<Vec<User>>,
    pub(crate) saves: Mutex<usize>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.id() == user_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.username().as_str() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email().as_str() == email)
            .cloned())
    }

    async fn create_user(&self, user: User) -> AppResult<()> {
        self.users.lock().await.push(user);
        Ok(())
    }

    async fn save_user(&self, user: User) -> AppResult<()> {
        *self.saves.lock().await += 1;
        let mut users = self.users.lock().await;
        let Some(stored) = users.iter_mut().find(|stored| stored.id() == user.id()) else {
            return Err(AppError::NotFound(format!("user '{}'", user.id())));
        };
        *stored = user;
        Ok(())
    }
}
