use std::collections::HashMap;

use async_trait::async_trait;
use grantree_application::UserRepository;
use grantree_core::{AppError, AppResult};
use grantree_domain::{User, UserId};
use tokio::sync::RwLock;

/// In-memory user repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

fn ensure_unique(users: &HashMap<UserId, User>, user: &User) -> AppResult<()> {
    let clash = users.values().any(|stored| {
        stored.id() != user.id()
            && (stored.username() == user.username() || stored.email() == user.email())
    });

    if clash {
        return Err(AppError::Conflict(format!(
            "username '{}' or email '{}' already in use",
            user.username().as_str(),
            user.email().as_str()
        )));
    }

    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.username().as_str() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email().as_str() == email)
            .cloned())
    }

    async fn create_user(&self, user: User) -> AppResult<()> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.id()) {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                user.id()
            )));
        }
        ensure_unique(&users, &user)?;

        users.insert(user.id(), user);
        Ok(())
    }

    async fn save_user(&self, user: User) -> AppResult<()> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id()) {
            return Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                user.id()
            )));
        }
        ensure_unique(&users, &user)?;

        users.insert(user.id(), user);
        Ok(())
    }
}
