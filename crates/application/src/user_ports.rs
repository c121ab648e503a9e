use async_trait::async_trait;

use grantree_core::AppResult;
use grantree_domain::{User, UserId};

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds a user by normalized username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Finds a user by normalized email address.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Inserts a new user.
    async fn create_user(&self, user: User) -> AppResult<()>;

    /// Replaces a stored user.
    async fn save_user(&self, user: User) -> AppResult<()>;
}
