use async_trait::async_trait;

use grantree_core::AppResult;
use grantree_domain::{Role, RoleId};

/// Normalized role search parameters passed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSearch {
    /// Case-insensitive substring matched against title or description.
    pub keyword: Option<String>,
    /// Number of matching roles skipped.
    pub offset: usize,
    /// Maximum roles returned.
    pub limit: usize,
    /// Includes soft-deleted roles when set.
    pub include_deleted: bool,
}

/// One page of roles plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSearchPage {
    /// Roles on the requested page, newest first.
    pub roles: Vec<Role>,
    /// Number of roles matching the search before paging.
    pub total: usize,
}

/// Repository port for role persistence.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds a role by identifier, including soft-deleted roles.
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds every existing role among `role_ids`; unknown ids are skipped.
    async fn find_by_ids(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>>;

    /// Finds a role by exact title, including soft-deleted roles.
    async fn find_by_title(&self, title: &str) -> AppResult<Option<Role>>;

    /// Inserts a new role.
    async fn create_role(&self, role: Role) -> AppResult<()>;

    /// Replaces a stored role.
    async fn save_role(&self, role: Role) -> AppResult<()>;

    /// Searches roles with paging.
    async fn search_roles(&self, search: RoleSearch) -> AppResult<RoleSearchPage>;
}
