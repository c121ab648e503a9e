//! Application services and ports.

#![forbid(unsafe_code)]

mod effective_permission_service;
mod role_ports;
mod role_service;
mod user_ports;
mod user_service;

#[cfg(test)]
mod test_fakes;

pub use effective_permission_service::{
    EffectivePermissionService, EffectivePermissions, ResolvedRole, SoftDeletedRolePolicy,
};
pub use role_ports::{RoleRepository, RoleSearch, RoleSearchPage};
pub use role_service::{
    PageMeta, RegisterRoleInput, RoleListQuery, RoleListingConfig, RolePage, RoleService,
    RoleUpdateOutcome, UpdateRoleInput,
};
pub use user_ports::UserRepository;
pub use user_service::{OverrideUpdateOutcome, RegisterUserInput, UserService};
