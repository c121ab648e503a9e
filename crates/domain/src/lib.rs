//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod permission_tree;
mod role;
mod role_reference;
mod user;

pub use permission_tree::{
    PatchOutcome, PermissionTree, PermissionValue, apply_patch, merge, merge_all,
};
pub use role::{Role, RoleId, RoleUpdate};
pub use role_reference::RoleReference;
pub use user::{
    EmailAddress, NAME_MAX_LENGTH, USERNAME_MAX_LENGTH, User, UserId, UserProfile, Username,
};
