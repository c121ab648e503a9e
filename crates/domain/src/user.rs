//! User domain types and validation rules.

use chrono::{DateTime, Utc};
use grantree_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission_tree::{PermissionTree, apply_patch};
use crate::role_reference::RoleReference;

/// Maximum length of each person name part.
pub const NAME_MAX_LENGTH: usize = 50;

/// Maximum username length.
pub const USERNAME_MAX_LENGTH: usize = 30;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Lowercased login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Creates a trimmed, lowercased username of 1 to 30 characters.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();
        let char_count = normalized.chars().count();

        if char_count == 0 {
            return Err(AppError::Validation(
                "username must not be empty".to_owned(),
            ));
        }

        if char_count > USERNAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "username must not exceed {USERNAME_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized username.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Employee profile attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    employee_id: NonEmptyString,
    position: NonEmptyString,
    first_name: NonEmptyString,
    middle_name: Option<String>,
    last_name: NonEmptyString,
}

impl UserProfile {
    /// Creates a validated profile.
    pub fn new(
        employee_id: impl Into<String>,
        position: impl Into<String>,
        first_name: impl Into<String>,
        middle_name: Option<String>,
        last_name: impl Into<String>,
    ) -> AppResult<Self> {
        let first_name = NonEmptyString::new(first_name)?;
        let last_name = NonEmptyString::new(last_name)?;
        let middle_name = middle_name.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        for (field, value) in [
            ("first_name", Some(first_name.as_str())),
            ("middle_name", middle_name.as_deref()),
            ("last_name", Some(last_name.as_str())),
        ] {
            if value.is_some_and(|name| name.chars().count() > NAME_MAX_LENGTH) {
                return Err(AppError::Validation(format!(
                    "{field} must not exceed {NAME_MAX_LENGTH} characters"
                )));
            }
        }

        Ok(Self {
            employee_id: NonEmptyString::new(employee_id)?,
            position: NonEmptyString::new(position)?,
            first_name,
            middle_name,
            last_name,
        })
    }

    /// Returns the employee identifier.
    #[must_use]
    pub fn employee_id(&self) -> &NonEmptyString {
        &self.employee_id
    }

    /// Returns the job position.
    #[must_use]
    pub fn position(&self) -> &NonEmptyString {
        &self.position
    }

    /// Returns the first name.
    #[must_use]
    pub fn first_name(&self) -> &NonEmptyString {
        &self.first_name
    }

    /// Returns the optional middle name.
    #[must_use]
    pub fn middle_name(&self) -> Option<&str> {
        self.middle_name.as_deref()
    }

    /// Returns the last name.
    #[must_use]
    pub fn last_name(&self) -> &NonEmptyString {
        &self.last_name
    }
}

/// User record holding role references and a personal permission override.
///
/// Effective permissions are never stored on the user; they are derived from
/// the current role state each time they are needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    profile: UserProfile,
    #[serde(default)]
    roles: RoleReference,
    #[serde(default)]
    permissions_override: PermissionTree,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user without roles and with an empty override.
    #[must_use]
    pub fn new(
        username: Username,
        email: EmailAddress,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            profile,
            roles: RoleReference::default(),
            permissions_override: PermissionTree::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the profile.
    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Returns the held role reference.
    #[must_use]
    pub fn roles(&self) -> &RoleReference {
        &self.roles
    }

    /// Returns the user-level override tree.
    #[must_use]
    pub fn permissions_override(&self) -> &PermissionTree {
        &self.permissions_override
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the held role reference.
    pub fn assign_roles(&mut self, roles: RoleReference, now: DateTime<Utc>) {
        self.roles = roles;
        self.updated_at = now;
    }

    /// Deep-merges `patch` into the override, returning whether it changed.
    pub fn patch_permissions_override(
        &mut self,
        patch: &PermissionTree,
        now: DateTime<Utc>,
    ) -> bool {
        let outcome = apply_patch(&self.permissions_override, patch);
        if outcome.changed {
            self.permissions_override = outcome.tree;
            self.updated_at = now;
        }

        outcome.changed
    }
}
