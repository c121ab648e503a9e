use serde::{Deserialize, Serialize};

use crate::role::{Role, RoleId};

/// Roles held by a user, either by identifier or as already-loaded records.
///
/// Built explicitly at the persistence or transport boundary; absence of any
/// reference is modelled as `Option::None` by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoleReference {
    /// One role identifier.
    Identifier(RoleId),
    /// Several role identifiers in assignment order.
    Identifiers(Vec<RoleId>),
    /// One embedded role record.
    Embedded(Box<Role>),
    /// Several embedded role records in assignment order.
    EmbeddedList(Vec<Role>),
}

impl RoleReference {
    /// Returns whether the reference points at no role.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Identifier(_) | Self::Embedded(_) => false,
            Self::Identifiers(role_ids) => role_ids.is_empty(),
            Self::EmbeddedList(roles) => roles.is_empty(),
        }
    }
}

impl Default for RoleReference {
    fn default() -> Self {
        Self::Identifiers(Vec::new())
    }
}

impl From<RoleId> for RoleReference {
    fn from(value: RoleId) -> Self {
        Self::Identifier(value)
    }
}

impl From<Vec<RoleId>> for RoleReference {
    fn from(value: Vec<RoleId>) -> Self {
        Self::Identifiers(value)
    }
}

impl From<Role> for RoleReference {
    fn from(value: Role) -> Self {
        Self::Embedded(Box::new(value))
    }
}

impl From<Vec<Role>> for RoleReference {
    fn from(value: Vec<Role>) -> Self {
        Self::EmbeddedList(value)
    }
}
