use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use campus_core::{DomainError, ValueObject, fold_key};

/// Coarse role tag.
///
/// Roles are usually *inferred* from permission records (see
/// [`crate::inference`]) and are therefore hints, not authoritative claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Developer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Developer];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Developer => "developer",
        }
    }

    /// Admins and developers bypass workflow locks.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::Developer)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_key(s).as_str() {
            "admin" | "administrador" => Ok(Role::Admin),
            "teacher" | "docente" => Ok(Role::Teacher),
            "developer" | "dev" => Ok(Role::Developer),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Zero or more roles held at the same time. The empty set means least
/// privilege.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl ValueObject for RoleSet {}

impl RoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// First privileged role held, if any (admin before developer).
    pub fn privileged(&self) -> Option<Role> {
        self.iter().find(|r| r.is_privileged())
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged().is_some()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl core::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.iter().map(Role::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
