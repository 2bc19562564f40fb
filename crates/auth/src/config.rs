//! Policy configuration: keyword tables for role inference and the capability
//! names the authorization rules look for.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields
//! the standard policy.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roles::Role;

/// Capability names that let a non-privileged actor edit grades.
pub const DEFAULT_GRADE_EDIT_CAPABILITIES: [&str; 3] = ["edit_grades", "manage_grades", "teacher"];

/// Capability name that lets a non-developer delete records.
pub const DEFAULT_DELETE_CAPABILITY: &str = "delete_records";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid policy config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("blank keyword in the {role} keyword table")]
    BlankKeyword { role: Role },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Keywords matched against permission routes and names, per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleKeywords {
    pub admin: Vec<String>,
    pub teacher: Vec<String>,
    pub developer: Vec<String>,
}

impl Default for RoleKeywords {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        Self {
            admin: owned(&["admin", "usuario", "permiso"]),
            teacher: owned(&["nota", "calificacion", "boletin", "docente"]),
            developer: owned(&["developer", "dev"]),
        }
    }
}

impl RoleKeywords {
    pub fn for_role(&self, role: Role) -> &[String] {
        match role {
            Role::Admin => &self.admin,
            Role::Teacher => &self.teacher,
            Role::Developer => &self.developer,
        }
    }
}

/// Tunable policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub role_keywords: RoleKeywords,
    pub grade_edit_capabilities: Vec<String>,
    pub delete_capability: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            role_keywords: RoleKeywords::default(),
            grade_edit_capabilities: DEFAULT_GRADE_EDIT_CAPABILITIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            delete_capability: DEFAULT_DELETE_CAPABILITY.to_string(),
        }
    }
}

impl PolicyConfig {
    /// Decode and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PolicyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, decode and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading policy config {}", path.display()))?;
        let config = Self::from_json_str(&raw)
            .with_context(|| format!("decoding policy config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "policy config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for role in Role::ALL {
            if self
                .role_keywords
                .for_role(role)
                .iter()
                .any(|k| k.trim().is_empty())
            {
                return Err(ConfigError::BlankKeyword { role });
            }
        }
        if self.grade_edit_capabilities.iter().all(|c| c.trim().is_empty()) {
            return Err(ConfigError::Empty("grade_edit_capabilities"));
        }
        if self.delete_capability.trim().is_empty() {
            return Err(ConfigError::Empty("delete_capability"));
        }
        Ok(())
    }
}
