//! `campus-auth`: pure authorization boundary for the school-administration
//! front end.
//!
//! Permission records go in, booleans (and explanations) come out. This crate
//! is decoupled from HTTP, rendering and storage: every function takes the
//! current snapshot explicitly and nothing is cached across snapshots.

pub mod authorize;
pub mod config;
pub mod context;
pub mod inference;
pub mod permissions;
pub mod roles;

pub use authorize::{
    AuthorizationPolicy, AuthzError, DecisionRule, GradeEditDecision, authorize_grade_edit, can,
    can_delete, can_edit_grades, can_override_period, explain_grade_edit, selectable_periods,
};
pub use config::{ConfigError, PolicyConfig, RoleKeywords};
pub use context::{RoleSource, SessionContext, SnapshotId};
pub use inference::{RoleEvidence, RoleInferencer, classify};
pub use permissions::{
    Action, ActionFlags, CapabilityEntry, CapabilitySet, PermissionRecord, has_capability, normalize,
    normalize_value, records_from_value,
};
pub use roles::{Role, RoleSet};
