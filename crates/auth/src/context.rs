//! Session context: one immutable permission snapshot plus everything derived
//! from it.
//!
//! The context is replaced wholesale on login, logout or permission refresh and
//! never edited in place, so any number of readers can hold a clone while a new
//! one is being built.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use campus_core::{AcademicPeriod, AcademicYear, PeriodStatus, YearStatus};

use crate::authorize::{AuthorizationPolicy, GradeEditDecision, selectable_periods};
use crate::permissions::{Action, CapabilitySet, PermissionRecord, normalize, records_from_value};
use crate::roles::RoleSet;

/// Identity of one permission snapshot, for correlating log events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Where the context's roles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSource {
    /// Derived from permission-record text by keyword tables.
    Inferred,
    /// Stated by the authentication backend.
    Asserted,
}

#[derive(Debug)]
struct Snapshot {
    id: SnapshotId,
    records: Vec<PermissionRecord>,
    capabilities: CapabilitySet,
    roles: RoleSet,
    role_source: RoleSource,
}

/// Immutable resolution context passed by reference into policy checks.
///
/// Cloning is cheap (two `Arc` bumps).
#[derive(Debug, Clone)]
pub struct SessionContext {
    snapshot: Arc<Snapshot>,
    policy: Arc<AuthorizationPolicy>,
}

impl SessionContext {
    /// Context with the default policy and inferred roles.
    pub fn new(records: Vec<PermissionRecord>) -> Self {
        Self::with_policy(records, Arc::new(AuthorizationPolicy::default()))
    }

    /// Context built from a raw JSON payload; malformed input yields an empty
    /// (least-privilege) snapshot.
    pub fn from_value(value: &serde_json::Value) -> Self {
        Self::new(records_from_value(value))
    }

    pub fn with_policy(records: Vec<PermissionRecord>, policy: Arc<AuthorizationPolicy>) -> Self {
        let roles = policy.inferencer().classify(&records);
        Self::assemble(records, roles, RoleSource::Inferred, policy)
    }

    /// Replace inferred roles with roles asserted by the backend.
    pub fn with_asserted_roles(self, roles: RoleSet) -> Self {
        let records = self.snapshot.records.clone();
        Self::assemble(records, roles, RoleSource::Asserted, self.policy)
    }

    /// New snapshot for refreshed permission records.
    ///
    /// Asserted roles survive a refresh; inferred roles are recomputed.
    pub fn refresh(&self, records: Vec<PermissionRecord>) -> Self {
        match self.snapshot.role_source {
            RoleSource::Asserted => Self::assemble(
                records,
                self.snapshot.roles.clone(),
                RoleSource::Asserted,
                Arc::clone(&self.policy),
            ),
            RoleSource::Inferred => Self::with_policy(records, Arc::clone(&self.policy)),
        }
    }

    fn assemble(
        records: Vec<PermissionRecord>,
        roles: RoleSet,
        role_source: RoleSource,
        policy: Arc<AuthorizationPolicy>,
    ) -> Self {
        let snapshot = Snapshot {
            id: SnapshotId::new(),
            capabilities: normalize(&records),
            records,
            roles,
            role_source,
        };
        debug!(
            snapshot_id = %snapshot.id,
            records = snapshot.records.len(),
            roles = %snapshot.roles,
            role_source = ?snapshot.role_source,
            "session context built"
        );
        Self {
            snapshot: Arc::new(snapshot),
            policy,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.snapshot.id
    }

    pub fn records(&self) -> &[PermissionRecord] {
        &self.snapshot.records
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.snapshot.capabilities
    }

    pub fn roles(&self) -> &RoleSet {
        &self.snapshot.roles
    }

    pub fn role_source(&self) -> RoleSource {
        self.snapshot.role_source
    }

    pub fn policy(&self) -> &AuthorizationPolicy {
        &self.policy
    }

    pub fn can(&self, fragment: &str, action: Action) -> bool {
        self.capabilities().allows(fragment, action)
    }

    pub fn explain_grade_edit(
        &self,
        year_status: YearStatus,
        period_status: Option<PeriodStatus>,
    ) -> GradeEditDecision {
        self.policy
            .explain_grade_edit(year_status, period_status, self.roles(), self.capabilities())
    }

    pub fn can_edit_grades(&self, year_status: YearStatus, period_status: Option<PeriodStatus>) -> bool {
        self.explain_grade_edit(year_status, period_status).granted
    }

    /// Grade-edit gate for concrete records. A period from another year is
    /// treated as not active.
    pub fn can_edit_grades_in(&self, year: &AcademicYear, period: Option<&AcademicPeriod>) -> bool {
        let period_status = period.map(|p| {
            if p.belongs_to(year) {
                p.status
            } else {
                PeriodStatus::Closed
            }
        });
        self.can_edit_grades(year.status, period_status)
    }

    pub fn can_override_period(&self) -> bool {
        self.policy.can_override_period(self.roles())
    }

    pub fn can_delete(&self) -> bool {
        self.policy.can_delete(self.roles(), self.capabilities())
    }

    pub fn selectable_periods<'a>(&self, periods: &'a [AcademicPeriod]) -> Vec<&'a AcademicPeriod> {
        selectable_periods(periods, self.roles())
    }
}
