use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use campus_core::{AcademicPeriod, PeriodStatus, YearStatus};

use crate::config::{DEFAULT_DELETE_CAPABILITY, DEFAULT_GRADE_EDIT_CAPABILITIES, PolicyConfig};
use crate::inference::RoleInferencer;
use crate::permissions::{Action, CapabilitySet};
use crate::roles::{Role, RoleSet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("academic year is {0}; grades can no longer be edited")]
    YearLocked(YearStatus),

    #[error("period is {0}; only the active period accepts grades")]
    PeriodNotActive(PeriodStatus),

    #[error("forbidden: missing capability '{0}'")]
    Forbidden(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision (audit trail)
// ─────────────────────────────────────────────────────────────────────────────

/// The rule that settled a grade-edit decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DecisionRule {
    /// Admin/developer override, regardless of workflow state.
    PrivilegedRole { role: Role },
    YearLocked { status: YearStatus },
    PeriodNotActive { status: PeriodStatus },
    CapabilityGranted { capability: String },
    MissingCapability { required_any: Vec<String> },
}

/// Explanation of a grade-edit decision.
///
/// Answers "why can't this teacher type grades?" without re-deriving the
/// policy by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeEditDecision {
    pub granted: bool,
    pub rule: DecisionRule,
    pub roles: RoleSet,
    pub year_status: YearStatus,
    pub period_status: Option<PeriodStatus>,
}

impl GradeEditDecision {
    pub fn reason(&self) -> String {
        match &self.rule {
            DecisionRule::PrivilegedRole { role } => {
                format!("role '{role}' may edit grades in any year or period")
            }
            DecisionRule::YearLocked { status } => {
                format!("academic year is {status}")
            }
            DecisionRule::PeriodNotActive { status } => {
                format!("period is {status}, not active")
            }
            DecisionRule::CapabilityGranted { capability } => {
                format!("capability '{capability}' is granted")
            }
            DecisionRule::MissingCapability { required_any } => {
                format!("none of {required_any:?} is granted")
            }
        }
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        match self.rule {
            DecisionRule::PrivilegedRole { .. } | DecisionRule::CapabilityGranted { .. } => Ok(()),
            DecisionRule::YearLocked { status } => Err(AuthzError::YearLocked(status)),
            DecisionRule::PeriodNotActive { status } => Err(AuthzError::PeriodNotActive(status)),
            DecisionRule::MissingCapability { required_any } => Err(AuthzError::Forbidden(
                required_any.into_iter().next().unwrap_or_default(),
            )),
        }
    }
}

fn decide_grade_edit<S: AsRef<str>>(
    year_status: YearStatus,
    period_status: Option<PeriodStatus>,
    roles: &RoleSet,
    capabilities: &CapabilitySet,
    edit_capabilities: &[S],
) -> GradeEditDecision {
    let rule = if let Some(role) = roles.privileged() {
        DecisionRule::PrivilegedRole { role }
    } else if year_status.is_locked() {
        DecisionRule::YearLocked { status: year_status }
    } else if let Some(status) = period_status.filter(|s| !s.is_active()) {
        DecisionRule::PeriodNotActive { status }
    } else {
        match edit_capabilities
            .iter()
            .map(|c| c.as_ref())
            .find(|c| capabilities.grants(c))
        {
            Some(capability) => DecisionRule::CapabilityGranted {
                capability: capability.to_string(),
            },
            None => DecisionRule::MissingCapability {
                required_any: edit_capabilities
                    .iter()
                    .map(|c| c.as_ref().to_string())
                    .collect(),
            },
        }
    };

    let granted = matches!(
        rule,
        DecisionRule::PrivilegedRole { .. } | DecisionRule::CapabilityGranted { .. }
    );
    trace!(granted, year = %year_status, roles = %roles, "grade edit decided");

    GradeEditDecision {
        granted,
        rule,
        roles: roles.clone(),
        year_status,
        period_status,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Default policy (free functions)
// ─────────────────────────────────────────────────────────────────────────────

/// Full explanation of [`can_edit_grades`].
pub fn explain_grade_edit(
    year_status: YearStatus,
    period_status: Option<PeriodStatus>,
    roles: &RoleSet,
    capabilities: &CapabilitySet,
) -> GradeEditDecision {
    decide_grade_edit(
        year_status,
        period_status,
        roles,
        capabilities,
        &DEFAULT_GRADE_EDIT_CAPABILITIES,
    )
}

/// May this actor enter or change grades now?
///
/// 1. admin or developer: always.
/// 2. closed/finished year: never.
/// 3. a known period that is not active: never.
/// 4. otherwise iff one of `edit_grades`, `manage_grades`, `teacher` is granted.
pub fn can_edit_grades(
    year_status: YearStatus,
    period_status: Option<PeriodStatus>,
    roles: &RoleSet,
    capabilities: &CapabilitySet,
) -> bool {
    explain_grade_edit(year_status, period_status, roles, capabilities).granted
}

/// [`can_edit_grades`] as a `Result`.
pub fn authorize_grade_edit(
    year_status: YearStatus,
    period_status: Option<PeriodStatus>,
    roles: &RoleSet,
    capabilities: &CapabilitySet,
) -> Result<(), AuthzError> {
    explain_grade_edit(year_status, period_status, roles, capabilities).into_result()
}

/// Whether the actor may pick a non-active period for grade entry.
pub fn can_override_period(roles: &RoleSet) -> bool {
    roles.is_privileged()
}

pub fn can_delete(roles: &RoleSet, capabilities: &CapabilitySet) -> bool {
    roles.contains(Role::Developer) || capabilities.grants(DEFAULT_DELETE_CAPABILITY)
}

/// Generic page gate: does a record matching `fragment` allow `action`?
pub fn can(capabilities: &CapabilitySet, fragment: &str, action: Action) -> bool {
    capabilities.allows(fragment, action)
}

/// Periods the actor may choose for grade entry: every period for admins and
/// developers, only active ones for everybody else. Input order is kept.
pub fn selectable_periods<'a>(periods: &'a [AcademicPeriod], roles: &RoleSet) -> Vec<&'a AcademicPeriod> {
    let unrestricted = can_override_period(roles);
    periods
        .iter()
        .filter(|p| unrestricted || p.status.is_active())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Configured policy
// ─────────────────────────────────────────────────────────────────────────────

/// Policy bound to a [`PolicyConfig`].
///
/// Same rules as the free functions, but with configurable capability names
/// and role keyword tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    config: PolicyConfig,
}

impl AuthorizationPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn inferencer(&self) -> RoleInferencer {
        RoleInferencer::new(&self.config.role_keywords)
    }

    pub fn explain_grade_edit(
        &self,
        year_status: YearStatus,
        period_status: Option<PeriodStatus>,
        roles: &RoleSet,
        capabilities: &CapabilitySet,
    ) -> GradeEditDecision {
        decide_grade_edit(
            year_status,
            period_status,
            roles,
            capabilities,
            self.config.grade_edit_capabilities.as_slice(),
        )
    }

    pub fn can_edit_grades(
        &self,
        year_status: YearStatus,
        period_status: Option<PeriodStatus>,
        roles: &RoleSet,
        capabilities: &CapabilitySet,
    ) -> bool {
        self.explain_grade_edit(year_status, period_status, roles, capabilities)
            .granted
    }

    pub fn authorize_grade_edit(
        &self,
        year_status: YearStatus,
        period_status: Option<PeriodStatus>,
        roles: &RoleSet,
        capabilities: &CapabilitySet,
    ) -> Result<(), AuthzError> {
        self.explain_grade_edit(year_status, period_status, roles, capabilities)
            .into_result()
    }

    pub fn can_override_period(&self, roles: &RoleSet) -> bool {
        can_override_period(roles)
    }

    pub fn can_delete(&self, roles: &RoleSet, capabilities: &CapabilitySet) -> bool {
        roles.contains(Role::Developer) || capabilities.grants(&self.config.delete_capability)
    }

    pub fn authorize_delete(&self, roles: &RoleSet, capabilities: &CapabilitySet) -> Result<(), AuthzError> {
        if self.can_delete(roles, capabilities) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden(self.config.delete_capability.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{PermissionRecord, normalize};

    fn teacher_caps() -> CapabilitySet {
        CapabilitySet::empty().with_grants(["edit_grades"])
    }

    fn roles(list: &[Role]) -> RoleSet {
        list.iter().copied().collect()
    }

    #[test]
    fn teacher_in_open_year_and_active_period() {
        let r = roles(&[Role::Teacher]);
        assert!(can_edit_grades(YearStatus::Active, Some(PeriodStatus::Active), &r, &teacher_caps()));
        assert!(can_edit_grades(YearStatus::Active, None, &r, &teacher_caps()));
    }

    #[test]
    fn locked_year_denies_teacher() {
        let r = roles(&[Role::Teacher]);
        for year in [YearStatus::Closed, YearStatus::Finished] {
            for period in [None, Some(PeriodStatus::Active), Some(PeriodStatus::Closed)] {
                assert!(!can_edit_grades(year, period, &r, &teacher_caps()));
            }
        }
        let decision = explain_grade_edit(YearStatus::Closed, None, &r, &teacher_caps());
        assert_eq!(decision.rule, DecisionRule::YearLocked { status: YearStatus::Closed });
    }

    #[test]
    fn inactive_period_denies_teacher() {
        let r = roles(&[Role::Teacher]);
        for period in [PeriodStatus::Pending, PeriodStatus::Closed] {
            let err = authorize_grade_edit(YearStatus::Active, Some(period), &r, &teacher_caps()).unwrap_err();
            assert_eq!(err, AuthzError::PeriodNotActive(period));
        }
    }

    #[test]
    fn developer_and_admin_override_workflow_state() {
        for role in [Role::Developer, Role::Admin] {
            let r = roles(&[role]);
            let decision = explain_grade_edit(
                YearStatus::Closed,
                Some(PeriodStatus::Closed),
                &r,
                &CapabilitySet::empty(),
            );
            assert!(decision.granted);
            assert_eq!(decision.rule, DecisionRule::PrivilegedRole { role });
        }
    }

    #[test]
    fn no_roles_and_no_capability_is_denied() {
        let err = authorize_grade_edit(
            YearStatus::Active,
            Some(PeriodStatus::Active),
            &RoleSet::empty(),
            &CapabilitySet::empty(),
        )
        .unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("edit_grades".to_string()));
    }

    #[test]
    fn any_listed_capability_suffices() {
        let caps = CapabilitySet::empty().with_grants(["manage_grades"]);
        let decision = explain_grade_edit(YearStatus::Active, None, &RoleSet::empty(), &caps);
        assert!(decision.granted);
        assert_eq!(
            decision.rule,
            DecisionRule::CapabilityGranted { capability: "manage_grades".into() }
        );
        assert!(decision.reason().contains("manage_grades"));
    }

    #[test]
    fn decision_serializes_with_rule_tag() {
        let decision = explain_grade_edit(
            YearStatus::Finished,
            None,
            &roles(&[Role::Teacher]),
            &teacher_caps(),
        );
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["granted"], false);
        assert_eq!(json["rule"]["rule"], "year_locked");
        assert_eq!(json["rule"]["status"], "finished");
        assert_eq!(json["roles"], serde_json::json!(["teacher"]));
    }

    #[test]
    fn period_override_only_for_privileged() {
        assert!(can_override_period(&roles(&[Role::Admin])));
        assert!(can_override_period(&roles(&[Role::Developer, Role::Teacher])));
        assert!(!can_override_period(&roles(&[Role::Teacher])));
        assert!(!can_override_period(&RoleSet::empty()));
    }

    #[test]
    fn delete_requires_developer_or_capability() {
        assert!(can_delete(&roles(&[Role::Developer]), &CapabilitySet::empty()));
        assert!(!can_delete(&roles(&[Role::Admin]), &CapabilitySet::empty()));
        let caps = CapabilitySet::empty().with_grants(["delete_records"]);
        assert!(can_delete(&RoleSet::empty(), &caps));
    }

    #[test]
    fn generic_page_gate() {
        let caps = normalize(&[PermissionRecord::new("1", "Grupos", "/grupos").allow(Action::Create)]);
        assert!(can(&caps, "/grupos", Action::Create));
        assert!(!can(&caps, "/grupos", Action::Delete));
    }

    #[test]
    fn configured_policy_uses_its_capability_names() {
        let config = PolicyConfig {
            grade_edit_capabilities: vec!["registrar_notas".into()],
            delete_capability: "borrar".into(),
            ..PolicyConfig::default()
        };
        let policy = AuthorizationPolicy::new(config);
        let caps = CapabilitySet::empty().with_grants(["registrar_notas", "borrar"]);
        let teacher = roles(&[Role::Teacher]);

        assert!(policy.can_edit_grades(YearStatus::Active, None, &teacher, &caps));
        assert!(!policy.can_edit_grades(YearStatus::Active, None, &teacher, &teacher_caps()));
        assert!(policy.can_delete(&teacher, &caps));
        assert_eq!(
            policy.authorize_delete(&teacher, &teacher_caps()),
            Err(AuthzError::Forbidden("borrar".into()))
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn year() -> impl Strategy<Value = YearStatus> {
            prop::sample::select(vec![YearStatus::Active, YearStatus::Closed, YearStatus::Finished])
        }

        fn period() -> impl Strategy<Value = Option<PeriodStatus>> {
            prop::option::of(prop::sample::select(vec![
                PeriodStatus::Pending,
                PeriodStatus::Active,
                PeriodStatus::Closed,
            ]))
        }

        fn role_set() -> impl Strategy<Value = RoleSet> {
            prop::sample::subsequence(Role::ALL.to_vec(), 0..=3).prop_map(|r| r.into_iter().collect())
        }

        fn caps() -> impl Strategy<Value = CapabilitySet> {
            prop::sample::subsequence(
                vec!["edit_grades", "manage_grades", "teacher", "delete_records", "other"],
                0..=5,
            )
            .prop_map(|tags| CapabilitySet::empty().with_grants(tags))
        }

        proptest! {
            /// Property: developers can always edit grades.
            #[test]
            fn developer_always_edits(y in year(), p in period(), mut r in role_set(), c in caps()) {
                r.insert(Role::Developer);
                prop_assert!(can_edit_grades(y, p, &r, &c));
            }

            /// Property: a locked year denies every non-privileged actor.
            #[test]
            fn locked_year_denies(p in period(), r in role_set(), c in caps(), closed in any::<bool>()) {
                prop_assume!(!r.is_privileged());
                let y = if closed { YearStatus::Closed } else { YearStatus::Finished };
                prop_assert!(!can_edit_grades(y, p, &r, &c));
            }

            /// Property: a known inactive period denies every non-privileged actor.
            #[test]
            fn inactive_period_denies(y in year(), r in role_set(), c in caps(), pending in any::<bool>()) {
                prop_assume!(!r.is_privileged());
                let p = if pending { PeriodStatus::Pending } else { PeriodStatus::Closed };
                prop_assert!(!can_edit_grades(y, Some(p), &r, &c));
            }

            /// Property: the boolean gate and the explanation always agree.
            #[test]
            fn gate_matches_explanation(y in year(), p in period(), r in role_set(), c in caps()) {
                let decision = explain_grade_edit(y, p, &r, &c);
                prop_assert_eq!(can_edit_grades(y, p, &r, &c), decision.granted);
                prop_assert_eq!(authorize_grade_edit(y, p, &r, &c).is_ok(), decision.granted);
            }
        }
    }
}
