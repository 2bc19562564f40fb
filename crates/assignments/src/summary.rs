//! Display summaries: "who teaches this subject across the grade".
//!
//! A summary must never list a blanket and a specific record for the same
//! group as two entries. The specific record suppresses the blanket for its
//! group only; groups without an override still show the blanket.

use serde::Serialize;

use campus_core::{GroupId, SubjectId};

use crate::assignment::TeacherAssignment;
use crate::index::{AssignmentIndex, Resolution};

/// Resolution of one group of a grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCoverage<'a> {
    pub group_id: GroupId,
    pub resolution: Resolution<'a>,
}

/// Which groups a summary row stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "groups", rename_all = "snake_case")]
pub enum Covers {
    /// A specific record: exactly this group.
    Group(GroupId),
    /// A blanket record: every group except those with an override.
    AllGroupsExcept(Vec<GroupId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow<'a> {
    pub assignment: &'a TeacherAssignment,
    pub covers: Covers,
}

impl AssignmentIndex {
    /// Per-group resolution for the given groups, in the given order.
    pub fn coverage(&self, subject_id: &SubjectId, groups: &[GroupId]) -> Vec<GroupCoverage<'_>> {
        groups
            .iter()
            .map(|g| GroupCoverage {
                group_id: g.clone(),
                resolution: self.resolve(subject_id, g),
            })
            .collect()
    }

    /// Distinct effective records for a subject over a known list of groups,
    /// in order of first appearance.
    ///
    /// The blanket record appears iff at least one listed group has no
    /// override. No record appears twice.
    pub fn effective_teachers(&self, subject_id: &SubjectId, groups: &[GroupId]) -> Vec<&TeacherAssignment> {
        let mut seen: Vec<usize> = Vec::new();
        for group in groups {
            if let Some(position) = self.position(subject_id, group) {
                if !seen.contains(&position) {
                    seen.push(position);
                }
            }
        }
        seen.into_iter().map(|p| &self.records()[p]).collect()
    }

    /// Summary rows for a subject when the grade's group list is unknown.
    ///
    /// The blanket row (if any) comes first and names the overridden groups it
    /// does not cover; specific rows follow, ordered by group id.
    pub fn subject_summary(&self, subject_id: &SubjectId) -> Vec<SummaryRow<'_>> {
        let specific = self.specific_positions(subject_id);
        let mut rows = Vec::with_capacity(specific.len() + 1);

        if let Some(position) = self.blanket_position(subject_id) {
            rows.push(SummaryRow {
                assignment: &self.records()[position],
                covers: Covers::AllGroupsExcept(specific.keys().map(|g| (*g).clone()).collect()),
            });
        }
        rows.extend(specific.iter().map(|(group, &position)| SummaryRow {
            assignment: &self.records()[position],
            covers: Covers::Group((*group).clone()),
        }));
        rows
    }
}
