use serde::{Deserialize, Serialize};
use tracing::warn;

use campus_core::{AssignmentId, Entity, GradeId, GroupId, PersonId, SubjectId, YearId};

/// The `(subject, grade, year)` key every assignment is filed under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub subject_id: SubjectId,
    pub grade_id: GradeId,
    pub year_id: YearId,
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "subject {} / grade {} / year {}", self.subject_id, self.grade_id, self.year_id)
    }
}

/// A teacher's assignment to a subject in a grade.
///
/// Without a `group_id` the record is a blanket assignment covering every
/// group of the grade; with one it is a specific assignment overriding the
/// blanket for that group only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherAssignment {
    pub id: AssignmentId,
    pub teacher_person_id: PersonId,
    pub subject_id: SubjectId,
    pub grade_id: GradeId,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    pub year_id: YearId,
}

impl TeacherAssignment {
    pub fn blanket(
        id: impl Into<AssignmentId>,
        teacher: impl Into<PersonId>,
        subject: impl Into<SubjectId>,
        grade: impl Into<GradeId>,
        year: impl Into<YearId>,
    ) -> Self {
        Self {
            id: id.into(),
            teacher_person_id: teacher.into(),
            subject_id: subject.into(),
            grade_id: grade.into(),
            group_id: None,
            year_id: year.into(),
        }
    }

    pub fn for_group(mut self, group: impl Into<GroupId>) -> Self {
        self.group_id = Some(group.into());
        self
    }

    /// The group this record is scoped to. A blank group id counts as none.
    pub fn group(&self) -> Option<&GroupId> {
        self.group_id
            .as_ref()
            .filter(|g| !g.as_str().trim().is_empty())
    }

    pub fn is_blanket(&self) -> bool {
        self.group().is_none()
    }

    pub fn scope(&self) -> Scope {
        Scope {
            subject_id: self.subject_id.clone(),
            grade_id: self.grade_id.clone(),
            year_id: self.year_id.clone(),
        }
    }

    pub fn in_scope(&self, scope: &Scope) -> bool {
        self.subject_id == scope.subject_id
            && self.grade_id == scope.grade_id
            && self.year_id == scope.year_id
    }
}

impl Entity for TeacherAssignment {
    type Id = AssignmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Decode a raw assignment listing.
///
/// A non-array payload decodes as an empty list and undecodable elements are
/// skipped, so a half-loaded screen resolves everything as unassigned instead
/// of failing.
pub fn assignments_from_value(value: &serde_json::Value) -> Vec<TeacherAssignment> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!("assignment payload is not an array; using empty listing");
        }
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| match TeacherAssignment::deserialize(item) {
            Ok(a) => Some(a),
            Err(err) => {
                warn!(position, error = %err, "skipping malformed teacher assignment");
                None
            }
        })
        .collect()
}
