//! Pre-flight checks for assignment mutations issued by the UI layer.
//!
//! The backend does not reject duplicate slots, so screens call these before
//! sending a create/update to keep new conflicts from entering the data.

use thiserror::Error;

use campus_core::{AssignmentId, GroupId};

use crate::assignment::{Scope, TeacherAssignment};
use crate::index::AssignmentIndex;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("{scope} already has an all-groups teacher (assignment {existing})")]
    DuplicateBlanket { scope: Scope, existing: AssignmentId },

    #[error("group {group} in {scope} already has a teacher (assignment {existing})")]
    DuplicateGroup {
        scope: Scope,
        group: GroupId,
        existing: AssignmentId,
    },

    #[error("assignment {0} does not exist")]
    UnknownAssignment(AssignmentId),
}

/// Reject a new record that would share a slot with an existing one.
pub fn check_create(index: &AssignmentIndex, candidate: &TeacherAssignment) -> Result<(), AssignmentError> {
    check_slot(index, candidate, None)
}

/// Reject an edit that would move a record into an occupied slot. The record
/// being edited does not count as an occupant.
pub fn check_update(index: &AssignmentIndex, candidate: &TeacherAssignment) -> Result<(), AssignmentError> {
    if !index.records().iter().any(|a| a.id == candidate.id) {
        return Err(AssignmentError::UnknownAssignment(candidate.id.clone()));
    }
    check_slot(index, candidate, Some(&candidate.id))
}

fn check_slot(
    index: &AssignmentIndex,
    candidate: &TeacherAssignment,
    ignore: Option<&AssignmentId>,
) -> Result<(), AssignmentError> {
    let scope = candidate.scope();
    let occupant = index
        .records()
        .iter()
        .filter(|a| Some(&a.id) != ignore)
        .find(|a| a.in_scope(&scope) && a.group() == candidate.group());

    let Some(existing) = occupant else {
        return Ok(());
    };

    Err(match candidate.group() {
        None => AssignmentError::DuplicateBlanket {
            scope,
            existing: existing.id.clone(),
        },
        Some(group) => AssignmentError::DuplicateGroup {
            scope,
            group: group.clone(),
            existing: existing.id.clone(),
        },
    })
}
