//! Assignment index: which teacher record is effective for a group.
//!
//! The raw records are the arena; the index only stores positions into it.
//! Precedence for a `(subject, group)` query:
//!
//! 1. a specific record for that group wins;
//! 2. otherwise the blanket record of the subject;
//! 3. otherwise the group is unassigned.
//!
//! Duplicates in the same slot (two blankets for a scope, or two specific
//! records for the same group) are a data-integrity problem upstream. They are
//! resolved deterministically, the **last** record in input order wins, and
//! reported through [`AssignmentIndex::conflicts`].

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use campus_core::{AssignmentId, GradeId, GroupId, PersonId, SubjectId, YearId};

use crate::assignment::{Scope, TeacherAssignment};

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of resolving a group's teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution<'a> {
    Assigned(&'a TeacherAssignment),
    /// No specific or blanket record applies; render "no teacher assigned".
    Unassigned,
}

impl<'a> Resolution<'a> {
    pub fn assignment(self) -> Option<&'a TeacherAssignment> {
        match self {
            Resolution::Assigned(a) => Some(a),
            Resolution::Unassigned => None,
        }
    }

    pub fn teacher(self) -> Option<&'a PersonId> {
        self.assignment().map(|a| &a.teacher_person_id)
    }

    pub fn is_assigned(self) -> bool {
        matches!(self, Resolution::Assigned(_))
    }

    /// True when the group is covered through a blanket record.
    pub fn is_inherited(self) -> bool {
        self.assignment().is_some_and(TeacherAssignment::is_blanket)
    }
}

impl<'a> From<Option<&'a TeacherAssignment>> for Resolution<'a> {
    fn from(value: Option<&'a TeacherAssignment>) -> Self {
        value.map_or(Resolution::Unassigned, Resolution::Assigned)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conflicts
// ─────────────────────────────────────────────────────────────────────────────

/// Several records competing for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentConflict {
    pub scope: Scope,
    /// `None` for competing blanket records.
    pub group_id: Option<GroupId>,
    /// The record that resolution uses (last in input order).
    pub kept: AssignmentId,
    /// Earlier records for the same slot, in input order.
    pub superseded: Vec<AssignmentId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Index
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct Slot {
    winner: usize,
    superseded: Vec<usize>,
}

impl Slot {
    fn new(position: usize) -> Self {
        Self {
            winner: position,
            superseded: Vec::new(),
        }
    }

    fn replace(&mut self, position: usize) {
        self.superseded.push(self.winner);
        self.winner = position;
    }
}

#[derive(Debug, Clone, Default)]
struct ScopeSlots {
    blanket: Option<Slot>,
    specific: BTreeMap<GroupId, Slot>,
}

/// Derived lookup table over a set of teacher-assignment records.
///
/// Disposable: rebuild it whenever the record set changes. It owns a copy of
/// the records so that resolutions can borrow from it.
#[derive(Debug, Clone, Default)]
pub struct AssignmentIndex {
    records: Vec<TeacherAssignment>,
    scopes: BTreeMap<Scope, ScopeSlots>,
    conflicts: Vec<AssignmentConflict>,
}

impl AssignmentIndex {
    pub fn build(records: impl IntoIterator<Item = TeacherAssignment>) -> Self {
        let records: Vec<TeacherAssignment> = records.into_iter().collect();
        let mut scopes: BTreeMap<Scope, ScopeSlots> = BTreeMap::new();

        for (position, record) in records.iter().enumerate() {
            let slots = scopes.entry(record.scope()).or_default();
            match record.group() {
                None => match slots.blanket.as_mut() {
                    Some(slot) => slot.replace(position),
                    None => slots.blanket = Some(Slot::new(position)),
                },
                Some(group) => {
                    slots
                        .specific
                        .entry(group.clone())
                        .and_modify(|slot| slot.replace(position))
                        .or_insert_with(|| Slot::new(position));
                }
            }
        }

        let conflicts = collect_conflicts(&records, &scopes);
        for conflict in &conflicts {
            warn!(
                scope = %conflict.scope,
                group_id = ?conflict.group_id.as_ref().map(GroupId::as_str),
                kept = %conflict.kept,
                superseded = conflict.superseded.len(),
                "duplicate teacher assignment; last record wins"
            );
        }
        debug!(
            records = records.len(),
            scopes = scopes.len(),
            conflicts = conflicts.len(),
            "assignment index built"
        );

        Self {
            records,
            scopes,
            conflicts,
        }
    }

    /// Index restricted to one grade and year.
    pub fn for_scope<'r>(
        records: impl IntoIterator<Item = &'r TeacherAssignment>,
        grade_id: &GradeId,
        year_id: &YearId,
    ) -> Self {
        Self::build(
            records
                .into_iter()
                .filter(|a| &a.grade_id == grade_id && &a.year_id == year_id)
                .cloned(),
        )
    }

    pub fn records(&self) -> &[TeacherAssignment] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.keys()
    }

    /// Every slot that held more than one record while building.
    pub fn conflicts(&self) -> &[AssignmentConflict] {
        &self.conflicts
    }

    /// Resolve within a fully qualified scope.
    pub fn resolve_in(&self, scope: &Scope, group_id: &GroupId) -> Resolution<'_> {
        self.position_in(scope, group_id)
            .map(|p| &self.records[p])
            .into()
    }

    /// Resolve a `(subject, group)` query across every scope of the subject.
    ///
    /// Meant for an index built per grade and year (see [`Self::for_scope`]).
    /// If the index spans several grades or years, the latest matching record
    /// in input order wins, exactly like [`resolve`] over the same records.
    pub fn resolve(&self, subject_id: &SubjectId, group_id: &GroupId) -> Resolution<'_> {
        self.position(subject_id, group_id)
            .map(|p| &self.records[p])
            .into()
    }

    /// Records held by one teacher, in input order.
    pub fn for_teacher<'a, 'p>(
        &'a self,
        person_id: &'p PersonId,
    ) -> impl Iterator<Item = &'a TeacherAssignment> + use<'a, 'p> {
        self.records
            .iter()
            .filter(move |a| &a.teacher_person_id == person_id)
    }

    pub(crate) fn position_in(&self, scope: &Scope, group_id: &GroupId) -> Option<usize> {
        let slots = self.scopes.get(scope)?;
        slots
            .specific
            .get(group_id)
            .or(slots.blanket.as_ref())
            .map(|slot| slot.winner)
    }

    pub(crate) fn position(&self, subject_id: &SubjectId, group_id: &GroupId) -> Option<usize> {
        let slots: Vec<&ScopeSlots> = self.subject_slots(subject_id).map(|(_, s)| s).collect();
        let specific = slots
            .iter()
            .filter_map(|s| s.specific.get(group_id))
            .map(|slot| slot.winner)
            .max();
        specific.or_else(|| {
            slots
                .iter()
                .filter_map(|s| s.blanket.as_ref())
                .map(|slot| slot.winner)
                .max()
        })
    }

    /// Winning blanket position of a subject (latest across scopes).
    pub(crate) fn blanket_position(&self, subject_id: &SubjectId) -> Option<usize> {
        self.subject_slots(subject_id)
            .filter_map(|(_, s)| s.blanket.as_ref())
            .map(|slot| slot.winner)
            .max()
    }

    /// Winning specific positions of a subject, keyed by group.
    pub(crate) fn specific_positions(&self, subject_id: &SubjectId) -> BTreeMap<&GroupId, usize> {
        let mut winners: BTreeMap<&GroupId, usize> = BTreeMap::new();
        for (_, slots) in self.subject_slots(subject_id) {
            for (group, slot) in &slots.specific {
                let entry = winners.entry(group).or_insert(slot.winner);
                *entry = (*entry).max(slot.winner);
            }
        }
        winners
    }

    fn subject_slots<'a>(
        &'a self,
        subject_id: &SubjectId,
    ) -> impl Iterator<Item = (&'a Scope, &'a ScopeSlots)> {
        self.scopes
            .iter()
            .filter(move |(scope, _)| &scope.subject_id == subject_id)
    }
}

fn collect_conflicts(
    records: &[TeacherAssignment],
    scopes: &BTreeMap<Scope, ScopeSlots>,
) -> Vec<AssignmentConflict> {
    let mut conflicts = Vec::new();
    for (scope, slots) in scopes {
        let blanket = slots.blanket.iter().map(|slot| (None, slot));
        let specific = slots.specific.iter().map(|(g, slot)| (Some(g), slot));
        for (group, slot) in blanket.chain(specific) {
            if slot.superseded.is_empty() {
                continue;
            }
            conflicts.push(AssignmentConflict {
                scope: scope.clone(),
                group_id: group.cloned(),
                kept: records[slot.winner].id.clone(),
                superseded: slot
                    .superseded
                    .iter()
                    .map(|&p| records[p].id.clone())
                    .collect(),
            });
        }
    }
    conflicts
}

/// One-shot resolution over a record slice, without building an index.
///
/// Same precedence and tie-break as [`AssignmentIndex::resolve`].
pub fn resolve<'a>(
    assignments: &'a [TeacherAssignment],
    subject_id: &SubjectId,
    group_id: &GroupId,
) -> Resolution<'a> {
    let for_subject = || assignments.iter().filter(|a| &a.subject_id == subject_id);
    for_subject()
        .filter(|a| a.group() == Some(group_id))
        .last()
        .or_else(|| for_subject().filter(|a| a.is_blanket()).last())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blanket(id: &str, teacher: &str, subject: &str) -> TeacherAssignment {
        TeacherAssignment::blanket(id, teacher, subject, "9", "2026")
    }

    fn specific(id: &str, teacher: &str, subject: &str, group: &str) -> TeacherAssignment {
        blanket(id, teacher, subject).for_group(group)
    }

    fn subject(s: &str) -> SubjectId {
        SubjectId::new(s)
    }

    fn group(g: &str) -> GroupId {
        GroupId::new(g)
    }

    #[test]
    fn specific_overrides_blanket() {
        let index = AssignmentIndex::build(vec![blanket("1", "T1", "M"), specific("2", "T2", "M", "9A")]);

        let r = index.resolve(&subject("M"), &group("9A"));
        assert_eq!(r.teacher(), Some(&PersonId::new("T2")));
        assert!(!r.is_inherited());

        let r = index.resolve(&subject("M"), &group("9B"));
        assert_eq!(r.teacher(), Some(&PersonId::new("T1")));
        assert!(r.is_inherited());

        assert_eq!(index.resolve(&subject("Other"), &group("9A")), Resolution::Unassigned);
        assert!(index.conflicts().is_empty());
    }

    #[test]
    fn order_of_blanket_and_specific_does_not_matter() {
        let index = AssignmentIndex::build(vec![specific("2", "T2", "M", "9A"), blanket("1", "T1", "M")]);
        assert_eq!(index.resolve(&subject("M"), &group("9A")).teacher(), Some(&PersonId::new("T2")));
        assert_eq!(index.resolve(&subject("M"), &group("9B")).teacher(), Some(&PersonId::new("T1")));
    }

    #[test]
    fn only_specific_leaves_other_groups_unassigned() {
        let index = AssignmentIndex::build(vec![specific("2", "T2", "M", "9A")]);
        assert!(index.resolve(&subject("M"), &group("9A")).is_assigned());
        assert!(!index.resolve(&subject("M"), &group("9B")).is_assigned());
    }

    #[test]
    fn empty_index_resolves_nothing() {
        let index = AssignmentIndex::build(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.resolve(&subject("M"), &group("9A")), Resolution::Unassigned);
    }

    #[test]
    fn duplicate_specific_last_wins_and_is_reported() {
        let index = AssignmentIndex::build(vec![
            specific("1", "T1", "M", "9A"),
            blanket("2", "T9", "M"),
            specific("3", "T3", "M", "9A"),
        ]);
        assert_eq!(index.resolve(&subject("M"), &group("9A")).teacher(), Some(&PersonId::new("T3")));

        let conflicts = index.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].group_id, Some(group("9A")));
        assert_eq!(conflicts[0].kept, AssignmentId::new("3"));
        assert_eq!(conflicts[0].superseded, vec![AssignmentId::new("1")]);
    }

    #[test]
    fn duplicate_blanket_last_wins() {
        let index = AssignmentIndex::build(vec![
            blanket("1", "T1", "M"),
            blanket("2", "T2", "M"),
            blanket("3", "T3", "M"),
        ]);
        assert_eq!(index.resolve(&subject("M"), &group("9C")).teacher(), Some(&PersonId::new("T3")));
        assert_eq!(index.conflicts().len(), 1);
        assert_eq!(index.conflicts()[0].group_id, None);
        assert_eq!(
            index.conflicts()[0].superseded,
            vec![AssignmentId::new("1"), AssignmentId::new("2")]
        );
    }

    #[test]
    fn scoped_index_ignores_other_grades_and_years() {
        let records = vec![
            TeacherAssignment::blanket("1", "T1", "M", "9", "2026"),
            TeacherAssignment::blanket("2", "T2", "M", "10", "2026"),
            TeacherAssignment::blanket("3", "T3", "M", "9", "2025"),
        ];
        let index = AssignmentIndex::for_scope(&records, &GradeId::new("9"), &YearId::new("2026"));
        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve(&subject("M"), &group("9A")).teacher(), Some(&PersonId::new("T1")));
        assert!(index.conflicts().is_empty());
    }

    #[test]
    fn resolve_in_uses_the_exact_scope() {
        let records = vec![
            TeacherAssignment::blanket("1", "T1", "M", "9", "2026"),
            TeacherAssignment::blanket("2", "T2", "M", "10", "2026"),
        ];
        let index = AssignmentIndex::build(records.clone());
        assert_eq!(index.resolve_in(&records[0].scope(), &group("9A")).teacher(), Some(&PersonId::new("T1")));
        assert_eq!(index.resolve_in(&records[1].scope(), &group("10A")).teacher(), Some(&PersonId::new("T2")));
        // Same blanket slot in two grades is not a conflict.
        assert!(index.conflicts().is_empty());
        assert_eq!(index.scopes().count(), 2);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn index_is_shareable_across_threads() {
        assert_send_sync::<AssignmentIndex>();
        assert_send_sync::<AssignmentConflict>();

        let index = AssignmentIndex::build(vec![blanket("1", "T1", "M"), specific("2", "T2", "M", "9A")]);
        let teachers: Vec<String> = std::thread::scope(|scope| {
            let workers: Vec<_> = ["9A", "9B"]
                .into_iter()
                .map(|g| {
                    let index = &index;
                    scope.spawn(move || {
                        index
                            .resolve(&subject("M"), &GroupId::new(g))
                            .teacher()
                            .map(|p| p.to_string())
                            .unwrap_or_default()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert_eq!(teachers, ["T2", "T1"]);
    }

    #[test]
    fn teacher_listing_outlives_the_lookup_id() {
        let index = AssignmentIndex::build(vec![blanket("1", "T1", "M"), blanket("2", "T2", "L")]);
        let held: Vec<&TeacherAssignment> = {
            let id = PersonId::new("T2");
            index.for_teacher(&id).collect()
        };
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].id.as_str(), "2");
    }

    #[test]
    fn teacher_listing() {
        let index = AssignmentIndex::build(vec![
            blanket("1", "T1", "M"),
            specific("2", "T2", "M", "9A"),
            blanket("3", "T1", "L"),
        ]);
        let ids: Vec<&str> = index
            .for_teacher(&PersonId::new("T1"))
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn free_function_matches_spec_examples() {
        let records = vec![blanket("A", "T1", "M"), specific("B", "T2", "M", "9A")];
        assert_eq!(resolve(&records, &subject("M"), &group("9A")).assignment(), Some(&records[1]));
        assert_eq!(resolve(&records, &subject("M"), &group("9B")).assignment(), Some(&records[0]));
        assert_eq!(resolve(&records, &subject("Other"), &group("9A")), Resolution::Unassigned);
        assert_eq!(resolve(&[], &subject("M"), &group("9A")), Resolution::Unassigned);
    }

    #[test]
    fn resolution_serializes_with_status_tag() {
        let records = vec![specific("B", "T2", "M", "9A")];
        let json = serde_json::to_value(resolve(&records, &subject("M"), &group("9A"))).unwrap();
        assert_eq!(json["status"], "assigned");
        assert_eq!(json["teacher_person_id"], "T2");

        let json = serde_json::to_value(Resolution::Unassigned).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "unassigned" }));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn record() -> impl Strategy<Value = (String, String, Option<String>)> {
            (
                prop::sample::select(vec!["T1", "T2", "T3", "T4"]).prop_map(str::to_string),
                prop::sample::select(vec!["M", "L"]).prop_map(str::to_string),
                prop::option::of(prop::sample::select(vec!["9A", "9B", "9C"]).prop_map(str::to_string)),
            )
        }

        fn records() -> impl Strategy<Value = Vec<TeacherAssignment>> {
            prop::collection::vec(record(), 0..12).prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (teacher, subject, group))| {
                        let a = TeacherAssignment::blanket(i.to_string(), teacher, subject, "9", "2026");
                        match group {
                            Some(g) => a.for_group(g),
                            None => a,
                        }
                    })
                    .collect()
            })
        }

        proptest! {
            /// Property: the index and the one-shot scan always agree.
            #[test]
            fn index_matches_scan(
                rs in records(),
                s in prop::sample::select(vec!["M", "L", "X"]),
                g in prop::sample::select(vec!["9A", "9B", "9C", "9D"]),
            ) {
                let index = AssignmentIndex::build(rs.clone());
                let (s, g) = (SubjectId::new(s), GroupId::new(g));
                prop_assert_eq!(
                    index.resolve(&s, &g).assignment().map(|a| &a.id),
                    resolve(&rs, &s, &g).assignment().map(|a| &a.id)
                );
            }

            /// Property: a resolved record always matches the query subject and
            /// is either the group's own record or a blanket.
            #[test]
            fn resolution_is_well_formed(
                rs in records(),
                g in prop::sample::select(vec!["9A", "9B", "9C"]),
            ) {
                let index = AssignmentIndex::build(rs);
                let (s, g) = (SubjectId::new("M"), GroupId::new(g));
                if let Some(a) = index.resolve(&s, &g).assignment() {
                    prop_assert_eq!(&a.subject_id, &s);
                    prop_assert!(a.is_blanket() || a.group() == Some(&g));
                }
            }
        }
    }
}
