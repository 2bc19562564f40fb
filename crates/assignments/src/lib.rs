//! `campus-assignments`: effective-teacher resolution for
//! (subject, grade, group) combinations.
//!
//! Grade entry, group detail and grade reports all ask the same question:
//! "who teaches this subject to this group?". They all go through
//! [`AssignmentIndex`].

pub mod assignment;
pub mod index;
pub mod summary;
pub mod validation;

pub use assignment::{Scope, TeacherAssignment, assignments_from_value};
pub use index::{AssignmentConflict, AssignmentIndex, Resolution, resolve};
pub use summary::{Covers, GroupCoverage, SummaryRow};
pub use validation::{AssignmentError, check_create, check_update};
