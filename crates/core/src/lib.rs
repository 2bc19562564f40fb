//! `campus-core`: shared domain vocabulary for the campus policy crates.
//!
//! Identifiers, the academic workflow (years and periods), and the text folding
//! every fuzzy matcher in the workspace relies on. No IO lives here.

pub mod academic;
pub mod entity;
pub mod error;
pub mod id;
pub mod text;
pub mod value_object;

pub use academic::{AcademicPeriod, AcademicYear, PeriodStatus, YearStatus, active_period, period_on};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AssignmentId, GradeId, GroupId, PageId, PeriodId, PersonId, SubjectId, YearId};
pub use text::{contains_folded, fold_key};
pub use value_object::ValueObject;
