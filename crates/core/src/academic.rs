//! Academic workflow: years and the periods they are divided into.
//!
//! Both are externally owned lookup records; this crate only reads them.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::DomainError;
use crate::id::{PeriodId, YearId};

// ─────────────────────────────────────────────────────────────────────────────
// Statuses
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle status of an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearStatus {
    #[serde(alias = "activo")]
    Active,
    #[serde(alias = "cerrado")]
    Closed,
    #[serde(alias = "finalizado")]
    Finished,
}

impl YearStatus {
    /// Closed and finished years no longer accept grade changes.
    pub fn is_locked(self) -> bool {
        matches!(self, YearStatus::Closed | YearStatus::Finished)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            YearStatus::Active => "active",
            YearStatus::Closed => "closed",
            YearStatus::Finished => "finished",
        }
    }
}

impl core::fmt::Display for YearStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for YearStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::text::fold_key(s).as_str() {
            "active" | "activo" => Ok(YearStatus::Active),
            "closed" | "cerrado" => Ok(YearStatus::Closed),
            "finished" | "finalizado" => Ok(YearStatus::Finished),
            _ => Err(DomainError::unknown_status("year", s)),
        }
    }
}

/// Lifecycle status of an academic period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "activo")]
    Active,
    #[serde(alias = "cerrado")]
    Closed,
}

impl PeriodStatus {
    pub fn is_active(self) -> bool {
        self == PeriodStatus::Active
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodStatus::Pending => "pending",
            PeriodStatus::Active => "active",
            PeriodStatus::Closed => "closed",
        }
    }
}

impl core::fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::text::fold_key(s).as_str() {
            "pending" | "pendiente" => Ok(PeriodStatus::Pending),
            "active" | "activo" => Ok(PeriodStatus::Active),
            "closed" | "cerrado" => Ok(PeriodStatus::Closed),
            _ => Err(DomainError::unknown_status("period", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// An academic year (e.g. 2026).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicYear {
    pub id: YearId,
    pub year_number: i32,
    pub status: YearStatus,
}

impl Entity for AcademicYear {
    type Id = YearId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A period (term) of an academic year.
///
/// # Invariants
/// - A period belongs to exactly one year (`year_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicPeriod {
    pub id: PeriodId,
    pub year_id: YearId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PeriodStatus,
}

impl AcademicPeriod {
    pub fn belongs_to(&self, year: &AcademicYear) -> bool {
        self.year_id == year.id
    }

    /// Inclusive on both ends. A period whose end precedes its start contains
    /// no dates.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

impl Entity for AcademicPeriod {
    type Id = PeriodId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// The first period marked active, in input order.
pub fn active_period(periods: &[AcademicPeriod]) -> Option<&AcademicPeriod> {
    periods.iter().find(|p| p.status.is_active())
}

/// The first period whose date range contains `date`, in input order.
pub fn period_on(periods: &[AcademicPeriod], date: NaiveDate) -> Option<&AcademicPeriod> {
    periods.iter().find(|p| p.contains(date))
}
