//! Payroll period and lifecycle status models.
//!
//! This module contains the [`PayrollPeriod`] record, its [`PayrollStatus`]
//! state machine and the [`PeriodView`] returned to callers.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DateRange;
use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a payroll period.
///
/// Status only ever moves forward one step at a time:
/// `Draft -> Pending -> Processed`. `Processed` is terminal.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayrollStatus;
///
/// assert!(PayrollStatus::Draft.can_transition_to(PayrollStatus::Pending));
/// assert!(!PayrollStatus::Draft.can_transition_to(PayrollStatus::Processed));
/// assert!(!PayrollStatus::Processed.can_transition_to(PayrollStatus::Pending));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Created and still editable; no run has started.
    #[default]
    Draft,
    /// A run has been reserved and is in flight.
    Pending,
    /// Payslips have been committed. Terminal.
    Processed,
}

impl PayrollStatus {
    /// The only status from which `self` may be entered.
    pub fn predecessor(self) -> Option<PayrollStatus> {
        match self {
            PayrollStatus::Draft => None,
            PayrollStatus::Pending => Some(PayrollStatus::Draft),
            PayrollStatus::Processed => Some(PayrollStatus::Pending),
        }
    }

    /// Returns true if moving from `self` to `next` is a legal single step.
    pub fn can_transition_to(self, next: PayrollStatus) -> bool {
        next.predecessor() == Some(self)
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayrollStatus::Draft => write!(f, "draft"),
            PayrollStatus::Pending => write!(f, "pending"),
            PayrollStatus::Processed => write!(f, "processed"),
        }
    }
}

/// Validates a (year, month) pair identifying a payroll period.
pub fn validate_year_month(year: i32, month: u32) -> EngineResult<()> {
    if year <= 0 {
        return Err(EngineError::validation("year", "must be a positive year"));
    }
    if !(1..=12).contains(&month) {
        return Err(EngineError::validation("month", "must be between 1 and 12"));
    }
    Ok(())
}

/// A payroll cycle for one (year, month) with an explicit date range.
///
/// Exactly one period exists per (year, month). The start and end dates
/// default to the calendar month when the period is created and can be
/// narrowed or widened while the period is still a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Surrogate identifier.
    pub id: Uuid,
    /// Period year.
    pub year: i32,
    /// Period month (1-12).
    pub month: u32,
    /// Human-readable name (e.g., "June 2025 payroll").
    pub name: String,
    /// First day counted by the run (inclusive).
    pub period_start: NaiveDate,
    /// Last day counted by the run (inclusive).
    pub period_end: NaiveDate,
    /// Lifecycle status.
    pub status: PayrollStatus,
    /// When the run was reserved.
    pub processed_at: Option<DateTime<Utc>>,
    /// When the period was created.
    pub created_at: DateTime<Utc>,
    /// Who created the period.
    pub created_by: String,
    /// When the period was last changed.
    pub updated_at: DateTime<Utc>,
    /// Who last changed the period.
    pub updated_by: String,
}

impl PayrollPeriod {
    /// Creates a draft period for (year, month) covering the calendar month.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{PayrollPeriod, PayrollStatus};
    /// use chrono::NaiveDate;
    ///
    /// let period = PayrollPeriod::new(2025, 6, "admin").unwrap();
    /// assert_eq!(period.status, PayrollStatus::Draft);
    /// assert_eq!(period.name, "Payroll 2025-06");
    /// assert_eq!(period.period_end, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    /// ```
    pub fn new(year: i32, month: u32, actor: &str) -> EngineResult<Self> {
        validate_year_month(year, month)?;
        let range = DateRange::calendar_month(year, month)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            year,
            month,
            name: format!("Payroll {year}-{month:02}"),
            period_start: range.start(),
            period_end: range.end(),
            status: PayrollStatus::Draft,
            processed_at: None,
            created_at: now,
            created_by: actor.to_string(),
            updated_at: now,
            updated_by: actor.to_string(),
        })
    }

    /// The inclusive range of days this period pays for.
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.period_start, self.period_end)
    }

    /// Moves the period to `next`, stamping the audit fields.
    ///
    /// Fails with [`EngineError::InvalidState`] unless the move is a single
    /// forward step. Entering `Pending` also stamps `processed_at`.
    pub fn transition_to(
        &mut self,
        next: PayrollStatus,
        actor: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidState {
                expected: next.predecessor().unwrap_or(PayrollStatus::Draft),
                actual: self.status,
            });
        }

        if next == PayrollStatus::Pending {
            self.processed_at = Some(now);
        }
        self.status = next;
        self.updated_at = now;
        self.updated_by = actor.to_string();
        Ok(())
    }

    /// Fails with the matching lifecycle error unless the period is a draft.
    pub fn ensure_draft(&self) -> EngineResult<()> {
        match self.status {
            PayrollStatus::Draft => Ok(()),
            PayrollStatus::Pending => Err(EngineError::AlreadyRunning {
                year: self.year,
                month: self.month,
            }),
            PayrollStatus::Processed => Err(EngineError::AlreadyProcessed {
                year: self.year,
                month: self.month,
            }),
        }
    }
}

/// The caller-facing representation of a payroll period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodView {
    /// Period identifier.
    pub id: Uuid,
    /// Period year.
    pub year: i32,
    /// Period month.
    pub month: u32,
    /// Period name.
    pub name: String,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Lifecycle status.
    pub status: PayrollStatus,
    /// When the run was reserved, if it has been.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<&PayrollPeriod> for PeriodView {
    fn from(period: &PayrollPeriod) -> Self {
        Self {
            id: period.id,
            year: period.year,
            month: period.month,
            name: period.name.clone(),
            period_start: period.period_start,
            period_end: period.period_end,
            status: period.status,
            processed_at: period.processed_at,
        }
    }
}
