//! Inclusive calendar date ranges.

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// An inclusive range of calendar dates.
///
/// The range is normalized on construction: whichever date is earlier
/// becomes the start, so argument order never changes the covered days.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let a = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// let b = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let range = DateRange::new(a, b);
///
/// assert_eq!(range.start(), b);
/// assert_eq!(range.end(), a);
/// assert_eq!(range.len_days(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range covering both dates, inclusive.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Returns the range covering every day of the given calendar month.
    ///
    /// Fails with a validation error if `month` is not in `1..=12` or the
    /// year is outside chrono's supported range.
    pub fn calendar_month(year: i32, month: u32) -> EngineResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            EngineError::validation("month", format!("{year}-{month} is not a valid month"))
        })?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| {
                EngineError::validation("year", format!("{year} is outside the supported range"))
            })?;
        Ok(Self::new(first, last))
    }

    /// The first day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The last day of the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Checks if `date` falls within the range, inclusive of both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered.
    pub fn len_days(&self) -> u32 {
        // the range is normalized, so the difference is never negative
        (self.end - self.start).num_days() as u32 + 1
    }

    /// Iterates over every date in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}
