//! Expected working day detection.
//!
//! A working day is any Monday through Friday. Public holidays are not
//! excluded; the count is the raw weekday count of the range.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::DateRange;

/// Returns true if `date` falls on Monday through Friday.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::is_working_day;
/// use chrono::NaiveDate;
///
/// // 2025-06-02 is a Monday, 2025-06-07 a Saturday
/// assert!(is_working_day(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()));
/// assert!(!is_working_day(NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()));
/// ```
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts the weekdays between two dates, inclusive of both.
///
/// The earlier date is always used as the start, so swapping the arguments
/// never changes the result.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::count_weekdays;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// assert_eq!(count_weekdays(start, end), 21);
/// assert_eq!(count_weekdays(end, start), 21);
/// ```
pub fn count_weekdays(a: NaiveDate, b: NaiveDate) -> u32 {
    DateRange::new(a, b)
        .days()
        .filter(|d| is_working_day(*d))
        .count() as u32
}
