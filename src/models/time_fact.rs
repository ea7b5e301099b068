//! Attendance, overtime and reimbursement facts.
//!
//! Facts are written by the time-tracking collaborators before a run and are
//! read-only while payslips are calculated.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common accessors shared by every fact kind.
pub trait DatedFact {
    /// The employee the fact belongs to.
    fn employee_id(&self) -> &str;
    /// The calendar day the fact is recorded against.
    fn date(&self) -> NaiveDate;
}

/// A day on which the employee checked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee who attended.
    pub employee_id: String,
    /// The attended day.
    pub date: NaiveDate,
    /// Check-in timestamp, if recorded.
    #[serde(default)]
    pub check_in_at: Option<NaiveDateTime>,
    /// Check-out timestamp, if recorded.
    #[serde(default)]
    pub check_out_at: Option<NaiveDateTime>,
}

impl Attendance {
    /// Creates an attendance record for a checked-in day.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date,
            check_in_at: None,
            check_out_at: None,
        }
    }
}

impl DatedFact for Attendance {
    fn employee_id(&self) -> &str {
        &self.employee_id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Extra hours worked on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overtime {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee who worked the overtime.
    pub employee_id: String,
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Number of overtime hours.
    pub hours_worked: Decimal,
}

impl Overtime {
    /// Creates an overtime record.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, hours_worked: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date,
            hours_worked,
        }
    }
}

impl DatedFact for Overtime {
    fn employee_id(&self) -> &str {
        &self.employee_id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// An expense the employee is reimbursed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reimbursement {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee to reimburse.
    pub employee_id: String,
    /// The day the expense was submitted.
    pub date: NaiveDate,
    /// Amount to reimburse.
    pub amount: Decimal,
    /// Free-text description of the expense.
    #[serde(default)]
    pub description: String,
}

impl Reimbursement {
    /// Creates a reimbursement record.
    pub fn new(
        employee_id: impl Into<String>,
        date: NaiveDate,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date,
            amount,
            description: description.into(),
        }
    }
}

impl DatedFact for Reimbursement {
    fn employee_id(&self) -> &str {
        &self.employee_id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    #[test]
    fn test_deserialize_attendance_with_check_times() {
        let json = r#"{
            "id": "0d3c6a52-98f1-4a1e-8f55-3f4a2b1c0d9e",
            "employee_id": "emp_001",
            "date": "2025-06-11",
            "check_in_at": "2025-06-11T09:00:00",
            "check_out_at": "2025-06-11T17:30:00"
        }"#;
        let attendance: Attendance = serde_json::from_str(json).unwrap();
        assert_eq!(attendance.date, day());
        assert_eq!(attendance.check_in_at, Some(datetime("2025-06-11 09:00:00")));
        assert_eq!(attendance.check_out_at, Some(datetime("2025-06-11 17:30:00")));

        let bare: Attendance = serde_json::from_str(
            r#"{"id": "0d3c6a52-98f1-4a1e-8f55-3f4a2b1c0d9e", "employee_id": "emp_001", "date": "2025-06-11"}"#,
        )
        .unwrap();
        assert_eq!(bare.check_in_at, None);
    }

    #[test]
    fn test_dated_fact_accessors() {
        let overtime = Overtime::new("emp_002", day(), Decimal::new(2, 0));
        assert_eq!(overtime.employee_id(), "emp_002");
        assert_eq!(DatedFact::date(&overtime), day());

        let reimbursement = Reimbursement::new("emp_003", day(), Decimal::new(100_000, 0), "taxi");
        assert_eq!(reimbursement.employee_id(), "emp_003");
        assert_eq!(reimbursement.description, "taxi");
    }

    #[test]
    fn test_deserialize_reimbursement_without_description() {
        let json = r#"{
            "id": "6f1c1a38-7f3e-4c55-9d8e-0b8a1d2c3e4f",
            "employee_id": "emp_001",
            "date": "2025-06-05",
            "amount": "100000"
        }"#;
        let reimbursement: Reimbursement = serde_json::from_str(json).unwrap();
        assert_eq!(reimbursement.amount, Decimal::new(100_000, 0));
        assert!(reimbursement.description.is_empty());
    }
}
