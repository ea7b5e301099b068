//! Payslip models.
//!
//! This module contains the persisted [`Payslip`] record, the breakdown item
//! types stored inside it, and the [`PayslipView`] served to employees.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::error::EngineResult;

/// One attended day on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceBreakdownItem {
    /// The attended day.
    pub date: NaiveDate,
}

/// One overtime record on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeBreakdownItem {
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Overtime hours on that day.
    pub hours_worked: Decimal,
}

/// One reimbursement record on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementBreakdownItem {
    /// The day the expense was submitted.
    pub date: NaiveDate,
    /// Reimbursed amount.
    pub amount: Decimal,
    /// Description of the expense.
    pub description: String,
}

/// The persisted, immutable result of pricing one employee for one period.
///
/// Breakdowns are stored as serialized JSON text: they are written once and
/// always read whole, so they are never normalized into rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier for the payslip.
    pub id: Uuid,
    /// The employee who is paid.
    pub employee_id: String,
    /// The period this payslip belongs to.
    pub payroll_period_id: Uuid,
    /// Period month.
    pub month: u32,
    /// Period year.
    pub year: i32,

    /// Prorated salary for the days attended.
    pub base_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Sum of reimbursements in the period.
    pub reimbursement_total: Decimal,
    /// `base_pay + overtime_pay + reimbursement_total`.
    pub total_pay: Decimal,

    /// Monthly salary at the time of the run.
    pub monthly_salary: Decimal,
    /// Weekdays in the period.
    pub expected_working_days: u32,
    /// Days with an attendance record.
    pub days_attended: u32,
    /// Salary per working hour.
    pub hourly_rate: Decimal,
    /// Rate paid per overtime hour.
    pub overtime_rate_per_hour: Decimal,
    /// Flat hours credited for attended days.
    pub total_hours_worked: Decimal,
    /// Sum of overtime hours.
    pub total_overtime_hours: Decimal,

    /// JSON array of [`AttendanceBreakdownItem`].
    pub attendance_breakdown: String,
    /// JSON array of [`OvertimeBreakdownItem`].
    pub overtime_breakdown: String,
    /// JSON array of [`ReimbursementBreakdownItem`].
    pub reimbursement_breakdown: String,

    /// When the payslip was generated.
    pub created_at: DateTime<Utc>,
    /// Who triggered the run that generated it.
    pub created_by: String,
}

fn parse_breakdown<T: DeserializeOwned>(raw: &str) -> EngineResult<Vec<T>> {
    Ok(serde_json::from_str(raw)?)
}

impl Payslip {
    /// Decodes the attendance breakdown.
    pub fn attendance_items(&self) -> EngineResult<Vec<AttendanceBreakdownItem>> {
        parse_breakdown(&self.attendance_breakdown)
    }

    /// Decodes the overtime breakdown.
    pub fn overtime_items(&self) -> EngineResult<Vec<OvertimeBreakdownItem>> {
        parse_breakdown(&self.overtime_breakdown)
    }

    /// Decodes the reimbursement breakdown.
    pub fn reimbursement_items(&self) -> EngineResult<Vec<ReimbursementBreakdownItem>> {
        parse_breakdown(&self.reimbursement_breakdown)
    }

    /// Returns true if the total equals the sum of its components.
    pub fn is_balanced(&self) -> bool {
        self.total_pay == self.base_pay + self.overtime_pay + self.reimbursement_total
    }

    /// Builds the caller-facing view, decoding every breakdown.
    pub fn to_view(&self) -> EngineResult<PayslipView> {
        Ok(PayslipView {
            id: self.id,
            employee_id: self.employee_id.clone(),
            month: self.month,
            year: self.year,
            base_pay: self.base_pay,
            overtime_pay: self.overtime_pay,
            reimbursement_total: self.reimbursement_total,
            total_pay: self.total_pay,
            monthly_salary: self.monthly_salary,
            expected_working_days: self.expected_working_days,
            days_attended: self.days_attended,
            hourly_rate: self.hourly_rate,
            overtime_rate_per_hour: self.overtime_rate_per_hour,
            total_hours_worked: self.total_hours_worked,
            total_overtime_hours: self.total_overtime_hours,
            attendance_breakdown: self.attendance_items()?,
            overtime_breakdown: self.overtime_items()?,
            reimbursement_breakdown: self.reimbursement_items()?,
        })
    }
}

/// A payslip with its breakdowns decoded, as returned to employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipView {
    /// Payslip identifier.
    pub id: Uuid,
    /// The employee who is paid.
    pub employee_id: String,
    /// Period month.
    pub month: u32,
    /// Period year.
    pub year: i32,
    /// Prorated salary for the days attended.
    pub base_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Sum of reimbursements.
    pub reimbursement_total: Decimal,
    /// Grand total.
    pub total_pay: Decimal,
    /// Monthly salary at the time of the run.
    pub monthly_salary: Decimal,
    /// Weekdays in the period.
    pub expected_working_days: u32,
    /// Days with an attendance record.
    pub days_attended: u32,
    /// Salary per working hour.
    pub hourly_rate: Decimal,
    /// Rate paid per overtime hour.
    pub overtime_rate_per_hour: Decimal,
    /// Flat hours credited for attended days.
    pub total_hours_worked: Decimal,
    /// Sum of overtime hours.
    pub total_overtime_hours: Decimal,
    /// Attended days.
    pub attendance_breakdown: Vec<AttendanceBreakdownItem>,
    /// Overtime records.
    pub overtime_breakdown: Vec<OvertimeBreakdownItem>,
    /// Reimbursement records.
    pub reimbursement_breakdown: Vec<ReimbursementBreakdownItem>,
}
