//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod date_range;
mod employee;
mod payroll_period;
mod payslip;
mod summary;
mod time_fact;

pub use date_range::DateRange;
pub use employee::Employee;
pub use payroll_period::{PayrollPeriod, PayrollStatus, PeriodView, validate_year_month};
pub use payslip::{
    AttendanceBreakdownItem, OvertimeBreakdownItem, Payslip, PayslipView,
    ReimbursementBreakdownItem,
};
pub use summary::{EmployeePayslipBrief, PayrollSummary};
pub use time_fact::{Attendance, DatedFact, Overtime, Reimbursement};
