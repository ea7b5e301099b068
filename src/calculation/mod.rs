//! Calculation logic for the payroll engine.
//!
//! This module contains the pure functions that price a payroll period:
//! expected working day detection and per-employee payslip calculation,
//! including prorated base pay, overtime pay and reimbursement pass-through.

mod payslip;
mod working_days;

pub use payslip::{CalculationContext, EmployeeFacts, calculate_payslip};
pub use working_days::{count_weekdays, is_working_day};
