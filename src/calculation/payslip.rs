//! Payslip calculation.
//!
//! This module turns one employee's attendance, overtime and reimbursement
//! facts into a [`Payslip`] using the flat prorating rules:
//!
//! - every attended day counts as a full day of `hours_per_day` hours
//! - base pay is the monthly salary prorated by days attended over weekdays
//! - overtime is paid at `overtime_multiplier` times the hourly rate
//! - reimbursements are passed through unchanged

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

use crate::config::CalculationConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Attendance, AttendanceBreakdownItem, DatedFact, Employee, Overtime, OvertimeBreakdownItem,
    PayrollPeriod, Payslip, Reimbursement, ReimbursementBreakdownItem,
};

use super::count_weekdays;

/// The facts recorded for one employee, as read from the time-fact store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFacts {
    /// Attendance records.
    pub attendance: Vec<Attendance>,
    /// Overtime records.
    pub overtime: Vec<Overtime>,
    /// Reimbursement records.
    pub reimbursements: Vec<Reimbursement>,
}

/// Everything about a run that is shared by all of its payslips.
#[derive(Debug, Clone, Copy)]
pub struct CalculationContext<'a> {
    /// The period being priced.
    pub period: &'a PayrollPeriod,
    /// Calculation constants.
    pub config: &'a CalculationConfig,
    /// The user who triggered the run.
    pub actor: &'a str,
    /// Timestamp stamped on every generated payslip.
    pub generated_at: DateTime<Utc>,
}

/// Keeps only `employee_id`'s facts dated inside the period, ordered by date.
fn facts_in_period<'f, F: DatedFact>(
    facts: &'f [F],
    employee_id: &str,
    period: &PayrollPeriod,
) -> Vec<&'f F> {
    let range = period.date_range();
    let mut selected: Vec<&F> = facts
        .iter()
        .filter(|f| f.employee_id() == employee_id && range.contains(f.date()))
        .collect();
    selected.sort_by_key(|f| f.date());
    selected
}

fn round_money(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

fn overflow(what: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("arithmetic overflow computing {what}"),
    }
}

fn checked_sum<I>(values: I, what: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| overflow(what))
}

fn to_json<T: Serialize>(items: &[T]) -> EngineResult<String> {
    Ok(serde_json::to_string(items)?)
}

/// Calculates the payslip for one employee in one period.
///
/// # Arguments
///
/// * `employee` - The employee being paid
/// * `facts` - The employee's attendance, overtime and reimbursement facts
/// * `ctx` - The period, constants and audit stamp shared by the run
///
/// # Returns
///
/// The payslip with every context field and breakdown populated, or a
/// `CalculationError` if:
/// - The period contains no weekdays (the hourly rate would be undefined)
/// - `hours_per_day` is not positive
/// - An intermediate value overflows
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{CalculationContext, EmployeeFacts, calculate_payslip};
/// use payroll_engine::config::CalculationConfig;
/// use payroll_engine::models::{Employee, PayrollPeriod};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
///
/// let period = PayrollPeriod::new(2025, 6, "admin").unwrap();
/// let employee = Employee::new("emp_001", "alice", Decimal::new(2_100_000, 0));
/// let config = CalculationConfig::default();
/// let ctx = CalculationContext {
///     period: &period,
///     config: &config,
///     actor: "admin",
///     generated_at: Utc::now(),
/// };
///
/// let payslip = calculate_payslip(&employee, &EmployeeFacts::default(), &ctx).unwrap();
/// assert_eq!(payslip.expected_working_days, 21);
/// assert_eq!(payslip.total_pay, Decimal::ZERO);
/// ```
pub fn calculate_payslip(
    employee: &Employee,
    facts: &EmployeeFacts,
    ctx: &CalculationContext<'_>,
) -> EngineResult<Payslip> {
    let period = ctx.period;
    let config = ctx.config;

    let attendance = facts_in_period(&facts.attendance, &employee.id, period);
    let overtime = facts_in_period(&facts.overtime, &employee.id, period);
    let reimbursements = facts_in_period(&facts.reimbursements, &employee.id, period);

    let days_attended = attendance.len() as u32;
    let total_overtime_hours =
        checked_sum(overtime.iter().map(|o| o.hours_worked), "overtime hours")?;
    let reimbursement_total =
        checked_sum(reimbursements.iter().map(|r| r.amount), "reimbursement total")?;

    let expected_working_days = count_weekdays(period.period_start, period.period_end);
    if expected_working_days == 0 {
        return Err(EngineError::CalculationError {
            message: format!(
                "period {}-{:02} ({} to {}) has no working days",
                period.year, period.month, period.period_start, period.period_end
            ),
        });
    }
    if config.hours_per_day <= Decimal::ZERO {
        return Err(EngineError::CalculationError {
            message: "hours_per_day must be positive".to_string(),
        });
    }

    let expected = Decimal::from(expected_working_days);
    let attended = Decimal::from(days_attended);

    let hourly_rate = employee
        .monthly_salary
        .checked_div(expected)
        .and_then(|daily| daily.checked_div(config.hours_per_day))
        .ok_or_else(|| overflow("hourly rate"))?;
    let overtime_rate_per_hour = hourly_rate
        .checked_mul(config.overtime_multiplier)
        .ok_or_else(|| overflow("overtime rate"))?;

    // salary * attended / expected == (attended / expected) * salary, without
    // the repeating intermediate fraction
    let base_pay = employee
        .monthly_salary
        .checked_mul(attended)
        .and_then(|v| v.checked_div(expected))
        .map(|v| round_money(v, config.money_scale))
        .ok_or_else(|| overflow("base pay"))?;
    let overtime_pay = total_overtime_hours
        .checked_mul(overtime_rate_per_hour)
        .map(|v| round_money(v, config.money_scale))
        .ok_or_else(|| overflow("overtime pay"))?;
    let total_pay = checked_sum([base_pay, overtime_pay, reimbursement_total], "total pay")?;
    let total_hours_worked = attended
        .checked_mul(config.hours_per_day)
        .ok_or_else(|| overflow("hours worked"))?;

    let attendance_items: Vec<AttendanceBreakdownItem> = attendance
        .iter()
        .map(|a| AttendanceBreakdownItem { date: a.date })
        .collect();
    let overtime_items: Vec<OvertimeBreakdownItem> = overtime
        .iter()
        .map(|o| OvertimeBreakdownItem {
            date: o.date,
            hours_worked: o.hours_worked,
        })
        .collect();
    let reimbursement_items: Vec<ReimbursementBreakdownItem> = reimbursements
        .iter()
        .map(|r| ReimbursementBreakdownItem {
            date: r.date,
            amount: r.amount,
            description: r.description.clone(),
        })
        .collect();

    Ok(Payslip {
        id: Uuid::new_v4(),
        employee_id: employee.id.clone(),
        payroll_period_id: period.id,
        month: period.month,
        year: period.year,

        base_pay,
        overtime_pay,
        reimbursement_total,
        total_pay,

        monthly_salary: employee.monthly_salary,
        expected_working_days,
        days_attended,
        hourly_rate,
        overtime_rate_per_hour,
        total_hours_worked,
        total_overtime_hours,

        attendance_breakdown: to_json(&attendance_items)?,
        overtime_breakdown: to_json(&overtime_items)?,
        reimbursement_breakdown: to_json(&reimbursement_items)?,

        created_at: ctx.generated_at,
        created_by: ctx.actor.to_string(),
    })
}
