//! Payroll summary models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// One employee's line on a payroll summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayslipBrief {
    /// The employee who is paid.
    pub employee_id: String,
    /// Display name of the employee.
    pub employee_name: String,
    /// Prorated salary.
    pub base_pay: Decimal,
    /// Overtime pay.
    pub overtime_pay: Decimal,
    /// Reimbursements.
    pub reimbursement_total: Decimal,
    /// Grand total.
    pub total_pay: Decimal,
}

/// Aggregated totals for a processed payroll period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// The summarized period.
    pub payroll_period_id: Uuid,
    /// Period year.
    pub year: i32,
    /// Period month.
    pub month: u32,
    /// Number of payslips in the period.
    pub employee_count: usize,
    /// Sum of base pay across payslips.
    pub total_base_pay: Decimal,
    /// Sum of overtime pay across payslips.
    pub total_overtime_pay: Decimal,
    /// Sum of reimbursements across payslips.
    pub total_reimbursement: Decimal,
    /// Sum of every payslip total.
    pub total_pay: Decimal,
    /// One brief per payslip, ordered by employee id.
    pub payslips: Vec<EmployeePayslipBrief>,
}

impl PayrollSummary {
    /// Builds a summary, deriving every total from the briefs.
    ///
    /// Fails with `CalculationError` if a total overflows.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{EmployeePayslipBrief, PayrollSummary};
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let brief = EmployeePayslipBrief {
    ///     employee_id: "emp_001".to_string(),
    ///     employee_name: "alice".to_string(),
    ///     base_pay: Decimal::new(100, 0),
    ///     overtime_pay: Decimal::new(20, 0),
    ///     reimbursement_total: Decimal::new(5, 0),
    ///     total_pay: Decimal::new(125, 0),
    /// };
    /// let summary = PayrollSummary::from_briefs(Uuid::new_v4(), 2025, 6, vec![brief]).unwrap();
    /// assert_eq!(summary.total_pay, Decimal::new(125, 0));
    /// assert_eq!(summary.employee_count, 1);
    /// ```
    pub fn from_briefs(
        payroll_period_id: Uuid,
        year: i32,
        month: u32,
        mut payslips: Vec<EmployeePayslipBrief>,
    ) -> EngineResult<Self> {
        payslips.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));

        Ok(Self {
            payroll_period_id,
            year,
            month,
            employee_count: payslips.len(),
            total_base_pay: column_total(&payslips, "base pay", |p| p.base_pay)?,
            total_overtime_pay: column_total(&payslips, "overtime pay", |p| p.overtime_pay)?,
            total_reimbursement: column_total(&payslips, "reimbursements", |p| {
                p.reimbursement_total
            })?,
            total_pay: column_total(&payslips, "total pay", |p| p.total_pay)?,
            payslips,
        })
    }
}

fn column_total(
    payslips: &[EmployeePayslipBrief],
    column: &str,
    value: impl Fn(&EmployeePayslipBrief) -> Decimal,
) -> EngineResult<Decimal> {
    payslips
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(value(p)))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("arithmetic overflow summing {column}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief(id: &str, base: i64, overtime: i64, reimbursement: i64) -> EmployeePayslipBrief {
        EmployeePayslipBrief {
            employee_id: id.to_string(),
            employee_name: format!("name_{id}"),
            base_pay: Decimal::from(base),
            overtime_pay: Decimal::from(overtime),
            reimbursement_total: Decimal::from(reimbursement),
            total_pay: Decimal::from(base + overtime + reimbursement),
        }
    }

    #[test]
    fn test_totals_sum_every_brief() {
        let summary = PayrollSummary::from_briefs(
            Uuid::new_v4(),
            2025,
            6,
            vec![brief("emp_002", 1000, 50, 0), brief("emp_001", 2000, 0, 30)],
        )
        .unwrap();

        assert_eq!(summary.employee_count, 2);
        assert_eq!(summary.total_base_pay, Decimal::from(3000));
        assert_eq!(summary.total_overtime_pay, Decimal::from(50));
        assert_eq!(summary.total_reimbursement, Decimal::from(30));
        assert_eq!(summary.total_pay, Decimal::from(3080));
    }

    #[test]
    fn test_briefs_sorted_by_employee_id() {
        let summary = PayrollSummary::from_briefs(
            Uuid::new_v4(),
            2025,
            6,
            vec![brief("emp_b", 1, 0, 0), brief("emp_a", 1, 0, 0)],
        )
        .unwrap();
        assert_eq!(summary.payslips[0].employee_id, "emp_a");
        assert_eq!(summary.payslips[1].employee_id, "emp_b");
    }

    #[test]
    fn test_empty_summary_has_zero_totals() {
        let summary = PayrollSummary::from_briefs(Uuid::new_v4(), 2025, 6, vec![]).unwrap();
        assert_eq!(summary.employee_count, 0);
        assert_eq!(summary.total_pay, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_total_is_calculation_error() {
        let mut huge = brief("emp_001", 0, 0, 0);
        huge.total_pay = Decimal::MAX;
        let err = PayrollSummary::from_briefs(
            Uuid::new_v4(),
            2025,
            6,
            vec![huge, brief("emp_002", 1, 0, 0)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("total pay"));
    }
}
