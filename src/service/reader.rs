//! Read-only views over committed payroll data.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    EmployeePayslipBrief, PayrollStatus, PayrollSummary, PayslipView, validate_year_month,
};
use crate::store::{PayrollStore, TimeFactStore};

/// Serves payslips and period summaries.
pub struct PayrollReader {
    payroll_store: Arc<dyn PayrollStore>,
    fact_store: Arc<dyn TimeFactStore>,
}

impl PayrollReader {
    /// Creates a reader over the given stores.
    pub fn new(payroll_store: Arc<dyn PayrollStore>, fact_store: Arc<dyn TimeFactStore>) -> Self {
        Self {
            payroll_store,
            fact_store,
        }
    }

    /// Returns `employee_id`'s payslip for (year, month).
    pub async fn get_payslip(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<PayslipView> {
        validate_year_month(year, month)?;

        let payslip = self
            .payroll_store
            .find_payslip(employee_id, year, month)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                resource: format!("payslip for {employee_id} in {year}-{month:02}"),
            })?;
        payslip.to_view()
    }

    /// Returns the totals of a processed period and one brief per payslip.
    pub async fn get_payroll_summary(&self, year: i32, month: u32) -> EngineResult<PayrollSummary> {
        validate_year_month(year, month)?;

        let period = self
            .payroll_store
            .find_period(year, month)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                resource: format!("payroll period {year}-{month:02}"),
            })?;
        if period.status != PayrollStatus::Processed {
            return Err(EngineError::NotProcessed {
                year,
                month,
                status: period.status,
            });
        }

        let names: HashMap<String, String> = self
            .fact_store
            .list_employees()
            .await?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();

        let briefs = self
            .payroll_store
            .list_payslips(period.id)
            .await?
            .into_iter()
            .map(|p| EmployeePayslipBrief {
                employee_name: names.get(&p.employee_id).cloned().unwrap_or_default(),
                employee_id: p.employee_id,
                base_pay: p.base_pay,
                overtime_pay: p.overtime_pay,
                reimbursement_total: p.reimbursement_total,
                total_pay: p.total_pay,
            })
            .collect();

        PayrollSummary::from_briefs(period.id, year, month, briefs)
    }
}
