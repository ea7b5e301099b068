//! Payroll run orchestration.
//!
//! A run happens in two phases:
//!
//! 1. [`PayrollRunner::reserve_run`] moves a draft period to `pending` under
//!    its row lock and returns immediately.
//! 2. [`PayrollRunner::execute_run`] re-locks the period, prices every
//!    employee and commits all payslips together with the `processed` status.
//!    Any failure rolls the transaction back and leaves the period `pending`.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{CalculationContext, calculate_payslip};
use crate::config::CalculationConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollPeriod, PayrollStatus};
use crate::store::{PayrollStore, TimeFactStore};

/// The result of a committed payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// The processed period.
    pub period_id: Uuid,
    /// Period year.
    pub year: i32,
    /// Period month.
    pub month: u32,
    /// Number of payslips written.
    pub payslip_count: usize,
    /// Sum of every payslip's total pay.
    pub total_pay: Decimal,
    /// Wall-clock time spent inside the run transaction.
    pub duration_us: u64,
}

/// Reserves and executes payroll runs.
pub struct PayrollRunner {
    payroll_store: Arc<dyn PayrollStore>,
    fact_store: Arc<dyn TimeFactStore>,
    config: CalculationConfig,
}

impl PayrollRunner {
    /// Creates a runner reading facts from `fact_store` and writing
    /// periods and payslips to `payroll_store`.
    pub fn new(
        payroll_store: Arc<dyn PayrollStore>,
        fact_store: Arc<dyn TimeFactStore>,
        config: CalculationConfig,
    ) -> Self {
        Self {
            payroll_store,
            fact_store,
            config,
        }
    }

    /// Moves the (year, month) period from `draft` to `pending`.
    ///
    /// The status check and the transition share one row-lock transaction,
    /// so of two concurrent reservations exactly one succeeds.
    pub async fn reserve_run(
        &self,
        year: i32,
        month: u32,
        actor: &str,
    ) -> EngineResult<PayrollPeriod> {
        let period = self
            .payroll_store
            .find_period(year, month)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                resource: format!("payroll period {year}-{month:02}"),
            })?;

        let mut tx = self.payroll_store.lock_period_for_update(period.id).await?;
        let mut period = tx.period().clone();
        period.ensure_draft()?;
        period.transition_to(PayrollStatus::Pending, actor, Utc::now())?;
        tx.stage_period(period);
        let period = tx.commit().await?;

        info!(
            period_id = %period.id,
            year,
            month,
            actor,
            "Payroll run reserved"
        );
        Ok(period)
    }

    /// Prices every employee for a `pending` period and commits the payslips.
    ///
    /// Fails with [`EngineError::InvalidState`] if the period is not
    /// `pending` once the lock is held. Nothing is written on failure.
    pub async fn execute_run(&self, period_id: Uuid, actor: &str) -> EngineResult<RunReport> {
        let started = Instant::now();

        let mut tx = self.payroll_store.lock_period_for_update(period_id).await?;
        let mut period = tx.period().clone();
        if period.status != PayrollStatus::Pending {
            warn!(
                period_id = %period_id,
                status = %period.status,
                "Run found period in unexpected state"
            );
            return Err(EngineError::InvalidState {
                expected: PayrollStatus::Pending,
                actual: period.status,
            });
        }

        let employees = self.fact_store.list_employees().await?;
        let range = period.date_range();
        let generated_at = Utc::now();
        let ctx = CalculationContext {
            period: &period,
            config: &self.config,
            actor,
            generated_at,
        };

        let mut payslips = Vec::with_capacity(employees.len());
        for employee in &employees {
            let facts = self.fact_store.employee_facts(&employee.id, range).await?;
            payslips.push(calculate_payslip(employee, &facts, &ctx)?);
        }

        let payslip_count = payslips.len();
        let total_pay = payslips
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.total_pay))
            .ok_or_else(|| EngineError::CalculationError {
                message: "arithmetic overflow computing run total".to_string(),
            })?;

        period.transition_to(PayrollStatus::Processed, actor, generated_at)?;
        tx.stage_payslips(payslips);
        tx.stage_period(period);
        let period = tx.commit().await?;

        let report = RunReport {
            period_id: period.id,
            year: period.year,
            month: period.month,
            payslip_count,
            total_pay,
            duration_us: started.elapsed().as_micros() as u64,
        };
        info!(
            period_id = %report.period_id,
            employee_count = report.payslip_count,
            total_pay = %report.total_pay,
            duration_us = report.duration_us,
            "Payroll run committed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attendance, Employee, Overtime, Reimbursement};
    use crate::service::{PeriodRegistry, UpsertPeriodRequest};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .add_employee(Employee::new("emp_001", "alice", Decimal::from(2_100_000)))
            .unwrap();
        store
            .add_employee(Employee::new("emp_002", "bob", Decimal::from(4_200_000)))
            .unwrap();
        for day in ["2025-06-02", "2025-06-03", "2025-06-04"] {
            store
                .record_attendance(Attendance::new("emp_001", date(day)))
                .unwrap();
        }
        store
            .record_overtime(Overtime::new("emp_001", date("2025-06-02"), Decimal::from(2)))
            .unwrap();
        store
            .record_reimbursement(Reimbursement::new(
                "emp_002",
                date("2025-06-10"),
                Decimal::from(75_000),
                "travel",
            ))
            .unwrap();
        store
    }

    fn runner(store: &MemoryStore) -> PayrollRunner {
        PayrollRunner::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            CalculationConfig::default(),
        )
    }

    async fn create_period(store: &MemoryStore, request: UpsertPeriodRequest) -> PayrollPeriod {
        PeriodRegistry::new(Arc::new(store.clone()))
            .upsert_period(2025, 6, &request, "admin")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reserve_run_marks_pending() {
        let store = seeded_store();
        create_period(&store, UpsertPeriodRequest::default()).await;

        let period = runner(&store).reserve_run(2025, 6, "admin").await.unwrap();
        assert_eq!(period.status, PayrollStatus::Pending);
        assert!(period.processed_at.is_some());
        assert_eq!(period.updated_by, "admin");
    }

    #[tokio::test]
    async fn test_reserve_run_missing_period() {
        let store = seeded_store();
        let err = runner(&store).reserve_run(2025, 6, "admin").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reserve_run_twice_is_already_running() {
        let store = seeded_store();
        create_period(&store, UpsertPeriodRequest::default()).await;
        let runner = runner(&store);

        runner.reserve_run(2025, 6, "admin").await.unwrap();
        let err = runner.reserve_run(2025, 6, "admin").await.unwrap_err();
        assert!(matches!(err, EngineError::AlreadyRunning { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_reservations_admit_one() {
        let store = seeded_store();
        create_period(&store, UpsertPeriodRequest::default()).await;
        let runner = runner(&store);

        let (a, b) = tokio::join!(
            runner.reserve_run(2025, 6, "first"),
            runner.reserve_run(2025, 6, "second"),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    }

    #[tokio::test]
    async fn test_execute_run_commits_payslips() {
        let store = seeded_store();
        create_period(&store, UpsertPeriodRequest::default()).await;
        let runner = runner(&store);

        let period = runner.reserve_run(2025, 6, "admin").await.unwrap();
        let report = runner.execute_run(period.id, "admin").await.unwrap();
        assert_eq!(report.payslip_count, 2);

        let stored = store.find_period_by_id(period.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PayrollStatus::Processed);

        let payslips = store.list_payslips(period.id).await.unwrap();
        assert_eq!(payslips.len(), 2);
        assert!(payslips.iter().all(|p| p.is_balanced()));
        let sum: Decimal = payslips.iter().map(|p| p.total_pay).sum();
        assert_eq!(report.total_pay, sum);

        // June 2025 has 21 weekdays: 2,100,000 * 3 / 21 = 300,000
        let alice = store
            .find_payslip("emp_001", 2025, 6)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alice.base_pay, Decimal::from(300_000));
        assert_eq!(alice.overtime_pay, Decimal::from(50_000));

        let bob = store
            .find_payslip("emp_002", 2025, 6)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bob.base_pay, Decimal::ZERO);
        assert_eq!(bob.total_pay, Decimal::from(75_000));
    }

    #[tokio::test]
    async fn test_execute_run_on_processed_period_is_invalid_state() {
        let store = seeded_store();
        create_period(&store, UpsertPeriodRequest::default()).await;
        let runner = runner(&store);

        let period = runner.reserve_run(2025, 6, "admin").await.unwrap();
        runner.execute_run(period.id, "admin").await.unwrap();

        let err = runner.execute_run(period.id, "admin").await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidState {
                expected: PayrollStatus::Pending,
                actual: PayrollStatus::Processed,
            }
        ));
        assert_eq!(store.list_payslips(period.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_execute_run_on_draft_period_is_invalid_state() {
        let store = seeded_store();
        let period = create_period(&store, UpsertPeriodRequest::default()).await;

        let err = runner(&store)
            .execute_run(period.id, "admin")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidState {
                actual: PayrollStatus::Draft,
                ..
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_executions_commit_once() {
        let store = seeded_store();
        create_period(&store, UpsertPeriodRequest::default()).await;
        let runner = Arc::new(runner(&store));
        let period_id = runner.reserve_run(2025, 6, "admin").await.unwrap().id;

        let first = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.execute_run(period_id, "admin").await })
        };
        let second = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.execute_run(period_id, "admin").await })
        };
        let results = [first.await.unwrap(), second.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(EngineError::InvalidState {
                actual: PayrollStatus::Processed,
                ..
            })
        )));
        assert_eq!(store.list_payslips(period_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_weekday_period_stays_pending() {
        let store = seeded_store();
        // a Saturday and a Sunday
        let request = UpsertPeriodRequest {
            period_start: Some(date("2025-06-07")),
            period_end: Some(date("2025-06-08")),
            ..Default::default()
        };
        create_period(&store, request).await;
        let runner = runner(&store);

        let period = runner.reserve_run(2025, 6, "admin").await.unwrap();
        let err = runner.execute_run(period.id, "admin").await.unwrap_err();
        assert!(matches!(err, EngineError::CalculationError { .. }));

        let stored = store.find_period_by_id(period.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PayrollStatus::Pending);
        assert!(store.list_payslips(period.id).await.unwrap().is_empty());
    }
}
