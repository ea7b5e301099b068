//! Payroll services.
//!
//! [`PayrollService`] is the entry point used by the HTTP layer. It wires
//! together:
//!
//! - [`PeriodRegistry`] for period upserts
//! - [`PayrollRunner`] and [`RunQueue`] for reserving and executing runs
//! - [`PayrollReader`] for payslips and summaries

mod period_registry;
mod queue;
mod reader;
mod runner;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{PayrollSummary, PayslipView, PeriodView};
use crate::store::{PayrollStore, TimeFactStore};

pub use period_registry::{PeriodRegistry, UpsertPeriodRequest};
pub use queue::{RunJob, RunOutcome, RunQueue, RunWorker};
pub use reader::PayrollReader;
pub use runner::{PayrollRunner, RunReport};

/// Facade over every payroll operation.
pub struct PayrollService {
    registry: PeriodRegistry,
    runner: Arc<PayrollRunner>,
    reader: PayrollReader,
    queue: RunQueue,
}

impl PayrollService {
    /// Builds the service and the worker that executes its runs.
    ///
    /// Triggered runs stay queued until the returned [`RunWorker`] is
    /// spawned.
    pub fn new(
        payroll_store: Arc<dyn PayrollStore>,
        fact_store: Arc<dyn TimeFactStore>,
        config: &EngineConfig,
    ) -> (Self, RunWorker) {
        let runner = Arc::new(PayrollRunner::new(
            payroll_store.clone(),
            fact_store.clone(),
            config.calculation.clone(),
        ));
        let (queue, worker) = RunQueue::new(runner.clone(), &config.worker);

        let service = Self {
            registry: PeriodRegistry::new(payroll_store.clone()),
            runner,
            reader: PayrollReader::new(payroll_store, fact_store),
            queue,
        };
        (service, worker)
    }

    /// Creates or edits the period for (year, month).
    pub async fn upsert_period(
        &self,
        year: i32,
        month: u32,
        request: &UpsertPeriodRequest,
        actor: &str,
    ) -> EngineResult<PeriodView> {
        let period = self
            .registry
            .upsert_period(year, month, request, actor)
            .await?;
        Ok(PeriodView::from(&period))
    }

    /// Reserves a run for (year, month) and queues its execution.
    ///
    /// Returns the period as `pending` without waiting for the run.
    pub async fn trigger_run(&self, year: i32, month: u32, actor: &str) -> EngineResult<PeriodView> {
        let period = self.runner.reserve_run(year, month, actor).await?;
        self.queue
            .submit(RunJob {
                period_id: period.id,
                actor: actor.to_string(),
            })
            .await?;

        info!(period_id = %period.id, actor, "Payroll run queued");
        Ok(PeriodView::from(&period))
    }

    /// Returns `employee_id`'s payslip for (year, month).
    pub async fn get_payslip(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<PayslipView> {
        self.reader.get_payslip(employee_id, year, month).await
    }

    /// Returns the summary of a processed period.
    pub async fn get_payroll_summary(&self, year: i32, month: u32) -> EngineResult<PayrollSummary> {
        self.reader.get_payroll_summary(year, month).await
    }

    /// Subscribes to run outcomes.
    pub fn subscribe(&self) -> broadcast::Receiver<RunOutcome> {
        self.queue.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{Attendance, Employee, Overtime, PayrollStatus, Reimbursement};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service(store: &MemoryStore) -> (PayrollService, RunWorker) {
        PayrollService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            &EngineConfig::default(),
        )
    }

    /// Seeds the 22-weekday scenario: 2025-06-02 to 2025-07-01.
    fn seed_reference_scenario(store: &MemoryStore) {
        store
            .add_employee(Employee::new("emp_001", "alice", Decimal::from(2_200_000)))
            .unwrap();
        let weekdays = (0..30)
            .map(|offset| date("2025-06-02") + chrono::Duration::days(offset))
            .filter(|d| crate::calculation::is_working_day(*d))
            .take(20);
        for day in weekdays {
            store
                .record_attendance(Attendance::new("emp_001", day))
                .unwrap();
        }
        store
            .record_overtime(Overtime::new("emp_001", date("2025-06-05"), Decimal::from(2)))
            .unwrap();
        store
            .record_reimbursement(Reimbursement::new(
                "emp_001",
                date("2025-06-12"),
                Decimal::from(100_000),
                "equipment",
            ))
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let store = MemoryStore::new();
        seed_reference_scenario(&store);
        let (service, worker) = service(&store);
        let mut outcomes = service.subscribe();
        worker.spawn();

        let request = UpsertPeriodRequest {
            period_start: Some(date("2025-06-02")),
            period_end: Some(date("2025-07-01")),
            ..Default::default()
        };
        service
            .upsert_period(2025, 6, &request, "admin")
            .await
            .unwrap();

        let view = service.trigger_run(2025, 6, "admin").await.unwrap();
        assert_eq!(view.status, PayrollStatus::Pending);

        let outcome = outcomes.recv().await.unwrap();
        assert!(matches!(outcome, RunOutcome::Completed(_)), "{outcome:?}");

        let payslip = service.get_payslip("emp_001", 2025, 6).await.unwrap();
        assert_eq!(payslip.expected_working_days, 22);
        assert_eq!(payslip.hourly_rate, Decimal::from(12_500));
        assert_eq!(payslip.base_pay, Decimal::from(2_000_000));
        assert_eq!(payslip.overtime_pay, Decimal::from(50_000));
        assert_eq!(payslip.reimbursement_total, Decimal::from(100_000));
        assert_eq!(payslip.total_pay, Decimal::from(2_150_000));

        let summary = service.get_payroll_summary(2025, 6).await.unwrap();
        assert_eq!(summary.total_pay, Decimal::from(2_150_000));

        let err = service.trigger_run(2025, 6, "admin").await.unwrap_err();
        assert!(matches!(err, EngineError::AlreadyProcessed { .. }));
    }

    #[tokio::test]
    async fn test_trigger_while_pending_is_already_running() {
        let store = MemoryStore::new();
        // worker is never spawned, so the period stays pending
        let (service, _worker) = service(&store);
        service
            .upsert_period(2025, 6, &UpsertPeriodRequest::default(), "admin")
            .await
            .unwrap();

        service.trigger_run(2025, 6, "admin").await.unwrap();
        let err = service.trigger_run(2025, 6, "admin").await.unwrap_err();
        assert!(matches!(err, EngineError::AlreadyRunning { .. }));
    }

    #[tokio::test]
    async fn test_trigger_missing_period() {
        let store = MemoryStore::new();
        let (service, _worker) = service(&store);
        let err = service.trigger_run(2025, 6, "admin").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }
}
