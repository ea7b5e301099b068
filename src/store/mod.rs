//! Storage contracts consumed by the payroll engine.
//!
//! The engine never talks to a database handle directly. Instead every
//! service receives explicit store handles:
//!
//! - [`TimeFactStore`]: read-only access to employees and their attendance,
//!   overtime and reimbursement facts
//! - [`PayrollStore`]: periods and payslips, including the
//!   [`PayrollStore::lock_period_for_update`] transaction that serializes
//!   every status change of a period
//!
//! [`MemoryStore`] implements both for tests, benchmarks and the bundled
//! binary.

mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::calculation::EmployeeFacts;
use crate::error::EngineResult;
use crate::models::{
    Attendance, DateRange, Employee, Overtime, PayrollPeriod, Payslip, Reimbursement,
};

pub use memory::{MAX_OVERTIME_HOURS_PER_DAY, MemoryStore};

/// Read access to employees and their time-tracked facts.
///
/// Every `list_*` method returns records ordered by date.
#[async_trait]
pub trait TimeFactStore: Send + Sync {
    /// Lists every employee to be paid.
    async fn list_employees(&self) -> EngineResult<Vec<Employee>>;

    /// Lists an employee's attendance inside `range`.
    async fn list_attendance(
        &self,
        employee_id: &str,
        range: DateRange,
    ) -> EngineResult<Vec<Attendance>>;

    /// Lists an employee's overtime inside `range`.
    async fn list_overtime(&self, employee_id: &str, range: DateRange)
    -> EngineResult<Vec<Overtime>>;

    /// Lists an employee's reimbursements inside `range`.
    async fn list_reimbursements(
        &self,
        employee_id: &str,
        range: DateRange,
    ) -> EngineResult<Vec<Reimbursement>>;

    /// Loads all three fact kinds for an employee.
    async fn employee_facts(
        &self,
        employee_id: &str,
        range: DateRange,
    ) -> EngineResult<EmployeeFacts> {
        Ok(EmployeeFacts {
            attendance: self.list_attendance(employee_id, range).await?,
            overtime: self.list_overtime(employee_id, range).await?,
            reimbursements: self.list_reimbursements(employee_id, range).await?,
        })
    }
}

/// A write transaction holding the exclusive lock on one period.
///
/// Changes are staged and only become visible on [`commit`](Self::commit).
/// Dropping the transaction without committing discards them and releases
/// the lock.
#[async_trait]
pub trait PeriodTransaction: Send {
    /// The period as read after the lock was acquired.
    fn period(&self) -> &PayrollPeriod;

    /// Stages a replacement for the locked period.
    fn stage_period(&mut self, period: PayrollPeriod);

    /// Stages payslips for bulk insert.
    fn stage_payslips(&mut self, payslips: Vec<Payslip>);

    /// Applies every staged change atomically and releases the lock.
    ///
    /// Returns the period as committed.
    async fn commit(self: Box<Self>) -> EngineResult<PayrollPeriod>;
}

/// Persistence for payroll periods and payslips.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Finds the period for (year, month).
    async fn find_period(&self, year: i32, month: u32) -> EngineResult<Option<PayrollPeriod>>;

    /// Finds a period by id.
    async fn find_period_by_id(&self, id: Uuid) -> EngineResult<Option<PayrollPeriod>>;

    /// Inserts a new period. Fails if (year, month) is already taken.
    async fn insert_period(&self, period: PayrollPeriod) -> EngineResult<PayrollPeriod>;

    /// Opens a transaction holding the write lock on period `id`.
    ///
    /// Waits while another transaction holds the lock. Fails with
    /// `NotFound` if the period does not exist.
    async fn lock_period_for_update(&self, id: Uuid) -> EngineResult<Box<dyn PeriodTransaction>>;

    /// Finds an employee's payslip for (year, month).
    async fn find_payslip(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Option<Payslip>>;

    /// Lists every payslip of a period.
    async fn list_payslips(&self, period_id: Uuid) -> EngineResult<Vec<Payslip>>;
}
