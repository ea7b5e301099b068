//! In-memory store implementation.
//!
//! [`MemoryStore`] implements both [`TimeFactStore`] and [`PayrollStore`]
//! inside one process.
//!
//! ## Limitations
//!
//! - **No persistence**: all state is lost when the process exits
//! - **Single-process only**: row locks are not shared across processes

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use uuid::Uuid;

use super::{PayrollStore, PeriodTransaction, TimeFactStore};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Attendance, DateRange, DatedFact, Employee, Overtime, PayrollPeriod, Payslip, Reimbursement,
};

/// Maximum overtime an employee may record for a single day.
pub const MAX_OVERTIME_HOURS_PER_DAY: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

#[derive(Debug, Default)]
struct StoreState {
    periods: HashMap<Uuid, PayrollPeriod>,
    payslips: Vec<Payslip>,
    employees: Vec<Employee>,
    attendance: Vec<Attendance>,
    overtime: Vec<Overtime>,
    reimbursements: Vec<Reimbursement>,
}

#[derive(Debug, Default)]
struct Inner {
    state: RwLock<StoreState>,
    row_locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

/// Converts a lock poison error to a storage error.
fn poison_err<T>(_: PoisonError<T>) -> EngineError {
    EngineError::storage("lock poisoned")
}

/// Thread-safe in-memory payroll and time-fact store.
///
/// Cloning is cheap; clones share the same state.
///
/// ## Example
///
/// ```
/// use payroll_engine::models::Employee;
/// use payroll_engine::store::MemoryStore;
/// use rust_decimal::Decimal;
///
/// let store = MemoryStore::new();
/// store.add_employee(Employee::new("emp_001", "alice", Decimal::new(2_200_000, 0))).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, StoreState>> {
        self.inner.state.read().map_err(poison_err)
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, StoreState>> {
        self.inner.state.write().map_err(poison_err)
    }

    /// Adds an employee. Fails if the id is already taken.
    pub fn add_employee(&self, employee: Employee) -> EngineResult<()> {
        let mut state = self.write()?;
        if state.employees.iter().any(|e| e.id == employee.id) {
            return Err(EngineError::validation(
                "employee_id",
                format!("employee {} already exists", employee.id),
            ));
        }
        state.employees.push(employee);
        Ok(())
    }

    /// Records attendance. At most one record per employee per day.
    pub fn record_attendance(&self, attendance: Attendance) -> EngineResult<()> {
        let mut state = self.write()?;
        if has_fact_on(&state.attendance, &attendance.employee_id, attendance.date) {
            return Err(EngineError::validation(
                "date",
                format!("attendance already recorded for {}", attendance.date),
            ));
        }
        state.attendance.push(attendance);
        Ok(())
    }

    /// Records overtime. At most one record per employee per day, of more
    /// than zero and at most [`MAX_OVERTIME_HOURS_PER_DAY`] hours.
    pub fn record_overtime(&self, overtime: Overtime) -> EngineResult<()> {
        if overtime.hours_worked <= Decimal::ZERO
            || overtime.hours_worked > MAX_OVERTIME_HOURS_PER_DAY
        {
            return Err(EngineError::validation(
                "hours_worked",
                format!("must be greater than 0 and at most {MAX_OVERTIME_HOURS_PER_DAY}"),
            ));
        }

        let mut state = self.write()?;
        if has_fact_on(&state.overtime, &overtime.employee_id, overtime.date) {
            return Err(EngineError::validation(
                "date",
                format!("overtime already submitted for {}", overtime.date),
            ));
        }
        state.overtime.push(overtime);
        Ok(())
    }

    /// Records a reimbursement. The amount must be positive.
    pub fn record_reimbursement(&self, reimbursement: Reimbursement) -> EngineResult<()> {
        if reimbursement.amount <= Decimal::ZERO {
            return Err(EngineError::validation("amount", "must be greater than 0"));
        }
        self.write()?.reimbursements.push(reimbursement);
        Ok(())
    }

    fn row_lock(&self, id: Uuid) -> EngineResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self.inner.row_locks.lock().map_err(poison_err)?;
        Ok(locks.entry(id).or_default().clone())
    }
}

fn has_fact_on<F: DatedFact>(facts: &[F], employee_id: &str, date: chrono::NaiveDate) -> bool {
    facts
        .iter()
        .any(|f| f.employee_id() == employee_id && f.date() == date)
}

fn select_facts<F: DatedFact + Clone>(facts: &[F], employee_id: &str, range: DateRange) -> Vec<F> {
    let mut selected: Vec<F> = facts
        .iter()
        .filter(|f| f.employee_id() == employee_id && range.contains(f.date()))
        .cloned()
        .collect();
    selected.sort_by_key(|f| f.date());
    selected
}

#[async_trait]
impl TimeFactStore for MemoryStore {
    async fn list_employees(&self) -> EngineResult<Vec<Employee>> {
        let mut employees = self.read()?.employees.clone();
        employees.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(employees)
    }

    async fn list_attendance(
        &self,
        employee_id: &str,
        range: DateRange,
    ) -> EngineResult<Vec<Attendance>> {
        Ok(select_facts(&self.read()?.attendance, employee_id, range))
    }

    async fn list_overtime(
        &self,
        employee_id: &str,
        range: DateRange,
    ) -> EngineResult<Vec<Overtime>> {
        Ok(select_facts(&self.read()?.overtime, employee_id, range))
    }

    async fn list_reimbursements(
        &self,
        employee_id: &str,
        range: DateRange,
    ) -> EngineResult<Vec<Reimbursement>> {
        Ok(select_facts(&self.read()?.reimbursements, employee_id, range))
    }
}

#[async_trait]
impl PayrollStore for MemoryStore {
    async fn find_period(&self, year: i32, month: u32) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self
            .read()?
            .periods
            .values()
            .find(|p| p.year == year && p.month == month)
            .cloned())
    }

    async fn find_period_by_id(&self, id: Uuid) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self.read()?.periods.get(&id).cloned())
    }

    async fn insert_period(&self, period: PayrollPeriod) -> EngineResult<PayrollPeriod> {
        let mut state = self.write()?;
        if state
            .periods
            .values()
            .any(|p| p.year == period.year && p.month == period.month)
        {
            return Err(EngineError::storage(format!(
                "period {}-{:02} already exists",
                period.year, period.month
            )));
        }
        state.periods.insert(period.id, period.clone());
        Ok(period)
    }

    async fn lock_period_for_update(&self, id: Uuid) -> EngineResult<Box<dyn PeriodTransaction>> {
        let row_lock = self.row_lock(id)?;
        let guard = row_lock.lock_owned().await;
        debug!(period_id = %id, "Acquired period row lock");

        // read only after the lock is held so the snapshot is current
        let period = self
            .read()?
            .periods
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                resource: format!("payroll period {id}"),
            })?;

        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            guard,
            period,
            staged_period: None,
            staged_payslips: Vec::new(),
        }))
    }

    async fn find_payslip(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Option<Payslip>> {
        Ok(self
            .read()?
            .payslips
            .iter()
            .find(|p| p.employee_id == employee_id && p.year == year && p.month == month)
            .cloned())
    }

    async fn list_payslips(&self, period_id: Uuid) -> EngineResult<Vec<Payslip>> {
        Ok(self
            .read()?
            .payslips
            .iter()
            .filter(|p| p.payroll_period_id == period_id)
            .cloned()
            .collect())
    }
}

struct MemoryTransaction {
    store: MemoryStore,
    guard: OwnedMutexGuard<()>,
    period: PayrollPeriod,
    staged_period: Option<PayrollPeriod>,
    staged_payslips: Vec<Payslip>,
}

#[async_trait]
impl PeriodTransaction for MemoryTransaction {
    fn period(&self) -> &PayrollPeriod {
        &self.period
    }

    fn stage_period(&mut self, period: PayrollPeriod) {
        self.staged_period = Some(period);
    }

    fn stage_payslips(&mut self, payslips: Vec<Payslip>) {
        self.staged_payslips.extend(payslips);
    }

    async fn commit(self: Box<Self>) -> EngineResult<PayrollPeriod> {
        let MemoryTransaction {
            store,
            guard,
            period,
            staged_period,
            staged_payslips,
        } = *self;

        let committed = staged_period.unwrap_or_else(|| period.clone());
        if committed.id != period.id {
            return Err(EngineError::storage(
                "staged period does not match the locked row",
            ));
        }
        if (committed.year, committed.month) != (period.year, period.month) {
            return Err(EngineError::storage("period (year, month) is immutable"));
        }

        let mut state = store.write()?;

        let mut seen: HashSet<(&str, Uuid)> = state
            .payslips
            .iter()
            .map(|p| (p.employee_id.as_str(), p.payroll_period_id))
            .collect();
        for payslip in &staged_payslips {
            if !seen.insert((payslip.employee_id.as_str(), payslip.payroll_period_id)) {
                return Err(EngineError::storage(format!(
                    "duplicate payslip for employee {} in period {}",
                    payslip.employee_id, payslip.payroll_period_id
                )));
            }
        }
        drop(seen);

        let payslip_count = staged_payslips.len();
        state.periods.insert(committed.id, committed.clone());
        state.payslips.extend(staged_payslips);
        drop(state);
        drop(guard);

        debug!(
            period_id = %committed.id,
            status = %committed.status,
            payslip_count,
            "Committed period transaction"
        );
        Ok(committed)
    }
}
