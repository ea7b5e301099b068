//! Payroll period registry.
//!
//! Creates and edits payroll periods. Edits of an existing period run under
//! its row lock, so they cannot interleave with a run reservation.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollPeriod, validate_year_month};
use crate::store::PayrollStore;

/// Optional fields of a period upsert. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpsertPeriodRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New first day of the period.
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    /// New last day of the period.
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
}

impl UpsertPeriodRequest {
    fn apply_to(&self, period: &mut PayrollPeriod) -> EngineResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(EngineError::validation("name", "must not be blank"));
            }
            period.name = name.clone();
        }
        if let Some(start) = self.period_start {
            period.period_start = start;
        }
        if let Some(end) = self.period_end {
            period.period_end = end;
        }

        if period.period_start > period.period_end {
            return Err(EngineError::validation(
                "period_start",
                format!(
                    "{} is after period_end {}",
                    period.period_start, period.period_end
                ),
            ));
        }
        Ok(())
    }
}

/// Creates and updates payroll periods.
pub struct PeriodRegistry {
    store: Arc<dyn PayrollStore>,
}

impl PeriodRegistry {
    /// Creates a registry backed by `store`.
    pub fn new(store: Arc<dyn PayrollStore>) -> Self {
        Self { store }
    }

    /// Creates the period for (year, month) if it is missing, then applies
    /// the supplied fields.
    ///
    /// Existing periods can only be edited while they are drafts. When two
    /// callers create the same period at once, the one whose insert loses
    /// applies its fields as an edit of the winner's period.
    pub async fn upsert_period(
        &self,
        year: i32,
        month: u32,
        request: &UpsertPeriodRequest,
        actor: &str,
    ) -> EngineResult<PayrollPeriod> {
        validate_year_month(year, month)?;

        let Some(existing) = self.store.find_period(year, month).await? else {
            let mut period = PayrollPeriod::new(year, month, actor)?;
            request.apply_to(&mut period)?;
            return match self.store.insert_period(period).await {
                Ok(period) => {
                    info!(
                        period_id = %period.id,
                        year,
                        month,
                        actor,
                        "Created payroll period"
                    );
                    Ok(period)
                }
                // a concurrent upsert created it first; edit that row instead
                Err(err) => match self.store.find_period(year, month).await? {
                    Some(winner) => {
                        debug!(year, month, "Period created concurrently, applying as edit");
                        self.edit_period(winner, request, actor).await
                    }
                    None => Err(err),
                },
            };
        };

        self.edit_period(existing, request, actor).await
    }

    async fn edit_period(
        &self,
        existing: PayrollPeriod,
        request: &UpsertPeriodRequest,
        actor: &str,
    ) -> EngineResult<PayrollPeriod> {
        let mut tx = self.store.lock_period_for_update(existing.id).await?;
        let mut period = tx.period().clone();
        period.ensure_draft()?;
        request.apply_to(&mut period)?;
        period.updated_at = Utc::now();
        period.updated_by = actor.to_string();
        tx.stage_period(period);
        let period = tx.commit().await?;

        info!(
            period_id = %period.id,
            year = period.year,
            month = period.month,
            actor,
            "Updated payroll period"
        );
        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PayrollStatus, Payslip};
    use crate::store::{MemoryStore, PeriodTransaction};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    /// Store whose first (year, month) lookup misses, as if a concurrent
    /// upsert inserted the period right after it.
    struct RacingStore {
        inner: MemoryStore,
        missed: AtomicBool,
    }

    #[async_trait]
    impl PayrollStore for RacingStore {
        async fn find_period(&self, year: i32, month: u32) -> EngineResult<Option<PayrollPeriod>> {
            if !self.missed.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_period(year, month).await
        }

        async fn find_period_by_id(&self, id: Uuid) -> EngineResult<Option<PayrollPeriod>> {
            self.inner.find_period_by_id(id).await
        }

        async fn insert_period(&self, period: PayrollPeriod) -> EngineResult<PayrollPeriod> {
            self.inner.insert_period(period).await
        }

        async fn lock_period_for_update(
            &self,
            id: Uuid,
        ) -> EngineResult<Box<dyn PeriodTransaction>> {
            self.inner.lock_period_for_update(id).await
        }

        async fn find_payslip(
            &self,
            employee_id: &str,
            year: i32,
            month: u32,
        ) -> EngineResult<Option<Payslip>> {
            self.inner.find_payslip(employee_id, year, month).await
        }

        async fn list_payslips(&self, period_id: Uuid) -> EngineResult<Vec<Payslip>> {
            self.inner.list_payslips(period_id).await
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn registry() -> (PeriodRegistry, MemoryStore) {
        let store = MemoryStore::new();
        (PeriodRegistry::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_creates_period_with_defaults() {
        let (registry, _) = registry();

        let period = registry
            .upsert_period(2025, 6, &UpsertPeriodRequest::default(), "admin")
            .await
            .unwrap();

        assert_eq!(period.name, "Payroll 2025-06");
        assert_eq!(period.status, PayrollStatus::Draft);
        assert_eq!(period.period_start, date("2025-06-01"));
        assert_eq!(period.period_end, date("2025-06-30"));
        assert_eq!(period.created_by, "admin");
    }

    #[tokio::test]
    async fn test_rejects_invalid_year_month() {
        let (registry, _) = registry();
        let request = UpsertPeriodRequest::default();

        for (year, month) in [(0, 6), (-1, 6), (2025, 0), (2025, 13)] {
            let err = registry
                .upsert_period(year, month, &request, "admin")
                .await
                .unwrap_err();
            assert!(
                matches!(err, EngineError::Validation { .. }),
                "{year}-{month}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let (registry, store) = registry();
        let created = registry
            .upsert_period(2025, 6, &UpsertPeriodRequest::default(), "admin")
            .await
            .unwrap();

        let request = UpsertPeriodRequest {
            period_start: Some(date("2025-06-02")),
            ..Default::default()
        };
        let updated = registry
            .upsert_period(2025, 6, &request, "clerk")
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Payroll 2025-06");
        assert_eq!(updated.period_start, date("2025-06-02"));
        assert_eq!(updated.period_end, date("2025-06-30"));
        assert_eq!(updated.created_by, "admin");
        assert_eq!(updated.updated_by, "clerk");

        let stored = store.find_period(2025, 6).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_rejects_inverted_range() {
        let (registry, store) = registry();
        let request = UpsertPeriodRequest {
            period_start: Some(date("2025-06-20")),
            period_end: Some(date("2025-06-10")),
            ..Default::default()
        };

        let err = registry
            .upsert_period(2025, 6, &request, "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
        assert!(store.find_period(2025, 6).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edit_of_non_draft_period_is_rejected() {
        let (registry, store) = registry();
        let period = registry
            .upsert_period(2025, 6, &UpsertPeriodRequest::default(), "admin")
            .await
            .unwrap();

        let mut tx = store.lock_period_for_update(period.id).await.unwrap();
        let mut pending = tx.period().clone();
        pending
            .transition_to(PayrollStatus::Pending, "admin", Utc::now())
            .unwrap();
        tx.stage_period(pending);
        tx.commit().await.unwrap();

        let request = UpsertPeriodRequest {
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        let err = registry
            .upsert_period(2025, 6, &request, "admin")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::AlreadyRunning {
                year: 2025,
                month: 6
            }
        ));
    }

    #[tokio::test]
    async fn test_losing_concurrent_create_applies_as_edit() {
        let store = MemoryStore::new();
        let winner = store
            .insert_period(PayrollPeriod::new(2025, 6, "admin").unwrap())
            .await
            .unwrap();
        let registry = PeriodRegistry::new(Arc::new(RacingStore {
            inner: store.clone(),
            missed: AtomicBool::new(false),
        }));

        let request = UpsertPeriodRequest {
            name: Some("June payroll".to_string()),
            ..Default::default()
        };
        let period = registry
            .upsert_period(2025, 6, &request, "clerk")
            .await
            .unwrap();

        assert_eq!(period.id, winner.id);
        assert_eq!(period.name, "June payroll");
        assert_eq!(period.created_by, "admin");
        assert_eq!(period.updated_by, "clerk");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_upserts_all_succeed() {
        let (registry, store) = registry();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let request = UpsertPeriodRequest {
                        name: Some(format!("run {i}")),
                        ..Default::default()
                    };
                    registry.upsert_period(2025, 6, &request, "admin").await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        let stored = store.find_period(2025, 6).await.unwrap().unwrap();
        assert!(ids.iter().all(|id| *id == stored.id));
    }

    #[test]
    fn test_request_rejects_unknown_fields() {
        let result: Result<UpsertPeriodRequest, _> =
            serde_json::from_str(r#"{"status": "processed"}"#);
        assert!(result.is_err());
    }
}
