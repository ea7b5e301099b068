//! Background execution of reserved payroll runs.
//!
//! [`RunQueue`] is the submitting side: it hands jobs to a bounded channel
//! and lets callers subscribe to outcomes. [`RunWorker`] drains the channel
//! and executes each job on its own task.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::error::{EngineError, EngineResult};

use super::runner::{PayrollRunner, RunReport};

/// A reserved run waiting for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunJob {
    /// The `pending` period to process.
    pub period_id: Uuid,
    /// The user who triggered the run.
    pub actor: String,
}

/// How an executed job ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Payslips were committed and the period is `processed`.
    Completed(RunReport),
    /// The run was rolled back.
    Failed {
        /// The period the job targeted.
        period_id: Uuid,
        /// Why the run failed.
        error: EngineError,
    },
}

impl RunOutcome {
    /// The period the outcome belongs to.
    pub fn period_id(&self) -> Uuid {
        match self {
            RunOutcome::Completed(report) => report.period_id,
            RunOutcome::Failed { period_id, .. } => *period_id,
        }
    }
}

/// Handle for submitting run jobs.
#[derive(Debug, Clone)]
pub struct RunQueue {
    jobs: mpsc::Sender<RunJob>,
    outcomes: broadcast::Sender<RunOutcome>,
}

impl RunQueue {
    /// Creates a queue and the worker that drains it.
    ///
    /// The worker does nothing until it is spawned.
    pub fn new(runner: Arc<PayrollRunner>, config: &WorkerConfig) -> (Self, RunWorker) {
        let (jobs_tx, jobs_rx) = mpsc::channel(config.queue_capacity);
        let (outcomes_tx, _) = broadcast::channel(config.outcome_capacity);

        let queue = Self {
            jobs: jobs_tx,
            outcomes: outcomes_tx.clone(),
        };
        let worker = RunWorker {
            runner,
            jobs: jobs_rx,
            outcomes: outcomes_tx,
        };
        (queue, worker)
    }

    /// Enqueues a job, waiting while the queue is full.
    ///
    /// Fails with [`EngineError::QueueClosed`] once the worker has stopped.
    pub async fn submit(&self, job: RunJob) -> EngineResult<()> {
        self.jobs
            .send(job)
            .await
            .map_err(|_| EngineError::QueueClosed)
    }

    /// Subscribes to the outcomes of jobs finishing after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RunOutcome> {
        self.outcomes.subscribe()
    }
}

/// Executes queued runs.
pub struct RunWorker {
    runner: Arc<PayrollRunner>,
    jobs: mpsc::Receiver<RunJob>,
    outcomes: broadcast::Sender<RunOutcome>,
}

impl RunWorker {
    /// Runs the worker loop on a new task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Receives jobs until every [`RunQueue`] handle is dropped.
    ///
    /// Each job executes on its own task. Runs for the same period are
    /// serialized by the period row lock. A job whose task panics is
    /// reported as a failed outcome.
    pub async fn run(mut self) {
        info!("Payroll run worker started");

        while let Some(job) = self.jobs.recv().await {
            info!(
                period_id = %job.period_id,
                actor = %job.actor,
                "Dispatching payroll run"
            );

            let runner = self.runner.clone();
            let outcomes = self.outcomes.clone();
            tokio::spawn(async move {
                let period_id = job.period_id;
                let execution =
                    tokio::spawn(async move { runner.execute_run(job.period_id, &job.actor).await });
                let result = execution.await.unwrap_or_else(|join_err| {
                    Err(EngineError::CalculationError {
                        message: format!("payroll run aborted: {join_err}"),
                    })
                });

                let outcome = match result {
                    Ok(report) => RunOutcome::Completed(report),
                    Err(err) => {
                        error!(
                            period_id = %period_id,
                            error = %err,
                            "Payroll run failed; period left pending"
                        );
                        RunOutcome::Failed {
                            period_id,
                            error: err,
                        }
                    }
                };
                // no subscribers is fine
                let _ = outcomes.send(outcome);
            });
        }

        info!("Run queue closed, worker exiting");
    }
}
