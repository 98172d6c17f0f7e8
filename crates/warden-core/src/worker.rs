//! Background worker running the supervised unit of work.
//!
//! The worker runs on its own OS thread. After every unit it polls the
//! [`ShutdownFlag`]; cancellation is cooperative and never interrupts a unit
//! mid-flight. Whatever way [`Worker::run`] exits, exactly one outcome is
//! written to the completion channel.

use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::error::WorkerError;
use crate::flag::ShutdownFlag;

/// Payload of the completion signal: `None` on success.
pub type Completion = Option<WorkerError>;

/// What the worker should do after a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
}

/// Pluggable business logic driven by the worker, one call per iteration.
pub trait UnitOfWork: Send + 'static {
    fn perform(&mut self, iteration: u64) -> Result<Step, WorkerError>;
}

impl<F> UnitOfWork for F
where
    F: FnMut(u64) -> Result<Step, WorkerError> + Send + 'static,
{
    fn perform(&mut self, iteration: u64) -> Result<Step, WorkerError> {
        self(iteration)
    }
}

/// Stand-in workload: sleeps for a fixed period per iteration.
#[derive(Debug, Clone)]
pub struct SimulatedWork {
    unit: Duration,
    max_iterations: Option<u64>,
}

impl SimulatedWork {
    pub fn new(unit: Duration, max_iterations: Option<u64>) -> Self {
        Self {
            unit,
            max_iterations,
        }
    }
}

impl UnitOfWork for SimulatedWork {
    fn perform(&mut self, iteration: u64) -> Result<Step, WorkerError> {
        thread::sleep(self.unit);

        match self.max_iterations {
            Some(max) if iteration >= max => Ok(Step::Done),
            _ => Ok(Step::Continue),
        }
    }
}

/// Writes the worker's outcome on drop, so every exit path reports once.
struct CompletionGuard {
    tx: Option<oneshot::Sender<Completion>>,
    outcome: Completion,
}

impl CompletionGuard {
    fn new(tx: oneshot::Sender<Completion>) -> Self {
        Self {
            tx: Some(tx),
            outcome: None,
        }
    }

    fn record(&mut self, outcome: Completion) {
        self.outcome = outcome;
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let outcome = if thread::panicking() {
            Some(WorkerError::Panicked)
        } else {
            self.outcome.take()
        };

        tracing::info!("Processor completed");

        if let Some(tx) = self.tx.take() {
            if tx.send(outcome).is_err() {
                tracing::debug!("Supervisor no longer listening, completion discarded");
            }
        }
    }
}

/// The supervised background task
pub struct Worker<U> {
    unit: U,
    flag: ShutdownFlag,
}

impl<U: UnitOfWork> Worker<U> {
    pub fn new(unit: U, flag: ShutdownFlag) -> Self {
        Self { unit, flag }
    }

    /// Start the worker on a dedicated, detached thread.
    pub fn spawn(self, completion: oneshot::Sender<Completion>) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("warden-worker".to_string())
            .spawn(move || self.run(completion))
    }

    /// Run units of work until the unit finishes, fails, or shutdown is requested.
    pub fn run(mut self, completion: oneshot::Sender<Completion>) {
        tracing::info!("Processor starting");

        let mut guard = CompletionGuard::new(completion);
        let mut iteration: u64 = 0;

        loop {
            iteration += 1;
            tracing::info!(iteration, "Processor doing work");

            match self.unit.perform(iteration) {
                Ok(Step::Continue) => {}
                Ok(Step::Done) => {
                    tracing::debug!(iteration, "Work finished");
                    return;
                }
                Err(e) => {
                    tracing::warn!(iteration, error = %e, "Unit of work failed");
                    guard.record(Some(e));
                    return;
                }
            }

            if self.flag.is_set() {
                guard.record(Some(WorkerError::GracefulShutdown));
                return;
            }
        }
    }
}
