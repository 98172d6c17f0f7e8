//! Supervisor wiring: one worker, one control loop, one run.

use tokio::sync::{mpsc, oneshot};

use crate::config::SupervisorConfig;
use crate::control::{ControlLoop, Termination};
use crate::error::CoreError;
use crate::flag::ShutdownFlag;
use crate::worker::{SimulatedWork, UnitOfWork, Worker};

/// Runs a single unit-of-work to completion under a hard deadline
pub struct Supervisor {
    config: SupervisorConfig,
    flag: ShutdownFlag,
}

impl Supervisor {
    /// Create a supervisor, rejecting configs it cannot run with
    pub fn new(config: SupervisorConfig) -> Result<Self, CoreError> {
        config.validate()?;

        Ok(Self {
            config,
            flag: ShutdownFlag::new(),
        })
    }

    /// Handle to the flag shared with the worker
    pub fn flag(&self) -> ShutdownFlag {
        self.flag.clone()
    }

    /// The configured simulated workload
    pub fn simulated_work(&self) -> SimulatedWork {
        SimulatedWork::new(self.config.work_unit(), self.config.max_iterations)
    }

    /// Start the worker and supervise it until it reports back or the
    /// deadline fires. On [`Termination::Hard`] the worker thread is left
    /// running; the caller is expected to exit the process.
    pub async fn run<U: UnitOfWork>(
        self,
        unit: U,
        interrupts: mpsc::Receiver<()>,
    ) -> Result<Termination, CoreError> {
        tracing::info!(
            deadline_ms = self.config.deadline_ms,
            work_unit_ms = self.config.work_unit_ms,
            "Starting process"
        );

        // Deadline counts from here, before the worker exists
        let mut control = ControlLoop::new(self.flag.clone(), self.config.deadline());
        let (completion_tx, completion_rx) = oneshot::channel();

        tracing::info!("Launching processor");
        Worker::new(unit, self.flag.clone()).spawn(completion_tx)?;

        let termination = control.run(interrupts, completion_rx).await;

        tracing::info!(exit_code = termination.exit_code(), "Process ended");
        Ok(termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let config = SupervisorConfig {
            deadline_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            Supervisor::new(config),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_flag_handle_is_shared() {
        let supervisor = Supervisor::new(SupervisorConfig::default()).unwrap();
        supervisor.flag().set();
        assert!(supervisor.flag().is_set());
    }
}
