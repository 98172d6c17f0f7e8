//! Supervisor control loop.
//!
//! Races three event sources and decides how the process terminates:
//!
//! ```text
//! Running ──interrupt──▶ ShuttingDown ──interrupt──▶ ShuttingDown
//!    │                        │
//!    ├──completion────────────┴──completion──▶ TerminatedSoft (exit 0)
//!    └──deadline──────────────┴──deadline────▶ TerminatedHard (exit 1)
//! ```
//!
//! Simultaneously ready sources are picked in `tokio::select!`'s random order.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::error::WorkerError;
use crate::flag::ShutdownFlag;
use crate::worker::Completion;

/// Control loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    ShuttingDown,
    TerminatedSoft,
    TerminatedHard,
}

/// How a supervised run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Worker reported back before the deadline
    Soft(Completion),
    /// Deadline fired first; the worker was abandoned
    Hard,
}

impl Termination {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Termination::Soft(_) => 0,
            Termination::Hard => 1,
        }
    }

    /// Whether the worker stopped because shutdown was requested
    pub fn is_graceful(&self) -> bool {
        matches!(self, Termination::Soft(Some(WorkerError::GracefulShutdown)))
    }
}

pub struct ControlLoop {
    flag: ShutdownFlag,
    deadline: Instant,
    budget: Duration,
    state: LoopState,
}

impl ControlLoop {
    /// Create a control loop whose deadline starts counting now.
    pub fn new(flag: ShutdownFlag, budget: Duration) -> Self {
        Self {
            flag,
            deadline: Instant::now() + budget,
            budget,
            state: LoopState::Running,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Wait on interrupts, the deadline and worker completion until one of
    /// the two terminal conditions is reached.
    pub async fn run(
        &mut self,
        mut interrupts: mpsc::Receiver<()>,
        mut completion: oneshot::Receiver<Completion>,
    ) -> Termination {
        let deadline = tokio::time::sleep_until(self.deadline);
        tokio::pin!(deadline);

        let mut interrupts_open = true;

        loop {
            tokio::select! {
                received = interrupts.recv(), if interrupts_open => match received {
                    Some(()) => {
                        tracing::warn!("OS interrupt, shutting down early");
                        if self.flag.set() {
                            tracing::debug!("Shutdown flag raised");
                        }
                        self.state = LoopState::ShuttingDown;
                    }
                    None => {
                        tracing::debug!("Interrupt source closed");
                        interrupts_open = false;
                    }
                },
                _ = &mut deadline => {
                    tracing::error!(
                        deadline_ms = self.budget.as_millis() as u64,
                        "Timeout, killing program"
                    );
                    // Lets the abandoned worker wind down if the process outlives us
                    self.flag.set();
                    self.state = LoopState::TerminatedHard;
                    return Termination::Hard;
                }
                result = &mut completion => {
                    let outcome = result.unwrap_or(Some(WorkerError::Disconnected));
                    match &outcome {
                        Some(e) => tracing::info!(error = %e, "Task complete"),
                        None => tracing::info!("Task complete"),
                    }
                    self.state = LoopState::TerminatedSoft;
                    return Termination::Soft(outcome);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: Duration = Duration::from_secs(10);

    #[tokio::test(start_paused = true)]
    async fn test_completion_before_deadline_is_soft() {
        let (_interrupt_tx, interrupt_rx) = mpsc::channel(1);
        let (done_tx, done_rx) = oneshot::channel();
        let mut control = ControlLoop::new(ShutdownFlag::new(), BUDGET);
        assert_eq!(control.state(), LoopState::Running);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            let _ = done_tx.send(None);
        });

        let termination = control.run(interrupt_rx, done_rx).await;
        assert_eq!(termination, Termination::Soft(None));
        assert_eq!(termination.exit_code(), 0);
        assert_eq!(control.state(), LoopState::TerminatedSoft);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_before_completion_is_hard() {
        let (_interrupt_tx, interrupt_rx) = mpsc::channel(1);
        let (_done_tx, done_rx) = oneshot::channel();
        let flag = ShutdownFlag::new();
        let mut control = ControlLoop::new(flag.clone(), BUDGET);

        let started = Instant::now();
        let termination = control.run(interrupt_rx, done_rx).await;

        assert_eq!(termination, Termination::Hard);
        assert_eq!(termination.exit_code(), 1);
        assert_eq!(control.state(), LoopState::TerminatedHard);
        assert!(started.elapsed() >= BUDGET);
        assert!(flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_raises_flag_and_keeps_waiting() {
        let (interrupt_tx, interrupt_rx) = mpsc::channel(4);
        let (done_tx, done_rx) = oneshot::channel();
        let flag = ShutdownFlag::new();
        let mut control = ControlLoop::new(flag.clone(), BUDGET);

        let observer = flag.clone();
        tokio::spawn(async move {
            interrupt_tx.send(()).await.unwrap();
            interrupt_tx.send(()).await.unwrap();
            while !observer.is_set() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            tokio::time::sleep(Duration::from_secs(4)).await;
            let _ = done_tx.send(Some(WorkerError::GracefulShutdown));
        });

        let termination = control.run(interrupt_rx, done_rx).await;
        assert!(termination.is_graceful());
        assert_eq!(termination.exit_code(), 0);
        assert!(flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_then_deadline_is_hard() {
        let (interrupt_tx, interrupt_rx) = mpsc::channel(1);
        let (_done_tx, done_rx) = oneshot::channel();
        let mut control = ControlLoop::new(ShutdownFlag::new(), BUDGET);

        interrupt_tx.send(()).await.unwrap();
        let termination = control.run(interrupt_rx, done_rx).await;

        assert_eq!(termination, Termination::Hard);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_interrupt_source_is_ignored() {
        let (interrupt_tx, interrupt_rx) = mpsc::channel::<()>(1);
        drop(interrupt_tx);
        let (done_tx, done_rx) = oneshot::channel();
        let flag = ShutdownFlag::new();
        let mut control = ControlLoop::new(flag.clone(), BUDGET);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let _ = done_tx.send(None);
        });

        let termination = control.run(interrupt_rx, done_rx).await;
        assert_eq!(termination, Termination::Soft(None));
        assert!(!flag.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_worker_reports_disconnected() {
        let (_interrupt_tx, interrupt_rx) = mpsc::channel(1);
        let (done_tx, done_rx) = oneshot::channel::<Completion>();
        drop(done_tx);
        let mut control = ControlLoop::new(ShutdownFlag::new(), BUDGET);

        let termination = control.run(interrupt_rx, done_rx).await;
        assert_eq!(
            termination,
            Termination::Soft(Some(WorkerError::Disconnected))
        );
    }
}
