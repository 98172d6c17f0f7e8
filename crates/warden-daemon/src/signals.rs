//! Interrupt forwarding from the platform into the control loop.

use tokio::sync::mpsc;

/// Registered interrupt listener. The OS handler is installed by
/// [`Interrupts::register`], so SIGINT no longer takes its default action
/// from that point on, even before [`Interrupts::forward`] is polled.
pub struct Interrupts {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
}

impl Interrupts {
    /// Install the interrupt handler. Must be called inside a Tokio runtime.
    #[cfg(unix)]
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(not(unix))]
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Forward every interrupt into `tx` until the receiver goes away.
    #[cfg(unix)]
    pub async fn forward(mut self, tx: mpsc::Sender<()>) {
        while self.sigint.recv().await.is_some() {
            tracing::debug!("Received SIGINT");

            if tx.send(()).await.is_err() {
                return;
            }
        }
    }

    #[cfg(not(unix))]
    pub async fn forward(self, tx: mpsc::Sender<()>) {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for interrupts: {}", e);
                return;
            }

            tracing::debug!("Received Ctrl+C");

            if tx.send(()).await.is_err() {
                return;
            }
        }
    }
}
