//! Shared shutdown request flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative shutdown flag shared between the control loop (writer) and
/// the worker (reader). Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark shutdown as requested. Returns `true` only for the call that
    /// flipped the flag.
    pub fn set(&self) -> bool {
        !self.requested.swap(true, Ordering::SeqCst)
    }

    /// Whether shutdown has been requested.
    pub fn is_set(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
