//! Warden Core Components
//!
//! This crate provides the supervision core for the Warden daemon: a single
//! background worker raced against an interrupt source, a hard deadline, and
//! its own completion.

mod config;
mod control;
mod error;
mod flag;
mod supervisor;
mod worker;

pub use config::SupervisorConfig;
pub use control::{ControlLoop, LoopState, Termination};
pub use error::{CoreError, WorkerError};
pub use flag::ShutdownFlag;
pub use supervisor::Supervisor;
pub use worker::{Completion, SimulatedWork, Step, UnitOfWork, Worker};
