//! Configuration for the Warden supervisor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;

/// Supervisor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Wall-clock budget from start before the process is hard-killed
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Duration of one simulated unit of work
    #[serde(default = "default_work_unit_ms")]
    pub work_unit_ms: u64,

    /// Iterations after which the simulated work finishes on its own
    /// (`None` runs until interrupted)
    #[serde(default)]
    pub max_iterations: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_deadline_ms() -> u64 {
    10_000
}

fn default_work_unit_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("warden")
        .join("config.yaml")
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            work_unit_ms: default_work_unit_ms(),
            max_iterations: None,
            log_level: default_log_level(),
        }
    }
}

impl SupervisorConfig {
    /// Load configuration from the user config directory, falling back to defaults
    pub fn load() -> Self {
        let config_path = default_config_path();

        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), "Failed to load config file: {}", e);
                }
            }
        }

        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Reject values the supervisor cannot run with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.deadline_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "deadline_ms must be greater than zero".to_string(),
            ));
        }
        if self.work_unit_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "work_unit_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(CoreError::InvalidConfig(
                "max_iterations must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn work_unit(&self) -> Duration {
        Duration::from_millis(self.work_unit_ms)
    }
}
