//! Runtime configuration for the control loops.
//!
//! These are the structs the controller and heartbeat consume. They are
//! separate from the TOML-deserialized config in `ferm_config`.

use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by every unit controller.
#[derive(Debug, Clone)]
pub struct ControllerCfg {
    /// Time between samples.
    pub sample_period: Duration,
    /// Seconds per programme duration unit.
    pub unit_seconds: u32,
    /// Rotated log generations kept besides the active one.
    pub max_generations: u32,
    /// Where run records live.
    pub state_dir: PathBuf,
    /// Where CSV logs live.
    pub log_dir: PathBuf,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            sample_period: Duration::from_secs(60),
            unit_seconds: 3600,
            max_generations: 5,
            state_dir: PathBuf::from("state"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

/// Heartbeat LED settings.
#[derive(Debug, Clone)]
pub struct HeartbeatCfg {
    /// Half of one blink cycle.
    pub period: Duration,
}

impl Default for HeartbeatCfg {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }
}
