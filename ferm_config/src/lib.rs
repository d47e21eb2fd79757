#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the fermenter daemon.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Units are addressed by their position in `[[units]]`; the control
//!   channel uses a single digit, so at most `MAX_UNITS` are accepted.
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Highest unit count addressable by the single-digit control protocol.
pub const MAX_UNITS: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Daemon {
    /// Unix socket for the control channel
    pub socket: PathBuf,
    /// Directory holding one `.state` file per running unit
    pub state_dir: PathBuf,
    /// Directory holding the per-unit CSV temperature logs
    pub log_dir: PathBuf,
}

impl Default for Daemon {
    fn default() -> Self {
        Self {
            socket: PathBuf::from("/run/fermenter/control.sock"),
            state_dir: PathBuf::from("/var/lib/fermenter"),
            log_dir: PathBuf::from("/var/log/fermenter"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    /// Seconds between samples of each unit
    pub sample_period_s: u64,
    /// Seconds per programme duration unit (3600 = durations in hours)
    pub unit_seconds: u32,
    /// Rotated log generations kept besides the active one
    pub max_generations: u32,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            sample_period_s: 60,
            unit_seconds: 3600,
            max_generations: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HeartbeatCfg {
    pub led_pin: Option<u8>,
    /// Toggle interval of the heartbeat LED
    pub period_ms: u64,
}

impl Default for HeartbeatCfg {
    fn default() -> Self {
        Self {
            led_pin: None,
            period_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnitCfg {
    pub heater_pin: u8,
    /// LED mirroring the heater relay
    #[serde(default)]
    pub led_pin: Option<u8>,
    /// 1-Wire device id of the probe, e.g. "28-03168169dfff"
    pub sensor: String,
    /// Relay boards on the Pi are usually switched by pulling low
    #[serde(default = "default_active_low")]
    pub active_low: bool,
}

fn default_active_low() -> bool {
    true
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: Daemon,
    #[serde(default)]
    pub control: ControlCfg,
    #[serde(default)]
    pub heartbeat: HeartbeatCfg,
    pub units: Vec<UnitCfg>,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Units
        if self.units.is_empty() {
            eyre::bail!("at least one [[units]] entry is required");
        }
        if self.units.len() > MAX_UNITS {
            eyre::bail!(
                "at most {MAX_UNITS} units are supported, got {}",
                self.units.len()
            );
        }
        let mut pins = HashSet::new();
        for (i, u) in self.units.iter().enumerate() {
            if !pins.insert(u.heater_pin) {
                eyre::bail!("units[{i}].heater_pin {} is used twice", u.heater_pin);
            }
            if u.sensor.trim().is_empty() {
                eyre::bail!("units[{i}].sensor must not be empty");
            }
        }

        // Control
        if self.control.sample_period_s == 0 {
            eyre::bail!("control.sample_period_s must be >= 1");
        }
        if self.control.sample_period_s > 24 * 60 * 60 {
            eyre::bail!("control.sample_period_s is unreasonably large (>24h)");
        }
        if self.control.unit_seconds == 0 {
            eyre::bail!("control.unit_seconds must be >= 1");
        }
        if self.control.max_generations == 0 {
            eyre::bail!("control.max_generations must be >= 1");
        }

        // Heartbeat
        if self.heartbeat.period_ms == 0 {
            eyre::bail!("heartbeat.period_ms must be >= 1");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}
