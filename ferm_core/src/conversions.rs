//! `From` implementations bridging `ferm_config` types to `ferm_core` types.

use std::time::Duration;

use crate::config::{ControllerCfg, HeartbeatCfg};

// ── ControllerCfg ────────────────────────────────────────────────────────────

impl From<&ferm_config::Config> for ControllerCfg {
    fn from(c: &ferm_config::Config) -> Self {
        Self {
            sample_period: Duration::from_secs(c.control.sample_period_s),
            unit_seconds: c.control.unit_seconds,
            max_generations: c.control.max_generations,
            state_dir: c.daemon.state_dir.clone(),
            log_dir: c.daemon.log_dir.clone(),
        }
    }
}

// ── HeartbeatCfg ─────────────────────────────────────────────────────────────

impl From<&ferm_config::HeartbeatCfg> for HeartbeatCfg {
    fn from(c: &ferm_config::HeartbeatCfg) -> Self {
        Self {
            period: Duration::from_millis(c.period_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_cfg_from_toml() {
        let cfg = ferm_config::load_toml(
            r#"
[daemon]
state_dir = "/tmp/s"
log_dir = "/tmp/l"

[control]
sample_period_s = 15
unit_seconds = 60
max_generations = 2

[[units]]
heater_pin = 24
sensor = "28-x"
"#,
        )
        .unwrap();
        let c = ControllerCfg::from(&cfg);
        assert_eq!(c.sample_period, Duration::from_secs(15));
        assert_eq!(c.unit_seconds, 60);
        assert_eq!(c.max_generations, 2);
        assert_eq!(c.state_dir, std::path::PathBuf::from("/tmp/s"));

        let h = HeartbeatCfg::from(&cfg.heartbeat);
        assert_eq!(h.period, Duration::from_millis(1000));
    }
}
