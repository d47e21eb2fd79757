//! Offline checks: programme files and config.

use std::fmt::Write as _;
use std::path::Path;

use eyre::Result;
use ferm_config::Config;
use ferm_core::Programme;

/// Render a programme schedule relative to its start.
pub fn describe_programme(p: &Programme) -> String {
    let mut out = String::new();
    let unit = p.unit_seconds();
    let mut offset = 0i64;
    for (i, step) in p.steps().iter().enumerate() {
        let secs = ferm_core::util::step_seconds(step.duration, unit);
        let _ = writeln!(
            out,
            "step {:>2}: {:>6.1} -> {:>6.1} C over {} units (+{} .. +{})",
            i + 1,
            step.start_temp,
            step.end_temp,
            step.duration,
            hms(offset),
            hms(offset + secs)
        );
        offset += secs;
    }
    let _ = writeln!(
        out,
        "{} steps, total {} ({} s, {} s per unit)",
        p.steps().len(),
        hms(p.total_seconds()),
        p.total_seconds(),
        unit
    );
    out
}

/// `d`, `h`, `m`, `s` rendering of a span in seconds.
fn hms(secs: i64) -> String {
    let (d, rem) = (secs / 86_400, secs % 86_400);
    let (h, m, s) = (rem / 3600, (rem % 3600) / 60, rem % 60);
    if d > 0 {
        format!("{d}d{h:02}h{m:02}m")
    } else {
        format!("{h}h{m:02}m{s:02}s")
    }
}

pub fn check_programme(file: &Path, unit_seconds: u32) -> Result<String> {
    let p = Programme::load(file, unit_seconds)?;
    Ok(describe_programme(&p))
}

pub fn describe_config(cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "socket:    {}", cfg.daemon.socket.display());
    let _ = writeln!(out, "state dir: {}", cfg.daemon.state_dir.display());
    let _ = writeln!(out, "log dir:   {}", cfg.daemon.log_dir.display());
    let _ = writeln!(
        out,
        "control:   sample every {} s, {} s per unit, {} log generations",
        cfg.control.sample_period_s, cfg.control.unit_seconds, cfg.control.max_generations
    );
    match cfg.heartbeat.led_pin {
        Some(pin) => {
            let _ = writeln!(out, "heartbeat: pin {pin} every {} ms", cfg.heartbeat.period_ms);
        }
        None => {
            let _ = writeln!(out, "heartbeat: none");
        }
    }
    for (i, u) in cfg.units.iter().enumerate() {
        let led = u.led_pin.map_or_else(|| "-".to_string(), |p| p.to_string());
        let _ = writeln!(
            out,
            "unit {i}:    sensor {} heater pin {}{} led {led}",
            u.sensor,
            u.heater_pin,
            if u.active_low { " (active low)" } else { "" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hms_formats_short_and_long_spans() {
        assert_eq!(hms(0), "0h00m00s");
        assert_eq!(hms(3_725), "1h02m05s");
        assert_eq!(hms(2 * 86_400 + 3_600), "2d01h00m");
    }

    #[test]
    fn describes_schedule_offsets() {
        let p = Programme::parse("t", "10 20 1\n20 20 1\n", 60).unwrap();
        let text = describe_programme(&p);
        assert!(text.contains("+0h00m00s .. +0h01m00s"), "{text}");
        assert!(text.contains("+0h01m00s .. +0h02m00s"), "{text}");
        assert!(text.contains("2 steps, total 0h02m00s (120 s, 60 s per unit)"), "{text}");
    }
}
