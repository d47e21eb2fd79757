//! Human-readable error descriptions and structured JSON error formatting.

use ferm_core::error::{FermenterError, ProgrammeError};

/// Exit code for configuration and general failures.
pub const EXIT_GENERAL: i32 = 1;
/// Exit code when heater, LED or probe outputs cannot be initialised.
pub const EXIT_HARDWARE: i32 = 3;

fn hardware_error(err: &eyre::Report) -> Option<&FermenterError> {
    err.chain()
        .find_map(|e| e.downcast_ref::<FermenterError>())
        .filter(|fe| {
            matches!(
                fe,
                FermenterError::Hardware(_)
                    | FermenterError::HardwareFault(_)
                    | FermenterError::SensorMissing(_)
            )
        })
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(pe) = err.chain().find_map(|e| e.downcast_ref::<ProgrammeError>()) {
        return match pe {
            ProgrammeError::Open { path, source } => format!(
                "What happened: Could not read programme {} ({source}).\nLikely causes: Wrong path or missing read permission.\nHow to fix: Check the file exists and pass an absolute path.",
                path.display()
            ),
            ProgrammeError::Empty { name } => format!(
                "What happened: Programme {name} has no valid steps.\nLikely causes: Every line is blank, a comment, or malformed.\nHow to fix: Write one `start_temp end_temp duration` record per line; re-run with --log-level=debug to see skipped lines."
            ),
        };
    }

    if let Some(fe) = hardware_error(err) {
        return match fe {
            FermenterError::SensorMissing(p) => format!(
                "What happened: Temperature probe {p} was not found.\nLikely causes: 1-Wire overlay not enabled, probe unplugged, or wrong sensor id.\nHow to fix: Check /sys/bus/w1/devices and the [[units]] sensor values."
            ),
            other => format!(
                "What happened: Hardware outputs could not be initialised ({other}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the pins in [[units]] and [heartbeat]; ensure the process may access /dev/gpiomem, or run with --simulate."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: {msg}.\nLikely causes: The config path is wrong.\nHow to fix: Pass --config <FILE> pointing at a readable TOML file."
        );
    }
    if lower.contains("parse config") || lower.contains("must") || lower.contains("at least") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing [[units]], duplicate heater pins, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }
    if lower.contains("control socket") {
        return format!(
            "What happened: {msg}.\nLikely causes: Socket directory not writable, or another fermenterd is running.\nHow to fix: Check [daemon] socket and its directory permissions."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Hardware init failures exit with 3, everything else with 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if hardware_error(err).is_some() {
        EXIT_HARDWARE
    } else {
        EXIT_GENERAL
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match exit_code_for_error(err) {
        EXIT_HARDWARE => "HardwareInit",
        _ if err.chain().any(|e| e.is::<ProgrammeError>()) => "Programme",
        _ => "Error",
    };
    json!({ "reason": reason, "message": humanize(err), "exit_code": exit_code_for_error(err) })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn hardware_errors_exit_with_three() {
        let err = eyre::Report::new(FermenterError::Hardware("open pin 17: busy".into()))
            .wrap_err("init unit 0");
        assert_eq!(exit_code_for_error(&err), EXIT_HARDWARE);
        assert!(humanize(&err).contains("could not be initialised"));
    }

    #[test]
    fn programme_errors_are_general() {
        let err = eyre::Report::new(ProgrammeError::Empty {
            name: "ale.prog".into(),
        });
        assert_eq!(exit_code_for_error(&err), EXIT_GENERAL);
        assert!(humanize(&err).contains("no valid steps"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Programme");
    }

    #[test]
    fn missing_programme_names_the_path() {
        let err = eyre::Report::new(ProgrammeError::Open {
            path: PathBuf::from("/nope.prog"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert!(humanize(&err).contains("/nope.prog"));
    }
}
