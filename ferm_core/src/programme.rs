//! Temperature programmes: parsing, scheduling and ramp interpolation.
//!
//! A programme is a list of linear ramp steps. Each step runs from
//! `start_temp` to `end_temp` over `duration` units, where one unit is
//! `unit_seconds` long. Steps are laid end to end once
//! [`Programme::assign_start_times`] has anchored the first one.
use std::path::Path;

use ferm_traits::Timestamp;
use tracing::{debug, info, warn};

use crate::error::ProgrammeError;
use crate::util::{format_ts, step_seconds};

/// One linear ramp segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub start_temp: f32,
    pub end_temp: f32,
    /// Length in programme units (non-negative).
    pub duration: f32,
    /// Absolute start, set by `assign_start_times`.
    pub start_time: Option<Timestamp>,
}

impl Step {
    pub fn new(start_temp: f32, end_temp: f32, duration: f32) -> Self {
        Self {
            start_temp,
            end_temp,
            duration,
            start_time: None,
        }
    }
}

/// Where a programme stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampPoint {
    /// Before the first step; holds the first step's start temperature.
    PreRamp(f32),
    /// Inside step `step` (zero based).
    Ramp { step: usize, temp: f32 },
    /// Past the end of the last step.
    Complete,
}

impl RampPoint {
    /// Target temperature, or `None` once the programme has finished.
    pub fn temperature(self) -> Option<f32> {
        match self {
            Self::PreRamp(t) | Self::Ramp { temp: t, .. } => Some(t),
            Self::Complete => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Programme {
    steps: Vec<Step>,
    unit_seconds: u32,
}

impl Programme {
    /// Build from already-validated steps. Fails when `steps` is empty.
    pub fn from_steps(steps: Vec<Step>, unit_seconds: u32) -> Result<Self, ProgrammeError> {
        if steps.is_empty() {
            return Err(ProgrammeError::Empty {
                name: "<inline>".to_string(),
            });
        }
        Ok(Self {
            steps,
            unit_seconds: unit_seconds.max(1),
        })
    }

    /// Parse a step list, one `start_temp end_temp duration` record per line.
    ///
    /// Blank lines and `#` comments are skipped quietly. Malformed records are
    /// skipped with a warning; only a list with no valid step is an error.
    /// `name` identifies the source in diagnostics.
    pub fn parse(name: &str, text: &str, unit_seconds: u32) -> Result<Self, ProgrammeError> {
        let mut steps = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parse_step(trimmed) {
                Ok(step) => {
                    debug!(
                        source = name,
                        step = steps.len() + 1,
                        "Step {}: {:.1}->{:.1} in {:.1} units",
                        steps.len() + 1,
                        step.start_temp,
                        step.end_temp,
                        step.duration
                    );
                    steps.push(step);
                }
                Err(why) => {
                    warn!(source = name, line = idx + 1, text = trimmed, "skipping step: {why}");
                }
            }
        }
        if steps.is_empty() {
            return Err(ProgrammeError::Empty {
                name: name.to_string(),
            });
        }
        Ok(Self {
            steps,
            unit_seconds: unit_seconds.max(1),
        })
    }

    /// Read and parse a programme file.
    pub fn load(path: &Path, unit_seconds: u32) -> Result<Self, ProgrammeError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProgrammeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let programme = Self::parse(&path.display().to_string(), &text, unit_seconds)?;
        info!(
            source = %path.display(),
            steps = programme.steps.len(),
            "programme loaded"
        );
        Ok(programme)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn unit_seconds(&self) -> u32 {
        self.unit_seconds
    }

    /// Total length of all steps in seconds.
    pub fn total_seconds(&self) -> i64 {
        self.steps
            .iter()
            .map(|s| step_seconds(s.duration, self.unit_seconds))
            .fold(0i64, i64::saturating_add)
    }

    /// Start of the first step, once scheduled.
    pub fn start_time(&self) -> Option<Timestamp> {
        self.steps.first().and_then(|s| s.start_time)
    }

    /// End of the last step, once scheduled.
    pub fn end_time(&self) -> Option<Timestamp> {
        self.start_time()
            .map(|t| t.saturating_add(self.total_seconds()))
    }

    /// Anchor the first step at `base` and lay the rest end to end.
    ///
    /// Use the current time for a fresh start, or the persisted start time to
    /// resume an interrupted run at the right point of its ramp.
    pub fn assign_start_times(&mut self, base: Timestamp) {
        let mut t = base;
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.start_time = Some(t);
            info!(
                step = i + 1,
                start = %format_ts(t),
                from = step.start_temp,
                to = step.end_temp,
                "step scheduled"
            );
            t = t.saturating_add(step_seconds(step.duration, self.unit_seconds));
        }
    }

    /// Desired temperature at `now`.
    ///
    /// Inside a step the target is interpolated linearly between its start
    /// and end temperatures; a zero-length step yields its end temperature.
    /// Shared boundaries belong to the earlier step.
    pub fn desired_temperature(&self, now: Timestamp) -> RampPoint {
        let Some(first) = self.steps.first() else {
            return RampPoint::Complete;
        };
        let Some(first_start) = first.start_time else {
            return RampPoint::PreRamp(first.start_temp);
        };
        if now < first_start {
            return RampPoint::PreRamp(first.start_temp);
        }

        for (i, step) in self.steps.iter().enumerate() {
            let Some(start) = step.start_time else {
                continue;
            };
            let len = step_seconds(step.duration, self.unit_seconds);
            let end = start.saturating_add(len);
            if start <= now && now <= end {
                let fraction = if len == 0 {
                    1.0
                } else {
                    (now - start) as f64 / len as f64
                };
                let temp = f64::from(step.start_temp) * (1.0 - fraction)
                    + f64::from(step.end_temp) * fraction;
                return RampPoint::Ramp {
                    step: i,
                    temp: temp as f32,
                };
            }
        }
        RampPoint::Complete
    }
}

/// Parse one `start_temp end_temp duration` record; trailing fields are ignored.
fn parse_step(line: &str) -> Result<Step, String> {
    let mut fields = line.split_whitespace();
    let mut next = |what: &str| -> Result<f32, String> {
        let raw = fields.next().ok_or_else(|| format!("missing {what}"))?;
        let v: f32 = raw
            .parse()
            .map_err(|_| format!("{what} {raw:?} is not a number"))?;
        if !v.is_finite() {
            return Err(format!("{what} {raw:?} is not finite"));
        }
        Ok(v)
    };
    let start_temp = next("start temperature")?;
    let end_temp = next("end temperature")?;
    let duration = next("duration")?;
    if duration < 0.0 {
        return Err(format!("duration {duration} is negative"));
    }
    Ok(Step::new(start_temp, end_temp, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_step_accepts_three_numbers() {
        let s = parse_step("18 20.5 48").unwrap();
        assert_eq!(s, Step::new(18.0, 20.5, 48.0));
    }

    #[test]
    fn parse_step_ignores_trailing_fields() {
        assert!(parse_step("18 20 1 extra").is_ok());
    }

    #[test]
    fn parse_step_rejects_short_and_bad_records() {
        assert!(parse_step("18 20").unwrap_err().contains("missing duration"));
        assert!(parse_step("18 x 1").unwrap_err().contains("not a number"));
        assert!(parse_step("18 20 -1").unwrap_err().contains("negative"));
        assert!(parse_step("inf 20 1").unwrap_err().contains("not finite"));
    }

    #[test]
    fn unscheduled_programme_is_pre_ramp() {
        let p = Programme::from_steps(vec![Step::new(12.0, 20.0, 1.0)], 60).unwrap();
        assert_eq!(p.desired_temperature(0), RampPoint::PreRamp(12.0));
        assert_eq!(p.end_time(), None);
    }
}
