//! Result of one controller cycle.

use crate::sink::LogEntry;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Stop command from the control channel.
    Command,
    /// The last step of the programme has elapsed.
    Completed,
}

/// What a single pass of the control loop did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// No programme loaded; heater held off.
    Idle,
    /// One sample taken and the heater driven accordingly.
    Sampled(LogEntry),
    /// The run ended during this cycle; heater is off.
    Stopped(StopReason),
}
