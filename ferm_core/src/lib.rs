#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Fermentation control logic (hardware-agnostic).
//!
//! All hardware interactions go through `ferm_traits::Thermometer`,
//! `ferm_traits::Heater` and `ferm_traits::Indicator`.
//!
//! ## Architecture
//!
//! - **Programmes**: step parsing, scheduling and ramp interpolation (`programme`)
//! - **Persistence**: one run record per unit for crash recovery (`persist`)
//! - **Logging**: rotated CSV temperature logs (`sink`)
//! - **Control**: the per-unit state machine (`controller`)
//! - **Commands**: per-unit mailbox and status snapshot (`command`)
//! - **Control channel**: text protocol over a Unix socket (`listener`)
//! - **Heartbeat**: liveness LED (`heartbeat`)

pub mod command;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod heartbeat;
pub mod hw_error;
pub mod listener;
pub mod mocks;
pub mod persist;
pub mod programme;
pub mod sink;
pub mod status;
pub mod util;

pub use command::{Command, CommandSlot, UnitHandle, UnitStatus};
pub use config::{ControllerCfg, HeartbeatCfg};
pub use controller::{Fermenter, SENSOR_FAULT_C};
pub use error::{FermenterError, ProgrammeError, SinkError};
pub use listener::{ControlServer, Reply, Request, SessionEnd};
pub use persist::{RunRecord, StateStore};
pub use programme::{Programme, RampPoint, Step};
pub use sink::{LogEntry, LogHandle, LogSink};
pub use status::{CycleOutcome, StopReason};
