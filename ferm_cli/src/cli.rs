//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "fermenterd", version, about = "Fermentation temperature controller")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/fermenterd.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace); overrides `[logging] level`
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller daemon until `q` arrives on the control socket or a signal
    Run {
        /// Drive simulated vessels instead of GPIO and 1-Wire probes
        #[arg(long, action = ArgAction::SetTrue)]
        simulate: bool,
    },
    /// Parse a programme file and print its schedule
    CheckProgramme {
        /// Programme file (one `start_temp end_temp duration` per line)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Seconds per duration unit; defaults to the config value, or 3600
        #[arg(long, value_name = "SECS")]
        unit_seconds: Option<u32>,
    },
    /// Load and validate the config, then print a summary
    CheckConfig,
}
