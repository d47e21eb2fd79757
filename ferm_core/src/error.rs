use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum FermenterError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("sensor missing: {0}")]
    SensorMissing(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Why a programme could not be loaded.
#[derive(Debug, Error)]
pub enum ProgrammeError {
    #[error("open programme {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("programme {name} has no valid steps")]
    Empty { name: String },
}

/// Failures of the CSV temperature log.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("log io: {0}")]
    Io(#[from] std::io::Error),
    #[error("log csv: {0}")]
    Csv(#[from] csv::Error),
}
