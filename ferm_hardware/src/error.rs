use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("sensor not present: {0}")]
    SensorMissing(String),
    #[error("sensor crc check failed")]
    Crc,
    #[error("sensor output unparsable: {0}")]
    Garbled(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
