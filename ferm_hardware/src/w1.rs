//! DS18B20 probes exposed by the kernel `w1-therm` driver.
//!
//! The sysfs file looks like:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ferm_traits::Thermometer;
use tracing::trace;

use crate::error::{HwError, Result};

/// Base directory of 1-Wire slaves on Linux.
pub const W1_DEVICES: &str = "/sys/bus/w1/devices";

pub struct W1Thermometer {
    path: PathBuf,
}

impl W1Thermometer {
    /// Probe addressed by its 1-Wire id, e.g. `28-03168169dfff`.
    pub fn new(device_id: &str) -> Self {
        Self::with_path(Path::new(W1_DEVICES).join(device_id).join("w1_slave"))
    }

    /// Probe backed by an arbitrary file in `w1_slave` format.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_once(&self) -> Result<f32> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => HwError::SensorMissing(self.path.display().to_string()),
            _ => HwError::Io(e),
        })?;
        let c = parse_w1_slave(&text)?;
        trace!(path = %self.path.display(), celsius = c, "w1 read");
        Ok(c)
    }
}

impl Thermometer for W1Thermometer {
    fn read_celsius(&mut self) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read_once()?)
    }
}

/// Extract degrees Celsius from `w1_slave` contents.
pub fn parse_w1_slave(text: &str) -> Result<f32> {
    if let Some(first) = text.lines().next()
        && first.contains("crc=")
        && !first.trim_end().ends_with("YES")
    {
        return Err(HwError::Crc);
    }
    let Some(idx) = text.find("t=") else {
        return Err(HwError::Garbled("missing 't='".to_string()));
    };
    let digits: String = text[idx + 2..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    let milli: i32 = digits
        .parse()
        .map_err(|_| HwError::Garbled(format!("bad value after 't=': {digits:?}")))?;
    Ok(milli as f32 / 1000.0)
}
