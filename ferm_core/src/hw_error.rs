//! Maps `Box<dyn Error>` from trait boundaries to typed `FermenterError`.
//!
//! The traits in `ferm_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `ferm_hardware::HwError` downcasting.

use crate::error::FermenterError;

/// Map a trait-boundary error to a typed `FermenterError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> FermenterError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<ferm_hardware::error::HwError>() {
            return match hw {
                ferm_hardware::error::HwError::SensorMissing(p) => {
                    FermenterError::SensorMissing(p.clone())
                }
                ferm_hardware::error::HwError::Io(io) => FermenterError::Io(io.to_string()),
                other => FermenterError::HardwareFault(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        return FermenterError::Io(io.to_string());
    }
    FermenterError::Hardware(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_io() {
        let e = std::io::Error::other("disk gone");
        assert!(matches!(map_hw_error(&e), FermenterError::Io(m) if m.contains("disk gone")));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn missing_sensor_is_recognised() {
        let e = ferm_hardware::error::HwError::SensorMissing("/sys/x".into());
        assert!(matches!(map_hw_error(&e), FermenterError::SensorMissing(p) if p == "/sys/x"));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn crc_is_a_fault() {
        let e = ferm_hardware::error::HwError::Crc;
        assert!(matches!(map_hw_error(&e), FermenterError::HardwareFault(_)));
    }
}
