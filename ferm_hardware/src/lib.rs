pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
pub mod w1;

use ferm_traits::{Heater, Indicator, Thermometer};
use std::sync::{Arc, Mutex};

pub use w1::W1Thermometer;

/// Degrees gained per read while the simulated heater is on.
const SIM_HEAT_STEP_C: f32 = 0.05;
/// Fraction of the gap to ambient lost per read.
const SIM_LOSS: f32 = 0.01;

#[derive(Debug)]
struct VesselState {
    celsius: f32,
    ambient: f32,
    heating: bool,
}

/// Simulated vessel: one thermometer and one heater sharing a crude thermal model.
#[derive(Debug, Clone)]
pub struct SimulatedVessel {
    state: Arc<Mutex<VesselState>>,
}

impl SimulatedVessel {
    pub fn new(ambient: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(VesselState {
                celsius: ambient,
                ambient,
                heating: false,
            })),
        }
    }

    pub fn thermometer(&self) -> SimulatedThermometer {
        SimulatedThermometer {
            state: Arc::clone(&self.state),
        }
    }

    pub fn heater(&self) -> SimulatedHeater {
        SimulatedHeater {
            state: Arc::clone(&self.state),
        }
    }

    pub fn is_heating(&self) -> bool {
        self.state.lock().map(|s| s.heating).unwrap_or(false)
    }
}

pub struct SimulatedThermometer {
    state: Arc<Mutex<VesselState>>,
}

impl Thermometer for SimulatedThermometer {
    fn read_celsius(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        let mut s = self
            .state
            .lock()
            .map_err(|_| error::HwError::Gpio("simulated vessel poisoned".to_string()))?;
        let loss = (s.celsius - s.ambient) * SIM_LOSS;
        s.celsius -= loss;
        if s.heating {
            s.celsius += SIM_HEAT_STEP_C;
        }
        tracing::trace!(celsius = s.celsius, "simulated read");
        Ok(s.celsius)
    }
}

pub struct SimulatedHeater {
    state: Arc<Mutex<VesselState>>,
}

impl Heater for SimulatedHeater {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut s) = self.state.lock() {
            s.heating = on;
        }
        Ok(())
    }
}

/// Indicator that only traces its state.
#[derive(Debug, Default)]
pub struct SimulatedLed {
    on: bool,
}

impl SimulatedLed {
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Indicator for SimulatedLed {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.on = on;
        tracing::trace!(on, "simulated led");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_vessel_warms_while_heating() {
        let vessel = SimulatedVessel::new(18.0);
        let mut t = vessel.thermometer();
        let mut h = vessel.heater();
        h.set(true).unwrap();
        let a = t.read_celsius().unwrap();
        let b = t.read_celsius().unwrap();
        assert!(b > a && a > 18.0);
        assert!(vessel.is_heating());
    }

    #[test]
    fn simulated_vessel_cools_towards_ambient() {
        let vessel = SimulatedVessel::new(18.0);
        let mut t = vessel.thermometer();
        let mut h = vessel.heater();
        h.set(true).unwrap();
        for _ in 0..50 {
            t.read_celsius().unwrap();
        }
        h.set(false).unwrap();
        let warm = t.read_celsius().unwrap();
        let cooler = t.read_celsius().unwrap();
        assert!(cooler < warm);
        assert!(cooler > 18.0);
    }

    #[test]
    fn simulated_led_tracks_state() {
        let mut led = SimulatedLed::default();
        led.set(true).unwrap();
        assert!(led.is_on());
    }
}
