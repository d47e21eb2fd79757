pub mod clock;

pub use clock::{Clock, SystemClock, Timestamp};

/// Temperature probe for one vessel.
pub trait Thermometer {
    /// Current temperature in degrees Celsius.
    fn read_celsius(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
}

/// Binary heater output for one vessel.
pub trait Heater {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Status LED driven by the heartbeat loop.
pub trait Indicator {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Thermometer + ?Sized> Thermometer for Box<T> {
    fn read_celsius(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_celsius()
    }
}

impl<T: Heater + ?Sized> Heater for Box<T> {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set(on)
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set(on)
    }
}
