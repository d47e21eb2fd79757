use rppal::gpio::{Gpio, Level, OutputPin};
use tracing::{debug, trace};

use ferm_traits::{Heater, Indicator};

use crate::error::{HwError, Result};

fn open_output(gpio: &Gpio, pin: u8, initial: Level) -> Result<OutputPin> {
    let p = gpio
        .get(pin)
        .map_err(|e| HwError::Gpio(format!("open pin {pin}: {e}")))?;
    Ok(match initial {
        Level::High => p.into_output_high(),
        Level::Low => p.into_output_low(),
    })
}

/// Relay-driven heater with an optional LED that mirrors the relay.
pub struct GpioHeater {
    relay: OutputPin,
    led: Option<OutputPin>,
    active_low: bool,
}

impl GpioHeater {
    /// Claim the relay (and LED) pins, leaving the heater off.
    pub fn open(relay_pin: u8, led_pin: Option<u8>, active_low: bool) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let off = if active_low { Level::High } else { Level::Low };
        let relay = open_output(&gpio, relay_pin, off)?;
        let led = led_pin
            .map(|p| open_output(&gpio, p, Level::Low))
            .transpose()?;
        debug!(relay_pin, ?led_pin, active_low, "heater outputs ready");
        Ok(Self {
            relay,
            led,
            active_low,
        })
    }
}

impl Heater for GpioHeater {
    fn set(&mut self, on: bool) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let level = if on != self.active_low {
            Level::High
        } else {
            Level::Low
        };
        self.relay.write(level);
        if let Some(led) = self.led.as_mut() {
            led.write(if on { Level::High } else { Level::Low });
        }
        trace!(on, ?level, "heater set");
        Ok(())
    }
}

/// Plain LED output.
pub struct GpioLed {
    pin: OutputPin,
}

impl GpioLed {
    pub fn open(pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(Self {
            pin: open_output(&gpio, pin, Level::Low)?,
        })
    }
}

impl Indicator for GpioLed {
    fn set(&mut self, on: bool) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.write(if on { Level::High } else { Level::Low });
        Ok(())
    }
}
