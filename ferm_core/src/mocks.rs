//! Test and helper mocks for ferm_core.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ferm_traits::{Clock, Heater, Indicator, Thermometer, Timestamp};

/// Deterministic clock whose time only moves when told to.
///
/// now() = origin + whole seconds of offset
/// sleep(d) advances the offset by d without actually sleeping.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Timestamp,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new(origin: Timestamp) -> Self {
        Self {
            origin,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    /// Jump to an absolute timestamp (must not be before the origin).
    pub fn set(&self, now: Timestamp) {
        let secs = u64::try_from(now - self.origin).unwrap_or(0);
        if let Ok(mut off) = self.offset.lock() {
            *off = Duration::from_secs(secs);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        self.origin
            .saturating_add(i64::try_from(off.as_secs()).unwrap_or(i64::MAX))
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

/// Thermometer returning a settable value; `None` makes reads fail.
#[derive(Debug, Clone)]
pub struct FakeThermometer {
    reading: Arc<Mutex<Option<f32>>>,
}

impl FakeThermometer {
    pub fn new(celsius: f32) -> Self {
        Self {
            reading: Arc::new(Mutex::new(Some(celsius))),
        }
    }

    pub fn set(&self, reading: Option<f32>) {
        if let Ok(mut r) = self.reading.lock() {
            *r = reading;
        }
    }
}

impl Thermometer for FakeThermometer {
    fn read_celsius(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        let r = self.reading.lock().map(|g| *g).unwrap_or(None);
        r.ok_or_else(|| std::io::Error::other("fake sensor unplugged").into())
    }
}

/// Heater or LED that remembers every state it was driven to.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    history: Arc<Mutex<VecDeque<bool>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<bool> {
        self.history.lock().ok().and_then(|h| h.back().copied())
    }

    pub fn history(&self) -> Vec<bool> {
        self.history
            .lock()
            .map(|h| h.iter().copied().collect())
            .unwrap_or_default()
    }

    fn record(&self, on: bool) {
        if let Ok(mut h) = self.history.lock() {
            h.push_back(on);
        }
    }
}

impl Heater for RecordingOutput {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.record(on);
        Ok(())
    }
}

impl Indicator for RecordingOutput {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.record(on);
        Ok(())
    }
}
