//! Liveness blink, independent of the control loops.

use std::sync::atomic::{AtomicBool, Ordering};

use ferm_traits::{Clock, Indicator};
use tracing::{trace, warn};

use crate::config::HeartbeatCfg;
use crate::hw_error::map_hw_error;

/// Toggle `led` every `cfg.period` until `shutdown`, then switch it off.
/// Returns the number of toggles.
pub fn run<I: Indicator, C: Clock>(
    led: &mut I,
    cfg: &HeartbeatCfg,
    clock: &C,
    shutdown: &AtomicBool,
) -> u64 {
    let mut on = false;
    let mut toggles = 0u64;
    let mut warned = false;
    while !shutdown.load(Ordering::Acquire) {
        on = !on;
        match led.set(on) {
            Ok(()) => trace!(on, "heartbeat"),
            Err(e) if !warned => {
                warn!(error = %map_hw_error(&*e), "heartbeat LED failed");
                warned = true;
            }
            Err(_) => {}
        }
        toggles += 1;
        clock.sleep(cfg.period);
    }
    if let Err(e) = led.set(false) {
        warn!(error = %map_hw_error(&*e), "cannot switch heartbeat LED off");
    }
    toggles
}
