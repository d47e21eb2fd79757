use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Whole seconds since the Unix epoch.
pub type Timestamp = i64;

/// Wall clock abstraction used by the control loops.
///
/// - now(): current wall time in whole seconds
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - secs_since(): helper to compute elapsed seconds from an earlier timestamp
pub trait Clock {
    fn now(&self) -> Timestamp;
    fn sleep(&self, d: Duration);

    /// Seconds elapsed since `earlier`, saturating at 0 if the clock went backwards.
    fn secs_since(&self, earlier: Timestamp) -> u64 {
        u64::try_from(self.now().saturating_sub(earlier)).unwrap_or(0)
    }
}

/// Default clock backed by `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            // Clock set before 1970; report negative seconds rather than panic
            Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
        }
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Timestamp);

    impl Clock for Fixed {
        fn now(&self) -> Timestamp {
            self.0
        }
        fn sleep(&self, _d: Duration) {}
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock::new().now() > 1_577_836_800);
    }

    #[test]
    fn secs_since_saturates() {
        let c = Fixed(100);
        assert_eq!(c.secs_since(40), 60);
        assert_eq!(c.secs_since(500), 0);
    }
}
