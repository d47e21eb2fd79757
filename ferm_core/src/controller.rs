//! The per-unit fermentation controller.
//!
//! Each physical unit gets one `Fermenter`, driven by its own thread through
//! [`Fermenter::run`]. A unit is either Stopped (no programme, heater off)
//! or Running (programme loaded, sampled once per period). Finishing the
//! last step is handled exactly like a Stop command.
//!
//! Ordering on transitions:
//! - start: load, rotate logs, schedule, write run record, open log
//! - stop: heater off, drop programme, close log, delete run record
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ferm_traits::{Clock, Heater, Thermometer, Timestamp};
use tracing::{debug, error, info, warn};

use crate::command::{Command, UnitHandle, UnitStatus};
use crate::config::ControllerCfg;
use crate::hw_error::map_hw_error;
use crate::persist::StateStore;
use crate::programme::{Programme, RampPoint};
use crate::sink::{LogEntry, LogHandle, LogSink};
use crate::status::{CycleOutcome, StopReason};

/// Reading substituted for a failed sensor; high enough to keep the heater off.
pub const SENSOR_FAULT_C: f32 = 999.0;

/// Longest uninterrupted sleep between shutdown checks.
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

/// A programme in progress.
struct Run {
    programme: Programme,
    source: PathBuf,
    started_at: Timestamp,
    log: Option<LogHandle>,
}

pub struct Fermenter<T: Thermometer, H: Heater, C: Clock> {
    unit: Arc<UnitHandle>,
    thermometer: T,
    heater: H,
    clock: C,
    cfg: ControllerCfg,
    store: StateStore,
    logs: LogSink,
    run: Option<Run>,
}

impl<T: Thermometer, H: Heater, C: Clock> core::fmt::Debug for Fermenter<T, H, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fermenter")
            .field("unit", &self.unit.index())
            .field("source", &self.run.as_ref().map(|r| &r.source))
            .finish()
    }
}

impl<T: Thermometer, H: Heater, C: Clock> Fermenter<T, H, C> {
    pub fn new(unit: Arc<UnitHandle>, thermometer: T, heater: H, clock: C, cfg: ControllerCfg) -> Self {
        let store = StateStore::new(&cfg.state_dir);
        let logs = LogSink::new(&cfg.log_dir);
        Self {
            unit,
            thermometer,
            heater,
            clock,
            cfg,
            store,
            logs,
            run: None,
        }
    }

    pub fn index(&self) -> usize {
        self.unit.index()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn programme(&self) -> Option<&Programme> {
        self.run.as_ref().map(|r| &r.programme)
    }

    pub fn source(&self) -> Option<&Path> {
        self.run.as_ref().map(|r| r.source.as_path())
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.run.as_ref().map(|r| r.started_at)
    }

    /// Control loop: resume any interrupted run, then cycle until `shutdown`.
    ///
    /// The run record is left in place on shutdown so the next start resumes.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(unit = self.index(), "controller started");
        self.recover();
        while !shutdown.load(Ordering::Acquire) {
            self.cycle();
            self.sleep_unless_shutdown(shutdown);
        }
        self.drive_heater(false);
        info!(unit = self.index(), running = self.is_running(), "controller stopped");
    }

    fn sleep_unless_shutdown(&self, shutdown: &AtomicBool) {
        let mut left = self.cfg.sample_period;
        while !left.is_zero() && !shutdown.load(Ordering::Acquire) {
            let nap = left.min(SHUTDOWN_POLL);
            self.clock.sleep(nap);
            left = left.saturating_sub(nap);
        }
    }

    /// Resume a run interrupted by a previous process exit, if one was recorded.
    ///
    /// The record is consumed whatever happens; a successful resume writes it
    /// back. Returns whether the unit is now running.
    pub fn recover(&mut self) -> bool {
        let unit = self.index();
        self.drive_heater(false);
        let Some(record) = self.store.read_and_consume(unit) else {
            debug!(unit, "no interrupted run");
            return false;
        };
        let mut programme = match Programme::load(&record.source, self.cfg.unit_seconds) {
            Ok(p) => p,
            Err(e) => {
                warn!(unit, error = %e, "cannot resume interrupted run");
                return false;
            }
        };
        programme.assign_start_times(record.start_time);
        if let Err(e) = self.store.write(unit, record.start_time, &record.source) {
            error!(unit, error = %e, "cannot rewrite run record; run will not survive a restart");
        }
        let log = self.open_log();
        info!(
            unit,
            source = %record.source.display(),
            elapsed_s = self.clock.secs_since(record.start_time),
            "resumed interrupted run"
        );
        self.enter_running(programme, record.source, record.start_time, log);
        true
    }

    /// One pass of the loop: apply at most one command, then sample if running.
    pub fn cycle(&mut self) -> CycleOutcome {
        match self.unit.take_command() {
            Some(Command::Start(source)) => {
                if let Some(run) = &self.run {
                    info!(
                        unit = self.index(),
                        requested = %source.display(),
                        running = %run.source.display(),
                        "start ignored; stop the current programme first"
                    );
                } else {
                    self.start(source);
                }
            }
            Some(Command::Stop) => {
                if self.run.is_some() {
                    self.stop(StopReason::Command);
                    return CycleOutcome::Stopped(StopReason::Command);
                }
                debug!(unit = self.index(), "stop ignored; nothing running");
            }
            None => {}
        }

        if self.run.is_some() {
            self.sample()
        } else {
            CycleOutcome::Idle
        }
    }

    fn start(&mut self, source: PathBuf) {
        let unit = self.index();
        let mut programme = match Programme::load(&source, self.cfg.unit_seconds) {
            Ok(p) => p,
            Err(e) => {
                warn!(unit, error = %e, "start rejected");
                return;
            }
        };
        if let Err(e) = self.logs.rotate(unit, self.cfg.max_generations) {
            warn!(unit, error = %e, "log rotation failed");
        }
        let now = self.clock.now();
        programme.assign_start_times(now);
        if let Err(e) = self.store.write(unit, now, &source) {
            error!(unit, error = %e, "cannot write run record; run will not survive a restart");
        }
        let log = self.open_log();
        info!(
            unit,
            source = %source.display(),
            steps = programme.steps().len(),
            total_s = programme.total_seconds(),
            "programme started"
        );
        self.enter_running(programme, source, now, log);
    }

    fn enter_running(&mut self, programme: Programme, source: PathBuf, started_at: Timestamp, log: Option<LogHandle>) {
        self.unit.publish(UnitStatus::Running {
            source: source.clone(),
            started_at,
        });
        self.run = Some(Run {
            programme,
            source,
            started_at,
            log,
        });
    }

    fn stop(&mut self, reason: StopReason) {
        let unit = self.index();
        self.drive_heater(false);
        if let Some(run) = self.run.take() {
            let Run { source, log, .. } = run;
            // Close before the record goes so a live record always has its log
            drop(log);
            info!(unit, source = %source.display(), ?reason, "programme stopped");
        }
        self.store.delete(unit);
        self.unit.publish(UnitStatus::Idle);
    }

    fn sample(&mut self) -> CycleOutcome {
        let unit = self.index();
        let now = self.clock.now();
        let point = match &self.run {
            Some(run) => run.programme.desired_temperature(now),
            None => return CycleOutcome::Idle,
        };
        let desired = match point {
            RampPoint::Complete => {
                self.stop(StopReason::Completed);
                return CycleOutcome::Stopped(StopReason::Completed);
            }
            RampPoint::PreRamp(t) | RampPoint::Ramp { temp: t, .. } => t,
        };

        let actual = self.read_temperature();
        let heat = actual < desired;
        let entry = LogEntry {
            time: now,
            actual,
            desired,
            heat,
        };
        if let Some(log) = self.run.as_mut().and_then(|r| r.log.as_mut())
            && let Err(e) = log.append(&entry)
        {
            warn!(unit, error = %e, "log append failed");
        }
        self.drive_heater(heat);
        debug!(unit, actual, desired, heat, "sample");
        CycleOutcome::Sampled(entry)
    }

    fn read_temperature(&mut self) -> f32 {
        match self.thermometer.read_celsius() {
            Ok(c) if c.is_finite() => c,
            Ok(c) => {
                warn!(unit = self.index(), reading = c, "non-finite temperature; holding heater off");
                SENSOR_FAULT_C
            }
            Err(e) => {
                let err = map_hw_error(&*e);
                warn!(unit = self.index(), error = %err, "sensor read failed; holding heater off");
                SENSOR_FAULT_C
            }
        }
    }

    fn drive_heater(&mut self, on: bool) {
        if let Err(e) = self.heater.set(on) {
            let err = map_hw_error(&*e);
            error!(unit = self.index(), on, error = %err, "heater actuation failed");
        }
    }

    fn open_log(&self) -> Option<LogHandle> {
        match self.logs.open(self.index()) {
            Ok(h) => Some(h),
            Err(e) => {
                warn!(unit = self.index(), error = %e, "cannot open temperature log; running without it");
                None
            }
        }
    }
}
