//! `fermenterd run`: wire hardware, controllers, heartbeat and listener together.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use eyre::{Result, WrapErr};
use ferm_config::Config;
use ferm_core::{ControlServer, ControllerCfg, Fermenter, HeartbeatCfg, UnitHandle, heartbeat};
use ferm_hardware::{SimulatedLed, SimulatedVessel};
use ferm_traits::{Heater, Indicator, SystemClock, Thermometer};
use tracing::{error, info, warn};

/// Starting temperature of every simulated vessel.
const SIM_AMBIENT_C: f32 = 18.0;

struct UnitIo {
    thermometer: Box<dyn Thermometer + Send>,
    heater: Box<dyn Heater + Send>,
}

struct Outputs {
    units: Vec<UnitIo>,
    heartbeat: Option<Box<dyn Indicator + Send>>,
}

fn simulated(cfg: &Config) -> Outputs {
    let units = cfg
        .units
        .iter()
        .map(|_| {
            let vessel = SimulatedVessel::new(SIM_AMBIENT_C);
            UnitIo {
                thermometer: Box::new(vessel.thermometer()),
                heater: Box::new(vessel.heater()),
            }
        })
        .collect();
    Outputs {
        units,
        heartbeat: Some(Box::new(SimulatedLed::default())),
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn hardware(cfg: &Config) -> Result<Outputs> {
    use ferm_core::FermenterError;
    use ferm_hardware::W1Thermometer;
    use ferm_hardware::gpio::{GpioHeater, GpioLed};

    let mut units = Vec::with_capacity(cfg.units.len());
    for (i, u) in cfg.units.iter().enumerate() {
        let heater = GpioHeater::open(u.heater_pin, u.led_pin, u.active_low)
            .map_err(|e| FermenterError::Hardware(e.to_string()))
            .wrap_err_with(|| format!("initialise unit {i} outputs"))?;
        let thermometer = W1Thermometer::new(&u.sensor);
        if !thermometer.path().exists() {
            // Probes may appear later; each sample retries the read
            warn!(unit = i, path = %thermometer.path().display(), "temperature probe not present yet");
        }
        units.push(UnitIo {
            thermometer: Box::new(thermometer),
            heater: Box::new(heater),
        });
    }
    let heartbeat = match cfg.heartbeat.led_pin {
        Some(pin) => {
            let led = GpioLed::open(pin)
                .map_err(|e| FermenterError::Hardware(e.to_string()))
                .wrap_err("initialise heartbeat LED")?;
            Some(Box::new(led) as Box<dyn Indicator + Send>)
        }
        None => None,
    };
    Ok(Outputs { units, heartbeat })
}

fn init_outputs(cfg: &Config, simulate: bool) -> Result<Outputs> {
    if simulate {
        info!(units = cfg.units.len(), "using simulated vessels");
        return Ok(simulated(cfg));
    }
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        let outputs = hardware(cfg)?;
        info!(units = cfg.units.len(), "hardware outputs initialised");
        Ok(outputs)
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        warn!("built without the `hardware` feature; using simulated vessels");
        Ok(simulated(cfg))
    }
}

/// Run the daemon until `q` on the control socket or SIGINT/SIGTERM.
pub fn run(cfg: &Config, simulate: bool) -> Result<()> {
    let outputs = init_outputs(cfg, simulate)?;
    let ctl_cfg = ControllerCfg::from(cfg);
    let hb_cfg = HeartbeatCfg::from(&cfg.heartbeat);

    let handles: Vec<Arc<UnitHandle>> = (0..outputs.units.len())
        .map(|i| Arc::new(UnitHandle::new(i)))
        .collect();
    let unit_count = handles.len();

    let socket = cfg.daemon.socket.clone();
    let listener = ControlServer::bind(&socket)
        .wrap_err_with(|| format!("bind control socket {}", socket.display()))?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let (wake_tx, wake_rx) = crossbeam_channel::bounded::<()>(1);
    {
        let shutdown = Arc::clone(&shutdown);
        let wake_tx = wake_tx.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Release);
            let _ = wake_tx.try_send(());
        })
        .wrap_err("install signal handler")?;
    }

    let mut workers = Vec::with_capacity(handles.len() + 1);
    for (io, handle) in outputs.units.into_iter().zip(&handles) {
        let mut fermenter = Fermenter::new(
            Arc::clone(handle),
            io.thermometer,
            io.heater,
            SystemClock,
            ctl_cfg.clone(),
        );
        let shutdown = Arc::clone(&shutdown);
        let worker = thread::Builder::new()
            .name(format!("fermenter{}", handle.index()))
            .spawn(move || fermenter.run(&shutdown))
            .wrap_err("spawn controller thread")?;
        workers.push(worker);
    }

    if let Some(mut led) = outputs.heartbeat {
        let shutdown = Arc::clone(&shutdown);
        let worker = thread::Builder::new()
            .name("heartbeat".into())
            .spawn(move || {
                let toggles = heartbeat::run(&mut led, &hb_cfg, &SystemClock, &shutdown);
                tracing::debug!(toggles, "heartbeat stopped");
            })
            .wrap_err("spawn heartbeat thread")?;
        workers.push(worker);
    }

    let server = ControlServer::new(handles, format!("fermenterd {}", env!("CARGO_PKG_VERSION")));
    {
        let shutdown = Arc::clone(&shutdown);
        // Detached: after a signal it stays blocked in accept until the process exits
        thread::Builder::new()
            .name("listener".into())
            .spawn(move || {
                server.accept_loop(&listener);
                shutdown.store(true, Ordering::Release);
                let _ = wake_tx.try_send(());
            })
            .wrap_err("spawn listener thread")?;
    }

    info!(units = unit_count, "fermenterd running");
    if wake_rx.recv().is_err() {
        warn!("shutdown channel closed unexpectedly");
    }
    shutdown.store(true, Ordering::Release);
    info!("shutting down");

    for w in workers {
        let name = w.thread().name().unwrap_or("worker").to_string();
        if w.join().is_err() {
            error!(thread = %name, "worker panicked");
        }
    }
    if let Err(e) = std::fs::remove_file(&socket)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(socket = %socket.display(), error = %e, "cannot remove control socket");
    }
    info!("fermenterd stopped");
    Ok(())
}
