//! Tracing setup for the daemon.
//!
//! Console output is pretty or JSON lines (`--json`). An optional file layer
//! writes JSON lines through a non-blocking `tracing-appender` writer whose
//! guard lives in [`FILE_GUARD`] for the life of the process.

use std::path::Path;

use eyre::{Result, WrapErr};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::FILE_GUARD;

/// `RUST_LOG` wins over the CLI level, which wins over the config level.
fn env_filter(cli_level: Option<&str>, cfg_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli_level.or(cfg_level).unwrap_or("info")))
}

fn file_appender(file: &str, rotation: Option<&str>) -> rolling::RollingFileAppender {
    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map_or_else(|| "fermenterd.log".into(), |n| n.to_string_lossy().into_owned());
    match rotation {
        Some("daily") => rolling::daily(dir, name),
        Some("hourly") => rolling::hourly(dir, name),
        _ => rolling::never(dir, name),
    }
}

/// Install the global subscriber. Call once, before any thread starts.
pub fn init(json: bool, cli_level: Option<&str>, logging: Option<&ferm_config::Logging>) -> Result<()> {
    let cfg_level = logging.and_then(|l| l.level.as_deref());
    let filter = env_filter(cli_level, cfg_level);

    let file_layer = match logging.and_then(|l| l.file.as_deref()) {
        Some(file) => {
            if let Some(dir) = Path::new(file).parent()
                && !dir.as_os_str().is_empty()
            {
                std::fs::create_dir_all(dir)
                    .wrap_err_with(|| format!("create log directory {}", dir.display()))?;
            }
            let rotation = logging.and_then(|l| l.rotation.as_deref());
            let (writer, guard) = tracing_appender::non_blocking(file_appender(file, rotation));
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let installed = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    installed.map_err(|e| eyre::eyre!("install tracing subscriber: {e}"))
}
