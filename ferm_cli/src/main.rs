//! `fermenterd`: fermentation temperature controller daemon.

mod check;
mod cli;
mod daemon;
mod error_fmt;
mod logging;

use clap::Parser;
use eyre::{Result, WrapErr};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        tracing::error!(error = %err, "fermenterd failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    match cli.cmd {
        Commands::Run { simulate } => {
            let cfg = ferm_config::load_file(&cli.config)?;
            logging::init(cli.json, cli.log_level.as_deref(), Some(&cfg.logging))?;
            tracing::info!(
                config = %cli.config.display(),
                units = cfg.units.len(),
                version = env!("CARGO_PKG_VERSION"),
                "starting fermenterd"
            );
            daemon::run(&cfg, simulate)
        }
        Commands::CheckProgramme { file, unit_seconds } => {
            logging::init(cli.json, cli.log_level.as_deref().or(Some("warn")), None)?;
            let unit_seconds = match unit_seconds {
                Some(u) => u,
                None => ferm_config::load_file(&cli.config)
                    .map(|c| c.control.unit_seconds)
                    .unwrap_or(3600),
            };
            if unit_seconds == 0 {
                eyre::bail!("--unit-seconds must be >= 1");
            }
            let text = check::check_programme(&file, unit_seconds)
                .wrap_err_with(|| format!("check programme {}", file.display()))?;
            print!("{text}");
            Ok(())
        }
        Commands::CheckConfig => {
            logging::init(cli.json, cli.log_level.as_deref().or(Some("warn")), None)?;
            let cfg = ferm_config::load_file(&cli.config)?;
            print!("{}", check::describe_config(&cfg));
            println!("config OK: {}", cli.config.display());
            Ok(())
        }
    }
}
