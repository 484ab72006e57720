#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `whiskers`: occupancy scale monitor.

mod cli;
mod commands;
mod error_fmt;
mod hw;
mod sinks;

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn file_layer(logging: &whiskers_config::Logging) -> Result<Option<BoxedLayer>> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    let Some(file) = logging.file.as_deref() else {
        return Ok(None);
    };
    let path = std::path::Path::new(file);
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let prefix = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
    let rotation = match logging.rotation.as_deref() {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    };
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .build(dir)
        .wrap_err_with(|| format!("open log file {file}"))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);

    let level = logging.level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_new(level).wrap_err_with(|| format!("logging.level {level}"))?;
    Ok(Some(
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
    ))
}

fn init_tracing(json: bool, level: &str, logging: &whiskers_config::Logging) -> Result<()> {
    // RUST_LOG wins over --log-level for the console.
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("--log-level {level}"))?,
    };
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let console: BoxedLayer = if json {
        console.json().with_filter(filter).boxed()
    } else {
        console.with_filter(filter).boxed()
    };

    let mut layers = vec![console];
    layers.extend(file_layer(logging)?);
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))
}

fn real_main(cli: Cli) -> Result<()> {
    let (cfg, origin, fallback) = whiskers_config::load_or_default(&cli.config);
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    match (origin, fallback) {
        (whiskers_config::ConfigOrigin::File, _) => {
            tracing::debug!(path = %cli.config.display(), "config loaded");
        }
        (whiskers_config::ConfigOrigin::Missing, _) => {
            tracing::info!(path = %cli.config.display(), "no config file; using defaults");
        }
        (whiskers_config::ConfigOrigin::Fallback, reason) => {
            tracing::warn!(
                reason = reason.as_deref().unwrap_or("unknown"),
                "config unusable; using defaults"
            );
        }
    }
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration {}", cli.config.display()))?;

    match cli.cmd {
        Commands::Run { sim, max_polls } => {
            commands::run(&cfg, &cli.config, cli.json, sim, max_polls)
        }
        Commands::Simulate {
            visit_g,
            visit_ms,
            noise_g,
        } => commands::simulate(&cfg, cli.json, visit_g, visit_ms, noise_g),
        Commands::Calibrate { target_g, sim } => {
            commands::calibrate(&cfg, &cli.config, cli.json, target_g, sim)
        }
        Commands::SelfCheck => commands::self_check(&cfg, cli.json),
        Commands::History { file } => commands::history(&cfg, cli.json, file),
    }
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: error reporter not installed: {e}");
    }

    if let Err(err) = real_main(cli) {
        tracing::error!(error = %format!("{err:#}"), "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}
