//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "whiskers", version, about = "Cat scale occupancy monitor")]
pub struct Cli {
    /// Path to config TOML (typed); missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/whiskers.toml")]
    pub config: PathBuf,

    /// Emit records, results and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Monitor the scale and record visits until Ctrl-C
    Run {
        /// Use the simulated scale even in hardware builds
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
        /// Stop after this many polls
        #[arg(long, value_name = "N")]
        max_polls: Option<u64>,
    },
    /// Replay one scripted visit through the engine in virtual time
    Simulate {
        /// Mass of the simulated cat
        #[arg(long, value_name = "GRAMS", default_value_t = 4500.0)]
        visit_g: f32,
        /// How long the cat stays on the platform
        #[arg(long, value_name = "MS", default_value_t = 30_000)]
        visit_ms: u64,
        /// Peak ripple added to every reading
        #[arg(long, value_name = "GRAMS", default_value_t = 8.0)]
        noise_g: f32,
    },
    /// Derive the scale factor from a known mass and save it to the config
    Calibrate {
        /// Initial target mass (defaults to calibration.default_target_g)
        #[arg(long, value_name = "GRAMS")]
        target_g: Option<i32>,
        /// Use the simulated scale even in hardware builds
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
    /// Read the scale once (hardware presence / sim ok)
    SelfCheck,
    /// Print stored visit records
    History {
        /// History CSV (defaults to history.file from the config)
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}
