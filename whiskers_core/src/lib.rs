#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Occupancy weighing engine (hardware-agnostic).
//!
//! All hardware interactions go through `whiskers_traits::Scale` and
//! `whiskers_traits::InputDevice`; time comes from `whiskers_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Signal conditioning**: single-pole low-pass (`filter`)
//! - **Statistics**: time-windowed mean/variance/sigma (`window`)
//! - **Occupancy**: IDLE/OCCUPIED visits with best-sample tracking (`occupancy`)
//! - **Drift**: idle baseline re-zero requests (`drift`)
//! - **Engine**: the per-sample step tying the above together (`engine`)
//! - **Calibration**: interactive scale-factor derivation (`calibration`)
//! - **Monitor**: the polling loop, acquisition and collaborators (`runner`)
//!
//! ```no_run
//! use whiskers_core::{Monitor, mocks::ScriptedScale};
//! # fn main() -> eyre::Result<()> {
//! let mut monitor = Monitor::builder()
//!     .with_scale(ScriptedScale::holding(0))
//!     .build()?;
//! let _ = monitor.poll_once();
//! # Ok(())
//! # }
//! ```

pub mod acquisition;
pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod drift;
pub mod engine;
pub mod error;
pub mod events;
pub mod feedback;
pub mod filter;
pub mod hw_error;
pub mod mocks;
pub mod occupancy;
pub mod record;
pub mod runner;
pub mod sink;
pub mod util;
pub mod window;

pub use acquisition::ScaleReader;
pub use builder::MonitorBuilder;
pub use calibration::{CalibrationOutcome, CalibrationSession, Calibrator};
pub use config::{
    CalibrationCfg, DriftCfg, FilterCfg, LoadCellCfg, OccupancyCfg, RunnerCfg, Timeouts,
};
pub use drift::DriftCorrector;
pub use engine::WeighEngine;
pub use error::{BuildError, CalibrationError, Result, WhiskersError};
pub use events::{EngineEvent, StepOutcome};
pub use feedback::{Feedback, NoopFeedback, Notification};
pub use filter::LowPass;
pub use occupancy::{OccupancyMachine, OccupancyState};
pub use record::{Visit, VisitRecord};
pub use runner::{Monitor, PollOutcome, RunSummary};
pub use sink::{CalibrationStore, NullSink, RecordSink};
pub use window::WindowStats;
