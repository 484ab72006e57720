//! Type-state builder for `Monitor`.
//!
//! The builder enforces at compile time that a scale is provided before
//! `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use whiskers_traits::clock::{Clock, MonotonicClock};
use whiskers_traits::{InputDevice, Scale};

use crate::acquisition::ScaleReader;
use crate::calibration::Calibrator;
use crate::config::*;
use crate::engine::WeighEngine;
use crate::error::{BuildError, Result};
use crate::feedback::{Feedback, NoopFeedback};
use crate::runner::Monitor;
use crate::sink::{CalibrationStore, NullSink, RecordSink};
use crate::util::unix_now_s;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Monitor`. All fields are validated on `build()`.
pub struct MonitorBuilder<S> {
    scale: Option<Box<dyn Scale>>,
    filter: Option<FilterCfg>,
    occupancy: Option<OccupancyCfg>,
    drift: Option<DriftCfg>,
    load_cell: Option<LoadCellCfg>,
    calibration: Option<CalibrationCfg>,
    timeouts: Option<Timeouts>,
    runner: Option<RunnerCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    feedback: Option<Box<dyn Feedback>>,
    records: Option<Box<dyn RecordSink>>,
    store: Option<Box<dyn CalibrationStore>>,
    input: Option<Box<dyn InputDevice>>,
    timestamp: Option<Box<dyn Fn() -> i64>>,
    _s: PhantomData<S>,
}

impl Default for MonitorBuilder<Missing> {
    fn default() -> Self {
        Self {
            scale: None,
            filter: None,
            occupancy: None,
            drift: None,
            load_cell: None,
            calibration: None,
            timeouts: None,
            runner: None,
            clock: None,
            feedback: None,
            records: None,
            store: None,
            input: None,
            timestamp: None,
            _s: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

impl<S> MonitorBuilder<S> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Monitor> {
        let scale = self
            .scale
            .ok_or_else(|| eyre::Report::new(BuildError::MissingScale))?;
        let filter = self.filter.unwrap_or_default();
        let load_cell = self.load_cell.unwrap_or_default();
        let calibration = self.calibration.unwrap_or_default();
        let timeouts = self.timeouts.unwrap_or_default();

        if filter.sample_period_ms == 0 {
            return Err(invalid("sample_period_ms must be >= 1"));
        }
        if timeouts.sensor_ms == 0 {
            return Err(invalid("sensor_ms must be >= 1"));
        }
        if calibration.step_g <= 0 {
            return Err(invalid("calibration step_g must be > 0"));
        }
        if calibration.samples == 0 || load_cell.tare_samples == 0 {
            return Err(invalid("sample counts must be >= 1"));
        }

        let clock: Arc<dyn Clock + Send + Sync> = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let period = Duration::from_millis(filter.sample_period_ms);
        let engine = WeighEngine::with_clock(
            filter,
            self.occupancy.unwrap_or_default(),
            self.drift.unwrap_or_default(),
            clock.clone(),
        )?;
        let reader = ScaleReader::new(scale, &load_cell)
            .map_err(|_| invalid("scale_factor must be finite and non-zero"))?;
        let calibrator = Calibrator::new(calibration, timeouts.clone(), load_cell.tare_samples);

        Ok(Monitor {
            reader,
            engine,
            calibrator,
            feedback: self.feedback.unwrap_or_else(|| Box::new(NoopFeedback)),
            records: self.records.unwrap_or_else(|| Box::new(NullSink)),
            store: self.store.unwrap_or_else(|| Box::new(NullSink)),
            input: self.input,
            timeouts,
            tare_samples: load_cell.tare_samples,
            runner: self.runner.unwrap_or_default(),
            period,
            clock,
            timestamp: self.timestamp.unwrap_or_else(|| Box::new(unix_now_s)),
        })
    }
}

/// Chainable setters that do not affect type-state.
impl<S> MonitorBuilder<S> {
    /// Take every section from a loaded config file.
    pub fn with_config(self, cfg: &whiskers_config::Config) -> Self {
        self.with_filter((&cfg.filter).into())
            .with_occupancy((&cfg.scale).into())
            .with_drift((&cfg.scale).into())
            .with_load_cell((&cfg.scale).into())
            .with_calibration((&cfg.calibration).into())
            .with_timeouts((&cfg.timeouts).into())
            .with_runner((&cfg.runner).into())
    }
    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.filter = Some(filter);
        self
    }
    pub fn with_occupancy(mut self, occupancy: OccupancyCfg) -> Self {
        self.occupancy = Some(occupancy);
        self
    }
    pub fn with_drift(mut self, drift: DriftCfg) -> Self {
        self.drift = Some(drift);
        self
    }
    pub fn with_load_cell(mut self, load_cell: LoadCellCfg) -> Self {
        self.load_cell = Some(load_cell);
        self
    }
    pub fn with_calibration(mut self, calibration: CalibrationCfg) -> Self {
        self.calibration = Some(calibration);
        self
    }
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }
    pub fn with_runner(mut self, runner: RunnerCfg) -> Self {
        self.runner = Some(runner);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    pub fn with_feedback(mut self, feedback: impl Feedback + 'static) -> Self {
        self.feedback = Some(Box::new(feedback));
        self
    }
    pub fn with_record_sink(mut self, records: impl RecordSink + 'static) -> Self {
        self.records = Some(Box::new(records));
        self
    }
    pub fn with_calibration_store(mut self, store: impl CalibrationStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }
    pub fn with_input(mut self, input: impl InputDevice + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }
    /// Wall-clock source (seconds since the Unix epoch) used to stamp records.
    pub fn with_timestamp_source(mut self, f: impl Fn() -> i64 + 'static) -> Self {
        self.timestamp = Some(Box::new(f));
        self
    }
}

// Setter that advances type-state
impl MonitorBuilder<Missing> {
    pub fn with_scale(self, scale: impl Scale + 'static) -> MonitorBuilder<Set> {
        MonitorBuilder {
            scale: Some(Box::new(scale)),
            filter: self.filter,
            occupancy: self.occupancy,
            drift: self.drift,
            load_cell: self.load_cell,
            calibration: self.calibration,
            timeouts: self.timeouts,
            runner: self.runner,
            clock: self.clock,
            feedback: self.feedback,
            records: self.records,
            store: self.store,
            input: self.input,
            timestamp: self.timestamp,
            _s: PhantomData,
        }
    }
}

impl MonitorBuilder<Set> {
    /// Validate and build the Monitor. Only available once a scale is set.
    pub fn build(self) -> Result<Monitor> {
        self.try_build()
    }
}
