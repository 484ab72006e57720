//! Configuration types for the weighing engine.
//!
//! These are the runtime configuration structs used by `WeighEngine` and
//! `Monitor`. They are separate from the TOML-deserialized config in
//! `whiskers_config`; see `conversions` for the mapping.

/// Signal conditioning and statistics window.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCfg {
    /// Low-pass coefficient in (0.0, 1.0]. 1.0 passes the input through.
    pub alpha: f32,
    /// Rolling statistics window (ms).
    pub window_ms: u64,
    /// Target period of the polling loop (ms).
    pub sample_period_ms: u64,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            window_ms: 2000,
            sample_period_ms: 100,
        }
    }
}

/// Occupancy thresholds and visit post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyCfg {
    /// Smoothed mass strictly above this means occupied.
    pub weight_min_g: f32,
    /// Visits must last strictly longer than this to be recorded; best-sample
    /// tracking starts once a visit is this old.
    pub presence_time_min_ms: u64,
    /// Hold a finished visit this long and sample the secondary mass (0 = off).
    pub settle_ms: u64,
    /// Request a re-zero once a visit's settle interval has elapsed. Has no
    /// effect with `settle_ms == 0`.
    pub retare_after_visit: bool,
}

impl Default for OccupancyCfg {
    fn default() -> Self {
        Self {
            weight_min_g: 2000.0,
            presence_time_min_ms: 5000,
            settle_ms: 5000,
            retare_after_visit: true,
        }
    }
}

/// Idle baseline drift correction.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftCfg {
    /// |smoothed| at or above this keeps the drift timer running.
    pub tare_threshold_g: f32,
    /// Sustained drift longer than this requests a re-zero.
    pub tare_time_ms: u64,
}

impl Default for DriftCfg {
    fn default() -> Self {
        Self {
            tare_threshold_g: 50.0,
            tare_time_ms: 60_000,
        }
    }
}

/// Linear load-cell model: `units = (raw - offset_counts) / scale_factor`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadCellCfg {
    pub scale_factor: f32,
    pub offset_counts: i32,
    /// Raw reads averaged per tare.
    pub tare_samples: u32,
}

impl Default for LoadCellCfg {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            offset_counts: 0,
            tare_samples: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationCfg {
    pub default_target_g: i32,
    /// Grams per encoder detent.
    pub step_g: i32,
    /// Raw reads averaged on confirmation.
    pub samples: u32,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            default_target_g: 500,
            step_g: 1,
            samples: 10,
        }
    }
}

/// Timeouts and watchdogs.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeouts {
    /// Max sensor wait per read (ms).
    pub sensor_ms: u64,
    /// Max wait for one operator event while calibrating (ms).
    pub input_poll_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            sensor_ms: 1000,
            input_poll_ms: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunnerCfg {
    /// Stop `Monitor::run` after this many failed reads in a row. 0 disables.
    pub max_consecutive_failures: u32,
}
