//! `From` implementations bridging `whiskers_config` types to `whiskers_core` types.

use crate::config::{
    CalibrationCfg, DriftCfg, FilterCfg, LoadCellCfg, OccupancyCfg, RunnerCfg, Timeouts,
};
use crate::record::VisitRecord;

impl From<&whiskers_config::FilterCfg> for FilterCfg {
    fn from(c: &whiskers_config::FilterCfg) -> Self {
        Self {
            alpha: c.alpha,
            window_ms: c.window_ms,
            sample_period_ms: c.sample_period_ms,
        }
    }
}

// ── [scale] fans out into three runtime sections ─────────────────────────────

impl From<&whiskers_config::ScaleCfg> for OccupancyCfg {
    fn from(c: &whiskers_config::ScaleCfg) -> Self {
        Self {
            weight_min_g: c.weight_min_g,
            presence_time_min_ms: c.presence_time_min_ms,
            settle_ms: c.settle_ms,
            retare_after_visit: c.retare_after_visit,
        }
    }
}

impl From<&whiskers_config::ScaleCfg> for DriftCfg {
    fn from(c: &whiskers_config::ScaleCfg) -> Self {
        Self {
            tare_threshold_g: c.tare_threshold_g,
            tare_time_ms: c.tare_time_ms,
        }
    }
}

impl From<&whiskers_config::ScaleCfg> for LoadCellCfg {
    fn from(c: &whiskers_config::ScaleCfg) -> Self {
        Self {
            scale_factor: c.scale_factor,
            offset_counts: c.offset_counts,
            tare_samples: c.tare_samples,
        }
    }
}

impl From<&whiskers_config::CalibrationCfg> for CalibrationCfg {
    fn from(c: &whiskers_config::CalibrationCfg) -> Self {
        Self {
            default_target_g: c.default_target_g,
            step_g: c.step_g,
            samples: c.samples,
        }
    }
}

impl From<&whiskers_config::Timeouts> for Timeouts {
    fn from(c: &whiskers_config::Timeouts) -> Self {
        Self {
            sensor_ms: c.sensor_ms,
            input_poll_ms: c.input_poll_ms,
        }
    }
}

impl From<&whiskers_config::RunnerCfg> for RunnerCfg {
    fn from(c: &whiskers_config::RunnerCfg) -> Self {
        Self {
            max_consecutive_failures: c.max_consecutive_failures,
        }
    }
}

// ── Records flow the other way, into the history CSV ─────────────────────────

impl From<&VisitRecord> for whiskers_config::VisitRow {
    fn from(r: &VisitRecord) -> Self {
        Self {
            time: r.timestamp,
            weight: r.weight_g,
            std: r.sigma_g,
            duration: r.duration_s,
            secondary: r.secondary_g,
        }
    }
}

impl From<&whiskers_config::VisitRow> for VisitRecord {
    fn from(r: &whiskers_config::VisitRow) -> Self {
        Self {
            timestamp: r.time,
            weight_g: r.weight,
            sigma_g: r.std,
            duration_s: r.duration,
            secondary_g: r.secondary,
        }
    }
}
