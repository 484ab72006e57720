#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema, persistence and measurement history for the occupancy scale.
//!
//! - `Config` and its sections are deserialized from TOML, every section has
//!   built-in defaults so a missing or partial file still yields a usable setup.
//! - `Config::save_atomic` writes the file back after calibration changes the
//!   scale factor.
//! - `history` appends one CSV row per qualifying visit.
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod atomic;
pub mod history;

pub use history::{HistoryLog, VisitRow, load_history};

/// Occupancy, drift and load-cell model parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScaleCfg {
    /// Smoothed mass above which the platform counts as occupied.
    pub weight_min_g: f32,
    /// Visits must last strictly longer than this to produce a record.
    pub presence_time_min_ms: u64,
    /// Idle baseline magnitude at or above which the drift timer runs.
    pub tare_threshold_g: f32,
    /// Sustained drift longer than this triggers a re-zero.
    pub tare_time_ms: u64,
    /// Raw counts per gram.
    pub scale_factor: f32,
    /// Tare baseline in raw counts (restored at startup, refreshed on tare).
    pub offset_counts: i32,
    /// Delay after a visit before sampling the secondary mass (0 disables).
    pub settle_ms: u64,
    /// Re-zero once a visit has settled (needs `settle_ms > 0`).
    pub retare_after_visit: bool,
    /// Raw reads averaged per tare.
    pub tare_samples: u32,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            weight_min_g: 2000.0,
            presence_time_min_ms: 5000,
            tare_threshold_g: 50.0,
            tare_time_ms: 60_000,
            scale_factor: 1.0,
            offset_counts: 0,
            settle_ms: 5000,
            retare_after_visit: true,
            tare_samples: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FilterCfg {
    /// Low-pass smoothing coefficient, (0.0, 1.0].
    pub alpha: f32,
    /// Rolling statistics window.
    pub window_ms: u64,
    /// Polling cadence of the main loop.
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

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Target mass shown when a calibration session opens.
    pub default_target_g: i32,
    /// Grams added per encoder detent.
    pub step_g: i32,
    /// Raw reads averaged when the operator confirms.
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

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Timeouts {
    /// Per-read acquisition bound. Also accepts alias "sample_ms".
    #[serde(alias = "sample_ms")]
    pub sensor_ms: u64,
    /// How long the calibration loop waits for one input event before re-checking.
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

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RunnerCfg {
    /// Give up after this many acquisition failures in a row (0 = never).
    pub max_consecutive_failures: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// GPIO wiring; only read by hardware builds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Pins {
    pub hx711_dt: u8,
    pub hx711_sck: u8,
    pub encoder_a: u8,
    pub encoder_b: u8,
    pub button: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            hx711_dt: 5,
            hx711_sck: 6,
            encoder_a: 17,
            encoder_b: 27,
            button: 22,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HistoryCfg {
    /// CSV file receiving one row per qualifying visit.
    pub file: String,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self {
            file: "measurements.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub scale: ScaleCfg,
    pub filter: FilterCfg,
    pub calibration: CalibrationCfg,
    pub timeouts: Timeouts,
    pub runner: RunnerCfg,
    pub logging: Logging,
    pub pins: Pins,
    pub history: HistoryCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Where a loaded config came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    File,
    /// File absent; built-in defaults.
    Missing,
    /// File present but unreadable or unparsable; built-in defaults.
    Fallback,
}

/// Load `path`, falling back to built-in defaults when the file is missing or
/// cannot be parsed. The returned error string describes why the fallback was taken.
pub fn load_or_default(path: &Path) -> (Config, ConfigOrigin, Option<String>) {
    match std::fs::read_to_string(path) {
        Ok(text) => match load_toml(&text) {
            Ok(cfg) => (cfg, ConfigOrigin::File, None),
            Err(e) => (
                Config::default(),
                ConfigOrigin::Fallback,
                Some(format!("parse {}: {e}", path.display())),
            ),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (Config::default(), ConfigOrigin::Missing, None)
        }
        Err(e) => (
            Config::default(),
            ConfigOrigin::Fallback,
            Some(format!("read {}: {e}", path.display())),
        ),
    }
}

impl Config {
    pub fn to_toml_string(&self) -> eyre::Result<String> {
        toml::to_string_pretty(self).map_err(|e| eyre::eyre!("serialize config: {e}"))
    }

    /// Persist the config with write-temp + fsync + rename.
    pub fn save_atomic(&self, path: &Path) -> eyre::Result<()> {
        let text = self.to_toml_string()?;
        atomic::write_atomic(path, text.as_bytes())
            .map_err(|e| eyre::eyre!("write config {}: {e}", path.display()))
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Scale
        let s = &self.scale;
        if !s.weight_min_g.is_finite() || s.weight_min_g <= 0.0 {
            eyre::bail!("scale.weight_min_g must be > 0");
        }
        if s.presence_time_min_ms > 60 * 60 * 1000 {
            eyre::bail!("scale.presence_time_min_ms is unreasonably large (>1h)");
        }
        if !s.tare_threshold_g.is_finite() || s.tare_threshold_g <= 0.0 {
            eyre::bail!("scale.tare_threshold_g must be > 0");
        }
        if s.tare_threshold_g >= s.weight_min_g {
            eyre::bail!("scale.tare_threshold_g must be below scale.weight_min_g");
        }
        if s.tare_time_ms == 0 {
            eyre::bail!("scale.tare_time_ms must be >= 1");
        }
        if !s.scale_factor.is_finite() || s.scale_factor == 0.0 {
            eyre::bail!("scale.scale_factor must be finite and non-zero");
        }
        if s.settle_ms > 10 * 60 * 1000 {
            eyre::bail!("scale.settle_ms is unreasonably large (>10min)");
        }
        if s.tare_samples == 0 {
            eyre::bail!("scale.tare_samples must be >= 1");
        }

        // Filter
        let f = &self.filter;
        if !(f.alpha > 0.0 && f.alpha <= 1.0) {
            eyre::bail!("filter.alpha must be in (0.0, 1.0]");
        }
        if f.window_ms == 0 {
            eyre::bail!("filter.window_ms must be >= 1");
        }
        if f.sample_period_ms == 0 {
            eyre::bail!("filter.sample_period_ms must be >= 1");
        }
        if f.window_ms < f.sample_period_ms {
            eyre::bail!("filter.window_ms must span at least one sample period");
        }

        // Calibration
        if self.calibration.default_target_g <= 0 {
            eyre::bail!("calibration.default_target_g must be > 0");
        }
        if self.calibration.step_g <= 0 {
            eyre::bail!("calibration.step_g must be > 0");
        }
        if self.calibration.samples == 0 {
            eyre::bail!("calibration.samples must be >= 1");
        }

        // Timeouts
        if self.timeouts.sensor_ms == 0 {
            eyre::bail!("timeouts.sensor_ms must be >= 1");
        }
        if self.timeouts.input_poll_ms == 0 {
            eyre::bail!("timeouts.input_poll_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = load_toml("").expect("empty TOML parses");
        assert_eq!(cfg, Config::default());
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = load_toml("[scale]\nweight_min_g = 1500.0\n").expect("parse");
        assert_eq!(cfg.scale.weight_min_g, 1500.0);
        assert_eq!(cfg.scale.presence_time_min_ms, 5000);
        assert_eq!(cfg.filter, FilterCfg::default());
    }

    #[test]
    fn sample_ms_alias_is_accepted() {
        let cfg = load_toml("[timeouts]\nsample_ms = 250\n").expect("parse");
        assert_eq!(cfg.timeouts.sensor_ms, 250);
    }

    #[test]
    fn serialized_config_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.scale.scale_factor = -21.75;
        cfg.logging.level = Some("debug".into());
        let text = cfg.to_toml_string().expect("serialize");
        assert_eq!(load_toml(&text).expect("parse"), cfg);
    }
}
