//! Idle baseline drift detection.

use crate::config::DriftCfg;

/// Requests a re-zero when the idle baseline stays at or beyond the threshold
/// for longer than `tare_time_ms`. Any sample back inside the threshold
/// restarts the timer.
#[derive(Debug, Clone)]
pub struct DriftCorrector {
    cfg: DriftCfg,
    since_ms: Option<u64>,
}

impl DriftCorrector {
    pub fn new(cfg: DriftCfg) -> Self {
        Self { cfg, since_ms: None }
    }

    /// Start of the current drift episode, if the timer is running.
    pub fn drifting_since_ms(&self) -> Option<u64> {
        self.since_ms
    }

    pub fn reset(&mut self) {
        self.since_ms = None;
    }

    /// Observe one idle smoothed sample. Returns `true` when a re-zero is due;
    /// the timer is reset in that case.
    pub fn observe(&mut self, now_ms: u64, smoothed_g: f32) -> bool {
        if smoothed_g.abs() < self.cfg.tare_threshold_g {
            self.since_ms = None;
            return false;
        }
        let since = *self.since_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(since) > self.cfg.tare_time_ms {
            tracing::debug!(smoothed_g, drift_ms = now_ms - since, "baseline drift, re-zero due");
            self.since_ms = None;
            true
        } else {
            false
        }
    }
}
