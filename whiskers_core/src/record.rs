//! Visit measurements: engine-side `Visit`, caller-stamped `VisitRecord`.
use serde::Serialize;

use crate::util::ms_to_s;

/// One finished, qualifying visit as produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visit {
    /// Mean of the quietest window seen after the presence threshold.
    pub weight_g: f32,
    pub sigma_g: f32,
    pub duration_ms: u64,
    /// Smoothed mass after the settle interval, if one was configured.
    pub secondary_g: Option<f32>,
}

impl Visit {
    pub fn duration_s(&self) -> f32 {
        ms_to_s(self.duration_ms)
    }

    /// Attach a wall-clock timestamp (seconds since the Unix epoch).
    pub fn stamp(&self, timestamp: i64) -> VisitRecord {
        VisitRecord {
            timestamp,
            weight_g: self.weight_g,
            sigma_g: self.sigma_g,
            duration_s: self.duration_s(),
            secondary_g: self.secondary_g,
        }
    }
}

/// The measurement handed to storage and publishing, in
/// `(timestamp, weight, sigma, duration, secondary)` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisitRecord {
    pub timestamp: i64,
    pub weight_g: f32,
    pub sigma_g: f32,
    pub duration_s: f32,
    pub secondary_g: Option<f32>,
}
