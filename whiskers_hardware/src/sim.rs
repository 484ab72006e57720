//! Scripted load cell for tests, demos and `--sim` runs.
//!
//! A script is a list of segments, each lasting a number of reads ("ticks").
//! The mass follows the script, is converted to raw counts with the configured
//! gain and zero point, and optionally carries a small deterministic ripple.
use std::time::Duration;

use whiskers_traits::Scale;

use crate::error::HwError;

/// Deterministic ripple, scaled by `noise_g`. Mean is zero over one period.
const RIPPLE: [f32; 8] = [0.0, 0.7, -0.4, 1.0, -0.9, 0.3, -0.6, -0.1];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    from_g: f32,
    to_g: f32,
    ticks: u64,
}

#[derive(Debug, Clone)]
pub struct SimulatedScale {
    segments: Vec<Segment>,
    counts_per_gram: f32,
    zero_counts: i32,
    noise_g: f32,
    fault_at: Option<u64>,
    cycle: bool,
    tick: u64,
}

impl Default for SimulatedScale {
    fn default() -> Self {
        Self::new(1.0, 0)
    }
}

impl SimulatedScale {
    /// An empty platform reading `zero_counts`.
    pub fn new(counts_per_gram: f32, zero_counts: i32) -> Self {
        Self {
            segments: Vec::new(),
            counts_per_gram,
            zero_counts,
            noise_g: 0.0,
            fault_at: None,
            cycle: false,
            tick: 0,
        }
    }

    fn end_mass(&self) -> f32 {
        self.segments.last().map_or(0.0, |s| s.to_g)
    }

    /// Hold a constant mass for `ticks` reads.
    #[must_use]
    pub fn hold(mut self, grams: f32, ticks: u64) -> Self {
        self.segments.push(Segment {
            from_g: grams,
            to_g: grams,
            ticks,
        });
        self
    }

    /// Move linearly from the previous segment's final mass to `grams`.
    #[must_use]
    pub fn ramp(mut self, grams: f32, ticks: u64) -> Self {
        let from_g = self.end_mass();
        self.segments.push(Segment {
            from_g,
            to_g: grams,
            ticks,
        });
        self
    }

    #[must_use]
    pub fn with_noise(mut self, noise_g: f32) -> Self {
        self.noise_g = noise_g;
        self
    }

    /// Make the read at index `tick` fail once.
    #[must_use]
    pub fn with_fault_at(mut self, tick: u64) -> Self {
        self.fault_at = Some(tick);
        self
    }

    /// Restart the script after its last segment instead of holding the final mass.
    #[must_use]
    pub fn cycling(mut self) -> Self {
        self.cycle = true;
        self
    }

    /// Number of reads served so far, failed ones included.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    fn script_len(&self) -> u64 {
        self.segments.iter().map(|s| s.ticks).sum()
    }

    /// Scripted mass (without ripple) at read index `tick`.
    pub fn mass_at(&self, tick: u64) -> f32 {
        let len = self.script_len();
        let mut t = if self.cycle && len > 0 { tick % len } else { tick };
        for seg in &self.segments {
            if t < seg.ticks {
                let frac = (t + 1) as f32 / seg.ticks as f32;
                return seg.from_g + (seg.to_g - seg.from_g) * frac;
            }
            t -= seg.ticks;
        }
        self.end_mass()
    }

    fn counts_for(&self, grams: f32) -> i32 {
        let counts = (grams * self.counts_per_gram).round() as i64 + i64::from(self.zero_counts);
        counts.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl Scale for SimulatedScale {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let tick = self.tick;
        self.tick += 1;
        if self.fault_at == Some(tick) {
            tracing::debug!(tick, "simulated scale fault");
            return Err(Box::new(HwError::Injected(tick)));
        }
        let ripple = RIPPLE[(tick % RIPPLE.len() as u64) as usize] * self.noise_g;
        let raw = self.counts_for(self.mass_at(tick) + ripple);
        tracing::trace!(tick, raw, "simulated sample");
        Ok(raw)
    }
}
