//! Time-windowed rolling statistics.
//!
//! Observations are `(t_ms, value)` pairs kept in arrival order. An
//! observation is dropped once `now - t > window_ms`, where `now` is the
//! timestamp of the latest input. Aggregates are recomputed from the
//! retained observations in f64, so there is no drift from incremental
//! add/subtract updates.
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct WindowStats {
    window_ms: u64,
    obs: VecDeque<(u64, f32)>,
}

impl WindowStats {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            obs: VecDeque::new(),
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Start a new window containing only `initial`.
    pub fn reset(&mut self, now_ms: u64, initial: f32) {
        self.obs.clear();
        self.obs.push_back((now_ms, initial));
    }

    pub fn input(&mut self, now_ms: u64, value: f32) {
        self.obs.push_back((now_ms, value));
        while let Some(&(t, _)) = self.obs.front() {
            if now_ms.saturating_sub(t) > self.window_ms {
                self.obs.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.obs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obs.is_empty()
    }

    fn mean_f64(&self) -> f64 {
        if self.obs.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.obs.iter().map(|&(_, v)| f64::from(v)).sum();
        sum / self.obs.len() as f64
    }

    /// 0.0 for an empty window.
    pub fn mean(&self) -> f32 {
        self.mean_f64() as f32
    }

    /// Sample variance (n - 1). 0.0 with fewer than two observations.
    pub fn variance(&self) -> f32 {
        let n = self.obs.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean_f64();
        let ss: f64 = self
            .obs
            .iter()
            .map(|&(_, v)| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum();
        ((ss / (n - 1) as f64) as f32).max(0.0)
    }

    pub fn sigma(&self) -> f32 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_seeds_single_observation_with_zero_sigma() {
        let mut w = WindowStats::new(1000);
        w.reset(0, 2500.0);
        assert_eq!(w.len(), 1);
        assert_eq!(w.mean(), 2500.0);
        assert_eq!(w.sigma(), 0.0);
        assert_eq!(w.variance(), 0.0);
    }

    #[test]
    fn empty_window_reports_zeros() {
        let w = WindowStats::new(1000);
        assert!(w.is_empty());
        assert_eq!(w.mean(), 0.0);
        assert_eq!(w.sigma(), 0.0);
    }

    #[test]
    fn sample_variance_uses_n_minus_one() {
        let mut w = WindowStats::new(10_000);
        w.reset(0, 2.0);
        for (t, v) in [(1, 4.0), (2, 4.0), (3, 4.0), (4, 5.0), (5, 5.0), (6, 7.0), (7, 9.0)] {
            w.input(t, v);
        }
        // mean 5, sum of squares 32 over 7.
        assert_eq!(w.mean(), 5.0);
        assert!((w.variance() - 32.0 / 7.0).abs() < 1e-5);
    }

    #[test]
    fn observations_older_than_window_are_excluded() {
        let mut w = WindowStats::new(200);
        w.reset(0, 1000.0);
        w.input(100, 10.0);
        w.input(200, 10.0);
        // t=0 is exactly window_ms old: still inside.
        assert_eq!(w.len(), 3);
        w.input(201, 10.0);
        assert_eq!(w.len(), 3);
        assert_eq!(w.mean(), 10.0);
        assert_eq!(w.sigma(), 0.0);
    }

    #[test]
    fn gap_longer_than_window_leaves_only_latest() {
        let mut w = WindowStats::new(500);
        w.reset(0, 1.0);
        w.input(100, 3.0);
        w.input(5000, 7.0);
        assert_eq!(w.len(), 1);
        assert_eq!(w.mean(), 7.0);
    }
}
