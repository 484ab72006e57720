//! IDLE/OCCUPIED visit state machine with best-sample tracking.

use crate::config::OccupancyCfg;
use crate::record::Visit;
use crate::window::WindowStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum OccupancyState {
    Idle,
    Occupied,
}

/// Result of advancing the machine by one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Idle and still idle.
    None,
    Started,
    /// Occupied and still occupied. Carries the new best window when it improved.
    Sampling { improved: Option<(f32, f32)> },
    /// Visit too short; nothing is recorded.
    Discarded { duration_ms: u64 },
    Ended(Visit),
}

#[derive(Debug, Clone, Copy)]
struct ActiveVisit {
    start_ms: u64,
    best_mean_g: f32,
    best_sigma_g: f32,
}

impl ActiveVisit {
    fn has_best(&self) -> bool {
        self.best_sigma_g.is_finite()
    }
}

#[derive(Debug, Clone)]
pub struct OccupancyMachine {
    cfg: OccupancyCfg,
    stats: WindowStats,
    active: Option<ActiveVisit>,
}

impl OccupancyMachine {
    pub fn new(cfg: OccupancyCfg, window_ms: u64) -> Self {
        Self {
            cfg,
            stats: WindowStats::new(window_ms),
            active: None,
        }
    }

    pub fn state(&self) -> OccupancyState {
        if self.active.is_some() {
            OccupancyState::Occupied
        } else {
            OccupancyState::Idle
        }
    }

    pub fn cfg(&self) -> &OccupancyCfg {
        &self.cfg
    }

    pub fn stats(&self) -> &WindowStats {
        &self.stats
    }

    /// `(best_mean_g, best_sigma_g)` of the current visit, once one was picked.
    pub fn best(&self) -> Option<(f32, f32)> {
        self.active
            .filter(ActiveVisit::has_best)
            .map(|a| (a.best_mean_g, a.best_sigma_g))
    }

    /// Advance with the raw and smoothed mass of one sample taken at `now_ms`.
    pub fn advance(&mut self, now_ms: u64, raw_g: f32, smoothed_g: f32) -> Transition {
        let above = smoothed_g > self.cfg.weight_min_g;
        match (self.active.as_mut(), above) {
            (None, false) => Transition::None,
            (None, true) => {
                self.stats.reset(now_ms, smoothed_g);
                self.active = Some(ActiveVisit {
                    start_ms: now_ms,
                    best_mean_g: 0.0,
                    best_sigma_g: f32::INFINITY,
                });
                tracing::debug!(smoothed_g, "visit started");
                Transition::Started
            }
            (Some(visit), true) => {
                self.stats.input(now_ms, raw_g);
                let elapsed = now_ms.saturating_sub(visit.start_ms);
                let sigma = self.stats.sigma();
                if elapsed > self.cfg.presence_time_min_ms && sigma < visit.best_sigma_g {
                    visit.best_mean_g = self.stats.mean();
                    visit.best_sigma_g = sigma;
                    tracing::trace!(
                        mean_g = visit.best_mean_g,
                        sigma_g = sigma,
                        "best sample improved"
                    );
                    Transition::Sampling {
                        improved: Some((visit.best_mean_g, sigma)),
                    }
                } else {
                    Transition::Sampling { improved: None }
                }
            }
            (Some(visit), false) => {
                let visit = *visit;
                self.active = None;
                let duration_ms = now_ms.saturating_sub(visit.start_ms);
                if duration_ms <= self.cfg.presence_time_min_ms {
                    tracing::debug!(duration_ms, "visit discarded (too short)");
                    return Transition::Discarded { duration_ms };
                }
                let (weight_g, sigma_g) = if visit.has_best() {
                    (visit.best_mean_g, visit.best_sigma_g)
                } else {
                    (self.stats.mean(), self.stats.sigma())
                };
                tracing::debug!(weight_g, sigma_g, duration_ms, "visit ended");
                Transition::Ended(Visit {
                    weight_g,
                    sigma_g,
                    duration_ms,
                    secondary_g: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(presence_ms: u64) -> OccupancyMachine {
        OccupancyMachine::new(
            OccupancyCfg {
                weight_min_g: 2000.0,
                presence_time_min_ms: presence_ms,
                settle_ms: 0,
                retare_after_visit: false,
            },
            1000,
        )
    }

    #[test]
    fn crossing_threshold_is_strict() {
        let mut m = machine(500);
        assert_eq!(m.advance(0, 2000.0, 2000.0), Transition::None);
        assert_eq!(m.advance(100, 2001.0, 2000.5), Transition::Started);
        assert_eq!(m.state(), OccupancyState::Occupied);
        // At the threshold counts as left.
        assert!(matches!(
            m.advance(200, 2000.0, 2000.0),
            Transition::Discarded { duration_ms: 100 }
        ));
        assert_eq!(m.state(), OccupancyState::Idle);
    }

    #[test]
    fn best_tracking_waits_for_presence_time() {
        let mut m = machine(300);
        m.advance(0, 2500.0, 2500.0);
        for t in [100, 200, 300] {
            assert_eq!(m.advance(t, 2500.0, 2500.0), Transition::Sampling { improved: None });
        }
        assert_eq!(m.best(), None);
        assert_eq!(
            m.advance(400, 2500.0, 2500.0),
            Transition::Sampling {
                improved: Some((2500.0, 0.0))
            }
        );
        // sigma 0 cannot be beaten.
        assert_eq!(m.advance(500, 2500.0, 2500.0), Transition::Sampling { improved: None });
    }

    #[test]
    fn ended_visit_reports_best_window_not_final_window() {
        let mut m = machine(200);
        m.advance(0, 3000.0, 3000.0);
        for t in (100..=600).step_by(100) {
            m.advance(t, 3000.0, 3000.0);
        }
        // Noisy tail after the quiet window.
        m.advance(700, 3600.0, 3100.0);
        m.advance(800, 2400.0, 2900.0);
        match m.advance(900, 0.0, 1500.0) {
            Transition::Ended(v) => {
                assert_eq!(v.weight_g, 3000.0);
                assert_eq!(v.sigma_g, 0.0);
                assert_eq!(v.duration_ms, 900);
                assert_eq!(v.secondary_g, None);
            }
            other => panic!("expected Ended, got {other:?}"),
        }
    }

    #[test]
    fn qualifying_visit_without_best_falls_back_to_window() {
        let mut m = machine(150);
        m.advance(0, 2500.0, 2500.0);
        m.advance(100, 2700.0, 2600.0);
        // Next sample arrives late and below threshold, so no best was picked.
        match m.advance(400, 0.0, 1900.0) {
            Transition::Ended(v) => {
                assert_eq!(v.duration_ms, 400);
                // Window holds {seed 2500, raw 2700}.
                assert_eq!(v.weight_g, 2600.0);
                assert!(v.sigma_g > 0.0);
            }
            other => panic!("expected Ended, got {other:?}"),
        }
    }

    #[test]
    fn duration_equal_to_presence_time_is_discarded() {
        let mut m = machine(500);
        m.advance(0, 2500.0, 2500.0);
        m.advance(250, 2500.0, 2500.0);
        assert_eq!(m.advance(500, 0.0, 0.0), Transition::Discarded { duration_ms: 500 });
    }
}
