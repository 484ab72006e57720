//! The per-sample weighing engine (`WeighEngine`).
//!
//! Ties the signal conditioner, the occupancy machine and the drift
//! corrector together. Each step takes one unit-converted mass reading and
//! one clock sample; it never reads hardware itself.

use std::sync::Arc;
use std::time::Instant;

use whiskers_traits::clock::{Clock, MonotonicClock};

use crate::config::{DriftCfg, FilterCfg, OccupancyCfg};
use crate::drift::DriftCorrector;
use crate::error::{BuildError, Result};
use crate::events::{EngineEvent, StepOutcome};
use crate::filter::LowPass;
use crate::occupancy::{OccupancyMachine, OccupancyState, Transition};
use crate::record::Visit;

#[derive(Debug, Clone, Copy)]
struct PendingVisit {
    visit: Visit,
    ended_ms: u64,
}

pub struct WeighEngine {
    filter: LowPass,
    occupancy: OccupancyMachine,
    drift: DriftCorrector,
    pending: Option<PendingVisit>,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    last_smoothed_g: f32,
}

impl core::fmt::Debug for WeighEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeighEngine")
            .field("state", &self.occupancy.state())
            .field("smoothed_g", &self.last_smoothed_g)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

fn validate(filter: &FilterCfg, occupancy: &OccupancyCfg, drift: &DriftCfg) -> Result<()> {
    let invalid = |msg| Err(eyre::Report::new(BuildError::InvalidConfig(msg)));
    if !(filter.alpha > 0.0 && filter.alpha <= 1.0) {
        return invalid("alpha must be in (0.0, 1.0]");
    }
    if filter.window_ms == 0 {
        return invalid("window_ms must be >= 1");
    }
    if !occupancy.weight_min_g.is_finite() || occupancy.weight_min_g <= 0.0 {
        return invalid("weight_min_g must be finite and > 0");
    }
    if !drift.tare_threshold_g.is_finite() || drift.tare_threshold_g <= 0.0 {
        return invalid("tare_threshold_g must be finite and > 0");
    }
    Ok(())
}

impl WeighEngine {
    /// Validate the configuration and build an engine on the monotonic clock.
    pub fn new(filter: FilterCfg, occupancy: OccupancyCfg, drift: DriftCfg) -> Result<Self> {
        Self::with_clock(filter, occupancy, drift, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        filter: FilterCfg,
        occupancy: OccupancyCfg,
        drift: DriftCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self> {
        validate(&filter, &occupancy, &drift)?;
        let epoch = clock.now();
        Ok(Self {
            filter: LowPass::new(filter.alpha),
            occupancy: OccupancyMachine::new(occupancy, filter.window_ms),
            drift: DriftCorrector::new(drift),
            pending: None,
            clock,
            epoch,
            last_smoothed_g: 0.0,
        })
    }

    pub fn state(&self) -> OccupancyState {
        self.occupancy.state()
    }

    pub fn last_smoothed_g(&self) -> f32 {
        self.last_smoothed_g
    }

    /// Best `(mean_g, sigma_g)` of the active visit, once one was picked.
    pub fn best(&self) -> Option<(f32, f32)> {
        self.occupancy.best()
    }

    /// A finished visit waiting for its settle interval.
    pub fn pending_visit(&self) -> Option<&Visit> {
        self.pending.as_ref().map(|p| &p.visit)
    }

    /// One iteration: samples the clock once, then advances on `mass_g`.
    pub fn step_from_mass(&mut self, mass_g: f32) -> StepOutcome {
        let now_ms = self.clock.ms_since(self.epoch);
        self.step_at(now_ms, mass_g)
    }

    /// Advance at an explicit time (ms since engine creation). Times must not
    /// go backwards.
    pub fn step_at(&mut self, now_ms: u64, mass_g: f32) -> StepOutcome {
        let smoothed_g = self.filter.input(mass_g);
        self.last_smoothed_g = smoothed_g;
        let mut events = Vec::new();

        match self.occupancy.advance(now_ms, mass_g, smoothed_g) {
            Transition::None => self.idle_tick(now_ms, smoothed_g, &mut events),
            Transition::Started => {
                // A new occupant cuts the settle interval short; no re-zero under load.
                if let Some(p) = self.pending.take() {
                    self.emit(p.visit, false, &mut events);
                }
                self.drift.reset();
                events.push(EngineEvent::VisitStarted);
            }
            Transition::Sampling { improved } => {
                if let Some((mean_g, sigma_g)) = improved {
                    events.push(EngineEvent::BestSampleImproved { mean_g, sigma_g });
                }
            }
            Transition::Discarded { duration_ms } => {
                events.push(EngineEvent::VisitDiscarded { duration_ms });
            }
            Transition::Ended(visit) => {
                let settle_ms = self.occupancy.cfg().settle_ms;
                if settle_ms == 0 {
                    // The platform may still be partly loaded; leave the baseline
                    // to the drift corrector.
                    self.emit(visit, false, &mut events);
                } else {
                    tracing::debug!(settle_ms, "visit pending settle interval");
                    self.pending = Some(PendingVisit {
                        visit,
                        ended_ms: now_ms,
                    });
                }
            }
        }

        StepOutcome {
            smoothed_g,
            state: self.occupancy.state(),
            events,
        }
    }

    fn idle_tick(&mut self, now_ms: u64, smoothed_g: f32, events: &mut Vec<EngineEvent>) {
        if let Some(p) = self.pending {
            if now_ms.saturating_sub(p.ended_ms) >= self.occupancy.cfg().settle_ms {
                self.pending = None;
                let visit = Visit {
                    secondary_g: Some(smoothed_g),
                    ..p.visit
                };
                let retare = self.occupancy.cfg().retare_after_visit;
                self.emit(visit, retare, events);
            }
            return;
        }
        if self.drift.observe(now_ms, smoothed_g) {
            events.push(EngineEvent::Retare);
        }
    }

    fn emit(&mut self, visit: Visit, retare: bool, events: &mut Vec<EngineEvent>) {
        tracing::info!(
            weight_g = visit.weight_g,
            sigma_g = visit.sigma_g,
            duration_ms = visit.duration_ms,
            secondary_g = ?visit.secondary_g,
            "visit completed"
        );
        events.push(EngineEvent::VisitCompleted(visit));
        if retare {
            events.push(EngineEvent::Retare);
        }
        self.drift.reset();
    }
}
