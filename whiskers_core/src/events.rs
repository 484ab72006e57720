//! What one engine step produced.

use crate::occupancy::OccupancyState;
use crate::record::Visit;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    VisitStarted,
    /// Left before the presence time; no record.
    VisitDiscarded { duration_ms: u64 },
    /// Emitted once per qualifying visit, after the settle interval if any.
    VisitCompleted(Visit),
    /// The caller should re-zero the load cell now.
    Retare,
    BestSampleImproved { mean_g: f32, sigma_g: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub smoothed_g: f32,
    pub state: OccupancyState,
    pub events: Vec<EngineEvent>,
}

impl StepOutcome {
    pub fn completed_visit(&self) -> Option<&Visit> {
        self.events.iter().find_map(|e| match e {
            EngineEvent::VisitCompleted(v) => Some(v),
            _ => None,
        })
    }

    pub fn wants_retare(&self) -> bool {
        self.events.contains(&EngineEvent::Retare)
    }
}
