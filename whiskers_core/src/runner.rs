//! The cooperative polling loop around the engine (`Monitor`).
//!
//! One `poll_once` drains operator input, reads the scale once, advances the
//! engine and carries out what the engine asked for: re-zeroing, record
//! delivery and feedback. Failure escalation lives here, not in the engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use whiskers_traits::clock::Clock;
use whiskers_traits::{InputDevice, InputEvent, InputStatus, Scale};

use crate::acquisition::ScaleReader;
use crate::builder::{MonitorBuilder, Missing};
use crate::calibration::{CalibrationOutcome, Calibrator};
use crate::config::{RunnerCfg, Timeouts};
use crate::engine::WeighEngine;
use crate::error::{Result, WhiskersError};
use crate::events::{EngineEvent, StepOutcome};
use crate::feedback::{Feedback, Notification};
use crate::occupancy::OccupancyState;
use crate::sink::{CalibrationStore, RecordSink};

/// What a single poll did.
#[derive(Debug)]
pub enum PollOutcome {
    Sampled(StepOutcome),
    /// The scale gave no reading; engine state is untouched.
    Unavailable(WhiskersError),
    Calibrated(CalibrationOutcome),
    CalibrationAborted(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub polls: u64,
    pub visits: u64,
    pub unavailable: u64,
}

pub struct Monitor {
    pub(crate) reader: ScaleReader<Box<dyn Scale>>,
    pub(crate) engine: WeighEngine,
    pub(crate) calibrator: Calibrator,
    pub(crate) feedback: Box<dyn Feedback>,
    pub(crate) records: Box<dyn RecordSink>,
    pub(crate) store: Box<dyn CalibrationStore>,
    pub(crate) input: Option<Box<dyn InputDevice>>,
    pub(crate) timeouts: Timeouts,
    pub(crate) tare_samples: u32,
    pub(crate) runner: RunnerCfg,
    pub(crate) period: Duration,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) timestamp: Box<dyn Fn() -> i64>,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("engine", &self.engine)
            .field("reader", &self.reader)
            .field("has_input", &self.input.is_some())
            .field("period", &self.period)
            .finish()
    }
}

impl Monitor {
    pub fn builder() -> MonitorBuilder<Missing> {
        MonitorBuilder::default()
    }

    pub fn engine(&self) -> &WeighEngine {
        &self.engine
    }

    pub fn reader(&self) -> &ScaleReader<Box<dyn Scale>> {
        &self.reader
    }

    fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.sensor_ms)
    }

    /// Re-zero now.
    pub fn tare(&mut self) -> std::result::Result<i32, WhiskersError> {
        let offset_counts = self.reader.tare(self.tare_samples, self.sensor_timeout())?;
        self.feedback.notify(&Notification::Tared { offset_counts });
        Ok(offset_counts)
    }

    /// Run the blocking calibration protocol on the attached input device and
    /// persist the result.
    pub fn calibrate(&mut self) -> PollOutcome {
        let Some(input) = self.input.as_mut() else {
            return PollOutcome::CalibrationAborted("no input device attached".into());
        };
        match self
            .calibrator
            .run(&mut self.reader, input.as_mut(), &mut self.feedback)
        {
            Ok(outcome) => {
                if let Err(e) = self.store.persist(&outcome) {
                    tracing::warn!(error = %e, "failed to persist calibration");
                }
                PollOutcome::Calibrated(outcome)
            }
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(%reason, "calibration aborted");
                self.feedback.notify(&Notification::CalibrationAborted {
                    reason: reason.clone(),
                });
                PollOutcome::CalibrationAborted(reason)
            }
        }
    }

    fn next_input(&mut self) -> Option<InputEvent> {
        let input = self.input.as_mut()?;
        match input.poll_event(Duration::ZERO) {
            Ok(ev) => Some(ev),
            Err(InputStatus::Idle) => None,
            Err(InputStatus::Closed) => {
                tracing::debug!("input device closed");
                self.input = None;
                None
            }
        }
    }

    pub fn poll_once(&mut self) -> PollOutcome {
        while let Some(ev) = self.next_input() {
            match ev {
                InputEvent::Press => {
                    if let Err(e) = self.tare() {
                        tracing::warn!(error = %e, "tare failed");
                        self.feedback.notify(&Notification::SensorUnavailable);
                        return PollOutcome::Unavailable(e);
                    }
                }
                InputEvent::LongPress if self.engine.state() == OccupancyState::Occupied => {
                    tracing::debug!("calibration request ignored during a visit");
                }
                InputEvent::LongPress => return self.calibrate(),
                InputEvent::Delta(d) => {
                    tracing::trace!(delta = d, "encoder ignored outside calibration");
                }
            }
        }

        let mass_g = match self.reader.read_mass(self.sensor_timeout()) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "scale unavailable, skipping cycle");
                self.feedback.notify(&Notification::SensorUnavailable);
                return PollOutcome::Unavailable(e);
            }
        };
        tracing::trace!(mass_g, "sample");

        let outcome = self.engine.step_from_mass(mass_g);
        for ev in &outcome.events {
            self.handle(ev);
        }
        self.feedback.notify(&Notification::Reading {
            smoothed_g: outcome.smoothed_g,
            state: outcome.state,
        });
        PollOutcome::Sampled(outcome)
    }

    fn handle(&mut self, ev: &EngineEvent) {
        match ev {
            EngineEvent::VisitStarted => self.feedback.notify(&Notification::VisitStarted),
            EngineEvent::VisitDiscarded { duration_ms } => {
                self.feedback.notify(&Notification::VisitDiscarded {
                    duration_ms: *duration_ms,
                });
            }
            EngineEvent::VisitCompleted(visit) => {
                let record = visit.stamp((self.timestamp)());
                if let Err(e) = self.records.deliver(&record) {
                    tracing::warn!(error = %e, "record delivery failed");
                }
                self.feedback.notify(&Notification::VisitCompleted(record));
            }
            EngineEvent::Retare => {
                if let Err(e) = self.tare() {
                    tracing::warn!(error = %e, "re-zero failed");
                }
            }
            EngineEvent::BestSampleImproved { .. } => {}
        }
    }

    /// Poll at the configured period until `shutdown` is set or `max_polls`
    /// polls have run. Fails once more than `max_consecutive_failures` reads in
    /// a row were unavailable.
    pub fn run(&mut self, shutdown: &AtomicBool, max_polls: Option<u64>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut failures: u32 = 0;
        tracing::info!(period_ms = self.period.as_millis() as u64, "monitor start");

        while !shutdown.load(Ordering::Relaxed) && max_polls.is_none_or(|m| summary.polls < m) {
            let started = self.clock.now();
            summary.polls += 1;
            match self.poll_once() {
                PollOutcome::Unavailable(e) => {
                    summary.unavailable += 1;
                    failures = failures.saturating_add(1);
                    let limit = self.runner.max_consecutive_failures;
                    if limit > 0 && failures > limit {
                        tracing::error!(failures, "giving up after repeated acquisition failures");
                        return Err(eyre::Report::new(e)
                            .wrap_err(format!("{failures} consecutive acquisition failures")));
                    }
                }
                PollOutcome::Sampled(outcome) => {
                    failures = 0;
                    if outcome.completed_visit().is_some() {
                        summary.visits += 1;
                    }
                }
                PollOutcome::Calibrated(_) | PollOutcome::CalibrationAborted(_) => failures = 0,
            }
            let spent = self.clock.now().saturating_duration_since(started);
            self.clock.sleep(self.period.saturating_sub(spent));
        }

        tracing::info!(
            polls = summary.polls,
            visits = summary.visits,
            unavailable = summary.unavailable,
            "monitor stopped"
        );
        Ok(summary)
    }
}
