//! Interactive scale-factor calibration.
//!
//! `CalibrationSession` is the pure part: target adjustment, confirmation
//! checks, accumulation of raw readings and the factor computation.
//! `Calibrator` drives a session against a scale, an input device and a
//! feedback sink. It blocks until the operator confirms a usable target or the
//! input device goes away.

use std::time::Duration;

use serde::Serialize;
use whiskers_traits::{InputDevice, InputEvent, InputStatus, Scale};

use crate::acquisition::ScaleReader;
use crate::config::{CalibrationCfg, Timeouts};
use crate::error::{CalibrationError, Result};
use crate::feedback::{Feedback, Notification};

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSession {
    target_g: i32,
    step_g: i32,
    raw_sum: f64,
    raw_count: u32,
}

impl CalibrationSession {
    pub fn new(default_target_g: i32, step_g: i32) -> Self {
        Self {
            target_g: default_target_g,
            step_g,
            raw_sum: 0.0,
            raw_count: 0,
        }
    }

    pub fn target_g(&self) -> i32 {
        self.target_g
    }

    /// Apply `delta` encoder detents. Saturates instead of wrapping.
    pub fn adjust(&mut self, delta: i32) -> i32 {
        self.target_g = self.target_g.saturating_add(delta.saturating_mul(self.step_g));
        self.target_g
    }

    /// The confirmed target, or `InvalidTarget` for zero or negative targets.
    pub fn confirm(&self) -> std::result::Result<i32, CalibrationError> {
        if self.target_g <= 0 {
            Err(CalibrationError::InvalidTarget(self.target_g))
        } else {
            Ok(self.target_g)
        }
    }

    pub fn accumulate(&mut self, raw_units: f32) {
        self.raw_sum += f64::from(raw_units);
        self.raw_count += 1;
    }

    pub fn clear_readings(&mut self) {
        self.raw_sum = 0.0;
        self.raw_count = 0;
    }

    pub fn averaged_raw(&self) -> Option<f64> {
        (self.raw_count > 0).then(|| self.raw_sum / f64::from(self.raw_count))
    }

    /// `averaged_raw / target_g`. Zero or non-finite factors are rejected.
    pub fn finish(&self, averaged_raw: f64) -> std::result::Result<f32, CalibrationError> {
        let target = self.confirm()?;
        let factor = (averaged_raw / f64::from(target)) as f32;
        if factor.is_finite() && factor != 0.0 {
            Ok(factor)
        } else {
            Err(CalibrationError::DegenerateReading)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationOutcome {
    pub target_g: i32,
    pub averaged_raw: f64,
    pub scale_factor: f32,
    /// Tare offset taken at the start of the session.
    pub offset_counts: i32,
}

#[derive(Debug, Clone)]
pub struct Calibrator {
    cfg: CalibrationCfg,
    timeouts: Timeouts,
    tare_samples: u32,
}

impl Calibrator {
    pub fn new(cfg: CalibrationCfg, timeouts: Timeouts, tare_samples: u32) -> Self {
        Self {
            cfg,
            timeouts,
            tare_samples,
        }
    }

    fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.sensor_ms)
    }

    fn measure<S: Scale>(
        &self,
        session: &mut CalibrationSession,
        reader: &mut ScaleReader<S>,
    ) -> Result<f32> {
        session.clear_readings();
        for _ in 0..self.cfg.samples.max(1) {
            session.accumulate(reader.read_raw_units(self.sensor_timeout())?);
        }
        let avg = session
            .averaged_raw()
            .ok_or(CalibrationError::DegenerateReading)?;
        Ok(session.finish(avg)?)
    }

    /// Run one session to completion and apply the new factor to `reader`.
    pub fn run<S, I, F>(
        &self,
        reader: &mut ScaleReader<S>,
        input: &mut I,
        feedback: &mut F,
    ) -> Result<CalibrationOutcome>
    where
        S: Scale,
        I: InputDevice + ?Sized,
        F: Feedback + ?Sized,
    {
        let offset_counts = reader.tare(self.tare_samples, self.sensor_timeout())?;
        feedback.notify(&Notification::Tared { offset_counts });

        let mut session = CalibrationSession::new(self.cfg.default_target_g, self.cfg.step_g);
        tracing::info!(target_g = session.target_g(), "calibration started");
        feedback.notify(&Notification::CalibrationPrompt {
            target_g: session.target_g(),
        });

        let poll = Duration::from_millis(self.timeouts.input_poll_ms);
        loop {
            match input.poll_event(poll) {
                Ok(InputEvent::Delta(d)) => {
                    let target_g = session.adjust(d);
                    tracing::trace!(delta = d, target_g, "calibration target adjusted");
                    feedback.notify(&Notification::CalibrationPrompt { target_g });
                }
                Ok(InputEvent::Press | InputEvent::LongPress) => {
                    let target_g = session.target_g();
                    if let Err(e) = session.confirm() {
                        tracing::warn!(target_g, "calibration confirmation rejected: {e}");
                        feedback.notify(&Notification::CalibrationRejected {
                            target_g,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    feedback.notify(&Notification::CalibrationMeasuring { target_g });
                    match self.measure(&mut session, reader) {
                        Ok(scale_factor) => {
                            reader.set_scale_factor(scale_factor)?;
                            let averaged_raw = session.averaged_raw().unwrap_or_default();
                            tracing::info!(
                                target_g,
                                averaged_raw,
                                scale_factor,
                                "calibration complete"
                            );
                            feedback.notify(&Notification::Calibrated { scale_factor });
                            return Ok(CalibrationOutcome {
                                target_g,
                                averaged_raw,
                                scale_factor,
                                offset_counts,
                            });
                        }
                        Err(e) => {
                            tracing::warn!(
                                target_g,
                                error = %e,
                                "calibration measurement rejected"
                            );
                            feedback.notify(&Notification::CalibrationRejected {
                                target_g,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                Err(InputStatus::Idle) => {}
                Err(InputStatus::Closed) => {
                    return Err(eyre::Report::new(CalibrationError::InputClosed));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjusted_target_drives_factor() {
        let mut s = CalibrationSession::new(500, 1);
        assert_eq!(s.adjust(50), 550);
        assert_eq!(s.confirm(), Ok(550));
        assert_eq!(s.finish(1100.0), Ok(2.0));
    }

    #[test]
    fn step_size_multiplies_detents() {
        let mut s = CalibrationSession::new(500, 10);
        assert_eq!(s.adjust(-3), 470);
    }

    #[test]
    fn non_positive_target_is_rejected_and_session_stays_usable() {
        let mut s = CalibrationSession::new(500, 1);
        s.adjust(-500);
        assert_eq!(s.confirm(), Err(CalibrationError::InvalidTarget(0)));
        assert_eq!(s.finish(1000.0), Err(CalibrationError::InvalidTarget(0)));
        s.adjust(-1);
        assert_eq!(s.confirm(), Err(CalibrationError::InvalidTarget(-1)));
        s.adjust(201);
        assert_eq!(s.confirm(), Ok(200));
    }

    #[test]
    fn adjust_saturates() {
        let mut s = CalibrationSession::new(i32::MAX - 1, 5);
        assert_eq!(s.adjust(10), i32::MAX);
        let mut s = CalibrationSession::new(0, i32::MAX);
        assert_eq!(s.adjust(i32::MIN), i32::MIN);
    }

    #[test]
    fn degenerate_readings_are_rejected() {
        let s = CalibrationSession::new(500, 1);
        assert_eq!(s.finish(0.0), Err(CalibrationError::DegenerateReading));
        assert_eq!(s.finish(f64::NAN), Err(CalibrationError::DegenerateReading));
    }

    #[test]
    fn readings_accumulate_into_average() {
        let mut s = CalibrationSession::new(500, 1);
        assert_eq!(s.averaged_raw(), None);
        for v in [1000.0, 1200.0, 1100.0] {
            s.accumulate(v);
        }
        assert_eq!(s.averaged_raw(), Some(1100.0));
        s.clear_readings();
        assert_eq!(s.averaged_raw(), None);
    }
}
