//! Fire-and-forget notifications for displays, LEDs and logs.

use crate::occupancy::OccupancyState;
use crate::record::VisitRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Sent once per successful poll.
    Reading { smoothed_g: f32, state: OccupancyState },
    VisitStarted,
    VisitDiscarded { duration_ms: u64 },
    VisitCompleted(VisitRecord),
    Tared { offset_counts: i32 },
    SensorUnavailable,
    CalibrationPrompt { target_g: i32 },
    CalibrationRejected { target_g: i32, reason: String },
    CalibrationMeasuring { target_g: i32 },
    Calibrated { scale_factor: f32 },
    CalibrationAborted { reason: String },
}

/// Implementations must return promptly; the polling loop does not wait on them
/// and there is no error path back.
pub trait Feedback {
    fn notify(&mut self, n: &Notification);
}

impl<F: Feedback + ?Sized> Feedback for Box<F> {
    fn notify(&mut self, n: &Notification) {
        (**self).notify(n);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeedback;

impl Feedback for NoopFeedback {
    fn notify(&mut self, _n: &Notification) {}
}
