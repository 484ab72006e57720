//! Test and helper mocks for whiskers_core.
//!
//! Public so integration tests and benches can drive the engine without
//! hardware.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use whiskers_traits::{InputDevice, InputEvent, InputStatus, Scale};

use crate::calibration::CalibrationOutcome;
use crate::feedback::{Feedback, Notification};
use crate::record::VisitRecord;
use crate::sink::{CalibrationStore, RecordSink};

/// A scale that replays a fixed list of raw readings or errors.
///
/// Once the script is exhausted it keeps returning the `holding` value, or
/// errors if none was set.
#[derive(Debug, Default, Clone)]
pub struct ScriptedScale {
    script: VecDeque<Result<i32, String>>,
    holding: Option<i32>,
    reads: usize,
}

impl ScriptedScale {
    pub fn new(raws: impl IntoIterator<Item = i32>) -> Self {
        Self::from_results(raws.into_iter().map(Ok).collect())
    }

    /// `Err(msg)` entries fail with `msg`; mention "timeout" to get a timeout.
    pub fn from_results(script: Vec<Result<i32, String>>) -> Self {
        Self {
            script: script.into(),
            holding: None,
            reads: 0,
        }
    }

    /// Constant reading forever.
    pub fn holding(raw: i32) -> Self {
        Self::default().then_hold(raw)
    }

    #[must_use]
    pub fn then_hold(mut self, raw: i32) -> Self {
        self.holding = Some(raw);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Scale for ScriptedScale {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(msg)) => Err(Box::new(std::io::Error::other(msg))),
            None => self.holding.ok_or_else(|| "scripted scale exhausted".into()),
        }
    }
}

/// Operator input replayed from a list. When the list runs out the device
/// reports `Idle`, or `Closed` after `then_close`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    events: VecDeque<Result<InputEvent, InputStatus>>,
    close_when_empty: bool,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().map(Ok).collect(),
            close_when_empty: false,
        }
    }

    /// Insert an idle poll (timeout with nothing pending).
    #[must_use]
    pub fn idle(mut self) -> Self {
        self.events.push_back(Err(InputStatus::Idle));
        self
    }

    #[must_use]
    pub fn then(mut self, ev: InputEvent) -> Self {
        self.events.push_back(Ok(ev));
        self
    }

    #[must_use]
    pub fn then_close(mut self) -> Self {
        self.close_when_empty = true;
        self
    }
}

impl InputDevice for ScriptedInput {
    fn poll_event(&mut self, _timeout: Duration) -> Result<InputEvent, InputStatus> {
        match self.events.pop_front() {
            Some(ev) => ev,
            None if self.close_when_empty => Err(InputStatus::Closed),
            None => Err(InputStatus::Idle),
        }
    }
}

/// Feedback sink that keeps every notification. Clones share the log.
#[derive(Debug, Default, Clone)]
pub struct RecordingFeedback {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Feedback for RecordingFeedback {
    fn notify(&mut self, n: &Notification) {
        if let Ok(mut log) = self.log.lock() {
            log.push(n.clone());
        }
    }
}

/// Record sink and calibration store that keep what they receive. Clones
/// share the same storage.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<VisitRecord>>>,
    calibrations: Arc<Mutex<Vec<CalibrationOutcome>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose deliveries always fail (after recording the attempt).
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<VisitRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn calibrations(&self) -> Vec<CalibrationOutcome> {
        self.calibrations.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl RecordSink for RecordingSink {
    fn deliver(&mut self, record: &VisitRecord) -> crate::error::Result<()> {
        if let Ok(mut r) = self.records.lock() {
            r.push(*record);
        }
        if self.fail {
            eyre::bail!("recording sink configured to fail");
        }
        Ok(())
    }
}

impl CalibrationStore for RecordingSink {
    fn persist(&mut self, outcome: &CalibrationOutcome) -> crate::error::Result<()> {
        if let Ok(mut c) = self.calibrations.lock() {
            c.push(*outcome);
        }
        Ok(())
    }
}
