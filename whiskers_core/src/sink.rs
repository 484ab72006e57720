//! Hand-off points for results that leave the engine.

use crate::calibration::CalibrationOutcome;
use crate::error::Result;
use crate::record::VisitRecord;

/// Receives each qualifying visit exactly once. A failed delivery is logged
/// by the caller and not retried.
pub trait RecordSink {
    fn deliver(&mut self, record: &VisitRecord) -> Result<()>;
}

impl<R: RecordSink + ?Sized> RecordSink for Box<R> {
    fn deliver(&mut self, record: &VisitRecord) -> Result<()> {
        (**self).deliver(record)
    }
}

/// In-memory sink, mostly for tests.
impl RecordSink for Vec<VisitRecord> {
    fn deliver(&mut self, record: &VisitRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }
}

/// Persists a new scale factor and tare offset after calibration.
pub trait CalibrationStore {
    fn persist(&mut self, outcome: &CalibrationOutcome) -> Result<()>;
}

impl<C: CalibrationStore + ?Sized> CalibrationStore for Box<C> {
    fn persist(&mut self, outcome: &CalibrationOutcome) -> Result<()> {
        (**self).persist(outcome)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn deliver(&mut self, _record: &VisitRecord) -> Result<()> {
        Ok(())
    }
}

impl CalibrationStore for NullSink {
    fn persist(&mut self, _outcome: &CalibrationOutcome) -> Result<()> {
        Ok(())
    }
}
