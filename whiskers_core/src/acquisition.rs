//! Raw counts to mass: tare offset and scale factor on top of a `Scale`.

use std::time::Duration;

use whiskers_traits::Scale;

use crate::config::LoadCellCfg;
use crate::error::WhiskersError;
use crate::hw_error::map_hw_error;
use crate::util::round_counts;

/// `units = (raw - offset) / scale_factor`.
pub struct ScaleReader<S: Scale> {
    scale: S,
    offset: i32,
    scale_factor: f32,
}

impl<S: Scale> core::fmt::Debug for ScaleReader<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScaleReader")
            .field("offset", &self.offset)
            .field("scale_factor", &self.scale_factor)
            .finish()
    }
}

fn check_factor(factor: f32) -> Result<f32, WhiskersError> {
    if factor.is_finite() && factor != 0.0 {
        Ok(factor)
    } else {
        Err(WhiskersError::Config(format!(
            "scale factor must be finite and non-zero, got {factor}"
        )))
    }
}

impl<S: Scale> ScaleReader<S> {
    pub fn new(scale: S, cell: &LoadCellCfg) -> Result<Self, WhiskersError> {
        Ok(Self {
            scale,
            offset: cell.offset_counts,
            scale_factor: check_factor(cell.scale_factor)?,
        })
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn set_scale_factor(&mut self, factor: f32) -> Result<(), WhiskersError> {
        self.scale_factor = check_factor(factor)?;
        tracing::info!(scale_factor = factor, "scale factor applied");
        Ok(())
    }

    pub fn read_raw(&mut self, timeout: Duration) -> Result<i32, WhiskersError> {
        self.scale.read(timeout).map_err(|e| map_hw_error(&*e))
    }

    /// Offset-corrected counts with no scale factor applied.
    pub fn read_raw_units(&mut self, timeout: Duration) -> Result<f32, WhiskersError> {
        let raw = self.read_raw(timeout)?;
        Ok((i64::from(raw) - i64::from(self.offset)) as f32)
    }

    /// Mass in calibrated units (grams once calibrated).
    pub fn read_mass(&mut self, timeout: Duration) -> Result<f32, WhiskersError> {
        Ok(self.read_raw_units(timeout)? / self.scale_factor)
    }

    /// Mean of `samples` raw reads (at least one). Any failed read fails the whole average.
    pub fn average_raw(&mut self, samples: u32, timeout: Duration) -> Result<f64, WhiskersError> {
        let n = samples.max(1);
        let mut sum = 0.0f64;
        for _ in 0..n {
            sum += f64::from(self.read_raw(timeout)?);
        }
        Ok(sum / f64::from(n))
    }

    /// Re-zero: the averaged raw reading becomes the new offset. On error the
    /// previous offset is kept.
    pub fn tare(&mut self, samples: u32, timeout: Duration) -> Result<i32, WhiskersError> {
        let mean = self.average_raw(samples, timeout)?;
        let previous = self.offset;
        self.offset = round_counts(mean);
        tracing::info!(offset = self.offset, previous, "tare");
        Ok(self.offset)
    }
}
