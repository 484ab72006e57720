use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until the provided `is_high` predicate becomes false (HX711 DOUT low
/// means a conversion is ready), or the timeout expires. Sleeps between polls
/// instead of spinning.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// Sign-extend a 24-bit two's complement HX711 sample.
#[inline]
pub fn sign_extend_24(value: u32) -> i32 {
    let v = (value & 0x00FF_FFFF) as i32;
    if (v & 0x0080_0000) != 0 {
        v | !0x00FF_FFFF
    } else {
        v
    }
}
