//! Common time/unit helpers for whiskers_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

#[inline]
pub fn ms_to_s(ms: u64) -> f32 {
    (ms as f64 / MILLIS_PER_SEC as f64) as f32
}

/// Round a mean of raw counts to the nearest count, clamped to the i32 range.
/// Non-finite input maps to 0.
#[inline]
pub fn round_counts(mean: f64) -> i32 {
    if !mean.is_finite() {
        return 0;
    }
    mean.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Current wall-clock time in whole seconds since the Unix epoch (0 if the
/// system clock is before it).
pub fn unix_now_s() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_to_s_keeps_fractions() {
        assert_eq!(ms_to_s(0), 0.0);
        assert_eq!(ms_to_s(1500), 1.5);
    }

    #[test]
    fn round_counts_clamps_and_rounds() {
        assert_eq!(round_counts(10.5), 11);
        assert_eq!(round_counts(-10.5), -11);
        assert_eq!(round_counts(1e12), i32::MAX);
        assert_eq!(round_counts(f64::NAN), 0);
    }
}
