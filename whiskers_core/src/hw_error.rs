//! Maps `Box<dyn Error>` from trait boundaries to typed `WhiskersError`.
//!
//! The traits in `whiskers_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `whiskers_hardware::HwError` downcasting.

use crate::error::WhiskersError;

/// Map a trait-boundary error to a typed `WhiskersError`.
///
/// Known hardware error types are downcast first, anything else falls back
/// to string matching.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> WhiskersError {
    #[cfg(feature = "hardware-errors")]
    {
        use whiskers_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::DataReadyTimeout => WhiskersError::Timeout,
                other => WhiskersError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        WhiskersError::Timeout
    } else {
        WhiskersError::Hardware(s)
    }
}
