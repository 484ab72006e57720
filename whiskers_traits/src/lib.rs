//! Hardware-boundary traits shared by the weighing engine and its collaborators.
//!
//! Everything the engine touches outside of plain memory goes through one of
//! these: the load cell (`Scale`), the operator controls (`InputDevice`) and
//! time (`Clock`). Concrete implementations live in `whiskers_hardware` or in
//! tests.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// A load-cell ADC that yields raw, unscaled counts.
pub trait Scale {
    /// Block until a conversion is ready or `timeout` expires.
    fn read(&mut self, timeout: Duration) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;
}

impl<S: Scale + ?Sized> Scale for Box<S> {
    fn read(&mut self, timeout: Duration) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }
}

/// Discrete operator input, already debounced and decoded.
///
/// Rotary encoders and buttons are usually interrupt driven; implementations
/// queue these events and the polling loop drains them in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Signed number of detents turned since the previous event.
    Delta(i32),
    /// Short press and release.
    Press,
    /// Press held past the long-press threshold.
    LongPress,
}

/// Why no event was returned by [`InputDevice::poll_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStatus {
    /// Nothing arrived within the timeout.
    Idle,
    /// The producer side is gone; no further events will arrive.
    Closed,
}

pub trait InputDevice {
    /// Wait up to `timeout` for the next event. A zero timeout never blocks.
    fn poll_event(&mut self, timeout: Duration) -> Result<InputEvent, InputStatus>;
}

impl<I: InputDevice + ?Sized> InputDevice for Box<I> {
    fn poll_event(&mut self, timeout: Duration) -> Result<InputEvent, InputStatus> {
        (**self).poll_event(timeout)
    }
}
