//! Load-cell and operator-input implementations of the `whiskers_traits` seams.
//!
//! `sim` and the input decoders build everywhere. The Raspberry Pi drivers
//! need the `hardware` feature on Linux.
pub mod error;
pub mod input;
pub mod sim;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hx711;

pub use error::HwError;
pub use input::{ChannelInput, input_channel};
pub use sim::SimulatedScale;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use gpio::{GpioInput, HardwareScale};
