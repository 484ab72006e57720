#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Status display for the scale, rendered as text.

pub mod console;
pub mod screen;

pub use console::ConsoleFeedback;
pub use screen::{Screen, ScreenState};
