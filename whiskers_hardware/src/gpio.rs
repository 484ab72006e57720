//! Raspberry Pi wiring: HX711 load cell plus rotary encoder with push button.
//!
//! The encoder and button are polled from a dedicated thread that owns the
//! pins and pushes decoded events into a channel. The thread stops when the
//! `GpioInput` is dropped.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, InputPin};
use whiskers_traits::{InputDevice, InputEvent, InputStatus, Scale};

use crate::error::HwError;
use crate::hx711::{GAIN_A_128, Hx711};
use crate::input::{ButtonTracker, ChannelInput, QuadratureDecoder, input_channel};

const POLL_INTERVAL: Duration = Duration::from_millis(1);
const DEBOUNCE_MS: u64 = 10;
const LONG_PRESS_MS: u64 = 1000;
const STEPS_PER_DETENT: u8 = 4;
const MAX_RETRIES: u32 = 3;

pub struct HardwareScale {
    hx711: Hx711,
}

impl HardwareScale {
    pub fn open(dt_pin: u8, sck_pin: u8) -> Result<Self, HwError> {
        let hx711 = Hx711::open(dt_pin, sck_pin, GAIN_A_128)?;
        Ok(Self { hx711 })
    }
}

impl Scale for HardwareScale {
    fn read(&mut self, timeout: Duration) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let mut attempts = 0;
        loop {
            match self.hx711.read_with_timeout(timeout) {
                Ok(raw) => {
                    tracing::trace!(raw, "hx711 sample");
                    return Ok(raw);
                }
                Err(HwError::DataReadyTimeout) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    tracing::warn!(retries = attempts, "scale timeout, retrying");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scale read error");
                    return Err(Box::new(e));
                }
            }
        }
    }
}

/// Encoder + button input backed by a polling thread.
pub struct GpioInput {
    events: ChannelInput,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

fn input_pullup(gpio: &Gpio, pin: u8) -> Result<InputPin, HwError> {
    Ok(gpio
        .get(pin)
        .map_err(|e| HwError::Gpio(format!("pin {pin}: {e}")))?
        .into_input_pullup())
}

impl GpioInput {
    pub fn spawn(encoder_a: u8, encoder_b: u8, button: u8) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let a = input_pullup(&gpio, encoder_a)?;
        let b = input_pullup(&gpio, encoder_b)?;
        let btn = input_pullup(&gpio, button)?;

        let (tx, events) = input_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = shutdown.clone();

        let join_handle = std::thread::Builder::new()
            .name("gpio-input".into())
            .spawn(move || {
                let epoch = Instant::now();
                let mut decoder =
                    QuadratureDecoder::new(a.is_high(), b.is_high(), STEPS_PER_DETENT);
                let mut button = ButtonTracker::new(DEBOUNCE_MS, LONG_PRESS_MS);
                while !shutdown_flag.load(Ordering::Relaxed) {
                    let now_ms = u64::try_from(epoch.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let delta = decoder.update(a.is_high(), b.is_high());
                    // Pull-up wiring: pressed reads low.
                    let press = button.update(btn.is_low(), now_ms);
                    let sent = [(delta != 0).then_some(InputEvent::Delta(delta)), press]
                        .into_iter()
                        .flatten()
                        .try_for_each(|ev| tx.send(ev));
                    if sent.is_err() {
                        tracing::debug!("input consumer disconnected, exiting thread");
                        break;
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                tracing::trace!("gpio input thread exiting cleanly");
            })?;

        Ok(Self {
            events,
            shutdown,
            join_handle: Some(join_handle),
        })
    }
}

impl InputDevice for GpioInput {
    fn poll_event(&mut self, timeout: Duration) -> Result<InputEvent, InputStatus> {
        self.events.poll_event(timeout)
    }
}

impl Drop for GpioInput {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.join()
        {
            tracing::warn!(?e, "gpio input thread panicked during shutdown");
        }
    }
}
