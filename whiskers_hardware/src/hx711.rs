use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{sign_extend_24, wait_until_low_with_timeout};

/// Channel A, gain 128.
pub const GAIN_A_128: u8 = 25;

pub struct Hx711 {
    dt: InputPin,
    sck: OutputPin,
    gain_pulses: u8, // 25, 26, 27 based on gain/channel
}

impl Hx711 {
    pub fn new(dt: InputPin, mut sck: OutputPin, gain_pulses: u8) -> Result<Self> {
        if !(25..=27).contains(&gain_pulses) {
            return Err(HwError::Gpio(format!("invalid gain pulse count {gain_pulses}")));
        }
        sck.set_low(); // clock idle low
        Ok(Self {
            dt,
            sck,
            gain_pulses,
        })
    }

    /// Claim the DT/SCK pins by BCM number.
    pub fn open(dt_pin: u8, sck_pin: u8, gain_pulses: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let dt = gpio
            .get(dt_pin)
            .map_err(|e| HwError::Gpio(format!("dt pin {dt_pin}: {e}")))?
            .into_input();
        let sck = gpio
            .get(sck_pin)
            .map_err(|e| HwError::Gpio(format!("sck pin {sck_pin}: {e}")))?
            .into_output();
        Self::new(dt, sck, gain_pulses)
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        // DT low means a conversion is ready.
        wait_until_low_with_timeout(|| self.dt.is_high(), timeout, Duration::from_micros(200))?;

        let mut value: u32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay_100ns();
            value = (value << 1) | u32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay_100ns();
        }

        // Extra pulses select gain/channel for the next conversion.
        for _ in 24..self.gain_pulses {
            self.sck.set_high();
            spin_delay_100ns();
            self.sck.set_low();
            spin_delay_100ns();
        }

        let raw = sign_extend_24(value);
        trace!(raw, "hx711 raw read");
        Ok(raw)
    }
}

#[inline(always)]
fn spin_delay_100ns() {
    std::hint::spin_loop();
}
