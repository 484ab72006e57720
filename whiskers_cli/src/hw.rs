//! Scale and operator-input assembly: GPIO in hardware builds, simulation and
//! stdin otherwise.

use std::io::BufRead;
use std::time::Duration;

use eyre::Result;
use whiskers_hardware::{HwError, SimulatedScale, input_channel};
use whiskers_traits::{InputDevice, InputEvent, Scale};

/// Gain and zero point of the simulated load cell used by `calibrate --sim`.
pub const SIM_COUNTS_PER_GRAM: f32 = 420.0;
pub const SIM_ZERO_COUNTS: i32 = 8_000;

/// A scale that never signals data-ready. Selected with `WHISKERS_TEST_SIM_TIMEOUT`.
struct StuckScale;

impl Scale for StuckScale {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> std::result::Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(HwError::DataReadyTimeout))
    }
}

fn sim_timeout_requested() -> bool {
    std::env::var("WHISKERS_TEST_SIM_TIMEOUT").is_ok_and(|v| !v.is_empty() && v != "0")
}

/// Repeating day on the simulated platform, in grams at the configured gain:
/// empty, a 4.5 kg cat for about 40 s, empty again.
fn sim_day(cfg: &whiskers_config::Config) -> SimulatedScale {
    let ticks_per_s = (1000 / cfg.filter.sample_period_ms.max(1)).max(1);
    SimulatedScale::new(cfg.scale.scale_factor, cfg.scale.offset_counts)
        .hold(0.0, 20 * ticks_per_s)
        .ramp(4500.0, 2 * ticks_per_s)
        .hold(4500.0, 40 * ticks_per_s)
        .ramp(0.0, ticks_per_s)
        .hold(0.0, 60 * ticks_per_s)
        .with_noise(6.0)
        .cycling()
}

/// Known mass resting on the simulated platform after the tare reads.
pub fn sim_calibration(tare_samples: u32, mass_g: f32) -> SimulatedScale {
    SimulatedScale::new(SIM_COUNTS_PER_GRAM, SIM_ZERO_COUNTS)
        .hold(0.0, u64::from(tare_samples))
        .hold(mass_g, u64::MAX / 2)
}

pub fn open_scale(cfg: &whiskers_config::Config, sim: bool) -> Result<Box<dyn Scale>> {
    if sim_timeout_requested() {
        tracing::warn!("WHISKERS_TEST_SIM_TIMEOUT set: scale will time out");
        return Ok(Box::new(StuckScale));
    }
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        use eyre::WrapErr;
        if !sim {
            let scale =
                whiskers_hardware::HardwareScale::open(cfg.pins.hx711_dt, cfg.pins.hx711_sck)
                    .wrap_err("open hx711")?;
            tracing::info!(dt = cfg.pins.hx711_dt, sck = cfg.pins.hx711_sck, "hx711 ready");
            return Ok(Box::new(scale));
        }
    }
    let _ = sim;
    tracing::info!("using simulated scale");
    Ok(Box::new(sim_day(cfg)))
}

/// Rotary encoder and button in hardware builds, stdin lines otherwise.
pub fn open_input(cfg: &whiskers_config::Config, sim: bool) -> Result<Box<dyn InputDevice>> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        use eyre::WrapErr;
        if !sim {
            let p = &cfg.pins;
            let input = whiskers_hardware::GpioInput::spawn(p.encoder_a, p.encoder_b, p.button)
                .wrap_err("open input pins")?;
            return Ok(Box::new(input));
        }
    }
    let _ = (cfg, sim);
    Ok(Box::new(stdin_input()))
}

/// One stdin line as an operator action.
///
/// `t` tare, `c` calibrate, `+N`/`-N` encoder detents, empty line confirms.
pub fn parse_line(line: &str) -> Option<InputEvent> {
    match line.trim() {
        "" | "t" | "tare" => Some(InputEvent::Press),
        "c" | "cal" | "calibrate" => Some(InputEvent::LongPress),
        other => other
            .strip_prefix('+')
            .unwrap_or(other)
            .parse::<i32>()
            .ok()
            .map(InputEvent::Delta),
    }
}

/// Reader thread feeding a channel; the channel closes at end of input.
fn stdin_input() -> whiskers_hardware::ChannelInput {
    let (tx, input) = input_channel();
    let spawned = std::thread::Builder::new()
        .name("stdin-input".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match parse_line(&line) {
                    Some(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    None => tracing::warn!(%line, "unrecognized input (t, c, +N, -N or empty)"),
                }
            }
            tracing::debug!("stdin closed");
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "stdin reader not started; input disabled");
    }
    input
}
