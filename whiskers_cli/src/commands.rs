//! Subcommand bodies: config mapping, hardware assembly, and the monitor run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::{Result, WrapErr};
use whiskers_config::{Config, HistoryLog};
use whiskers_core::mocks::RecordingSink;
use whiskers_core::{
    Calibrator, Feedback, LoadCellCfg, Monitor, NoopFeedback, OccupancyCfg, ScaleReader,
};
use whiskers_hardware::SimulatedScale;
use whiskers_traits::clock::test_clock::TestClock;
use whiskers_ui::ConsoleFeedback;

use crate::hw::{open_input, open_scale, sim_calibration};
use crate::sinks::{ConfigCalibrationStore, CsvRecordSink, print_record};

fn feedback(json: bool) -> Box<dyn Feedback> {
    if json {
        Box::new(NoopFeedback)
    } else {
        Box::new(ConsoleFeedback::stderr())
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn run(
    cfg: &Config,
    config_path: &Path,
    json: bool,
    sim: bool,
    max_polls: Option<u64>,
) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .wrap_err("install Ctrl-C handler")?;
    }

    let history = HistoryLog::new(&cfg.history.file);
    tracing::info!(history = %history.path().display(), "recording visits");
    let mut monitor = Monitor::builder()
        .with_config(cfg)
        .with_feedback(feedback(json))
        .with_record_sink(CsvRecordSink::new(Some(history), json))
        .with_calibration_store(ConfigCalibrationStore::new(
            config_path.to_path_buf(),
            cfg.clone(),
        ))
        .with_input(open_input(cfg, sim)?)
        .with_timestamp_source(unix_now)
        .with_scale(open_scale(cfg, sim)?)
        .build()?;

    let summary = monitor.run(&shutdown, max_polls)?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "polls": summary.polls,
                "visits": summary.visits,
                "unavailable": summary.unavailable,
            })
        );
    } else {
        println!(
            "stopped: polls={} visits={} unavailable={}",
            summary.polls, summary.visits, summary.unavailable
        );
    }
    Ok(())
}

/// Push one scripted visit through the full monitor on a virtual clock.
pub fn simulate(cfg: &Config, json: bool, visit_g: f32, visit_ms: u64, noise_g: f32) -> Result<()> {
    if !visit_g.is_finite() || visit_g <= 0.0 {
        eyre::bail!("--visit-g must be > 0");
    }
    let period_ms = cfg.filter.sample_period_ms.max(1);
    let ticks = |ms: u64| ms.div_ceil(period_ms).max(1);
    let scale = SimulatedScale::new(cfg.scale.scale_factor, cfg.scale.offset_counts)
        .hold(0.0, ticks(2000))
        .ramp(visit_g, ticks(1000))
        .hold(visit_g, ticks(visit_ms))
        .ramp(0.0, ticks(500))
        .with_noise(noise_g);
    // Long enough for the exit, the settle interval and one more window.
    let script_ms = 2000 + 1000 + visit_ms + 500;
    let polls = ticks(script_ms + cfg.scale.settle_ms + cfg.filter.window_ms) + 10;

    let records = RecordingSink::new();
    let start = unix_now();
    let clock = Arc::new(TestClock::new());
    let stamp_clock = clock.clone();
    let mut monitor = Monitor::builder()
        .with_config(cfg)
        .with_occupancy(OccupancyCfg {
            // The platform is empty at the end of the script; no drift to chase.
            retare_after_visit: false,
            ..OccupancyCfg::from(&cfg.scale)
        })
        .with_clock(clock)
        .with_record_sink(records.clone())
        .with_timestamp_source(move || start + (stamp_clock.elapsed_ms() / 1000) as i64)
        .with_scale(scale)
        .build()?;

    let summary = monitor.run(&AtomicBool::new(false), Some(polls))?;
    for record in records.records() {
        print_record(&record, json);
    }
    if summary.visits == 0 {
        tracing::warn!(
            visit_ms,
            presence_time_min_ms = cfg.scale.presence_time_min_ms,
            "no qualifying visit; is the visit shorter than the presence time?"
        );
    }
    if !json {
        println!("simulated {} polls, {} visit(s)", summary.polls, summary.visits);
    }
    Ok(())
}

pub fn calibrate(
    cfg: &Config,
    config_path: &Path,
    json: bool,
    target_g: Option<i32>,
    sim: bool,
) -> Result<()> {
    let mut cal_cfg: whiskers_core::CalibrationCfg = (&cfg.calibration).into();
    if let Some(t) = target_g {
        cal_cfg.default_target_g = t;
    }
    let mut load_cell = LoadCellCfg::from(&cfg.scale);
    let scale = if sim || cfg!(not(all(feature = "hardware", target_os = "linux"))) {
        // The simulated platform carries exactly the initial target.
        let mass_g = cal_cfg.default_target_g.max(1) as f32;
        Box::new(sim_calibration(load_cell.tare_samples, mass_g)) as Box<dyn whiskers_traits::Scale>
    } else {
        open_scale(cfg, false)?
    };
    // Raw-unit reads ignore the factor; start from a neutral one if the
    // stored factor is unusable.
    if !load_cell.scale_factor.is_finite() || load_cell.scale_factor == 0.0 {
        load_cell.scale_factor = 1.0;
    }
    let mut reader = ScaleReader::new(scale, &load_cell)?;
    let mut input = open_input(cfg, sim)?;
    let mut fb = feedback(json);
    if !json {
        eprintln!("Place the known mass, adjust the target with +N/-N, then press Enter.");
    }

    let calibrator = Calibrator::new(cal_cfg, (&cfg.timeouts).into(), load_cell.tare_samples);
    let outcome = calibrator.run(&mut reader, &mut input, &mut fb)?;
    whiskers_core::CalibrationStore::persist(
        &mut ConfigCalibrationStore::new(config_path.to_path_buf(), cfg.clone()),
        &outcome,
    )?;

    if json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        println!(
            "calibrated: {} g -> scale_factor {:.4} (offset {})",
            outcome.target_g, outcome.scale_factor, outcome.offset_counts
        );
    }
    Ok(())
}

pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let mut reader = ScaleReader::new(open_scale(cfg, false)?, &(&cfg.scale).into())?;
    let timeout = Duration::from_millis(cfg.timeouts.sensor_ms);
    let mass_g = reader.read_mass(timeout).wrap_err("self-check read")?;
    if json {
        println!("{}", serde_json::json!({ "ok": true, "mass_g": mass_g }));
    } else {
        println!("OK: scale reads {mass_g:.1} g");
    }
    Ok(())
}

pub fn history(cfg: &Config, json: bool, file: Option<PathBuf>) -> Result<()> {
    let path = file.unwrap_or_else(|| PathBuf::from(&cfg.history.file));
    let rows = whiskers_config::load_history(&path)?;
    for row in &rows {
        if json {
            println!("{}", serde_json::to_string(row)?);
        } else {
            let when = chrono::DateTime::from_timestamp(row.time, 0).map_or_else(
                || row.time.to_string(),
                |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
            );
            println!(
                "{when}  {:>7.0} g  sigma {:>5.1} g  {:>6.1} s",
                row.weight, row.std, row.duration
            );
        }
    }
    if !json {
        println!("{} record(s)", rows.len());
    }
    Ok(())
}
