//! Human-readable error descriptions and structured JSON error formatting.

use whiskers_core::error::{BuildError, CalibrationError, WhiskersError};

/// Exit codes. Clap keeps 2 for usage errors.
pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_TIMEOUT: i32 = 3;
pub const EXIT_HARDWARE: i32 = 4;
pub const EXIT_CALIBRATION: i32 = 5;
pub const EXIT_CONFIG: i32 = 6;

fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingScale => {
                "What happened: No scale was provided to the monitor.\nLikely causes: The load cell failed to initialize or was not wired into the builder.\nHow to fix: Ensure the HX711 scale is created successfully and passed via with_scale(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CalibrationError>() {
        return match ce {
            CalibrationError::InputClosed => "What happened: Calibration was aborted because the input closed.\nLikely causes: stdin reached end of file, or the rotary encoder thread stopped.\nHow to fix: Run `whiskers calibrate` interactively; enter +N/-N to adjust and an empty line to confirm.".to_string(),
            other => format!(
                "What happened: Calibration failed ({other}).\nLikely causes: No mass on the platform, or a non-positive target.\nHow to fix: Place the known mass, set the matching target, then confirm."
            ),
        };
    }

    if let Some(we) = err.downcast_ref::<WhiskersError>() {
        return match we {
            WhiskersError::Timeout => "What happened: Scale read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify DT/SCK pins and power, and consider increasing timeouts.sensor_ms in the config.".to_string(),
            WhiskersError::Hardware(_) | WhiskersError::HardwareFault(_) => format!(
                "What happened: The scale reported an error ({}).\nLikely causes: Loose wiring or a failing load cell.\nHow to fix: Check the HX711 connections, then run `whiskers self-check`.",
                chain_text(err)
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = chain_text(err);
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open hx711") || lower.contains("open input pins") {
        return format!(
            "What happened: Failed to initialize hardware pins ({msg}).\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO."
        );
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("history csv must have headers") {
        return "Invalid headers in history CSV. Expected 'time,weight,std,duration,secondary'."
            .to_string();
    }

    // Generic fallback
    format!(
        "Something went wrong.\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error class.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return EXIT_CONFIG;
    }
    if err.downcast_ref::<CalibrationError>().is_some() {
        return EXIT_CALIBRATION;
    }
    match err.downcast_ref::<WhiskersError>() {
        Some(WhiskersError::Timeout) => EXIT_TIMEOUT,
        Some(WhiskersError::Hardware(_) | WhiskersError::HardwareFault(_)) => EXIT_HARDWARE,
        Some(WhiskersError::Config(_)) => EXIT_CONFIG,
        _ if chain_text(err).to_ascii_lowercase().contains("invalid configuration") => EXIT_CONFIG,
        _ => EXIT_GENERIC,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingScale => "MissingScale",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        };
    }
    if let Some(ce) = err.downcast_ref::<CalibrationError>() {
        return match ce {
            CalibrationError::InvalidTarget(_) => "InvalidTarget",
            CalibrationError::DegenerateReading => "DegenerateReading",
            CalibrationError::InputClosed => "InputClosed",
        };
    }
    match err.downcast_ref::<WhiskersError>() {
        Some(WhiskersError::Timeout) => "Timeout",
        Some(WhiskersError::Hardware(_)) => "Hardware",
        Some(WhiskersError::HardwareFault(_)) => "HardwareFault",
        Some(WhiskersError::Config(_)) => "Config",
        Some(WhiskersError::State(_)) => "State",
        Some(WhiskersError::Io(_)) => "Io",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
