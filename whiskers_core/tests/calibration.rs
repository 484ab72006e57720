use std::time::Duration;

use whiskers_core::error::CalibrationError;
use whiskers_core::mocks::{RecordingFeedback, ScriptedInput, ScriptedScale};
use whiskers_core::{CalibrationCfg, Calibrator, LoadCellCfg, Notification, ScaleReader, Timeouts};
use whiskers_traits::InputEvent;

/// Ten tare reads at `zero`, then `raw` forever.
fn scale(zero: i32, raw: i32) -> ScaleReader<ScriptedScale> {
    ScaleReader::new(
        ScriptedScale::new(std::iter::repeat_n(zero, 10)).then_hold(raw),
        &LoadCellCfg::default(),
    )
    .expect("valid load cell")
}

fn calibrator() -> Calibrator {
    Calibrator::new(CalibrationCfg::default(), Timeouts::default(), 10)
}

#[test]
fn adjusted_target_and_averaged_reading_give_factor() {
    let mut reader = scale(100, 1200);
    let mut input = ScriptedInput::new([InputEvent::Delta(20), InputEvent::Delta(30)])
        .idle()
        .then(InputEvent::Press);
    let mut fb = RecordingFeedback::new();

    let out = calibrator()
        .run(&mut reader, &mut input, &mut fb)
        .expect("calibration completes");

    assert_eq!(out.target_g, 550);
    assert_eq!(out.averaged_raw, 1100.0);
    assert_eq!(out.scale_factor, 2.0);
    assert_eq!(out.offset_counts, 100);
    assert_eq!(reader.scale_factor(), 2.0);
    // 550 g on the platform now reads as 550 g.
    assert_eq!(reader.read_mass(Duration::ZERO).expect("read"), 550.0);

    let notes = fb.notifications();
    assert_eq!(notes.first(), Some(&Notification::Tared { offset_counts: 100 }));
    assert!(notes.contains(&Notification::CalibrationPrompt { target_g: 520 }));
    assert_eq!(notes.last(), Some(&Notification::Calibrated { scale_factor: 2.0 }));
}

#[test]
fn zero_target_is_rejected_and_session_continues() {
    let mut reader = scale(0, 1100);
    let mut input = ScriptedInput::new([
        InputEvent::Delta(-500),
        InputEvent::Press,
        InputEvent::Delta(100),
        InputEvent::LongPress,
    ]);
    let mut fb = RecordingFeedback::new();

    let out = calibrator()
        .run(&mut reader, &mut input, &mut fb)
        .expect("second confirmation succeeds");
    assert_eq!(out.target_g, 100);
    assert_eq!(out.scale_factor, 11.0);

    let rejected: Vec<_> = fb
        .notifications()
        .into_iter()
        .filter(|n| matches!(n, Notification::CalibrationRejected { .. }))
        .collect();
    assert_eq!(rejected.len(), 1);
    assert!(matches!(
        &rejected[0],
        Notification::CalibrationRejected { target_g: 0, .. }
    ));
}

#[test]
fn closed_input_aborts_without_applying_a_factor() {
    let mut reader = scale(0, 1100);
    let mut input = ScriptedInput::new([InputEvent::Delta(10)]).then_close();
    let mut fb = RecordingFeedback::new();

    let err = calibrator()
        .run(&mut reader, &mut input, &mut fb)
        .expect_err("input closed");
    assert_eq!(
        err.downcast_ref::<CalibrationError>(),
        Some(&CalibrationError::InputClosed)
    );
    assert_eq!(reader.scale_factor(), 1.0);
}

#[test]
fn zero_reading_is_degenerate_and_session_stays_open() {
    // Empty platform at confirmation: raw units average to 0.
    let mut reader = ScaleReader::new(
        ScriptedScale::new(std::iter::repeat_n(50, 20)).then_hold(1050),
        &LoadCellCfg::default(),
    )
    .expect("valid load cell");
    let mut input = ScriptedInput::new([InputEvent::Press, InputEvent::Press]);
    let mut fb = RecordingFeedback::new();

    let out = calibrator()
        .run(&mut reader, &mut input, &mut fb)
        .expect("second attempt has a weight on it");
    assert_eq!(out.averaged_raw, 1000.0);
    assert_eq!(out.scale_factor, 2.0);
    assert!(fb.notifications().iter().any(|n| matches!(
        n,
        Notification::CalibrationRejected { target_g: 500, .. }
    )));
}
