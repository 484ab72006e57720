use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use whiskers_hardware::error::HwError;
use whiskers_hardware::util::wait_until_low_with_timeout;

#[test]
fn returns_once_data_ready_goes_low() {
    let high = Arc::new(AtomicBool::new(true));
    let high_bg = high.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(3));
        high_bg.store(false, Ordering::Relaxed);
    });

    let res = wait_until_low_with_timeout(
        || high.load(Ordering::Relaxed),
        Duration::from_millis(200),
        Duration::from_micros(200),
    );
    assert!(res.is_ok(), "expected success, got {res:?}");
}

#[test]
fn already_low_does_not_sleep() {
    let polls = AtomicU32::new(0);
    wait_until_low_with_timeout(
        || {
            polls.fetch_add(1, Ordering::Relaxed);
            false
        },
        Duration::ZERO,
        Duration::from_secs(10),
    )
    .expect("ready immediately");
    assert_eq!(polls.load(Ordering::Relaxed), 1);
}

#[test]
fn stuck_high_reports_data_ready_timeout() {
    let err = wait_until_low_with_timeout(
        || true,
        Duration::from_millis(5),
        Duration::from_micros(200),
    )
    .expect_err("expected timeout error");
    assert!(matches!(err, HwError::DataReadyTimeout), "unexpected error: {err:?}");
    assert!(err.to_string().contains("timeout"));
}
