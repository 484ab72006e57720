//! A visit-shaped script as the engine would see it: raw counts through the
//! `Scale` trait object.
use std::time::Duration;

use rstest::rstest;
use whiskers_hardware::SimulatedScale;
use whiskers_traits::Scale;

fn visit(counts_per_gram: f32, zero: i32) -> Box<dyn Scale> {
    Box::new(
        SimulatedScale::new(counts_per_gram, zero)
            .hold(0.0, 5)
            .ramp(2500.0, 10)
            .hold(2500.0, 80)
            .ramp(0.0, 5),
    )
}

#[rstest]
#[case(1.0, 0)]
#[case(21.5, -8000)]
#[case(-7.25, 120_000)]
fn raw_counts_follow_the_script(#[case] gain: f32, #[case] zero: i32) {
    let mut scale = visit(gain, zero);
    let raws: Vec<i32> = (0..100)
        .map(|_| scale.read(Duration::from_millis(100)).expect("read"))
        .collect();
    let grams = |raw: i32| (raw - zero) as f32 / gain;
    assert!(grams(raws[0]).abs() < 1.0);
    assert!((grams(raws[50]) - 2500.0).abs() < 1.0);
    assert!(grams(raws[99]).abs() < 1.0);
}
