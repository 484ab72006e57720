use whiskers_core::error::BuildError;
use whiskers_core::mocks::ScriptedScale;
use whiskers_core::{FilterCfg, LoadCellCfg, Monitor, OccupancyCfg, Timeouts};
use rstest::rstest;

#[rstest]
fn builder_missing_scale_yields_typed_build_error() {
    let err = Monitor::builder()
        // missing with_scale()
        .with_filter(FilterCfg::default())
        .try_build()
        .expect_err("should fail with MissingScale");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingScale) => {}
        other => panic!("expected MissingScale, got: {other:?}"),
    }
}

#[rstest]
#[case::zero_alpha(
    Monitor::builder().with_filter(FilterCfg { alpha: 0.0, ..FilterCfg::default() }),
    "alpha must be in (0.0, 1.0]"
)]
#[case::zero_window(
    Monitor::builder().with_filter(FilterCfg { window_ms: 0, ..FilterCfg::default() }),
    "window_ms must be >= 1"
)]
#[case::zero_period(
    Monitor::builder().with_filter(FilterCfg { sample_period_ms: 0, ..FilterCfg::default() }),
    "sample_period_ms must be >= 1"
)]
#[case::negative_threshold(
    Monitor::builder().with_occupancy(OccupancyCfg {
        weight_min_g: -1.0,
        ..OccupancyCfg::default()
    }),
    "weight_min_g must be finite and > 0"
)]
#[case::zero_factor(
    Monitor::builder().with_load_cell(LoadCellCfg { scale_factor: 0.0, ..LoadCellCfg::default() }),
    "scale_factor must be finite and non-zero"
)]
#[case::zero_sensor_timeout(
    Monitor::builder().with_timeouts(Timeouts { sensor_ms: 0, ..Timeouts::default() }),
    "sensor_ms must be >= 1"
)]
fn invalid_sections_are_rejected(
    #[case] builder: whiskers_core::MonitorBuilder<whiskers_core::builder::Missing>,
    #[case] expected: &'static str,
) {
    let err = builder
        .with_scale(ScriptedScale::holding(0))
        .build()
        .expect_err("invalid config must not build");
    assert_eq!(
        err.downcast_ref::<BuildError>(),
        Some(&BuildError::InvalidConfig(expected))
    );
}

#[test]
fn file_config_defaults_build() {
    let cfg = whiskers_config::Config::default();
    cfg.validate().expect("defaults validate");
    Monitor::builder()
        .with_config(&cfg)
        .with_scale(ScriptedScale::holding(0))
        .build()
        .expect("defaults build");
}
