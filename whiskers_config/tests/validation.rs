use rstest::rstest;
use whiskers_config::{ConfigOrigin, load_or_default, load_toml};

const VALID: &str = r#"
[scale]
weight_min_g = 2000.0
presence_time_min_ms = 5000
tare_threshold_g = 50.0
tare_time_ms = 60000
scale_factor = 21.4
settle_ms = 0

[filter]
alpha = 0.25
window_ms = 1500
sample_period_ms = 100

[calibration]
default_target_g = 500

[timeouts]
sensor_ms = 1000
"#;

#[test]
fn accepts_complete_config() {
    let cfg = load_toml(VALID).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.scale.scale_factor, 21.4);
    assert_eq!(cfg.filter.window_ms, 1500);
}

#[rstest]
#[case("[filter]\nalpha = 0.0\n", "filter.alpha must be in (0.0, 1.0]")]
#[case("[filter]\nalpha = 1.5\n", "filter.alpha must be in (0.0, 1.0]")]
#[case("[filter]\nwindow_ms = 50\nsample_period_ms = 100\n", "filter.window_ms must span")]
#[case("[scale]\nweight_min_g = 0.0\n", "scale.weight_min_g must be > 0")]
#[case("[scale]\ntare_threshold_g = 2500.0\n", "tare_threshold_g must be below")]
#[case("[scale]\nscale_factor = 0.0\n", "scale.scale_factor must be finite and non-zero")]
#[case("[scale]\ntare_time_ms = 0\n", "scale.tare_time_ms must be >= 1")]
#[case("[calibration]\ndefault_target_g = -5\n", "calibration.default_target_g must be > 0")]
#[case("[calibration]\nsamples = 0\n", "calibration.samples must be >= 1")]
#[case("[timeouts]\nsensor_ms = 0\n", "timeouts.sensor_ms must be >= 1")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "expected '{needle}' in '{msg}'");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (cfg, origin, why) = load_or_default(&dir.path().join("absent.toml"));
    assert_eq!(origin, ConfigOrigin::Missing);
    assert!(why.is_none());
    assert_eq!(cfg.scale.weight_min_g, 2000.0);
}

#[test]
fn corrupt_file_falls_back_to_defaults_with_reason() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[scale\nweight_min_g = ").unwrap();
    let (cfg, origin, why) = load_or_default(&path);
    assert_eq!(origin, ConfigOrigin::Fallback);
    assert!(why.unwrap().contains("parse"));
    assert_eq!(cfg.calibration.default_target_g, 500);
}

#[test]
fn saved_scale_factor_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whiskers.toml");
    let mut cfg = load_toml(VALID).unwrap();
    cfg.scale.scale_factor = 2.0;
    cfg.save_atomic(&path).expect("save");
    let (reloaded, origin, _) = load_or_default(&path);
    assert_eq!(origin, ConfigOrigin::File);
    assert_eq!(reloaded.scale.scale_factor, 2.0);
    assert_eq!(reloaded, cfg);
}
