#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validate arbitrary TOML; errors are fine, panics are not.
    if let Ok(cfg) = whiskers_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // Anything that validates must survive a save/load cycle.
            if let Ok(text) = cfg.to_toml_string() {
                let _ = whiskers_config::load_toml(&text);
            }
        }
    }
});
