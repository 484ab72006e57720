#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Arbitrary CSV bytes must be rejected gracefully by the history reader.
    let path = std::env::temp_dir().join(format!("whiskers-fuzz-{}.csv", std::process::id()));
    let Ok(mut f) = std::fs::File::create(&path) else {
        return;
    };
    if f.write_all(data).is_err() {
        return;
    }
    drop(f);
    let _ = whiskers_config::load_history(&path);
});
