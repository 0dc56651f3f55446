#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any input must come back as a value or an error, never a panic.
    let input = String::from_utf8_lossy(data);
    let _ = texmath::parse(&input);
});
