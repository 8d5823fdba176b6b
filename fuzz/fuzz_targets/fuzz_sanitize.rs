#![no_main]

use authn_errors::convenience::{sanitize, MAX_SANITIZED_LEN, SANITIZE_TRUNCATION_INDICATOR};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let out = sanitize(&input);
    assert!(out.len() <= MAX_SANITIZED_LEN + SANITIZE_TRUNCATION_INDICATOR.len());
    assert!(!out.chars().any(char::is_control));
});
