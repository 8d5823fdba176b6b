#![no_main]

use authn_errors::{authn_registry, validate_code};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(code) = std::str::from_utf8(data) {
        let valid = validate_code(code).is_ok();
        if let Ok(registry) = authn_registry() {
            // Only well-formed codes can ever be registered.
            if registry.contains(code) {
                assert!(valid);
            }
        }
    }
});
