#![no_main]

use authn_errors::{definitions, AuthError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let descriptor = definitions::ALL[selector as usize % definitions::ALL.len()];
    let message = String::from_utf8_lossy(rest).into_owned();

    let err = AuthError::new(descriptor, message.clone()).with_metadata("raw", message.clone());

    let mut line = String::new();
    err.internal_log().write_to(&mut line).unwrap();

    // External rendering depends on the descriptor alone.
    assert_eq!(err.to_string(), AuthError::from(descriptor).to_string());
});
