//! Macros for declaring descriptors and raising errors with formatted
//! internal messages.
//!
//! # Rules
//!
//! 1. **Format strings MUST be string literals** - prevents format injection
//! 2. **Format arguments MUST be wrapped in `sanitized!()`** - client names,
//!    token fragments and identifiers come from the request and are bounded
//!    and stripped of control characters before reaching the log
//!
//! ```rust
//! # use authn_errors::{auth_err, definitions, sanitized};
//! let client = "generic_oauth";
//! let err = auth_err!(
//!     &definitions::CLIENT_NOT_CONFIGURED,
//!     "client {} is not enabled",
//!     sanitized!(client)
//! );
//! assert!(err.is(&definitions::CLIENT_NOT_CONFIGURED));
//! ```
//!
//! ```rust,compile_fail
//! # use authn_errors::{auth_err, definitions};
//! let client = "raw";
//! // Args must be wrapped in sanitized!()
//! let err = auth_err!(&definitions::CLIENT_NOT_CONFIGURED, "client {}", client);
//! ```

use std::fmt;

/// Maximum length in bytes of a sanitized value.
pub const MAX_SANITIZED_LEN: usize = 256;

/// Appended when a sanitized value was cut.
pub const SANITIZE_TRUNCATION_INDICATOR: &str = "[TRUNCATED]";

/// Substituted for values with nothing printable in them.
pub const SANITIZE_EMPTY_PLACEHOLDER: &str = "[EMPTY]";

/// Bound and neutralize an untrusted value for inclusion in a log message.
///
/// - ANSI escape sequences (`ESC [ ... letter`) are dropped
/// - Other control characters become `?`
/// - Output is cut at [`MAX_SANITIZED_LEN`] bytes on a character boundary,
///   followed by [`SANITIZE_TRUNCATION_INDICATOR`]
/// - Values with no printable characters become [`SANITIZE_EMPTY_PLACEHOLDER`]
pub fn sanitize(value: &dyn fmt::Display) -> String {
    let original = value.to_string();
    let mut out = String::with_capacity(original.len().min(MAX_SANITIZED_LEN));
    let mut printable = false;
    let mut chars = original.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            continue;
        }

        let replacement = if c.is_control() { '?' } else { c };
        if out.len() + replacement.len_utf8() > MAX_SANITIZED_LEN {
            out.push_str(SANITIZE_TRUNCATION_INDICATOR);
            return out;
        }
        printable |= !c.is_control();
        out.push(replacement);
    }

    if !printable {
        return String::from(SANITIZE_EMPTY_PLACEHOLDER);
    }
    out
}

/// Sanitize an untrusted value; see [`sanitize`](crate::convenience::sanitize).
///
/// ```rust
/// # use authn_errors::sanitized;
/// let long = "A".repeat(300);
/// let san = sanitized!(long);
/// assert!(san.len() <= 256 + "[TRUNCATED]".len());
/// assert!(san.ends_with("[TRUNCATED]"));
/// ```
#[macro_export]
macro_rules! sanitized {
    ($expr:expr) => {
        $crate::convenience::sanitize(&$expr)
    };
}

/// Raise a descriptor with a literal or formatted internal message.
///
/// # Arguments
/// - `$descriptor`: `&'static Descriptor`
/// - `$msg` / `$fmt`: string literal
/// - `$arg`: values wrapped in `sanitized!()`
#[macro_export]
macro_rules! auth_err {
    ($descriptor:expr, $msg:literal) => {
        $crate::AuthError::new($descriptor, $msg)
    };
    ($descriptor:expr, $fmt:literal $(, sanitized!($arg:expr))+ $(,)?) => {
        $crate::AuthError::new($descriptor, format!($fmt $(, $crate::sanitized!($arg))+))
    };
}

/// Declare a batch of descriptor statics sharing one classification.
///
/// Builder options follow the code as method calls.
///
/// ```rust
/// use authn_errors::{define_descriptors, Classification, LogLevel};
///
/// define_descriptors! {
///     Classification::Forbidden => {
///         /// Caller may not impersonate other users.
///         IMPERSONATION_DENIED = "auth.impersonation.denied",
///         ORG_SWITCH_DENIED = "auth.org.switch-denied".with_log_level(LogLevel::Warn),
///     }
/// }
///
/// assert_eq!(IMPERSONATION_DENIED.status_code(), 403);
/// assert_eq!(ORG_SWITCH_DENIED.log_level(), Some(LogLevel::Warn));
/// ```
#[macro_export]
macro_rules! define_descriptors {
    ($classification:expr => {
        $( $(#[$meta:meta])* $name:ident = $code:literal $(. $option:ident ( $($arg:expr),* ))* ),* $(,)?
    }) => {
        $(
            $(#[$meta])*
            pub static $name: $crate::Descriptor =
                $crate::Descriptor::new($classification, $code) $(. $option ( $($arg),* ))*;
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{definitions, Classification, LogLevel};

    #[test]
    fn sanitize_passes_short_values() {
        assert_eq!(sanitize(&"generic_oauth"), "generic_oauth");
        assert_eq!(sanitize(&42), "42");
    }

    #[test]
    fn sanitize_replaces_control_characters() {
        assert_eq!(sanitize(&"line\nbreak\tx"), "line?break?x");
    }

    #[test]
    fn sanitize_strips_ansi_sequences() {
        assert_eq!(sanitize(&"\u{1b}[31mred\u{1b}[0m"), "red");
    }

    #[test]
    fn sanitize_truncates_on_char_boundary() {
        let value = "é".repeat(MAX_SANITIZED_LEN);
        let out = sanitize(&value);
        assert!(out.ends_with(SANITIZE_TRUNCATION_INDICATOR));
        assert!(out.len() <= MAX_SANITIZED_LEN + SANITIZE_TRUNCATION_INDICATOR.len());
    }

    #[test]
    fn sanitize_exact_limit_is_not_truncated() {
        let value = "a".repeat(MAX_SANITIZED_LEN);
        assert_eq!(sanitize(&value), value);
    }

    #[test]
    fn sanitize_empty_or_control_only() {
        assert_eq!(sanitize(&""), SANITIZE_EMPTY_PLACEHOLDER);
        assert_eq!(sanitize(&"\u{7}\u{7}"), SANITIZE_EMPTY_PLACEHOLDER);
    }

    #[test]
    fn auth_err_literal() {
        let err = auth_err!(&definitions::UNSUPPORTED_CLIENT, "unknown client");
        assert_eq!(err.internal_log().log_message(), "unknown client");
    }

    #[test]
    fn auth_err_formats_sanitized_args() {
        let client = "evil\u{1b}[2Jclient";
        let err = auth_err!(
            &definitions::UNSUPPORTED_CLIENT,
            "client {} via {}",
            sanitized!(client),
            sanitized!("header"),
        );
        assert_eq!(err.internal_log().log_message(), "client evilclient via header");
    }

    define_descriptors! {
        Classification::TooManyRequests => {
            /// Login attempts exceeded.
            TEST_LOGIN_THROTTLED = "test.login.throttled",
            TEST_LOGIN_LOCKED = "test.login.locked"
                .with_log_level(LogLevel::Warn)
                .with_public_message("Too many login attempts"),
            TEST_IDP_THROTTLED = "test.idp.throttled".with_downstream(),
        }
    }

    #[test]
    fn define_descriptors_applies_options() {
        assert_eq!(TEST_LOGIN_THROTTLED.classification(), Classification::TooManyRequests);
        assert_eq!(TEST_LOGIN_THROTTLED.log_level(), None);

        assert_eq!(TEST_LOGIN_LOCKED.log_level(), Some(LogLevel::Warn));
        assert_eq!(TEST_LOGIN_LOCKED.public_message(), Some("Too many login attempts"));

        assert!(TEST_IDP_THROTTLED.source().is_downstream());
        assert_eq!(TEST_IDP_THROTTLED.status_code(), 429);
    }
}
