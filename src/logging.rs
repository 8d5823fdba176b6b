//! Structured internal log entry for a raised [`AuthError`](crate::AuthError).
//!
//! # Properties
//!
//! - Borrows from the error with an explicit lifetime and cannot outlive it
//! - Every rendered field is bounded (DoS via huge messages or sources)
//! - The level comes from the descriptor, never from the call site
//!
//! `InternalLog` is meant to be consumed immediately: either handed to
//! [`InternalLog::emit`], which produces one `tracing` event, or written into
//! a caller-owned buffer with [`InternalLog::write_to`].

use crate::{Classification, Descriptor, ErrorSource, LogLevel};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use zeroize::Zeroize;

/// Maximum length for any individual field in formatted output.
pub const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Appended to fields cut at [`MAX_FIELD_OUTPUT_LEN`].
pub const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// `tracing` target used for every emitted event.
pub const LOG_TARGET: &str = "authn_errors";

/// Metadata value attached to an error (user id, client name, request id).
///
/// Owned values are zeroized on drop; borrowed values are static and left
/// alone.
#[derive(Debug)]
pub struct ContextField {
    value: Cow<'static, str>,
}

impl ContextField {
    /// Borrow the value.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.value.as_ref()
    }
}

impl From<&'static str> for ContextField {
    fn from(value: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
        }
    }
}

impl From<String> for ContextField {
    fn from(value: String) -> Self {
        Self {
            value: Cow::Owned(value),
        }
    }
}

impl From<Cow<'static, str>> for ContextField {
    fn from(value: Cow<'static, str>) -> Self {
        Self { value }
    }
}

impl Zeroize for ContextField {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.value {
            s.zeroize();
        }
    }
}

impl Drop for ContextField {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Structured view of an error, borrowed from it.
///
/// # Example
///
/// ```rust
/// # use authn_errors::definitions;
/// let err = definitions::UNSUPPORTED_CLIENT.error("client 'ldap-v0' is unknown");
/// let log = err.internal_log();
/// assert_eq!(log.log_message(), "client 'ldap-v0' is unknown");
/// log.emit();
/// ```
#[derive(Debug)]
pub struct InternalLog<'a> {
    pub(crate) descriptor: &'static Descriptor,
    pub(crate) log_message: &'a str,
    pub(crate) source: Option<&'a (dyn Error + Send + Sync + 'static)>,
    pub(crate) metadata: &'a [(&'static str, ContextField)],
}

impl<'a> InternalLog<'a> {
    /// Descriptor the error was raised from.
    #[inline]
    pub const fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// Stable code.
    #[inline]
    pub const fn code(&self) -> &'static str {
        self.descriptor.code().as_str()
    }

    /// Classification of the descriptor.
    #[inline]
    pub const fn classification(&self) -> Classification {
        self.descriptor.classification()
    }

    /// Level this entry is emitted at.
    #[inline]
    pub const fn level(&self) -> LogLevel {
        self.descriptor.effective_log_level()
    }

    /// Server or downstream attribution.
    #[inline]
    pub const fn error_source(&self) -> ErrorSource {
        self.descriptor.source()
    }

    /// Internal message supplied when the error was raised.
    #[inline]
    pub const fn log_message(&self) -> &'a str {
        self.log_message
    }

    /// Wrapped cause, if any.
    #[inline]
    pub fn source(&self) -> Option<&'a (dyn Error + Send + Sync + 'static)> {
        self.source
    }

    /// Tracking metadata, in insertion order.
    #[inline]
    pub const fn metadata(&self) -> &'a [(&'static str, ContextField)] {
        self.metadata
    }

    /// Write a single-line rendering without touching the heap unless a
    /// field needs truncation or a source is present.
    ///
    /// Format: `[code] classification status=N msg='...' source='...' key='value'`
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] {} status={} msg='{}'",
            self.code(),
            self.classification(),
            self.descriptor.status_code(),
            truncate_with_indicator(self.log_message)
        )?;

        if let Some(source) = self.source {
            let rendered = source.to_string();
            write!(f, " source='{}'", truncate_with_indicator(&rendered))?;
        }

        for (key, value) in self.metadata {
            write!(f, " {}='{}'", key, truncate_with_indicator(value.as_str()))?;
        }

        Ok(())
    }

    /// Emit one `tracing` event at the descriptor's effective level.
    pub fn emit(&self) {
        let mut line = String::new();
        if self.write_to(&mut line).is_err() {
            return;
        }

        let code = self.code();
        let classification = self.classification().as_str();
        let status = self.descriptor.status_code();
        let downstream = self.error_source().is_downstream();
        let retryable = self.descriptor.is_retryable();

        macro_rules! event_at {
            ($level:expr) => {
                tracing::event!(
                    target: LOG_TARGET,
                    $level,
                    error.code = code,
                    error.classification = classification,
                    error.status = status,
                    error.downstream = downstream,
                    error.retryable = retryable,
                    "{}",
                    line
                )
            };
        }

        match self.level() {
            LogLevel::Debug => event_at!(tracing::Level::DEBUG),
            LogLevel::Info => event_at!(tracing::Level::INFO),
            LogLevel::Warn => event_at!(tracing::Level::WARN),
            LogLevel::Error => event_at!(tracing::Level::ERROR),
        }

        line.zeroize();
    }

    /// Human-readable rendering for trusted debug sessions.
    ///
    /// Only available with BOTH the `trusted_debug` feature and debug
    /// assertions, so it cannot end up in a release build by accident. Unlike
    /// [`write_to`](Self::write_to), nothing is truncated.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = format!(
            "[{}] {} ({}) level={} msg='{}'",
            self.code(),
            self.classification(),
            self.error_source().as_str(),
            self.level(),
            self.log_message
        );
        let mut cause = self.source.map(|s| s as &(dyn Error + 'static));
        while let Some(err) = cause {
            output.push_str(&format!(" caused_by='{}'", err));
            cause = err.source();
        }
        for (key, value) in self.metadata {
            output.push_str(&format!(" {}='{}'", key, value.as_str()));
        }
        output
    }
}

/// Truncate a field to [`MAX_FIELD_OUTPUT_LEN`] on a UTF-8 boundary.
///
/// Borrowed when no truncation is needed.
pub(crate) fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let mut idx = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture<F: FnOnce()>(f: F) -> String {
        let sink = Captured::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        sink.contents()
    }

    #[test]
    fn write_to_renders_all_fields() {
        let err = definitions::CLIENT_NOT_CONFIGURED
            .error("client 'auth.client.saml' disabled")
            .with_metadata("request_id", "req-1");
        let mut out = String::new();
        err.internal_log().write_to(&mut out).unwrap();
        assert_eq!(
            out,
            "[auth.client.notConfigured] bad_request status=400 \
             msg='client 'auth.client.saml' disabled' request_id='req-1'"
        );
    }

    #[test]
    fn write_to_includes_source() {
        let err = definitions::UNSUPPORTED_IDENTITY.error_with_source(
            "identity lookup failed",
            io::Error::other("backend said no"),
        );
        let mut out = String::new();
        err.internal_log().write_to(&mut out).unwrap();
        assert!(out.contains("source='backend said no'"));
    }

    #[test]
    fn emit_uses_descriptor_log_level() {
        let output = capture(|| {
            definitions::TOKEN_NEEDS_ROTATION
                .error("token 7 crossed rotation threshold")
                .log();
        });
        assert!(output.contains("DEBUG"));
        assert!(output.contains("session.token.rotate"));
        assert!(output.contains("token 7 crossed rotation threshold"));
    }

    #[test]
    fn emit_falls_back_to_classification_level() {
        let bad_request = capture(|| definitions::UNSUPPORTED_CLIENT.error("unknown client").log());
        assert!(bad_request.contains("INFO"));

        let not_implemented =
            capture(|| definitions::UNSUPPORTED_IDENTITY.error("identity kind 'svc'").log());
        assert!(not_implemented.contains("ERROR"));
    }

    #[test]
    fn emit_records_structured_fields() {
        let output = capture(|| definitions::EXPIRED_ACCESS_TOKEN.error("expired").log());
        assert!(output.contains("error.code=\"oauth.expired-token\""));
        assert!(output.contains("error.status=401"));
        assert!(output.contains("error.downstream=false"));
    }

    #[test]
    fn truncate_ascii() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN + 10);
        let truncated = truncate_with_indicator(&s);
        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn no_truncate_when_under_limit() {
        let truncated = truncate_with_indicator("short string");
        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert_eq!(truncated, "short string");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        let s = "й".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);
        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));

        let s = "🔥".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);
        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn exactly_at_limit_is_kept() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);
        assert!(matches!(truncated, Cow::Borrowed(_)));

        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN + 1);
        assert!(matches!(truncate_with_indicator(&s), Cow::Owned(_)));
    }

    #[test]
    fn context_field_zeroizes_owned_only() {
        let mut owned = ContextField::from(String::from("user-42"));
        owned.zeroize();
        assert_eq!(owned.as_str(), "");

        let mut borrowed = ContextField::from("static");
        borrowed.zeroize();
        assert_eq!(borrowed.as_str(), "static");
    }
}
