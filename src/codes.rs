//! Error identity: validated codes and the descriptors built on them.
//!
//! A caller that receives `auth.client.notConfigured` can match on it
//! programmatically and correlate it across services. Everything else about
//! the failure (classification, severity, public text) hangs off the
//! [`Descriptor`] that owns the code.
//!
//! # Code Format
//!
//! Codes are dot-separated identifiers with at least two segments:
//!
//! - `session.token.rotate`
//! - `auth.client.notConfigured`
//! - `auth.identity.invalid-namespace-id`
//!
//! Each segment starts with an ASCII letter and continues with ASCII
//! alphanumerics, `-` or `_`. The first segment is the namespace.
//!
//! # Governance
//!
//! Descriptors are declared as `static` items and validated in const
//! context, so an invalid code is a build failure rather than a runtime
//! surprise. Neither [`ErrorCode`] nor [`Descriptor`] is `Clone` or `Copy`:
//! each failure condition has exactly one descriptor and everything else
//! refers to it.
//!
//! # Example
//!
//! ```rust
//! use authn_errors::{Classification, Descriptor, LogLevel};
//!
//! static ERR_SESSION_REVOKED: Descriptor =
//!     Descriptor::unauthorized("session.token.revoked").with_log_level(LogLevel::Debug);
//!
//! assert_eq!(ERR_SESSION_REVOKED.classification(), Classification::Unauthorized);
//! assert_eq!(ERR_SESSION_REVOKED.code().namespace(), "session");
//! ```

use crate::{AuthError, Classification, ErrorSource, LogLevel};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Maximum length of a code in bytes.
pub const MAX_CODE_LEN: usize = 128;

// ============================================================================
// Code Violations (Internal + Public)
// ============================================================================

/// Reason a candidate code was rejected.
///
/// Positions are byte offsets into the rejected code. The code itself is not
/// stored, so the violation can be logged without echoing caller input.
///
/// For external contexts use [`InternalCodeViolation::to_public`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalCodeViolation {
    /// Code is the empty string.
    Empty,
    /// Code exceeds [`MAX_CODE_LEN`].
    TooLong {
        /// Length of the rejected code.
        len: usize,
    },
    /// Code has a single segment and therefore no namespace.
    MissingNamespace,
    /// Leading, trailing or doubled dot.
    EmptySegment {
        /// Offset where the empty segment begins.
        position: usize,
    },
    /// Segment starts with something other than an ASCII letter.
    InvalidSegmentStart {
        /// Offset of the offending byte.
        position: usize,
    },
    /// Byte outside `[A-Za-z0-9_-]` inside a segment.
    InvalidCharacter {
        /// Offset of the offending byte.
        position: usize,
    },
}

impl InternalCodeViolation {
    /// Generic message safe for untrusted boundaries.
    pub fn to_public(&self) -> &'static str {
        match self {
            Self::Empty | Self::TooLong { .. } => "Invalid error code length",
            Self::MissingNamespace | Self::EmptySegment { .. } => "Invalid error code structure",
            Self::InvalidSegmentStart { .. } | Self::InvalidCharacter { .. } => {
                "Invalid error code format"
            }
        }
    }
}

impl fmt::Display for InternalCodeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Error code is empty"),
            Self::TooLong { len } => {
                write!(f, "Error code is {} bytes long (max {})", len, MAX_CODE_LEN)
            }
            Self::MissingNamespace => f.write_str("Error code has no namespace segment"),
            Self::EmptySegment { position } => {
                write!(f, "Error code has an empty segment at byte {}", position)
            }
            Self::InvalidSegmentStart { position } => write!(
                f,
                "Error code segment at byte {} does not start with a letter",
                position
            ),
            Self::InvalidCharacter { position } => {
                write!(f, "Error code has an invalid character at byte {}", position)
            }
        }
    }
}

impl Error for InternalCodeViolation {}

/// Check a candidate code against the format rules.
///
/// Const so that descriptor statics are validated at compile time.
pub const fn validate_code(code: &str) -> Result<(), InternalCodeViolation> {
    let bytes = code.as_bytes();
    let len = bytes.len();

    if len == 0 {
        return Err(InternalCodeViolation::Empty);
    }
    if len > MAX_CODE_LEN {
        return Err(InternalCodeViolation::TooLong { len });
    }

    let mut segments = 1;
    let mut at_segment_start = true;
    let mut i = 0;
    while i < len {
        let b = bytes[i];
        if b == b'.' {
            if at_segment_start {
                return Err(InternalCodeViolation::EmptySegment { position: i });
            }
            segments += 1;
            at_segment_start = true;
        } else if at_segment_start {
            if !b.is_ascii_alphabetic() {
                return Err(InternalCodeViolation::InvalidSegmentStart { position: i });
            }
            at_segment_start = false;
        } else if !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
            return Err(InternalCodeViolation::InvalidCharacter { position: i });
        }
        i += 1;
    }

    if at_segment_start {
        return Err(InternalCodeViolation::EmptySegment { position: len });
    }
    if segments < 2 {
        return Err(InternalCodeViolation::MissingNamespace);
    }
    Ok(())
}

// ============================================================================
// Error Code
// ============================================================================

/// Stable, dotted, machine-readable error identifier.
///
/// # Construction APIs
///
/// - `const_new`: for statics (invalid input is a compile error)
/// - `checked_new`: for runtime input (returns `Result`, never panics)
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    /// Create a code with compile-time validation.
    ///
    /// # Panics
    ///
    /// Panics if the code violates the format rules. In const contexts this
    /// is a compile error.
    #[inline]
    pub const fn const_new(code: &'static str) -> Self {
        assert!(validate_code(code).is_ok(), "Invalid error code");
        Self(code)
    }

    /// Create a code with runtime validation.
    ///
    /// # Errors
    ///
    /// Returns the internal violation; call `.to_public()` on it before
    /// showing it to anyone outside the process.
    #[inline]
    pub fn checked_new(code: &'static str) -> Result<Self, InternalCodeViolation> {
        validate_code(code)?;
        Ok(Self(code))
    }

    /// The code as written.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// First segment, e.g. `auth` for `auth.client.unsupported`.
    #[inline]
    pub fn namespace(&self) -> &'static str {
        self.0.split_once('.').map_or(self.0, |(namespace, _)| namespace)
    }

    /// All segments in order.
    #[inline]
    pub fn segments(&self) -> impl Iterator<Item = &'static str> {
        self.0.split('.')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// Immutable description of one named error condition.
///
/// Descriptors are defined once as `static` items and referenced by name
/// wherever their condition is detected. Raising one produces an
/// [`AuthError`] that points back at the descriptor.
///
/// Equality and hashing use the code only: two descriptors are the same
/// condition exactly when their codes match.
///
/// # Example
///
/// ```rust
/// use authn_errors::{definitions, Classification};
///
/// let err = definitions::EXPIRED_ACCESS_TOKEN.error("token for user 42 expired at 12:00");
/// assert!(err.is(&definitions::EXPIRED_ACCESS_TOKEN));
/// assert_eq!(err.classification(), Classification::Unauthorized);
/// assert_eq!(err.public().message, "OAuth access token expired");
/// ```
#[derive(Debug)]
pub struct Descriptor {
    code: ErrorCode,
    classification: Classification,
    log_level: Option<LogLevel>,
    public_message: Option<&'static str>,
    source: ErrorSource,
}

impl Descriptor {
    /// Create a descriptor with the given classification and no overrides.
    ///
    /// # Panics
    ///
    /// Panics (compile error in const context) if `code` is invalid.
    #[inline]
    pub const fn new(classification: Classification, code: &'static str) -> Self {
        Self {
            code: ErrorCode::const_new(code),
            classification,
            log_level: None,
            public_message: None,
            source: ErrorSource::Server,
        }
    }

    /// Override the severity used when errors of this kind are logged.
    #[inline]
    pub const fn with_log_level(self, level: LogLevel) -> Self {
        Self {
            log_level: Some(level),
            ..self
        }
    }

    /// Attach text that may be shown to external callers.
    ///
    /// # Panics
    ///
    /// Panics (compile error in const context) if `message` is empty.
    #[inline]
    pub const fn with_public_message(self, message: &'static str) -> Self {
        assert!(!message.is_empty(), "Public message must not be empty");
        Self {
            public_message: Some(message),
            ..self
        }
    }

    /// Attribute the failure to a downstream dependency.
    #[inline]
    pub const fn with_downstream(self) -> Self {
        Self {
            source: ErrorSource::Downstream,
            ..self
        }
    }

    /// Unauthorized (401) descriptor.
    #[inline]
    pub const fn unauthorized(code: &'static str) -> Self {
        Self::new(Classification::Unauthorized, code)
    }

    /// Forbidden (403) descriptor.
    #[inline]
    pub const fn forbidden(code: &'static str) -> Self {
        Self::new(Classification::Forbidden, code)
    }

    /// Not found (404) descriptor.
    #[inline]
    pub const fn not_found(code: &'static str) -> Self {
        Self::new(Classification::NotFound, code)
    }

    /// Unprocessable entity (422) descriptor.
    #[inline]
    pub const fn unprocessable_entity(code: &'static str) -> Self {
        Self::new(Classification::UnprocessableEntity, code)
    }

    /// Conflict (409) descriptor.
    #[inline]
    pub const fn conflict(code: &'static str) -> Self {
        Self::new(Classification::Conflict, code)
    }

    /// Too many requests (429) descriptor.
    #[inline]
    pub const fn too_many_requests(code: &'static str) -> Self {
        Self::new(Classification::TooManyRequests, code)
    }

    /// Bad request (400) descriptor.
    #[inline]
    pub const fn bad_request(code: &'static str) -> Self {
        Self::new(Classification::BadRequest, code)
    }

    /// Client closed request (499) descriptor.
    #[inline]
    pub const fn client_closed_request(code: &'static str) -> Self {
        Self::new(Classification::ClientClosedRequest, code)
    }

    /// Validation failed (400) descriptor.
    #[inline]
    pub const fn validation_failed(code: &'static str) -> Self {
        Self::new(Classification::ValidationFailed, code)
    }

    /// Internal (500) descriptor.
    #[inline]
    pub const fn internal(code: &'static str) -> Self {
        Self::new(Classification::Internal, code)
    }

    /// Timeout (504) descriptor.
    #[inline]
    pub const fn timeout(code: &'static str) -> Self {
        Self::new(Classification::Timeout, code)
    }

    /// Not implemented (501) descriptor.
    #[inline]
    pub const fn not_implemented(code: &'static str) -> Self {
        Self::new(Classification::NotImplemented, code)
    }

    /// Bad gateway (502) descriptor.
    #[inline]
    pub const fn bad_gateway(code: &'static str) -> Self {
        Self::new(Classification::BadGateway, code)
    }

    /// Gateway timeout (504) descriptor.
    #[inline]
    pub const fn gateway_timeout(code: &'static str) -> Self {
        Self::new(Classification::GatewayTimeout, code)
    }

    /// Unknown (500) descriptor.
    #[inline]
    pub const fn unknown(code: &'static str) -> Self {
        Self::new(Classification::Unknown, code)
    }

    /// Stable code.
    #[inline]
    pub const fn code(&self) -> &ErrorCode {
        &self.code
    }

    /// Classification deciding status and default severity.
    #[inline]
    pub const fn classification(&self) -> Classification {
        self.classification
    }

    /// Explicit severity override, if any.
    #[inline]
    pub const fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Override if present, otherwise the classification default.
    #[inline]
    pub const fn effective_log_level(&self) -> LogLevel {
        match self.log_level {
            Some(level) => level,
            None => self.classification.default_log_level(),
        }
    }

    /// Text safe for external callers, if the descriptor defines one.
    #[inline]
    pub const fn public_message(&self) -> Option<&'static str> {
        self.public_message
    }

    /// Server or downstream attribution.
    #[inline]
    pub const fn source(&self) -> ErrorSource {
        self.source
    }

    /// HTTP status of the classification.
    #[inline]
    pub const fn status_code(&self) -> u16 {
        self.classification.status_code()
    }

    /// Whether callers may retry the same request.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        self.classification.is_retryable()
    }

    /// Raise this condition with an internal log message.
    ///
    /// The message is for logs only and never reaches external callers.
    #[inline]
    pub fn error(&'static self, log_message: impl Into<Cow<'static, str>>) -> AuthError {
        AuthError::new(self, log_message)
    }

    /// Raise this condition, wrapping the error that caused it.
    #[inline]
    pub fn error_with_source(
        &'static self,
        log_message: impl Into<Cow<'static, str>>,
        source: impl Error + Send + Sync + 'static,
    ) -> AuthError {
        AuthError::new(self, log_message).with_source(source)
    }

    /// Whether `err` was raised from this descriptor.
    #[inline]
    pub fn matches(&self, err: &AuthError) -> bool {
        err.is(self)
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Descriptor {}

impl Hash for Descriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.code, self.classification)
    }
}

// ============================================================================
// Tests
// ============================================================================
