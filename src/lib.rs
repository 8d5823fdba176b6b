//! # Authn Errors
//!
//! The error catalog of the authentication subsystem, plus the machinery to
//! raise, log and render its entries safely.
//!
//! ## Design Philosophy
//!
//! 1. **Every failure condition has one descriptor**, declared once as a static
//! 2. **Codes are stable** and validated at compile time
//! 3. **Classification decides the response**, not the call site
//! 4. **Internal messages never reach callers**; only a descriptor's public
//!    message or a generic classification message does
//! 5. **Log severity is part of the descriptor**, so noisy-but-expected
//!    conditions (token rotation) stay at debug level everywhere
//!
//! ## Quick Start
//!
//! ```rust
//! use authn_errors::{definitions, Result};
//! use std::time::{Duration, SystemTime};
//!
//! fn check_expiry(expires_at: SystemTime) -> Result<()> {
//!     if expires_at <= SystemTime::now() {
//!         return Err(definitions::EXPIRED_ACCESS_TOKEN.error("access token past expiry"));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_expiry(SystemTime::now() - Duration::from_secs(5)).unwrap_err();
//!
//! // External display (safe for untrusted callers):
//! assert_eq!(err.to_string(), "OAuth access token expired (oauth.expired-token)");
//! assert_eq!(err.public().status_code, 401);
//!
//! // Internal log (full context, emitted through `tracing`):
//! err.log();
//! ```
//!
//! ## Matching
//!
//! ```rust
//! use authn_errors::definitions;
//!
//! let err = definitions::TOKEN_NEEDS_ROTATION.error("session 9f2c crossed rotation threshold");
//! if err.is(&definitions::TOKEN_NEEDS_ROTATION) {
//!     // rotate and retry
//! }
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: untruncated debug rendering (debug builds only)
//! - `tokio` / `async_std`: non-blocking timing normalization

#![warn(missing_docs)]
#![warn(clippy::all)]

use smallvec::SmallVec;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::result;
use std::time::{Duration, Instant};
use zeroize::Zeroize;

pub mod codes;
pub mod convenience;
pub mod definitions;
pub mod logging;
pub mod models;
pub mod registry;

pub use codes::*;
pub use convenience::*;
pub use logging::*;
pub use models::*;
pub use registry::*;

/// Type alias for Results using our error type.
pub type Result<T> = result::Result<T, AuthError>;

// ============================================================================
// Internal Error Context
// ============================================================================

/// Internal-only data of a raised error. Zeroized on drop.
struct ErrorContext {
    log_message: Cow<'static, str>,
    metadata: SmallVec<[(&'static str, ContextField); 4]>,
}

impl ErrorContext {
    #[inline]
    fn new(log_message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            log_message: log_message.into(),
            metadata: SmallVec::new(),
        }
    }
}

impl Zeroize for ErrorContext {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.log_message {
            s.zeroize();
        }
        for (_, value) in &mut self.metadata {
            value.zeroize();
        }
        self.metadata.clear();
    }
}

impl Drop for ErrorContext {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Raised Error
// ============================================================================

/// An occurrence of a catalog condition.
///
/// Created from a [`Descriptor`] with [`Descriptor::error`] (or the
/// [`auth_err!`] macro) at the point where the condition is detected, then
/// propagated unchanged to the error-rendering layer.
///
/// # Key Properties
///
/// - Classification, severity and public text come from the descriptor
/// - `Display` shows only the public view
/// - Internal message and owned metadata are zeroized on drop
/// - Matching is by descriptor identity ([`AuthError::is`])
#[must_use = "errors should be handled or logged"]
pub struct AuthError {
    descriptor: &'static Descriptor,
    context: ErrorContext,
    source: Option<Box<dyn Error + Send + Sync>>,
    created_at: Instant,
}

impl AuthError {
    /// Raise `descriptor` with an internal log message.
    #[inline]
    pub fn new(descriptor: &'static Descriptor, log_message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            descriptor,
            context: ErrorContext::new(log_message),
            source: None,
            created_at: Instant::now(),
        }
    }

    /// Attach the underlying cause.
    #[inline]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add tracking metadata (request id, client name, user id).
    ///
    /// Metadata is internal only and never rendered publicly.
    #[inline]
    pub fn with_metadata(mut self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.context
            .metadata
            .push((key, ContextField::from(value.into())));
        self
    }

    /// The descriptor this error was raised from.
    #[inline]
    pub const fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// Stable code of the descriptor.
    #[inline]
    pub const fn code(&self) -> &'static ErrorCode {
        self.descriptor.code()
    }

    /// Classification of the descriptor.
    #[inline]
    pub const fn classification(&self) -> Classification {
        self.descriptor.classification()
    }

    /// HTTP status to answer with.
    #[inline]
    pub const fn status_code(&self) -> u16 {
        self.descriptor.status_code()
    }

    /// Severity this error is logged at.
    #[inline]
    pub const fn effective_log_level(&self) -> LogLevel {
        self.descriptor.effective_log_level()
    }

    /// Whether the caller may retry the same request.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        self.descriptor.is_retryable()
    }

    /// Whether this error was raised from `descriptor`.
    #[inline]
    pub fn is(&self, descriptor: &Descriptor) -> bool {
        self.descriptor == descriptor
    }

    /// The view that may be returned to an external caller.
    ///
    /// Uses the descriptor's public message when present, otherwise the
    /// generic message of its classification. The internal log message is
    /// never used.
    #[inline]
    pub fn public(&self) -> PublicError {
        let classification = self.descriptor.classification();
        PublicError {
            status_code: classification.status_code(),
            message_id: self.descriptor.code().as_str(),
            message: self
                .descriptor
                .public_message()
                .unwrap_or_else(|| classification.generic_message()),
        }
    }

    /// Time elapsed since this error was raised.
    ///
    /// For metrics only; never expose it externally.
    #[inline]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Structured internal view, borrowed from this error.
    ///
    /// The returned `InternalLog` cannot outlive the error, so internal text
    /// is consumed by the logger and not retained.
    #[inline]
    pub fn internal_log(&self) -> InternalLog<'_> {
        InternalLog {
            descriptor: self.descriptor,
            log_message: self.context.log_message.as_ref(),
            source: self.source.as_deref(),
            metadata: &self.context.metadata,
        }
    }

    /// Callback-style access to the internal view.
    ///
    /// ```rust
    /// # use authn_errors::definitions;
    /// let err = definitions::INVALID_NAMESPACE_ID.error("namespace 'user:' has no id");
    /// let level = err.with_internal_log(|log| log.level());
    /// # let _ = level;
    /// ```
    #[inline]
    pub fn with_internal_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&InternalLog<'_>) -> R,
    {
        let log = self.internal_log();
        f(&log)
    }

    /// Emit this error through `tracing` at its effective level.
    #[inline]
    pub fn log(&self) {
        self.internal_log().emit();
    }

    /// Normalize timing so that different authentication failure paths are
    /// indistinguishable by response time.
    ///
    /// Sleeps until `target_duration` has elapsed since the error was raised.
    ///
    /// ```rust
    /// use authn_errors::{definitions, Result};
    /// use std::time::Duration;
    ///
    /// fn resolve_client(name: &str) -> Result<()> {
    ///     if name != "oauth_generic" {
    ///         return Err(definitions::UNSUPPORTED_CLIENT
    ///             .error("unknown client")
    ///             .with_timing_normalization(Duration::from_millis(20)));
    ///     }
    ///     Ok(())
    /// }
    /// # assert!(resolve_client("saml").is_err());
    /// ```
    ///
    /// # Limitations
    ///
    /// - Blocks the thread; use the async variant inside a runtime.
    /// - OS scheduling adds jitter.
    /// - Only the error return is normalized, not upstream work.
    #[inline]
    pub fn with_timing_normalization(self, target_duration: Duration) -> Self {
        let elapsed = self.created_at.elapsed();
        if elapsed < target_duration {
            std::thread::sleep(target_duration - elapsed);
        }
        self
    }

    /// Async timing normalization that does not block the executor.
    ///
    /// Requires the `tokio` or `async_std` feature; tokio wins if both are on.
    #[cfg(any(feature = "tokio", feature = "async_std"))]
    #[inline]
    pub async fn with_timing_normalization_async(self, target_duration: Duration) -> Self {
        let target_time = self.created_at + target_duration;
        let now = Instant::now();

        if now < target_time {
            let sleep_duration = target_time - now;

            #[cfg(feature = "tokio")]
            tokio::time::sleep(sleep_duration).await;

            #[cfg(all(feature = "async_std", not(feature = "tokio")))]
            async_std::task::sleep(sleep_duration).await;
        }
        self
    }
}

impl From<&'static Descriptor> for AuthError {
    /// Raise a descriptor without an internal message.
    fn from(descriptor: &'static Descriptor) -> Self {
        Self::new(descriptor, "")
    }
}

impl fmt::Debug for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthError")
            .field("code", self.descriptor.code())
            .field("classification", &self.descriptor.classification())
            .field("log_level", &self.descriptor.effective_log_level())
            .field("context", &"<REDACTED>")
            .field("source", &self.source.as_ref().map(|_| "<PRESENT>"))
            .finish()
    }
}

impl fmt::Display for AuthError {
    /// External display: `"{public message} ({code})"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.public(), f)
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}
