//! Classification and presentation metadata attached to every descriptor.
//!
//! A descriptor's [`Classification`] decides how generic middleware answers
//! the caller: which HTTP status is returned, whether a retry makes sense and
//! which generic message is shown when the descriptor carries no public text.
//! [`LogLevel`] and [`ErrorSource`] only influence internal reporting.
//!
//! # Copy Semantics
//!
//! Everything in this module is small, fieldless or borrowed-only metadata.
//! It is Copy so that rendering code can pass it around by value; identity
//! lives in [`crate::codes`], not here.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Classification
// ============================================================================

/// Coarse failure category of an error descriptor.
///
/// The set mirrors the status reasons used throughout the server; the
/// authentication catalog itself only uses `Unauthorized`, `BadRequest`
/// and `NotImplemented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Failure of unknown origin; rendered like an internal error.
    Unknown,
    /// Caller lacks valid credentials or session.
    Unauthorized,
    /// Caller is authenticated but not allowed to perform the action.
    Forbidden,
    /// Requested resource does not exist.
    NotFound,
    /// Request is well-formed but semantically invalid.
    UnprocessableEntity,
    /// Request conflicts with current state.
    Conflict,
    /// Caller exceeded a rate limit.
    TooManyRequests,
    /// Malformed or unsupported request shape.
    BadRequest,
    /// Caller went away before the response was ready.
    ClientClosedRequest,
    /// Request failed input validation.
    ValidationFailed,
    /// Unexpected server-side failure.
    Internal,
    /// Operation did not complete in time.
    Timeout,
    /// Recognized but unhandled case.
    NotImplemented,
    /// Upstream dependency returned an invalid response.
    BadGateway,
    /// Upstream dependency did not answer in time.
    GatewayTimeout,
}

impl Classification {
    /// Every classification, in declaration order.
    pub const ALL: [Classification; 15] = [
        Self::Unknown,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::UnprocessableEntity,
        Self::Conflict,
        Self::TooManyRequests,
        Self::BadRequest,
        Self::ClientClosedRequest,
        Self::ValidationFailed,
        Self::Internal,
        Self::Timeout,
        Self::NotImplemented,
        Self::BadGateway,
        Self::GatewayTimeout,
    ];

    /// Numeric HTTP status used when rendering this classification.
    ///
    /// `ClientClosedRequest` uses the non-standard 499.
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::UnprocessableEntity => 422,
            Self::Conflict => 409,
            Self::TooManyRequests => 429,
            Self::BadRequest | Self::ValidationFailed => 400,
            Self::ClientClosedRequest => 499,
            Self::Unknown | Self::Internal => 500,
            Self::NotImplemented => 501,
            Self::BadGateway => 502,
            Self::Timeout | Self::GatewayTimeout => 504,
        }
    }

    /// Typed HTTP status for frameworks built on the `http` crate.
    #[inline]
    pub fn http_status(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.status_code())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Whether the failure originates on the server side (5xx).
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Severity used when the descriptor has no explicit log level.
    ///
    /// Server-side failures are errors; caller mistakes are informational.
    #[inline]
    pub const fn default_log_level(&self) -> LogLevel {
        if self.is_server_error() {
            LogLevel::Error
        } else {
            LogLevel::Info
        }
    }

    /// Whether repeating the same request may succeed without changes.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TooManyRequests | Self::Timeout | Self::BadGateway | Self::GatewayTimeout
        )
    }

    /// Message rendered to external callers when no public message exists.
    ///
    /// These strings carry no detail beyond the classification itself.
    #[inline]
    pub const fn generic_message(&self) -> &'static str {
        match self {
            Self::Unknown => "An unexpected error occurred",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::UnprocessableEntity => "Unprocessable entity",
            Self::Conflict => "Conflict",
            Self::TooManyRequests => "Too many requests",
            Self::BadRequest => "Bad request",
            Self::ClientClosedRequest => "Client closed request",
            Self::ValidationFailed => "Validation failed",
            Self::Internal => "Internal server error",
            Self::Timeout => "Timeout",
            Self::NotImplemented => "Not implemented",
            Self::BadGateway => "Bad gateway",
            Self::GatewayTimeout => "Gateway timeout",
        }
    }

    /// Stable snake-case name used in structured logs.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::UnprocessableEntity => "unprocessable_entity",
            Self::Conflict => "conflict",
            Self::TooManyRequests => "too_many_requests",
            Self::BadRequest => "bad_request",
            Self::ClientClosedRequest => "client_closed_request",
            Self::ValidationFailed => "validation_failed",
            Self::Internal => "internal",
            Self::Timeout => "timeout",
            Self::NotImplemented => "not_implemented",
            Self::BadGateway => "bad_gateway",
            Self::GatewayTimeout => "gateway_timeout",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Severity override for a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic noise, normally filtered out.
    Debug,
    /// Expected failure worth recording.
    Info,
    /// Unusual failure that may need attention.
    Warn,
    /// Failure that needs attention.
    Error,
}

impl LogLevel {
    /// Corresponding `tracing` level.
    #[inline]
    pub const fn to_tracing(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }

    /// Lowercase name.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Error Source
// ============================================================================

/// Which side of the server a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    /// Caused by this server or its caller.
    #[default]
    Server,
    /// Caused by a dependency the server talks to (identity provider, database).
    Downstream,
}

impl ErrorSource {
    /// Lowercase name.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Downstream => "downstream",
        }
    }

    /// Whether a dependency is to blame.
    #[inline]
    pub const fn is_downstream(self) -> bool {
        matches!(self, Self::Downstream)
    }
}

// ============================================================================
// Public Rendering
// ============================================================================

/// The only view of an error that may leave the process.
///
/// Built by [`crate::AuthError::public`]. Contains the status, the stable
/// code and a message that is either the descriptor's public message or the
/// generic text of its classification. Internal log text never reaches it.
///
/// Serializes as `{"statusCode": 401, "messageId": "...", "message": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicError {
    /// HTTP status to answer with.
    pub status_code: u16,
    /// Stable descriptor code.
    pub message_id: &'static str,
    /// Text safe for external callers.
    pub message: &'static str,
}

impl PublicError {
    /// Typed HTTP status.
    #[inline]
    pub fn http_status(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.status_code)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for PublicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_catalog_classes() {
        assert_eq!(Classification::Unauthorized.status_code(), 401);
        assert_eq!(Classification::BadRequest.status_code(), 400);
        assert_eq!(Classification::NotImplemented.status_code(), 501);
        assert_eq!(
            Classification::NotImplemented.http_status(),
            http::StatusCode::NOT_IMPLEMENTED
        );
    }

    #[test]
    fn client_closed_request_uses_499() {
        let status = Classification::ClientClosedRequest.http_status();
        assert_eq!(status.as_u16(), 499);
    }

    #[test]
    fn every_classification_has_a_valid_http_status() {
        for class in Classification::ALL {
            assert_eq!(class.http_status().as_u16(), class.status_code());
            assert!(!class.generic_message().is_empty());
        }
    }

    #[test]
    fn default_log_level_follows_status_family() {
        assert_eq!(Classification::Unauthorized.default_log_level(), LogLevel::Info);
        assert_eq!(Classification::BadRequest.default_log_level(), LogLevel::Info);
        assert_eq!(Classification::NotImplemented.default_log_level(), LogLevel::Error);
        assert_eq!(Classification::Internal.default_log_level(), LogLevel::Error);
    }

    #[test]
    fn only_transient_classes_are_retryable() {
        let retryable: Vec<_> = Classification::ALL
            .into_iter()
            .filter(Classification::is_retryable)
            .collect();
        assert_eq!(
            retryable,
            vec![
                Classification::TooManyRequests,
                Classification::Timeout,
                Classification::BadGateway,
                Classification::GatewayTimeout,
            ]
        );
        assert!(!Classification::Unauthorized.is_retryable());
    }

    #[test]
    fn as_str_matches_serde_names() {
        for class in Classification::ALL {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class.as_str()));
        }
    }

    #[test]
    fn serde_names_parse_back() {
        for class in Classification::ALL {
            let json = format!("\"{}\"", class.as_str());
            assert_eq!(serde_json::from_str::<Classification>(&json).unwrap(), class);
        }

        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert!(serde_json::from_str::<LogLevel>("\"trace\"").is_err());

        let source: ErrorSource = serde_json::from_str("\"downstream\"").unwrap();
        assert!(source.is_downstream());
    }

    #[test]
    fn log_level_maps_to_tracing() {
        assert_eq!(LogLevel::Debug.to_tracing(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Error.to_tracing(), tracing::Level::ERROR);
        assert!(LogLevel::Debug < LogLevel::Error);
    }

    #[test]
    fn public_error_serializes_camel_case() {
        let public = PublicError {
            status_code: 401,
            message_id: "oauth.expired-token",
            message: "OAuth access token expired",
        };
        let value = serde_json::to_value(public).unwrap();
        assert_eq!(value["statusCode"], 401);
        assert_eq!(value["messageId"], "oauth.expired-token");
        assert_eq!(value["message"], "OAuth access token expired");
        assert_eq!(public.to_string(), "OAuth access token expired (oauth.expired-token)");
    }

    #[test]
    fn error_source_defaults_to_server() {
        assert_eq!(ErrorSource::default(), ErrorSource::Server);
        assert!(ErrorSource::Downstream.is_downstream());
    }
}
