//! Simulated authentication middleware.
//!
//! Each request is run through a few checks. Failures are logged internally
//! at the descriptor's level and answered with the public JSON view.
//!
//! Run with `RUST_LOG=debug` to also see token rotation events.

use authn_errors::{auth_err, definitions, sanitized, AuthError, Result};
use std::time::{Duration, SystemTime};
use tracing_subscriber::EnvFilter;

struct Request<'a> {
    client: &'a str,
    identity: &'a str,
    token_expires_at: SystemTime,
    session_age: Duration,
}

const CONFIGURED_CLIENTS: &[&str] = &["oauth_generic"];
const KNOWN_CLIENTS: &[&str] = &["oauth_generic", "oauth_github", "saml"];
const ROTATION_THRESHOLD: Duration = Duration::from_secs(600);

fn resolve_client(name: &str) -> Result<()> {
    if !KNOWN_CLIENTS.contains(&name) {
        return Err(auth_err!(
            &definitions::UNSUPPORTED_CLIENT,
            "no client registered under {}",
            sanitized!(name)
        ));
    }
    if !CONFIGURED_CLIENTS.contains(&name) {
        return Err(definitions::CLIENT_NOT_CONFIGURED
            .error(format!("client {} is disabled", sanitized!(name)))
            .with_metadata("client", name.to_owned()));
    }
    Ok(())
}

fn resolve_identity(identity: &str) -> Result<()> {
    let Some((namespace, id)) = identity.split_once(':') else {
        return Err(definitions::INVALID_NAMESPACE_ID.error("identity has no namespace separator"));
    };
    match namespace {
        "user" | "service-account" => {}
        "render" => {
            return Err(auth_err!(
                &definitions::UNSUPPORTED_IDENTITY,
                "namespace {} cannot sign in",
                sanitized!(namespace)
            ));
        }
        _ => {
            return Err(auth_err!(
                &definitions::INVALID_NAMESPACE_ID,
                "unknown namespace {}",
                sanitized!(namespace)
            ));
        }
    }
    if id.parse::<u64>().is_err() {
        return Err(auth_err!(
            &definitions::INVALID_NAMESPACE_ID,
            "id {} is not numeric",
            sanitized!(id)
        ));
    }
    Ok(())
}

fn authenticate(request: &Request<'_>) -> Result<()> {
    resolve_client(request.client)?;
    resolve_identity(request.identity)?;

    if request.token_expires_at <= SystemTime::now() {
        return Err(definitions::EXPIRED_ACCESS_TOKEN
            .error("access token past expiry")
            .with_metadata("identity", request.identity.to_owned()));
    }
    if request.session_age >= ROTATION_THRESHOLD {
        return Err(definitions::TOKEN_NEEDS_ROTATION.error("session crossed rotation threshold"));
    }
    Ok(())
}

fn respond(err: &AuthError) -> String {
    err.log();
    serde_json::to_string(&err.public()).unwrap_or_else(|_| String::from("{}"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let now = SystemTime::now();
    let later = now + Duration::from_secs(3600);
    let requests = [
        Request {
            client: "oauth_generic",
            identity: "user:42",
            token_expires_at: later,
            session_age: Duration::from_secs(30),
        },
        Request {
            client: "ldap\u{1b}[2J",
            identity: "user:42",
            token_expires_at: later,
            session_age: Duration::ZERO,
        },
        Request {
            client: "saml",
            identity: "user:42",
            token_expires_at: later,
            session_age: Duration::ZERO,
        },
        Request {
            client: "oauth_generic",
            identity: "render:7",
            token_expires_at: later,
            session_age: Duration::ZERO,
        },
        Request {
            client: "oauth_generic",
            identity: "user:abc",
            token_expires_at: later,
            session_age: Duration::ZERO,
        },
        Request {
            client: "oauth_generic",
            identity: "user:42",
            token_expires_at: now - Duration::from_secs(1),
            session_age: Duration::ZERO,
        },
        Request {
            client: "oauth_generic",
            identity: "user:42",
            token_expires_at: later,
            session_age: Duration::from_secs(900),
        },
    ];

    for request in &requests {
        match authenticate(request) {
            Ok(()) => println!("200 {{\"status\":\"ok\"}}"),
            Err(err) => println!("{} {}", err.status_code(), respond(&err)),
        }
    }
}
