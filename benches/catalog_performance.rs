//! Benchmarks for the hot paths of authn_errors: raising a catalog error,
//! rendering it publicly, writing the internal log line and resolving codes
//! through the registry.

use authn_errors::{auth_err, authn_registry, definitions, sanitized, validate_code, AuthError};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_raise(c: &mut Criterion) {
    let mut group = c.benchmark_group("raise");

    group.bench_function("static_message", |b| {
        b.iter(|| black_box(definitions::TOKEN_NEEDS_ROTATION.error("rotation threshold crossed")))
    });

    group.bench_function("owned_message_with_metadata", |b| {
        b.iter(|| {
            black_box(
                definitions::CLIENT_NOT_CONFIGURED
                    .error(format!("client {} disabled", black_box("generic_oauth")))
                    .with_metadata("request_id", String::from("req-0001")),
            )
        })
    });

    group.bench_function("auth_err_macro", |b| {
        let client = "saml\u{1b}[2J";
        b.iter(|| {
            black_box(auth_err!(
                &definitions::UNSUPPORTED_CLIENT,
                "client {}",
                sanitized!(black_box(client))
            ))
        })
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for descriptor in definitions::ALL {
        let err = AuthError::from(*descriptor);
        group.bench_with_input(
            BenchmarkId::new("public", descriptor.code().as_str()),
            &err,
            |b, err| b.iter(|| black_box(err.public())),
        );
    }

    let err = definitions::EXPIRED_ACCESS_TOKEN
        .error("access token for user 42 expired")
        .with_metadata("user_id", "42");
    group.bench_function("display", |b| b.iter(|| black_box(err.to_string())));
    group.bench_function("internal_write_to", |b| {
        let mut buffer = String::with_capacity(256);
        b.iter(|| {
            buffer.clear();
            err.internal_log().write_to(&mut buffer).unwrap();
            black_box(buffer.len())
        })
    });
    group.bench_function("public_json", |b| {
        b.iter(|| black_box(serde_json::to_vec(&err.public()).unwrap()))
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let registry = authn_registry().unwrap();
    let mut group = c.benchmark_group("lookup");

    group.bench_function("registry_hit", |b| {
        b.iter(|| black_box(registry.get(black_box("auth.identity.invalid-namespace-id"))))
    });
    group.bench_function("registry_miss", |b| {
        b.iter(|| black_box(registry.get(black_box("auth.identity.missing"))))
    });
    group.bench_function("validate_code", |b| {
        b.iter(|| black_box(validate_code(black_box("auth.identity.invalid-namespace-id"))))
    });

    group.finish();
}

criterion_group!(benches, bench_raise, bench_render, bench_lookup);
criterion_main!(benches);
