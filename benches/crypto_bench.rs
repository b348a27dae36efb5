// ABOUTME: Criterion benchmarks for token encryption and decryption
// ABOUTME: Measures AES-256-GCM round-trip cost for typical and oversized token payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Criterion benchmarks for the token encryptor.
//!
//! Measures encrypt and decrypt cost for payloads shaped like real OAuth
//! tokens, plus an oversized payload to show scaling.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reviewsync::crypto::TokenEncryptor;

/// Typical OAuth bearer token length
const TYPICAL_TOKEN: &str =
    "ya29.a0AfH6SMBx1yG8eWbkQ3w9dJpZr5tUvXyL2mN4oP6qR8sT0uV1wX3yZ5aB7cD9eF";

fn bench_encrypt(c: &mut Criterion) {
    let encryptor = TokenEncryptor::new(&[42u8; 32]).unwrap();
    let mut group = c.benchmark_group("token_encrypt");

    for (name, payload) in [
        ("typical_token", TYPICAL_TOKEN.to_owned()),
        ("large_payload", "x".repeat(4096)),
    ] {
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &payload, |b, payload| {
            b.iter(|| encryptor.encrypt(black_box(payload)).unwrap());
        });
    }
    group.finish();
}

fn bench_decrypt(c: &mut Criterion) {
    let encryptor = TokenEncryptor::new(&[42u8; 32]).unwrap();
    let mut group = c.benchmark_group("token_decrypt");

    for (name, payload) in [
        ("typical_token", TYPICAL_TOKEN.to_owned()),
        ("large_payload", "x".repeat(4096)),
    ] {
        let ciphertext = encryptor.encrypt(&payload).unwrap();
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &ciphertext,
            |b, ciphertext| {
                b.iter(|| encryptor.decrypt(black_box(ciphertext)).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let encryptor = TokenEncryptor::new(&[42u8; 32]).unwrap();

    c.bench_function("token_round_trip", |b| {
        b.iter(|| {
            let ciphertext = encryptor.encrypt(black_box(TYPICAL_TOKEN)).unwrap();
            encryptor.decrypt(&ciphertext).unwrap()
        });
    });
}

criterion_group!(benches, bench_encrypt, bench_decrypt, bench_round_trip);
criterion_main!(benches);
