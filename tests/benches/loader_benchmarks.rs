//! # Keeper Loader Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `loader-public` | Public-only batches (one keeper round) |
//! | `loader-mixed` | Half public, half shared (two rounds, ECDH per item) |
//! | `crypto` | Key agreement and pointer decryption on their own |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kl_file_loader::{FileLoaderApi, KeyAgreement, Secp256k1Agreement, SymmetricCipher, XChaChaCipher};
use kl_tests::fixtures::{Party, World};
use shared_types::TransactionInput;
use std::time::Duration;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

fn bench_public_batches(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("loader-public");
    group.measurement_time(Duration::from_secs(10));

    for size in [10, 100, 1000] {
        let world = World::new();
        let batch: Vec<TransactionInput> = rt.block_on(async {
            let mut batch = Vec::with_capacity(size);
            for i in 0..size {
                let body = format!("public file {i}");
                batch.push(world.public(&format!("tx-{i}"), body.as_bytes()).await.into());
            }
            batch
        });
        let service = world.service();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("load", size), &batch, |b, batch| {
            b.iter(|| black_box(rt.block_on(service.load(batch.clone())).expect("load")))
        });
    }

    group.finish();
}

fn bench_mixed_batches(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("loader-mixed");
    group.measurement_time(Duration::from_secs(10));

    let alice = Party::new("alice");
    let bob = Party::new("bob");

    for size in [10, 100] {
        let world = World::new();
        world.register(&alice, true);
        world.register(&bob, false);
        let batch: Vec<TransactionInput> = rt.block_on(async {
            let mut batch = Vec::with_capacity(size);
            for i in 0..size {
                let txid = format!("tx-{i}");
                let body = vec![i as u8; 4096];
                let tx = if i % 2 == 0 {
                    world.public(&txid, &body).await
                } else {
                    world.share(&txid, &alice, &bob, &body, true).await
                };
                batch.push(tx.into());
            }
            batch
        });
        let service = world.service();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("load", size), &batch, |b, batch| {
            b.iter(|| black_box(rt.block_on(service.load(batch.clone())).expect("load")))
        });
    }

    group.finish();
}

fn bench_crypto(c: &mut Criterion) {
    let mut group = c.benchmark_group("crypto");

    let alice = Party::new("alice");
    let bob = Party::new("bob");
    let private_key = alice.keys.to_bytes();
    let public_key = bob.keys.public_key();

    group.bench_function("ecdh_shared_secret", |b| {
        b.iter(|| {
            black_box(
                Secp256k1Agreement
                    .derive_shared_secret(&private_key, &public_key)
                    .expect("agreement"),
            )
        })
    });

    let key = [7u8; 32];
    let sealed = XChaChaCipher.encrypt(&[0u8; 64], &key).expect("seal");
    group.bench_function("pointer_decrypt", |b| {
        b.iter(|| black_box(XChaChaCipher.decrypt(&sealed, &key).expect("open")))
    });

    group.finish();
}

criterion_group!(benches, bench_public_batches, bench_mixed_batches, bench_crypto);
criterion_main!(benches);
