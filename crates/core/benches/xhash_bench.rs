//! Benchmark for the Xhash pipeline and nonce scanner

use std::sync::atomic::AtomicBool;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use xhash_core::{HeaderWords, TargetWords, scan_with_timestamp, xhash};

const TIMESTAMP: u64 = 1_700_000_000;

fn bench_header() -> HeaderWords {
    let mut bytes = [0u8; 80];
    bytes[..40].copy_from_slice(b"benchmark header for xhash performance..");
    HeaderWords::from_bytes(&bytes).unwrap()
}

fn bench_hash(c: &mut Criterion) {
    let header = bench_header();

    c.bench_function("xhash_single", |b| {
        b.iter(|| xhash(black_box(&header), black_box(TIMESTAMP)))
    });
}

fn bench_hash_varying_nonce(c: &mut Criterion) {
    let mut header = bench_header();

    c.bench_function("xhash_varying", |b| {
        let mut nonce: u32 = 0;
        b.iter(|| {
            header.set_nonce(nonce);
            nonce = nonce.wrapping_add(1);
            xhash(black_box(&header), TIMESTAMP)
        })
    });
}

fn bench_scan_window(c: &mut Criterion) {
    let header = bench_header().with_nonce(0);
    let impossible = TargetWords::new([0; 8]);
    let never = AtomicBool::new(false);

    c.bench_function("xhash_scan_256", |b| {
        b.iter(|| scan_with_timestamp(black_box(&header), &impossible, 255, TIMESTAMP, &never))
    });
}

criterion_group!(benches, bench_hash, bench_hash_varying_nonce, bench_scan_window);
criterion_main!(benches);
