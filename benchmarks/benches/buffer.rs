// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Buffer benchmarks: lock + canary check per access, allocation, protection flips

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use bastion_buffer::Buffer;
use bastion_util::fill_bytes_with_pattern;

fn bench_access_32(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer/32B");

    group.bench_function("open_mut_fill", |b| {
        let buffer = Buffer::new(32).expect("failed to create buffer");
        b.iter(|| {
            buffer
                .open_mut(|bytes| fill_bytes_with_pattern(bytes, black_box(0xAB)))
                .expect("failed to open_mut buffer");
        });
    });

    group.bench_function("open", |b| {
        let buffer = Buffer::random(32).expect("failed to create buffer");
        b.iter(|| {
            buffer
                .open(|bytes| {
                    black_box(bytes);
                })
                .expect("failed to open buffer");
        });
    });

    group.bench_function("data_view", |b| {
        let buffer = Buffer::random(32).expect("failed to create buffer");
        b.iter(|| {
            let view = buffer.data().expect("failed to view buffer");
            black_box(&*view);
        });
    });

    group.finish();
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer/lifecycle");

    for size in [32usize, 4096, 65536] {
        group.bench_function(format!("new_destroy/{size}B"), |b| {
            b.iter(|| {
                let buffer = Buffer::new(black_box(size)).expect("failed to create buffer");
                buffer.destroy().expect("failed to destroy buffer");
            });
        });
    }

    group.bench_function("freeze_melt/32B", |b| {
        let buffer = Buffer::new(32).expect("failed to create buffer");
        b.iter(|| {
            buffer.freeze().expect("failed to freeze buffer");
            buffer.melt().expect("failed to melt buffer");
        });
    });

    group.finish();
}

criterion_group!(benches, bench_access_32, bench_lifecycle);
criterion_main!(benches);
