// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshal Path Benchmark
//!
//! Compares the field-by-field encoding with the packed bulk copy for:
//! - a single packed value
//! - slices of packed values (1, 64, 1024 elements)
//! - a non-packed value, where both paths do the same work

#![allow(clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kmarshal::slice::{marshal_slice, marshal_unsafe_slice};
use kmarshal::{Addr, Marshallable, PagedMemory, Protection};
use std::hint::black_box as bb;

#[derive(Marshallable, Clone, Copy, Default, Debug)]
#[repr(C)]
struct Sample {
    seq: u64,
    stamp: i64,
    values: [f32; 8],
    id: u32,
    flags: u16,
    kind: u16,
}

#[derive(Marshallable, Clone, Copy, Default, Debug)]
#[repr(C)]
struct Wrapped {
    tag: u8,
    sample: Sample,
}

fn sample(seq: u64) -> Sample {
    Sample {
        seq,
        stamp: -1,
        values: [1.5; 8],
        id: 7,
        flags: 0x8001,
        kind: 2,
    }
}

fn bench_single_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_value");
    let value = sample(1);
    let mut buf = vec![0u8; Sample::SIZE];

    group.bench_function("marshal_bytes", |b| {
        b.iter(|| bb(&value).marshal_bytes(bb(&mut buf)))
    });
    group.bench_function("marshal_unsafe", |b| {
        b.iter(|| bb(&value).marshal_unsafe(bb(&mut buf)))
    });

    let wrapped = Wrapped {
        tag: 1,
        sample: value,
    };
    let mut buf = vec![0u8; Wrapped::SIZE];
    group.bench_function("non_packed_marshal_unsafe", |b| {
        b.iter(|| bb(&wrapped).marshal_unsafe(bb(&mut buf)))
    });
    group.finish();
}

fn bench_slices(c: &mut Criterion) {
    let mut group = c.benchmark_group("slice");
    for count in [1usize, 64, 1024] {
        let values: Vec<Sample> = (0..count as u64).map(sample).collect();
        let mut buf = vec![0u8; count * Sample::SIZE];
        group.throughput(Throughput::Bytes((count * Sample::SIZE) as u64));

        group.bench_with_input(BenchmarkId::new("field_by_field", count), &values, |b, v| {
            b.iter(|| marshal_slice(bb(v), bb(&mut buf)))
        });
        group.bench_with_input(BenchmarkId::new("bulk", count), &values, |b, v| {
            b.iter(|| marshal_unsafe_slice(bb(v), bb(&mut buf)))
        });
    }
    group.finish();
}

fn bench_copy_out(c: &mut Criterion) {
    let mut mem = PagedMemory::new();
    mem.map(Addr(0x10000), 4 * kmarshal::memory::PAGE_SIZE, Protection::READ_WRITE);
    let value = sample(3);
    let wrapped = Wrapped {
        tag: 0,
        sample: value,
    };

    let mut group = c.benchmark_group("copy_out");
    group.bench_function("packed", |b| {
        b.iter(|| bb(&value).copy_out(&mut mem, bb(Addr(0x10ff0))))
    });
    group.bench_function("non_packed", |b| {
        b.iter(|| bb(&wrapped).copy_out(&mut mem, bb(Addr(0x10ff0))))
    });
    group.finish();
}

criterion_group!(benches, bench_single_value, bench_slices, bench_copy_out);
criterion_main!(benches);
