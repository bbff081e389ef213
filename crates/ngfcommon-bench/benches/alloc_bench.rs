//! Allocator registry benchmarks.

use std::ffi::c_void;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ngfcommon_abi::alloc_abi::{ngfi_alloc, ngfi_free};
use ngfcommon_core::alloc::{self, AllocatorRegistry, CountingAllocator, SystemAllocator};

fn bench_registry_cycle(c: &mut Criterion) {
    let sizes: &[usize] = &[16, 64, 256, 1024, 4096, 32768];
    let mut group = c.benchmark_group("registry_alloc_free");

    let default = AllocatorRegistry::new();
    let counting = AllocatorRegistry::new();
    counting.set(Some(Arc::new(CountingAllocator::new(SystemAllocator))));

    for &size in sizes {
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, &sz| {
            b.iter(|| {
                let ptr = default.allocate(sz, 1);
                if let Some(ptr) = criterion::black_box(ptr) {
                    unsafe { default.free(ptr.as_ptr(), sz, 1) };
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("counting", size), &size, |b, &sz| {
            b.iter(|| {
                let ptr = counting.allocate(sz, 1);
                if let Some(ptr) = criterion::black_box(ptr) {
                    unsafe { counting.free(ptr.as_ptr(), sz, 1) };
                }
            });
        });
    }
    group.finish();
}

fn bench_typed_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("typed_burst");

    group.bench_function("1000x[u64;8]", |b| {
        b.iter(|| {
            let ptrs: Vec<_> = (0..1000).filter_map(|_| alloc::alloc_one::<[u64; 8]>()).collect();
            for ptr in criterion::black_box(ptrs) {
                unsafe { alloc::free_one(ptr.as_ptr()) };
            }
        });
    });

    group.finish();
}

fn bench_c_entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("c_entry");

    group.bench_function("ngfi_alloc_free_64B", |b| {
        b.iter(|| unsafe {
            let ptr: *mut c_void = ngfi_alloc(64, 1);
            ngfi_free(criterion::black_box(ptr), 64, 1);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_registry_cycle, bench_typed_burst, bench_c_entry);
criterion_main!(benches);
