//! Allocation counters layered over any table.
//!
//! All counters use relaxed ordering; they are advisory, not synchronization.

use std::ffi::c_void;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

use super::AllocationCallbacks;

/// Wraps a table and counts the traffic going through it.
#[derive(Debug, Default)]
pub struct CountingAllocator<A> {
    inner: A,
    allocations: AtomicU64,
    frees: AtomicU64,
    failures: AtomicU64,
    bytes_live: AtomicUsize,
}

/// Point-in-time copy of a [`CountingAllocator`]'s counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationStats {
    pub allocations: u64,
    pub frees: u64,
    pub failures: u64,
    pub bytes_live: usize,
}

impl AllocationStats {
    /// Allocations not yet matched by a free.
    #[must_use]
    pub const fn outstanding(&self) -> u64 {
        self.allocations.saturating_sub(self.frees)
    }
}

impl<A: AllocationCallbacks> CountingAllocator<A> {
    #[must_use]
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicU64::new(0),
            frees: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            bytes_live: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &A {
        &self.inner
    }

    #[must_use]
    pub fn snapshot(&self) -> AllocationStats {
        AllocationStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            bytes_live: self.bytes_live.load(Ordering::Relaxed),
        }
    }
}

unsafe impl<A: AllocationCallbacks> AllocationCallbacks for CountingAllocator<A> {
    fn allocate(&self, element_size: usize, count: usize) -> *mut c_void {
        let ptr = self.inner.allocate(element_size, count);
        if ptr.is_null() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        } else {
            self.allocations.fetch_add(1, Ordering::Relaxed);
            self.bytes_live
                .fetch_add(element_size.saturating_mul(count), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn free(&self, ptr: *mut c_void, element_size: usize, count: usize) {
        unsafe { self.inner.free(ptr, element_size, count) };
        self.frees.fetch_add(1, Ordering::Relaxed);
        self.bytes_live
            .fetch_sub(element_size.saturating_mul(count), Ordering::Relaxed);
    }
}
