//! Process-wide allocator registry and diagnostic dispatcher.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ngfcommon_core::alloc::{self, AllocationCallbacks, CountingAllocator, SystemAllocator};
use ngfcommon_core::config::{self, DiagnosticVerbosity};
use ngfcommon_core::diag::{self, DiagnosticLevel, DiagnosticSink, FnSink};
use ngfcommon_core::{ErrorCode, diag_error, diag_info, diag_warning};

static TEST_GUARD_HELD: AtomicBool = AtomicBool::new(false);

struct TestGuard;

impl Drop for TestGuard {
    fn drop(&mut self) {
        alloc::set_allocation_callbacks(None);
        diag::set_diagnostic_info(None);
        TEST_GUARD_HELD.store(false, Ordering::Release);
    }
}

fn acquire_test_guard() -> TestGuard {
    loop {
        if TEST_GUARD_HELD
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return TestGuard;
        }
        std::thread::yield_now();
    }
}

type Log = Arc<Mutex<Vec<(DiagnosticLevel, String)>>>;

fn install_log(verbosity: DiagnosticVerbosity) -> Log {
    let log = Log::default();
    let sink_log = Arc::clone(&log);
    let sink = FnSink::new(move |level: DiagnosticLevel, message: &str| {
        sink_log.lock().unwrap().push((level, message.to_owned()));
    })
    .with_verbosity(verbosity);
    diag::set_diagnostic_info(Some(Arc::new(sink)));
    log
}

/// The tag stands in for C userdata: every call must land on this value.
#[derive(Default)]
struct TaggedTable {
    tag: usize,
    allocs: AtomicUsize,
    frees: AtomicUsize,
}

unsafe impl AllocationCallbacks for TaggedTable {
    fn allocate(&self, element_size: usize, count: usize) -> *mut c_void {
        assert_eq!(self.tag, 0xA110C);
        self.allocs.fetch_add(1, Ordering::Relaxed);
        SystemAllocator.allocate(element_size, count)
    }

    unsafe fn free(&self, ptr: *mut c_void, element_size: usize, count: usize) {
        self.frees.fetch_add(1, Ordering::Relaxed);
        unsafe { SystemAllocator.free(ptr, element_size, count) };
    }
}

struct Exhausted;

unsafe impl AllocationCallbacks for Exhausted {
    fn allocate(&self, _: usize, _: usize) -> *mut c_void {
        std::ptr::null_mut()
    }

    unsafe fn free(&self, _: *mut c_void, _: usize, _: usize) {}
}

#[test]
fn custom_table_sees_every_request() {
    let _guard = acquire_test_guard();
    let table = Arc::new(TaggedTable {
        tag: 0xA110C,
        ..TaggedTable::default()
    });
    alloc::set_allocation_callbacks(Some(table.clone()));
    assert!(!alloc::global().is_default());

    let one = alloc::alloc_one::<u64>().unwrap();
    let many = alloc::alloc_n::<u32>(16).unwrap();
    unsafe {
        one.as_ptr().write(7);
        assert_eq!(one.as_ptr().read(), 7);
        alloc::free_one(one.as_ptr());
        alloc::free_n(many.as_ptr(), 16);
    }
    assert_eq!(table.allocs.load(Ordering::Relaxed), 2);
    assert_eq!(table.frees.load(Ordering::Relaxed), 2);
}

#[test]
fn clearing_restores_default_allocator() {
    let _guard = acquire_test_guard();
    let table = Arc::new(TaggedTable {
        tag: 0xA110C,
        ..TaggedTable::default()
    });
    alloc::set_allocation_callbacks(Some(table.clone()));
    let previous = alloc::set_allocation_callbacks(None);
    assert!(previous.is_some());
    assert!(alloc::global().is_default());

    let ptr = alloc::allocate(32, 2).unwrap();
    unsafe { alloc::free(ptr.as_ptr(), 32, 2) };
    assert_eq!(table.allocs.load(Ordering::Relaxed), 0);
}

#[test]
fn counting_table_balances_when_installed_globally() {
    let _guard = acquire_test_guard();
    let counting = Arc::new(CountingAllocator::new(SystemAllocator));
    alloc::set_allocation_callbacks(Some(counting.clone()));

    let ptrs: Vec<_> = (1..=5).map(|n| alloc::alloc_n::<u16>(n).unwrap()).collect();
    assert_eq!(counting.snapshot().outstanding(), 5);
    for (n, ptr) in (1..=5).zip(ptrs) {
        unsafe { alloc::free_n(ptr.as_ptr(), n) };
    }
    let stats = counting.snapshot();
    assert_eq!(stats.outstanding(), 0);
    assert_eq!(stats.bytes_live, 0);
}

#[test]
fn exhausted_table_reports_out_of_memory_once() {
    let _guard = acquire_test_guard();
    let log = install_log(DiagnosticVerbosity::Default);
    alloc::set_allocation_callbacks(Some(Arc::new(Exhausted)));

    assert!(alloc::alloc_one::<u8>().is_none());
    assert!(log.lock().unwrap().is_empty(), "plain allocate stays silent");

    let err = alloc::global().allocate_or_oom(48, 2).unwrap_err();
    assert_eq!(err, ErrorCode::OutOfMemory);
    let entries = log.lock().unwrap().clone();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, DiagnosticLevel::Error);
    assert!(entries[0].1.contains("48"));
}

#[test]
fn diagnostics_reach_installed_sink() {
    let _guard = acquire_test_guard();
    let log = install_log(DiagnosticVerbosity::Default);

    diag_warning!("x={}", 5);
    diag_info!("swapchain recreated");
    diag_error!("{} of {} descriptors bound", 3, 4);

    assert_eq!(
        log.lock().unwrap().clone(),
        vec![
            (DiagnosticLevel::Warning, "x=5".to_owned()),
            (DiagnosticLevel::Info, "swapchain recreated".to_owned()),
            (DiagnosticLevel::Error, "3 of 4 descriptors bound".to_owned()),
        ]
    );
}

#[test]
fn emitting_without_sink_is_silent() {
    let _guard = acquire_test_guard();
    let log = install_log(DiagnosticVerbosity::Default);
    diag::set_diagnostic_info(None);
    assert!(!diag::global().is_active());

    diag_error!("nobody is listening");
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn replacing_sink_returns_previous() {
    struct Quiet;
    impl DiagnosticSink for Quiet {
        fn message(&self, _: DiagnosticLevel, _: &str) {}
    }

    let _guard = acquire_test_guard();
    assert!(diag::set_diagnostic_info(Some(Arc::new(Quiet))).is_none());
    let previous = diag::set_diagnostic_info(Some(Arc::new(Quiet)));
    assert!(previous.is_some());
}

#[test]
fn effective_verbosity_follows_installed_sink() {
    let _guard = acquire_test_guard();
    install_log(DiagnosticVerbosity::Detailed);
    assert_eq!(config::effective_verbosity(), DiagnosticVerbosity::Detailed);

    install_log(DiagnosticVerbosity::Default);
    assert_eq!(config::effective_verbosity(), config::env_verbosity());
}
