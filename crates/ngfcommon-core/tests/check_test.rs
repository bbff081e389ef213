//! Recoverable and fatal checks against the process-wide dispatcher.
//!
//! The fatal case runs in a child copy of this test binary, selected through
//! `NGFCOMMON_FATAL_CHILD`.

use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ngfcommon_core::check::FATAL_EXIT_CODE;
use ngfcommon_core::diag::{self, DiagnosticLevel, FnSink};
use ngfcommon_core::{ErrorCode, Result, check_condition, check_fatal};

const CHILD_ENV: &str = "NGFCOMMON_FATAL_CHILD";

static TEST_GUARD_HELD: AtomicBool = AtomicBool::new(false);

struct TestGuard;

impl Drop for TestGuard {
    fn drop(&mut self) {
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

fn create_buffer(size: usize) -> Result<usize> {
    check_condition!(size > 0, ErrorCode::InvalidSize, "buffer size must be non-zero");
    Ok(size)
}

#[test]
fn failed_check_emits_exactly_one_error() {
    let _guard = acquire_test_guard();
    let log: Arc<Mutex<Vec<(DiagnosticLevel, String)>>> = Arc::default();
    let sink_log = Arc::clone(&log);
    diag::set_diagnostic_info(Some(Arc::new(FnSink::new(
        move |level: DiagnosticLevel, message: &str| {
            sink_log.lock().unwrap().push((level, message.to_owned()));
        },
    ))));

    assert_eq!(create_buffer(256), Ok(256));
    assert!(log.lock().unwrap().is_empty());

    assert_eq!(create_buffer(0), Err(ErrorCode::InvalidSize));
    assert_eq!(
        log.lock().unwrap().clone(),
        vec![(
            DiagnosticLevel::Error,
            "buffer size must be non-zero".to_owned()
        )]
    );
}

#[test]
fn fatal_check_child() {
    if std::env::var_os(CHILD_ENV).is_none() {
        return;
    }
    diag::set_diagnostic_info(Some(Arc::new(FnSink::new(
        |level: DiagnosticLevel, message: &str| eprintln!("diag:{level}:{message}"),
    ))));
    let depth = 9;
    check_fatal!(depth < 8, "render graph nesting too deep: {}", depth);
    eprintln!("diag:unreachable");
}

#[test]
fn fatal_check_terminates_after_one_error() {
    if std::env::var_os(CHILD_ENV).is_some() {
        return;
    }
    let exe = std::env::current_exe().unwrap();
    let output = Command::new(exe)
        .args(["fatal_check_child", "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(FATAL_EXIT_CODE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let diags: Vec<&str> = stderr.lines().filter(|l| l.starts_with("diag:")).collect();
    assert_eq!(diags, vec!["diag:error:render graph nesting too deep: 9"]);
}
