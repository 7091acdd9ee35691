use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use krt::check::{clear_assert_handler, set_assert_handler, AssertionEvent};
use krt::{clear_trace_hook, posix_memalign, set_trace_hook, EINVAL};

static TRACE_COUNT: AtomicUsize = AtomicUsize::new(0);
static TRACE_MSG: Mutex<Option<String>> = Mutex::new(None);
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn trace_hook(args: fmt::Arguments<'_>) {
    TRACE_COUNT.fetch_add(1, Ordering::Relaxed);
    let mut msg = String::new();
    let _ = fmt::write(&mut msg, args);
    *TRACE_MSG.lock().unwrap() = Some(msg);
}

fn unwinding_handler(_event: &AssertionEvent<'_>) -> ! {
    panic!("check failed under test");
}

struct TraceGuard;

impl Drop for TraceGuard {
    fn drop(&mut self) {
        clear_trace_hook();
        clear_assert_handler();
    }
}

fn reset() {
    TRACE_COUNT.store(0, Ordering::Relaxed);
    *TRACE_MSG.lock().unwrap() = None;
    set_trace_hook(trace_hook);
}

#[cfg(not(feature = "naive-memalign"))]
#[test]
fn rejected_alignment_reports_trace_when_debug() {
    let _guard = TEST_LOCK.lock().unwrap();
    let _trace_guard = TraceGuard;
    reset();

    let mut out = core::ptr::null_mut();
    assert_eq!(posix_memalign(&mut out, 24, 64), EINVAL);
    assert!(out.is_null());

    #[cfg(debug_assertions)]
    {
        assert_eq!(TRACE_COUNT.load(Ordering::Relaxed), 1);
        let msg = TRACE_MSG.lock().unwrap().clone().unwrap_or_default();
        assert!(msg.contains("krt error 22"));
        assert!(msg.contains("alignment 24"));
    }

    #[cfg(not(debug_assertions))]
    {
        assert_eq!(TRACE_COUNT.load(Ordering::Relaxed), 0);
    }
}

#[test]
fn successful_allocation_is_silent() {
    let _guard = TEST_LOCK.lock().unwrap();
    let _trace_guard = TraceGuard;
    reset();

    let mut out = core::ptr::null_mut();
    assert_eq!(posix_memalign(&mut out, 64, 10), 0);
    unsafe { krt::free_aligned(out) };

    assert_eq!(TRACE_COUNT.load(Ordering::Relaxed), 0);
}

#[cfg(feature = "checks")]
#[test]
fn failed_check_is_traced_before_termination() {
    let _guard = TEST_LOCK.lock().unwrap();
    let _trace_guard = TraceGuard;
    reset();
    set_assert_handler(unwinding_handler);

    let result = std::panic::catch_unwind(|| {
        krt::check!(2 < 1, "budget {}", 9);
    });
    assert!(result.is_err());

    assert_eq!(TRACE_COUNT.load(Ordering::Relaxed), 1);
    let msg = TRACE_MSG.lock().unwrap().clone().unwrap_or_default();
    assert!(msg.contains("trace_spec.rs"));
    assert!(msg.contains("check failed: 2 < 1: budget 9"));
}
