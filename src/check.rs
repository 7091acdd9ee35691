// check.rs
//
// Fatal check facility: diagnostic event, replaceable terminator, default abort path.

use core::fmt;
use core::sync::atomic::{AtomicPtr, Ordering};

/// True when `check!` evaluates its condition. Fixed by the `checks` feature.
pub const CHECKS_ACTIVE: bool = cfg!(feature = "checks");

/// Diagnostic context of a failed check. Only built on the failing path.
#[derive(Clone, Copy, Debug)]
pub struct AssertionEvent<'a> {
    pub file: &'a str,
    pub line: u32,
    pub condition: &'a str,
    pub function: &'a str,
    pub message: Option<fmt::Arguments<'a>>,
}

impl<'a> AssertionEvent<'a> {
    #[inline]
    pub const fn new(file: &'a str, line: u32, condition: &'a str, function: &'a str) -> Self {
        Self {
            file,
            line,
            condition,
            function,
            message: None,
        }
    }

    #[inline]
    pub const fn with_message(mut self, message: fmt::Arguments<'a>) -> Self {
        self.message = Some(message);
        self
    }
}

impl fmt::Display for AssertionEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: check failed: {}",
            self.file, self.line, self.function, self.condition
        )?;
        if let Some(message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

/// Terminator invoked for a failed check. It must not return.
pub type AssertHandler = for<'a, 'b> fn(&'a AssertionEvent<'b>) -> !;

static ASSERT_HANDLER: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());

/// Replaces the default terminator.
#[inline]
pub fn set_assert_handler(handler: AssertHandler) {
    ASSERT_HANDLER.store(handler as *const () as *mut (), Ordering::Release);
}

/// Restores the default terminator.
#[inline]
pub fn clear_assert_handler() {
    ASSERT_HANDLER.store(core::ptr::null_mut(), Ordering::Release);
}

/// Reports `event` and terminates.
///
/// The event is traced first, then handed to the installed handler, or to the
/// default terminator when none is installed. A check failing on the same thread
/// while its handler is running skips the handler and aborts. With `std`, failures
/// on other threads wait until the first report is written.
#[cold]
#[inline(never)]
pub fn assert_failed(event: &AssertionEvent<'_>) -> ! {
    let Some(_firing) = firing::enter() else {
        abort_now(event);
    };

    crate::trace::trace(format_args!("{}", event));

    let ptr = ASSERT_HANDLER.load(Ordering::Acquire);
    if !ptr.is_null() {
        let handler: AssertHandler = unsafe { core::mem::transmute(ptr) };
        handler(event);
    }
    default_terminate(event)
}

#[cfg(feature = "std")]
mod firing {
    use std::cell::Cell;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    std::thread_local! {
        static REPORTING: Cell<bool> = const { Cell::new(false) };
    }

    // Held for the whole report; a panicking handler poisons it, which is harmless.
    static REPORT_LOCK: Mutex<()> = Mutex::new(());

    pub(super) struct Firing {
        _lock: MutexGuard<'static, ()>,
    }

    /// `None` when this thread is already reporting a failure.
    pub(super) fn enter() -> Option<Firing> {
        if REPORTING.with(|flag| flag.replace(true)) {
            return None;
        }
        let lock = REPORT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        Some(Firing { _lock: lock })
    }

    impl Drop for Firing {
        fn drop(&mut self) {
            REPORTING.with(|flag| flag.set(false));
        }
    }
}

#[cfg(not(feature = "std"))]
mod firing {
    use core::sync::atomic::{AtomicBool, Ordering};

    static REPORTING: AtomicBool = AtomicBool::new(false);

    pub(super) struct Firing;

    pub(super) fn enter() -> Option<Firing> {
        if REPORTING.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Firing)
        }
    }

    impl Drop for Firing {
        fn drop(&mut self) {
            REPORTING.store(false, Ordering::Release);
        }
    }
}

#[cfg(feature = "std")]
fn default_terminate(event: &AssertionEvent<'_>) -> ! {
    use std::io::Write;

    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = writeln!(out, "{}", event);
    let _ = out.flush();
    std::process::abort()
}

#[cfg(not(feature = "std"))]
fn default_terminate(event: &AssertionEvent<'_>) -> ! {
    panic!("{}", event)
}

#[cfg(feature = "std")]
fn abort_now(event: &AssertionEvent<'_>) -> ! {
    use std::io::Write;

    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = writeln!(out, "nested check failure: {}", event);
    let _ = out.flush();
    std::process::abort()
}

#[cfg(not(feature = "std"))]
fn abort_now(event: &AssertionEvent<'_>) -> ! {
    panic!("nested check failure: {}", event)
}
