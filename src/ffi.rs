// ffi.rs
//
// C ABI entry points for freestanding C code linked against the runtime.

use core::ffi::{c_char, c_int, c_void, CStr};

use crate::aligned::{free_aligned, posix_memalign};
use crate::check::{assert_failed, AssertionEvent};
use crate::status::{Errno, EINVAL};

/// `posix_memalign(3)` over the global heap.
///
/// # Safety
/// `memptr` must be null or valid for a pointer-sized write.
pub unsafe fn c_posix_memalign(memptr: *mut *mut c_void, alignment: usize, size: usize) -> Errno {
    if memptr.is_null() {
        #[cfg(debug_assertions)]
        crate::trace::report_error(file!(), line!(), EINVAL);
        return EINVAL;
    }
    let mut out = core::ptr::null_mut();
    let status = posix_memalign(&mut out, alignment, size);
    if status == 0 {
        unsafe { memptr.write(out.cast()) };
    } else {
        #[cfg(debug_assertions)]
        crate::trace::report_error_msg(
            file!(),
            line!(),
            status,
            format_args!("posix_memalign(align={}, size={})", alignment, size),
        );
    }
    status
}

/// Releases a block from [`c_posix_memalign`].
///
/// # Safety
/// `ptr` must be null or a live block returned by [`c_posix_memalign`].
pub unsafe fn c_aligned_free(ptr: *mut c_void) {
    unsafe { free_aligned(ptr.cast()) }
}

/// Routes a glibc-style `assert()` failure into the check facility.
///
/// A negative `line` is reported as line 0 with the message `invalid line <n>`.
///
/// # Safety
/// Each string pointer must be null or point to a NUL-terminated string.
pub unsafe fn c_assert_fail(
    assertion: *const c_char,
    file: *const c_char,
    line: c_int,
    function: *const c_char,
) -> ! {
    let (file, assertion, function) = unsafe { (c_str(file), c_str(assertion), c_str(function)) };
    report_c_failure(file, line, assertion, function)
}

/// Routes a BSD-style `__assert(file, line, expr)` failure into the check facility.
///
/// The function name is unknown and reported as `?`.
///
/// # Safety
/// Each string pointer must be null or point to a NUL-terminated string.
pub unsafe fn c_assert(file: *const c_char, line: c_int, assertion: *const c_char) -> ! {
    let (file, assertion) = unsafe { (c_str(file), c_str(assertion)) };
    report_c_failure(file, line, assertion, "?")
}

fn report_c_failure(file: &str, line: c_int, condition: &str, function: &str) -> ! {
    match u32::try_from(line) {
        Ok(line) => assert_failed(&AssertionEvent::new(file, line, condition, function)),
        Err(_) => assert_failed(
            &AssertionEvent::new(file, 0, condition, function)
                .with_message(format_args!("invalid line {}", line)),
        ),
    }
}

unsafe fn c_str<'a>(ptr: *const c_char) -> &'a str {
    if ptr.is_null() {
        return "?";
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .unwrap_or("<invalid utf-8>")
}

/// Emits `#[no_mangle]` C symbols `<prefix>_posix_memalign`, `<prefix>_aligned_free`,
/// `<prefix>__assert_fail` and `<prefix>__assert`.
///
/// ```ignore
/// krt::export_c_shims!(rt);
/// // int rt_posix_memalign(void **memptr, size_t alignment, size_t size);
/// // void rt_aligned_free(void *ptr);
/// // void rt__assert_fail(const char *, const char *, int, const char *);
/// // void rt__assert(const char *, int, const char *);
/// ```
#[macro_export]
macro_rules! export_c_shims {
    ($prefix:ident) => {
        $crate::paste::paste! {
            /// # Safety
            /// `memptr` must be null or valid for a pointer-sized write.
            #[no_mangle]
            pub unsafe extern "C" fn [<$prefix _posix_memalign>](
                memptr: *mut *mut core::ffi::c_void,
                alignment: usize,
                size: usize,
            ) -> core::ffi::c_int {
                unsafe { $crate::ffi::c_posix_memalign(memptr, alignment, size) }
            }

            /// # Safety
            /// `ptr` must be null or a live block from the matching `posix_memalign`.
            #[no_mangle]
            pub unsafe extern "C" fn [<$prefix _aligned_free>](ptr: *mut core::ffi::c_void) {
                unsafe { $crate::ffi::c_aligned_free(ptr) }
            }

            /// # Safety
            /// Each string pointer must be null or NUL-terminated.
            #[no_mangle]
            pub unsafe extern "C" fn [<$prefix __assert_fail>](
                assertion: *const core::ffi::c_char,
                file: *const core::ffi::c_char,
                line: core::ffi::c_int,
                function: *const core::ffi::c_char,
            ) -> ! {
                unsafe { $crate::ffi::c_assert_fail(assertion, file, line, function) }
            }

            /// # Safety
            /// Each string pointer must be null or NUL-terminated.
            #[no_mangle]
            pub unsafe extern "C" fn [<$prefix __assert>](
                file: *const core::ffi::c_char,
                line: core::ffi::c_int,
                assertion: *const core::ffi::c_char,
            ) -> ! {
                unsafe { $crate::ffi::c_assert(file, line, assertion) }
            }
        }
    };
}
