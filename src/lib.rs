// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_std]

#[doc(hidden)]
pub extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod aligned;
pub mod alloc_metrics;
pub mod allocator;
pub mod check;
pub mod ffi;
pub mod macros;
pub mod status;
pub mod trace;

pub use aligned::{
    free_aligned, free_aligned_in, posix_memalign, posix_memalign_in, try_alloc_aligned,
    AlignedBuf,
};
pub use alloc_metrics::{reset_alloc_metrics, snapshot_alloc_metrics, AllocMetrics};
pub use allocator::{Allocator, GlobalAllocator};
pub use check::{
    assert_failed, clear_assert_handler, set_assert_handler, AssertHandler, AssertionEvent,
    CHECKS_ACTIVE,
};
pub use paste;
pub use status::{
    AllocError, Errno, EINVAL, ENOMEM, ESUCCESS, NTSTATUS, STATUS_INSUFFICIENT_RESOURCES,
    STATUS_INVALID_PARAMETER, STATUS_SUCCESS,
};
pub use trace::{clear_trace_hook, set_trace_hook};
