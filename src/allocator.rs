// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::alloc::Layout;
use core::ptr;
use core::ptr::NonNull;

use crate::status::AllocError;

/// Alignment every backend guarantees for a plain `malloc`-style request.
pub const MALLOC_ALIGN: usize = 2 * core::mem::size_of::<usize>();

/// The general-purpose heap the aligned shim sits on top of.
///
/// Implementations only need to honour `MALLOC_ALIGN`; stronger alignment is the
/// shim's job.
pub trait Allocator {
    /// # Safety
    /// `layout` must be valid.
    unsafe fn alloc(&self, layout: Layout) -> *mut u8;

    /// # Safety
    /// `layout` must be valid.
    /// The returned memory is zero-initialized.
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.alloc(layout) };
        if !ptr.is_null() {
            unsafe { ptr::write_bytes(ptr, 0, layout.size()) };
        }
        ptr
    }

    /// # Safety
    /// `ptr` must have been allocated by this allocator with the same `layout`.
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout);
}

impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        unsafe { (**self).alloc(layout) }
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        unsafe { (**self).alloc_zeroed(layout) }
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { (**self).dealloc(ptr, layout) }
    }
}

/// Fallible allocation helper that maps a null return to `AllocError::OutOfMemory`.
#[inline]
pub fn try_alloc_layout<A: Allocator>(alloc: &A, layout: Layout) -> Result<NonNull<u8>, AllocError> {
    let ptr = unsafe { alloc.alloc(layout) };
    NonNull::new(ptr).ok_or(AllocError::OutOfMemory)
}

/// The process heap exposed by the `alloc` crate.
#[derive(Copy, Clone, Debug, Default)]
pub struct GlobalAllocator;

impl Allocator for GlobalAllocator {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.size() == 0 {
            return dangling_for(layout);
        }
        unsafe { alloc::alloc::alloc(layout) }
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if layout.size() == 0 {
            return dangling_for(layout);
        }
        unsafe { alloc::alloc::alloc_zeroed(layout) }
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        unsafe { alloc::alloc::dealloc(ptr, layout) }
    }
}

#[inline]
fn dangling_for(layout: Layout) -> *mut u8 {
    ptr::null_mut::<u8>().wrapping_add(layout.align())
}
