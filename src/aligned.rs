// Copyright (c) 2026 Exveria
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aligned allocation on top of a plain `malloc`-style [`Allocator`].
//!
//! Every block is over-allocated and carries a header (true base pointer and
//! length) directly below the address handed to the caller. The release path
//! reads it back to rebuild the original layout.
//!
//! With the `naive-memalign` feature the alignment argument is ignored: the shim
//! forwards only the size and returns the first byte after the header.

use core::alloc::Layout;
use core::mem::{self, ManuallyDrop};
use core::ptr::{self, NonNull};

use crate::alloc_metrics;
use crate::allocator::{try_alloc_layout, Allocator, GlobalAllocator, MALLOC_ALIGN};
use crate::ensure;
use crate::status::{AllocError, Errno, ESUCCESS};

/// True when the shim ignores the requested alignment.
pub const IGNORES_ALIGNMENT: bool = cfg!(feature = "naive-memalign");

#[derive(Clone, Copy)]
#[repr(C)]
struct BlockHeader {
    base: *mut u8,
    total: usize,
}

const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

/// Returns true when `alignment` satisfies the POSIX `posix_memalign` contract.
#[inline]
pub const fn is_valid_alignment(alignment: usize) -> bool {
    alignment.is_power_of_two() && alignment % mem::size_of::<*const ()>() == 0
}

#[inline]
fn check_alignment(alignment: usize) -> Result<(), AllocError> {
    ensure!(
        IGNORES_ALIGNMENT || is_valid_alignment(alignment),
        AllocError::InvalidAlignment,
        "alignment {} is not a power-of-two multiple of {}",
        alignment,
        mem::size_of::<*const ()>()
    );
    Ok(())
}

/// Bytes requested from the underlying allocator for one aligned block.
#[inline]
fn padded_len(alignment: usize, size: usize) -> Result<usize, AllocError> {
    let slack = if IGNORES_ALIGNMENT {
        0
    } else {
        alignment.saturating_sub(MALLOC_ALIGN)
    };
    size.checked_add(HEADER_SIZE)
        .and_then(|len| len.checked_add(slack))
        .ok_or(AllocError::OutOfMemory)
}

#[inline]
fn block_layout(total: usize) -> Result<Layout, AllocError> {
    Layout::from_size_align(total, MALLOC_ALIGN).map_err(|_| AllocError::OutOfMemory)
}

/// Offset from `base` of the first `alignment`-aligned address with room for a header.
#[inline]
fn user_offset(base: *mut u8, alignment: usize) -> usize {
    if IGNORES_ALIGNMENT {
        return HEADER_SIZE;
    }
    let first = base as usize + HEADER_SIZE;
    let aligned = (first + alignment - 1) & !(alignment - 1);
    aligned - base as usize
}

/// Allocates `size` bytes aligned to `alignment` from `alloc`.
///
/// Exactly one call reaches `alloc` unless the request is rejected up front. The
/// returned pointer must be released with [`free_aligned_in`] on the same allocator.
pub fn try_alloc_aligned<A: Allocator>(
    alloc: &A,
    alignment: usize,
    size: usize,
) -> Result<NonNull<u8>, AllocError> {
    check_alignment(alignment).inspect_err(|_| alloc_metrics::inc_aligned_alloc_rejected())?;

    let total = padded_len(alignment, size)?;
    let layout = block_layout(total)?;
    let base = match try_alloc_layout(alloc, layout) {
        Ok(base) => base.as_ptr(),
        Err(err) => {
            alloc_metrics::inc_aligned_alloc_failed();
            return Err(err);
        }
    };

    let offset = user_offset(base, alignment);
    debug_assert!(offset >= HEADER_SIZE && offset + size <= total);
    unsafe {
        let user = base.add(offset);
        user.sub(HEADER_SIZE)
            .cast::<BlockHeader>()
            .write_unaligned(BlockHeader { base, total });
        alloc_metrics::inc_aligned_alloc_ok(total - size);
        Ok(NonNull::new_unchecked(user))
    }
}

/// Releases a block returned by [`try_alloc_aligned`]. Null is ignored.
///
/// # Safety
/// `ptr` must be null or have come from [`try_alloc_aligned`] (or
/// [`posix_memalign_in`]) on `alloc`, and must not have been released already.
pub unsafe fn free_aligned_in<A: Allocator>(alloc: &A, ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    let header = unsafe { ptr.sub(HEADER_SIZE).cast::<BlockHeader>().read_unaligned() };
    debug_assert!(header.base <= ptr);
    alloc_metrics::inc_aligned_free();
    unsafe {
        alloc.dealloc(
            header.base,
            Layout::from_size_align_unchecked(header.total, MALLOC_ALIGN),
        )
    };
}

/// Status-code form of [`try_alloc_aligned`].
///
/// On success writes the block to `out` and returns `ESUCCESS`; on failure returns
/// `ENOMEM` or `EINVAL` and leaves `out` untouched.
pub fn posix_memalign_in<A: Allocator>(
    alloc: &A,
    out: &mut *mut u8,
    alignment: usize,
    size: usize,
) -> Errno {
    match try_alloc_aligned(alloc, alignment, size) {
        Ok(ptr) => {
            *out = ptr.as_ptr();
            ESUCCESS
        }
        Err(err) => err.errno(),
    }
}

/// [`posix_memalign_in`] on the global heap.
#[inline]
pub fn posix_memalign(out: &mut *mut u8, alignment: usize, size: usize) -> Errno {
    posix_memalign_in(&GlobalAllocator, out, alignment, size)
}

/// Releases a block returned by [`posix_memalign`].
///
/// # Safety
/// See [`free_aligned_in`].
#[inline]
pub unsafe fn free_aligned(ptr: *mut u8) {
    unsafe { free_aligned_in(&GlobalAllocator, ptr) }
}

/// Owned, zero-filled aligned region released on drop.
pub struct AlignedBuf<A: Allocator = GlobalAllocator> {
    ptr: NonNull<u8>,
    len: usize,
    alloc: ManuallyDrop<A>,
}

unsafe impl<A: Allocator + Send> Send for AlignedBuf<A> {}
unsafe impl<A: Allocator + Sync> Sync for AlignedBuf<A> {}

impl AlignedBuf<GlobalAllocator> {
    #[inline]
    pub fn try_new(alignment: usize, len: usize) -> Result<Self, AllocError> {
        Self::try_new_in(GlobalAllocator, alignment, len)
    }
}

impl<A: Allocator> AlignedBuf<A> {
    pub fn try_new_in(alloc: A, alignment: usize, len: usize) -> Result<Self, AllocError> {
        let ptr = try_alloc_aligned(&alloc, alignment, len)?;
        unsafe { ptr::write_bytes(ptr.as_ptr(), 0, len) };
        Ok(Self {
            ptr,
            len,
            alloc: ManuallyDrop::new(alloc),
        })
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gives up ownership without releasing the block.
    #[inline]
    pub fn into_raw_parts(self) -> (NonNull<u8>, usize, A) {
        let mut this = ManuallyDrop::new(self);
        let alloc = unsafe { ManuallyDrop::take(&mut this.alloc) };
        (this.ptr, this.len, alloc)
    }

    /// # Safety
    /// The parts must come from [`AlignedBuf::into_raw_parts`].
    #[inline]
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize, alloc: A) -> Self {
        Self {
            ptr,
            len,
            alloc: ManuallyDrop::new(alloc),
        }
    }
}

impl<A: Allocator> core::ops::Deref for AlignedBuf<A> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<A: Allocator> core::ops::DerefMut for AlignedBuf<A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<A: Allocator> Drop for AlignedBuf<A> {
    fn drop(&mut self) {
        unsafe {
            let alloc = ManuallyDrop::take(&mut self.alloc);
            free_aligned_in(&alloc, self.ptr.as_ptr());
        }
    }
}
