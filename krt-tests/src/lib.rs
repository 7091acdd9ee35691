// Test-only crate for exercising krt from a host environment.
#![no_std]

#[cfg(test)]
extern crate std;

use core::alloc::Layout;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use krt::{Allocator, GlobalAllocator};

/// Heap double that counts traffic and can be switched into an exhausted state.
#[derive(Default)]
pub struct CountingAllocator {
    allocs: AtomicUsize,
    deallocs: AtomicUsize,
    live_bytes: AtomicUsize,
    exhausted: AtomicBool,
}

impl CountingAllocator {
    pub const fn new() -> Self {
        Self {
            allocs: AtomicUsize::new(0),
            deallocs: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            exhausted: AtomicBool::new(false),
        }
    }

    pub fn set_exhausted(&self, exhausted: bool) {
        self.exhausted.store(exhausted, Ordering::Relaxed);
    }

    pub fn allocs(&self) -> usize {
        self.allocs.load(Ordering::Relaxed)
    }

    pub fn deallocs(&self) -> usize {
        self.deallocs.load(Ordering::Relaxed)
    }

    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }
}

impl Allocator for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.allocs.fetch_add(1, Ordering::Relaxed);
        if self.exhausted.load(Ordering::Relaxed) {
            return ptr::null_mut();
        }
        let ptr = unsafe { GlobalAllocator.alloc(layout) };
        if !ptr.is_null() {
            self.live_bytes.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.deallocs.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
        unsafe { GlobalAllocator.dealloc(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_counter_still_counts_calls() {
        let heap = CountingAllocator::new();
        heap.set_exhausted(true);
        let layout = Layout::from_size_align(8, 8).unwrap();
        assert!(unsafe { heap.alloc(layout) }.is_null());
        assert_eq!(heap.allocs(), 1);
        assert_eq!(heap.live_bytes(), 0);
    }
}
