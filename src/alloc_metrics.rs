// alloc_metrics.rs
//
// Lightweight counters for the aligned allocation shim.
// Intended for leak hunting and diagnostics; relaxed atomics keep the hot path cheap.
//
// Build with `features = ["alloc-metrics"]` to enable counters.

#[cfg(feature = "alloc-metrics")]
mod imp {
    use core::sync::atomic::{AtomicU64, Ordering};

    #[repr(C)]
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct AllocMetrics {
        pub aligned_alloc_ok: u64,
        pub aligned_alloc_failed: u64,
        pub aligned_alloc_rejected: u64,
        pub aligned_free: u64,
        pub overhead_bytes: u64,
    }

    impl AllocMetrics {
        /// Blocks handed out and not yet released.
        #[inline]
        pub fn live_blocks(&self) -> u64 {
            self.aligned_alloc_ok.saturating_sub(self.aligned_free)
        }
    }

    static ALLOC_OK: AtomicU64 = AtomicU64::new(0);
    static ALLOC_FAILED: AtomicU64 = AtomicU64::new(0);
    static ALLOC_REJECTED: AtomicU64 = AtomicU64::new(0);
    static FREE: AtomicU64 = AtomicU64::new(0);
    static OVERHEAD_BYTES: AtomicU64 = AtomicU64::new(0);

    #[inline]
    pub fn reset_alloc_metrics() {
        ALLOC_OK.store(0, Ordering::Relaxed);
        ALLOC_FAILED.store(0, Ordering::Relaxed);
        ALLOC_REJECTED.store(0, Ordering::Relaxed);
        FREE.store(0, Ordering::Relaxed);
        OVERHEAD_BYTES.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn snapshot_alloc_metrics() -> AllocMetrics {
        AllocMetrics {
            aligned_alloc_ok: ALLOC_OK.load(Ordering::Relaxed),
            aligned_alloc_failed: ALLOC_FAILED.load(Ordering::Relaxed),
            aligned_alloc_rejected: ALLOC_REJECTED.load(Ordering::Relaxed),
            aligned_free: FREE.load(Ordering::Relaxed),
            overhead_bytes: OVERHEAD_BYTES.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn inc_aligned_alloc_ok(overhead: usize) {
        ALLOC_OK.fetch_add(1, Ordering::Relaxed);
        OVERHEAD_BYTES.fetch_add(overhead as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_aligned_alloc_failed() {
        ALLOC_FAILED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_aligned_alloc_rejected() {
        ALLOC_REJECTED.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_aligned_free() {
        FREE.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(not(feature = "alloc-metrics"))]
mod imp {
    #[repr(C)]
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct AllocMetrics {
        pub aligned_alloc_ok: u64,
        pub aligned_alloc_failed: u64,
        pub aligned_alloc_rejected: u64,
        pub aligned_free: u64,
        pub overhead_bytes: u64,
    }

    impl AllocMetrics {
        #[inline]
        pub fn live_blocks(&self) -> u64 {
            0
        }
    }

    #[inline]
    pub fn reset_alloc_metrics() {}

    #[inline]
    pub fn snapshot_alloc_metrics() -> AllocMetrics {
        AllocMetrics::default()
    }

    #[inline]
    pub(crate) fn inc_aligned_alloc_ok(_overhead: usize) {}

    #[inline]
    pub(crate) fn inc_aligned_alloc_failed() {}

    #[inline]
    pub(crate) fn inc_aligned_alloc_rejected() {}

    #[inline]
    pub(crate) fn inc_aligned_free() {}
}

pub use imp::*;
