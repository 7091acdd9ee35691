#[cfg(feature = "naive-memalign")]
mod naive_memalign_spec {
    use core::ptr;

    use krt::aligned::IGNORES_ALIGNMENT;
    use krt::{free_aligned_in, posix_memalign_in};
    use krt_tests::CountingAllocator;

    #[test]
    fn alignment_argument_is_ignored() {
        assert!(IGNORES_ALIGNMENT);
        let heap = CountingAllocator::new();
        for alignment in [0usize, 3, 16, 4096] {
            let mut p = ptr::null_mut();
            assert_eq!(posix_memalign_in(&heap, &mut p, alignment, 100), 0);
            assert_eq!(heap.live_bytes(), 100 + 2 * core::mem::size_of::<usize>());
            unsafe { free_aligned_in(&heap, p) };
        }
        assert_eq!(heap.allocs(), 4);
        assert_eq!(heap.deallocs(), 4);
    }
}
