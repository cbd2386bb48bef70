//! The allocation capability used by the container.
//!
//! Every byte a [`RawPolyVec`](crate::RawPolyVec) owns, both the element
//! buffer and the index table, is obtained from a single [`Allocator`] value
//! held by the container. The container is the only caller of that value and
//! returns every allocation before it is dropped.

use core::{alloc::Layout, ptr::NonNull};

/// A source of raw memory.
///
/// # Safety
///
/// Implementors must guarantee:
///
/// 1. A pointer returned by [`allocate`](Allocator::allocate) is valid for
///    reads and writes of `layout.size()` bytes, is aligned to
///    `layout.align()`, and does not alias any other live allocation.
/// 2. The memory stays valid until it is passed to
///    [`deallocate`](Allocator::deallocate) on the same allocator (or a clone
///    of it).
pub unsafe trait Allocator {
    /// Allocates a block of memory described by `layout`.
    ///
    /// Returns [`None`] when the request cannot be satisfied. The container
    /// never requests zero-sized blocks.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Returns a block of memory to the allocator.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` was returned by [`allocate`](Allocator::allocate) on this
    ///    allocator (or a clone of it) with the same `layout`.
    /// 2. The block has not been deallocated before.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: A shared reference hands out exactly the blocks of the allocator it
// points to.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: The requirements are forwarded unchanged to the caller.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// The global Rust allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: The global allocator upholds the allocator contract for every
// non-zero sized layout, and zero-sized layouts are rejected below.
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: The layout has a non-zero size, checked above.
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: The caller guarantees that the block came from `allocate` with
        // the same layout, which forwards to the global allocator.
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_round_trip() {
        let layout = Layout::from_size_align(64, 32).unwrap();
        let ptr = Global.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr().addr() % 32, 0);
        // SAFETY: The block was just allocated with this layout.
        unsafe { Global.deallocate(ptr, layout) };
    }

    #[test]
    fn test_global_rejects_zero_size() {
        let layout = Layout::from_size_align(0, 8).unwrap();
        assert!(Global.allocate(layout).is_none());
    }
}
