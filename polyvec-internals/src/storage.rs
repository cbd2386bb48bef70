//! The raw byte buffer elements are placed in.
//!
//! This module encapsulates the fields of [`RawStorage`]. Since this is the only
//! place they are visible, a [`RawStorage`] with a non-zero capacity always
//! owns a block obtained from an [`Allocator`] with exactly the layout
//! described by its `capacity` and `align` fields.

use core::{alloc::Layout, ptr::NonNull};

use crate::{TryReserveError, allocator::Allocator, util};

/// An owned, untyped byte buffer.
///
/// [`RawStorage`] does not free itself: the owner must call
/// [`deallocate`](RawStorage::deallocate) with the allocator it was created
/// from.
#[must_use]
pub(crate) struct RawStorage {
    /// Base of the buffer.
    ///
    /// # Safety
    ///
    /// 1. If `capacity > 0`, the pointer was returned by an allocator for
    ///    `Layout::from_size_align(capacity, align)`.
    /// 2. If `capacity == 0`, the pointer is dangling but aligned to `align`.
    ptr: NonNull<u8>,
    /// Size of the buffer in bytes.
    capacity: usize,
    /// Alignment of the buffer base, always a power of two.
    align: usize,
}

impl RawStorage {
    /// Creates a buffer that owns no memory.
    pub(crate) const fn new() -> Self {
        Self {
            ptr: util::dangling(util::DEFAULT_ALIGNMENT),
            capacity: 0,
            align: util::DEFAULT_ALIGNMENT,
        }
    }

    /// Allocates a buffer of `capacity` bytes whose base is aligned to `align`.
    ///
    /// `align` must be a power of two. A zero capacity allocates nothing.
    pub(crate) fn allocate<A: Allocator>(
        alloc: &A,
        capacity: usize,
        align: usize,
    ) -> Result<Self, TryReserveError> {
        debug_assert!(align.is_power_of_two());
        if capacity == 0 {
            return Ok(Self {
                ptr: util::dangling(align),
                capacity: 0,
                align,
            });
        }
        let layout = Layout::from_size_align(capacity, align)
            .map_err(|_| TryReserveError::CapacityOverflow)?;
        let ptr = alloc
            .allocate(layout)
            .ok_or(TryReserveError::AllocFailed { layout })?;
        Ok(Self {
            ptr,
            capacity,
            align,
        })
    }

    /// Returns the buffer to the allocator.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `alloc` is the allocator (or a clone of it) the buffer was created
    ///    from.
    /// 2. No live values remain in the buffer that still need to be dropped.
    pub(crate) unsafe fn deallocate<A: Allocator>(self, alloc: &A) {
        if self.capacity == 0 {
            return;
        }
        // SAFETY: The layout was validated when the buffer was allocated.
        let layout = unsafe { Layout::from_size_align_unchecked(self.capacity, self.align) };
        // SAFETY: The pointer came from `alloc` with this layout, guaranteed by
        // the invariants on `ptr` and by the caller.
        unsafe { alloc.deallocate(self.ptr, layout) }
    }

    /// Base of the buffer.
    #[inline]
    pub(crate) fn ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Size of the buffer in bytes.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Alignment guaranteed for the buffer base.
    #[inline]
    pub(crate) fn align(&self) -> usize {
        self.align
    }

    /// Returns a pointer `offset` bytes into the buffer.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `offset <= self.capacity()`.
    #[inline]
    pub(crate) unsafe fn at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.capacity);
        // SAFETY: The offset stays within the buffer or one past its end, which
        // is guaranteed by the caller. For zero-capacity buffers the offset is
        // zero and the pointer is returned unchanged.
        unsafe { self.ptr.add(offset) }
    }
}
