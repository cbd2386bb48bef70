//! The index table: one descriptor per live element.
//!
//! This module encapsulates the fields of [`IndexEntry`] and [`IndexTable`].
//! Entries can only be created through [`IndexEntry::new`], which pairs an
//! offset with the vtable of the value written there.

use core::{alloc::Layout, ptr::NonNull};

use crate::{TryReserveError, allocator::Allocator, element::ElementVtable};

/// Locates one element in the byte buffer.
pub(crate) struct IndexEntry<B: ?Sized + 'static, M> {
    /// Offset of the element from the buffer base.
    offset: usize,
    /// Vtable of the element's concrete type.
    vtable: &'static ElementVtable<B>,
    /// Data captured by the cloning policy at insertion time.
    meta: M,
}

impl<B: ?Sized + 'static, M: Copy> Clone for IndexEntry<B, M> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized + 'static, M: Copy> Copy for IndexEntry<B, M> {}

impl<B: ?Sized + 'static, M: Copy> IndexEntry<B, M> {
    /// Creates a new entry.
    #[inline]
    pub(crate) fn new(offset: usize, vtable: &'static ElementVtable<B>, meta: M) -> Self {
        Self {
            offset,
            vtable,
            meta,
        }
    }

    /// Offset of the element from the buffer base.
    #[inline]
    pub(crate) fn offset(self) -> usize {
        self.offset
    }

    /// One past the last byte of the element.
    #[inline]
    pub(crate) fn end(self) -> usize {
        self.offset + self.vtable.layout().size()
    }

    /// Vtable of the element's concrete type.
    #[inline]
    pub(crate) fn vtable(self) -> &'static ElementVtable<B> {
        self.vtable
    }

    /// Data captured by the cloning policy.
    #[inline]
    pub(crate) fn meta(self) -> M {
        self.meta
    }

    /// The same entry, placed at another offset.
    #[inline]
    pub(crate) fn with_offset(self, offset: usize) -> Self {
        Self { offset, ..self }
    }
}

/// A growable-by-replacement array of [`IndexEntry`] values.
///
/// Like [`RawStorage`](crate::storage::RawStorage), the table does not free
/// itself.
#[must_use]
pub(crate) struct IndexTable<B: ?Sized + 'static, M> {
    /// Start of the entry array.
    ///
    /// # Safety
    ///
    /// 1. If `capacity > 0`, the pointer was returned by an allocator for
    ///    `Layout::array::<IndexEntry<B, M>>(capacity)`.
    /// 2. The first `len` entries are initialized.
    ptr: NonNull<IndexEntry<B, M>>,
    /// Number of initialized entries.
    len: usize,
    /// Number of entries the array has room for.
    capacity: usize,
}

impl<B: ?Sized + 'static, M: Copy> IndexTable<B, M> {
    /// Creates a table that owns no memory.
    pub(crate) const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: 0,
        }
    }

    /// Allocates an empty table with room for `capacity` entries.
    pub(crate) fn allocate<A: Allocator>(
        alloc: &A,
        capacity: usize,
    ) -> Result<Self, TryReserveError> {
        if capacity == 0 {
            return Ok(Self::new());
        }
        let layout = Layout::array::<IndexEntry<B, M>>(capacity)
            .map_err(|_| TryReserveError::CapacityOverflow)?;
        let ptr = alloc
            .allocate(layout)
            .ok_or(TryReserveError::AllocFailed { layout })?;
        Ok(Self {
            ptr: ptr.cast(),
            len: 0,
            capacity,
        })
    }

    /// Returns the table to the allocator.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `alloc` is the allocator (or a clone of it)
    /// the table was created from.
    pub(crate) unsafe fn deallocate<A: Allocator>(self, alloc: &A) {
        if self.capacity == 0 {
            return;
        }
        // SAFETY: The same layout computation succeeded during allocation.
        let layout = unsafe {
            Layout::from_size_align_unchecked(
                self.capacity * size_of::<IndexEntry<B, M>>(),
                align_of::<IndexEntry<B, M>>(),
            )
        };
        // SAFETY: The pointer came from `alloc` with this layout.
        unsafe { alloc.deallocate(self.ptr.cast(), layout) }
    }

    /// Number of initialized entries.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of entries the array has room for.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// The initialized entries.
    #[inline]
    pub(crate) fn as_slice(&self) -> &[IndexEntry<B, M>] {
        // SAFETY: The first `len` entries are initialized, and the pointer is
        // non-null and aligned even when nothing is allocated.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the entry at `index`, which must be less than `len`.
    #[inline]
    pub(crate) fn get(&self, index: usize) -> IndexEntry<B, M> {
        self.as_slice()[index]
    }

    /// Reads the entry at `index` regardless of `len`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `index < capacity` and that the entry at
    /// `index` was written and not overwritten since.
    #[inline]
    pub(crate) unsafe fn read(&self, index: usize) -> IndexEntry<B, M> {
        debug_assert!(index < self.capacity);
        // SAFETY: `index < capacity` is guaranteed by the caller.
        let slot = unsafe { self.ptr.add(index) };
        // SAFETY: The entry was written, guaranteed by the caller.
        unsafe { slot.read() }
    }

    /// Writes the entry at `index` regardless of `len`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `index < capacity`.
    #[inline]
    pub(crate) unsafe fn write(&mut self, index: usize, entry: IndexEntry<B, M>) {
        debug_assert!(index < self.capacity);
        // SAFETY: `index < capacity` is guaranteed by the caller.
        let slot = unsafe { self.ptr.add(index) };
        // SAFETY: The slot lies within the allocation. Entries are `Copy`, so
        // nothing is leaked by overwriting.
        unsafe { slot.write(entry) }
    }

    /// Sets the number of initialized entries.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `len <= capacity` and that the first `len`
    /// entries are initialized.
    #[inline]
    pub(crate) unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.capacity);
        self.len = len;
    }

    /// Appends an entry.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `len < capacity`.
    #[inline]
    pub(crate) unsafe fn push(&mut self, entry: IndexEntry<B, M>) {
        // SAFETY: `len < capacity` is guaranteed by the caller.
        unsafe { self.write(self.len, entry) };
        self.len += 1;
    }

    /// Inserts an entry before position `index`, shifting later entries back.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `len < capacity` and `index <= len`.
    pub(crate) unsafe fn insert(&mut self, index: usize, entry: IndexEntry<B, M>) {
        debug_assert!(index <= self.len && self.len < self.capacity);
        let tail = self.len - index;
        // SAFETY: `index <= len < capacity`.
        let src = unsafe { self.ptr.add(index) };
        // SAFETY: `index + 1 <= capacity`.
        let dst = unsafe { src.add(1) };
        // SAFETY: Both ranges lie within the allocation because
        // `len + 1 <= capacity`; `copy` handles the overlap.
        unsafe { src.copy_to(dst, tail) };
        // SAFETY: `index < capacity`, as shown above.
        unsafe { self.write(index, entry) };
        self.len += 1;
    }

    /// Copies all initialized entries into the empty table `target`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `target.capacity() >= self.len()`.
    pub(crate) unsafe fn copy_into(&self, target: &mut Self) {
        debug_assert!(target.capacity >= self.len);
        // SAFETY: The source holds `len` initialized entries, the target has
        // room for them, and the two tables are distinct allocations.
        unsafe { self.ptr.copy_to_nonoverlapping(target.ptr, self.len) };
        target.len = self.len;
    }

    /// Adds `delta` to the offset of every entry from `from` on.
    pub(crate) fn shift_offsets(&mut self, from: usize, delta: usize) {
        for index in from..self.len {
            // SAFETY: `index < len <= capacity`, and the entry is initialized.
            let entry = unsafe { self.read(index) };
            let shifted = entry.with_offset(entry.offset + delta);
            // SAFETY: As above.
            unsafe { self.write(index, shifted) };
        }
    }
}
