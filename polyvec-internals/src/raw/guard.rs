//! Drop guards that keep a [`RawPolyVec`] consistent while elements are being
//! migrated.
//!
//! Migrations call into user code (clone implementations and destructors),
//! which can fail or panic at any point. Each guard records how far its
//! migration got, so that both the error path and unwinding leave the
//! container valid.

use core::{mem, mem::ManuallyDrop, ops::Range};

use super::RawPolyVec;
use crate::{
    TryReserveError,
    allocator::Allocator,
    index::{IndexEntry, IndexTable},
    policy::ClonePolicy,
    storage::RawStorage,
    util,
};

/// A replacement buffer and index table under construction.
///
/// The index table only lists elements that were completely written. Dropping
/// the guard drops those elements and frees both allocations.
pub(super) struct Staged<'a, B: ?Sized + 'static, M: Copy, A: Allocator> {
    /// Allocator of the container being migrated.
    alloc: &'a A,
    /// The new buffer.
    storage: RawStorage,
    /// Entries of the elements written to `storage` so far.
    index: IndexTable<B, M>,
}

impl<'a, B: ?Sized + 'static, M: Copy, A: Allocator> Staged<'a, B, M, A> {
    /// Allocates an empty buffer and index table.
    pub(super) fn allocate(
        alloc: &'a A,
        elements: usize,
        bytes: usize,
        align: usize,
    ) -> Result<Self, TryReserveError> {
        let storage = RawStorage::allocate(alloc, bytes, align)?;
        let index = match IndexTable::allocate(alloc, elements) {
            Ok(index) => index,
            Err(error) => {
                // SAFETY: The buffer came from `alloc` and holds no values.
                unsafe { storage.deallocate(alloc) };
                return Err(error);
            }
        };
        Ok(Self {
            alloc,
            storage,
            index,
        })
    }

    /// Moves every element of `storage` bitwise, keeping the offsets.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `index` describes `bytes_used` bytes of live elements in `storage`.
    /// 2. The staged buffer holds at least `bytes_used` bytes and the staged
    ///    table at least `index.len()` slots, and neither holds any element.
    /// 3. The caller treats the originals as moved out and never drops them.
    pub(super) unsafe fn relocate(
        &mut self,
        storage: &RawStorage,
        index: &IndexTable<B, M>,
        bytes_used: usize,
    ) {
        debug_assert!(self.index.len() == 0);
        // SAFETY: Both buffers hold at least `bytes_used` bytes and are
        // separate allocations.
        unsafe { storage.ptr().copy_to_nonoverlapping(self.storage.ptr(), bytes_used) };
        // SAFETY: The staged table has room for every entry.
        unsafe { index.copy_into(&mut self.index) };
    }

    /// Clones `source` to the entry's offset in the staged buffer and records
    /// the entry.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `entry` describes `source`, with metadata captured by `P`.
    /// 2. `entry.end()` is at most the staged byte capacity, the staged buffer
    ///    is aligned for the element, and the range is not occupied.
    /// 3. The staged table has a free slot.
    pub(super) unsafe fn clone_entry<P>(
        &mut self,
        entry: IndexEntry<B, M>,
        source: &B,
    ) -> Result<(), P::Error>
    where
        P: ClonePolicy<B, Meta = M>,
    {
        // SAFETY: The offset is within the staged buffer, guaranteed by the
        // caller.
        let destination = unsafe { self.storage.at(entry.offset()) };
        // SAFETY: The destination is valid, aligned and unoccupied, and lies in
        // a different buffer than `source`.
        unsafe { P::clone_element(entry.meta(), source, entry.vtable(), destination)? };
        // SAFETY: A free slot is guaranteed by the caller.
        unsafe { self.index.push(entry) };
        Ok(())
    }

    /// Hands out the completed buffer and index table.
    pub(super) fn finish(self) -> (RawStorage, IndexTable<B, M>) {
        let mut this = ManuallyDrop::new(self);
        (
            mem::replace(&mut this.storage, RawStorage::new()),
            mem::replace(&mut this.index, IndexTable::new()),
        )
    }
}

impl<B: ?Sized + 'static, M: Copy, A: Allocator> Drop for Staged<'_, B, M, A> {
    fn drop(&mut self) {
        let storage = mem::replace(&mut self.storage, RawStorage::new());
        let index = mem::replace(&mut self.index, IndexTable::new());
        for &entry in index.as_slice() {
            // SAFETY: Listed offsets lie within the staged buffer.
            let ptr = unsafe { storage.at(entry.offset()) };
            // SAFETY: Only completely written elements are listed.
            unsafe { entry.vtable().drop(ptr) };
        }
        // SAFETY: The buffer came from `alloc`, and every value was dropped.
        unsafe { storage.deallocate(self.alloc) };
        // SAFETY: The table came from `alloc`.
        unsafe { index.deallocate(self.alloc) };
    }
}

/// An erase in progress.
///
/// While the guard exists, the container's length covers only the elements
/// before the erased range, plus the survivors already moved into place. On
/// drop, the survivors that were not reached are appended back at their
/// current offsets.
pub(super) struct Settle<'a, B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> {
    /// The container being compacted.
    vec: &'a mut RawPolyVec<B, P, A>,
    /// Next erased entry to drop.
    erased: Range<usize>,
    /// Next survivor to place.
    read: usize,
    /// One past the last survivor.
    stop: usize,
}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Settle<'a, B, P, A> {
    /// Cuts `erased` and everything after it off the container.
    pub(super) fn detach(vec: &'a mut RawPolyVec<B, P, A>, erased: Range<usize>) -> Self {
        let stop = vec.len();
        // SAFETY: The entries before `erased.start` stay initialized.
        unsafe { vec.index.set_len(erased.start) };
        vec.bytes_used = vec.end_of_last();
        Self {
            vec,
            read: erased.end,
            erased,
            stop,
        }
    }

    /// Drops the erased elements.
    pub(super) fn drop_erased(&mut self) {
        while let Some(position) = self.erased.next() {
            // SAFETY: Detached entries are still initialized, and each one is
            // visited once.
            let entry = unsafe { self.vec.index.read(position) };
            // SAFETY: Entry offsets are at most the byte capacity.
            let ptr = unsafe { self.vec.storage.at(entry.offset()) };
            // SAFETY: The element is live and no longer reachable.
            unsafe { entry.vtable().drop(ptr) };
        }
    }

    /// Moves the survivors towards the front, in order.
    ///
    /// Relocating policies and overlapping moves copy bitwise. Otherwise the
    /// survivor is cloned into its new place and the original dropped. A
    /// failed clone stops the compaction; the guard then settles the rest.
    pub(super) fn compact(&mut self) -> Result<(), P::Error> {
        while self.read < self.stop {
            // SAFETY: Survivors past `read` are detached but initialized.
            let entry = unsafe { self.vec.index.read(self.read) };
            let layout = entry.vtable().layout();
            // The aligned position can never pass the current one, because
            // `bytes_used` never exceeds it and it is itself aligned.
            let offset =
                util::align_up(self.vec.bytes_used, layout.align()).unwrap_or(entry.offset());

            if offset == entry.offset() {
                self.place(entry);
                continue;
            }
            // SAFETY: Entry offsets are at most the byte capacity.
            let source = unsafe { self.vec.storage.at(entry.offset()) };
            // SAFETY: `offset` is below the survivor's own offset.
            let destination = unsafe { self.vec.storage.at(offset) };
            if P::RELOCATE || offset + layout.size() > entry.offset() {
                // SAFETY: Both ranges lie in the buffer, the destination is
                // free, and `copy` handles the overlap.
                unsafe { source.copy_to(destination, layout.size()) };
                self.place(entry.with_offset(offset));
            } else {
                // SAFETY: The survivor is a live element described by `entry`.
                let survivor = unsafe { entry.vtable().upcast(source).as_ref() };
                // SAFETY: The destination is free, aligned and does not overlap
                // the survivor.
                unsafe {
                    P::clone_element(entry.meta(), survivor, entry.vtable(), destination)?;
                }
                self.place(entry.with_offset(offset));
                // SAFETY: The original was cloned and is no longer reachable.
                unsafe { entry.vtable().drop(source) };
            }
        }
        Ok(())
    }

    /// Appends the survivor at `read`, now described by `entry`.
    fn place(&mut self, entry: IndexEntry<B, P::Meta>) {
        // SAFETY: The length is always below `read`, so the slot is free and
        // within capacity.
        unsafe { self.vec.index.push(entry) };
        self.vec.bytes_used = entry.end();
        self.read += 1;
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Drop for Settle<'_, B, P, A> {
    fn drop(&mut self) {
        while self.read < self.stop {
            // SAFETY: Survivors past `read` are detached but initialized, and
            // still live at their recorded offsets.
            let entry = unsafe { self.vec.index.read(self.read) };
            self.place(entry);
        }
    }
}
