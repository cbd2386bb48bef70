//! The element lifecycle engine.
//!
//! [`RawPolyVec`] owns a [`RawStorage`] byte buffer and an [`IndexTable`] and
//! keeps them consistent through every insertion, removal, growth and copy.
//!
//! # Safety Invariants
//!
//! Outside of the methods in this module (and the guards in `guard`) the
//! following holds:
//!
//! 1. For every entry `e` in the first `len` positions of the index table, the
//!    buffer holds an initialized value of the type `e.vtable` was created for,
//!    at `base + e.offset`, aligned for that type.
//! 2. Offsets never decrease with the index, and no two live values overlap.
//! 3. `bytes_used` is the end of the last live value, or 0 when empty, and is
//!    at most the byte capacity.
//! 4. Every live value's alignment is at most the buffer's alignment.
//! 5. `meta` of every entry was captured by `P` for the entry's type.

mod guard;
mod iter;

use core::{alloc::Layout, marker::PhantomData, mem, ops::Range, ptr::NonNull};

pub use self::iter::{RawIter, RawIterMut};
use self::guard::{Settle, Staged};
use crate::{
    RawError, TryReserveError,
    allocator::{Allocator, Global},
    element::{Element, ElementVtable},
    growth::Growth,
    index::{IndexEntry, IndexTable},
    policy::{Captures, ClonePolicy},
    storage::RawStorage,
    util,
};

/// A type-erased, contiguous container of elements viewed as `B`.
///
/// This is the unsafe core of `polyvec::PolyVec`. It provides the operations
/// with their failure guarantees but leaves configuration, logging and error
/// reporting to the façade crate.
pub struct RawPolyVec<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator = Global> {
    /// The element bytes.
    storage: RawStorage,
    /// One entry per live element.
    index: IndexTable<B, P::Meta>,
    /// End of the last live element.
    bytes_used: usize,
    /// Source of both the buffer and the index table.
    alloc: A,
    /// Marker to tell the compiler that we own values viewed as `B`.
    _owns: PhantomData<B>,
    /// Marker for the cloning policy, which is never stored.
    _policy: PhantomData<fn() -> P>,
}

// SAFETY: The container exclusively owns its elements, which can only be
// inserted when they coerce to `B` and are therefore `Send` whenever `B` is.
unsafe impl<B, P, A> Send for RawPolyVec<B, P, A>
where
    B: ?Sized + Send + 'static,
    P: ClonePolicy<B>,
    P::Meta: Send,
    A: Allocator + Send,
{
}

// SAFETY: Shared access only hands out `&B`, which is safe to share when `B`
// is `Sync`.
unsafe impl<B, P, A> Sync for RawPolyVec<B, P, A>
where
    B: ?Sized + Sync + 'static,
    P: ClonePolicy<B>,
    P::Meta: Sync,
    A: Allocator + Sync,
{
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> RawPolyVec<B, P, A> {
    /// Creates an empty container that allocates from `alloc`.
    ///
    /// Nothing is allocated until the first reservation or insertion.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            storage: RawStorage::new(),
            index: IndexTable::new(),
            bytes_used: 0,
            alloc,
            _owns: PhantomData,
            _policy: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the container holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of element slots in the index table.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Size of the byte buffer.
    #[inline]
    pub fn byte_capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Bytes from the buffer base to the end of the last element.
    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// Alignment guaranteed for the buffer base.
    #[inline]
    pub fn max_align(&self) -> usize {
        self.storage.align()
    }

    /// Base of the byte buffer.
    ///
    /// Dangling (but aligned) while nothing is allocated.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.storage.ptr().as_ptr()
    }

    /// The occupied part of the byte buffer, `[base, base + bytes_used)`.
    #[inline]
    pub fn as_ptr_range(&self) -> Range<*const u8> {
        // SAFETY: `bytes_used <= byte_capacity`, guaranteed by invariant 3.
        let end = unsafe { self.storage.at(self.bytes_used) };
        self.as_ptr()..end.as_ptr().cast_const()
    }

    /// The allocator the container draws from.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The vtable of the element at `index`.
    #[inline]
    pub fn vtable(&self, index: usize) -> Option<&'static ElementVtable<B>> {
        self.index.as_slice().get(index).map(|entry| entry.vtable())
    }

    /// Returns a reference to the element at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&B> {
        let entry = *self.index.as_slice().get(index)?;
        Some(self.element(entry))
    }

    /// Returns a mutable reference to the element at `index`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut B> {
        let entry = *self.index.as_slice().get(index)?;
        // SAFETY: The entry is live (invariant 1) and `&mut self` guarantees
        // exclusive access to it.
        Some(unsafe { self.element_ptr(entry).as_mut() })
    }

    /// Returns a reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `index < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &B {
        debug_assert!(index < self.len());
        // SAFETY: `index < len <= capacity` and the entry is initialized.
        let entry = unsafe { self.index.read(index) };
        self.element(entry)
    }

    /// Returns a mutable reference to the element at `index` without bounds
    /// checking.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `index < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut B {
        debug_assert!(index < self.len());
        // SAFETY: `index < len <= capacity` and the entry is initialized.
        let entry = unsafe { self.index.read(index) };
        // SAFETY: The entry is live and `&mut self` guarantees exclusive access.
        unsafe { self.element_ptr(entry).as_mut() }
    }

    /// Iterates over the elements in order.
    #[inline]
    pub fn iter(&self) -> RawIter<'_, B, P::Meta> {
        RawIter::new(self.storage.ptr(), self.index.as_slice())
    }

    /// Iterates mutably over the elements in order.
    #[inline]
    pub fn iter_mut(&mut self) -> RawIterMut<'_, B, P::Meta> {
        RawIterMut::new(self.storage.ptr(), self.index.as_slice())
    }

    /// Ensures room for at least `elements` elements and `bytes` bytes in a
    /// buffer aligned to at least `align`.
    ///
    /// Nothing happens if the current buffer already satisfies the request.
    /// Otherwise the buffer is replaced by one with exactly the requested
    /// capacities (but never smaller than the current ones), and all elements
    /// are migrated. On failure the container is unchanged.
    pub fn reserve(
        &mut self,
        elements: usize,
        bytes: usize,
        align: usize,
    ) -> Result<(), RawError<P::Error>> {
        let align = util::normalize_align(align);
        if elements <= self.capacity() && bytes <= self.byte_capacity() && align <= self.max_align()
        {
            return Ok(());
        }
        self.reallocate(
            elements.max(self.capacity()),
            bytes.max(self.byte_capacity()),
            align.max(self.max_align()),
        )
    }

    /// Appends `value`, growing with `growth` if needed.
    ///
    /// On failure the container is unchanged and `value` is dropped.
    pub fn push<T>(&mut self, value: T, growth: Growth) -> Result<&mut B, RawError<P::Error>>
    where
        T: Element<B>,
        P: Captures<B, T>,
    {
        self.push_with(move || value, growth)
    }

    /// Appends the value returned by `f`, growing with `growth` if needed.
    ///
    /// `f` is only called once room for the value exists. If growing fails,
    /// `f` is dropped without being called and the container is unchanged.
    pub fn push_with<T, F>(&mut self, f: F, growth: Growth) -> Result<&mut B, RawError<P::Error>>
    where
        T: Element<B>,
        P: Captures<B, T>,
        F: FnOnce() -> T,
    {
        let layout = Layout::new::<T>();
        let offset = util::align_up(self.bytes_used, layout.align())
            .ok_or(TryReserveError::CapacityOverflow)?;
        let end = offset
            .checked_add(layout.size())
            .ok_or(TryReserveError::CapacityOverflow)?;
        self.make_room(growth, end, layout.align())?;

        let entry = IndexEntry::new(offset, ElementVtable::new::<T>(), P::capture());
        let value = f();
        // SAFETY: `make_room` guarantees `end <= byte_capacity`.
        let slot = unsafe { self.storage.at(offset) }.cast::<T>();
        // SAFETY: The buffer is aligned to at least `align_of::<T>()` and the
        // offset is a multiple of that alignment. It lies after every live
        // element, so nothing is overwritten.
        unsafe { slot.write(value) };
        // SAFETY: `make_room` left a free index slot.
        unsafe { self.index.push(entry) };
        self.bytes_used = end;
        // SAFETY: The value was just written, and `&mut self` guarantees
        // exclusive access.
        Ok(unsafe { self.element_ptr(entry).as_mut() })
    }

    /// Inserts the value returned by `f` before position `index`.
    ///
    /// Later elements are shifted towards the end by a multiple of the buffer
    /// alignment. Growth has the same strong guarantee as
    /// [`push_with`](Self::push_with).
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_with<T, F>(
        &mut self,
        index: usize,
        f: F,
        growth: Growth,
    ) -> Result<&mut B, RawError<P::Error>>
    where
        T: Element<B>,
        P: Captures<B, T>,
        F: FnOnce() -> T,
    {
        let len = self.len();
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        if index == len {
            return self.push_with(f, growth);
        }

        let layout = Layout::new::<T>();
        let next = self.index.get(index);
        let previous_end = match index.checked_sub(1) {
            Some(previous) => self.index.get(previous).end(),
            None => 0,
        };
        let offset =
            util::align_up(previous_end, layout.align()).ok_or(TryReserveError::CapacityOverflow)?;
        let end = offset
            .checked_add(layout.size())
            .ok_or(TryReserveError::CapacityOverflow)?;
        let align = self.max_align().max(layout.align());
        let delta = util::align_up(end.saturating_sub(next.offset()), align)
            .ok_or(TryReserveError::CapacityOverflow)?;
        let required = self
            .bytes_used
            .checked_add(delta)
            .ok_or(TryReserveError::CapacityOverflow)?;
        self.make_room(growth, required, align)?;

        let entry = IndexEntry::new(offset, ElementVtable::new::<T>(), P::capture());
        let value = f();
        if delta > 0 {
            // SAFETY: Live offsets are at most the byte capacity.
            let source = unsafe { self.storage.at(next.offset()) };
            // SAFETY: `next.offset + delta <= required <= byte_capacity`.
            let destination = unsafe { self.storage.at(next.offset() + delta) };
            // SAFETY: The tail `[next.offset, bytes_used)` moved by `delta` ends
            // at `required <= byte_capacity`. `copy` handles the overlap, and a
            // bitwise move is valid for any Rust value. Since `delta` is a
            // multiple of the buffer alignment, every moved element stays
            // aligned.
            unsafe { source.copy_to(destination, self.bytes_used - next.offset()) };
            self.index.shift_offsets(index, delta);
        }
        // SAFETY: `end <= required <= byte_capacity`.
        let slot = unsafe { self.storage.at(offset) }.cast::<T>();
        // SAFETY: `[offset, end)` lies between the end of element `index - 1`
        // and the shifted start of element `index`, and is aligned for `T`.
        unsafe { slot.write(value) };
        // SAFETY: `make_room` left a free index slot, and `index < len`.
        unsafe { self.index.insert(index, entry) };
        self.bytes_used = required;
        // SAFETY: The value was just written, and `&mut self` guarantees
        // exclusive access.
        Ok(unsafe { self.element_ptr(entry).as_mut() })
    }

    /// Removes and drops the elements in `range`, then compacts the survivors.
    ///
    /// If migrating a survivor fails, the remaining survivors keep their
    /// current offsets: every survivor is still present exactly once and the
    /// length is reduced by the size of `range`.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or ends after `len`.
    pub fn erase(&mut self, range: Range<usize>) -> Result<(), RawError<P::Error>> {
        let Range { start, end } = range;
        let len = self.len();
        assert!(
            start <= end,
            "erase range starts at {start} but ends at {end}"
        );
        assert!(end <= len, "erase range end (is {end}) should be <= len (is {len})");
        if start == end {
            return Ok(());
        }

        let mut settle = Settle::detach(self, start..end);
        settle.drop_erased();
        settle.compact().map_err(RawError::Clone)
    }

    /// Removes and drops the last element, returning whether there was one.
    pub fn pop(&mut self) -> bool {
        let Some(last) = self.len().checked_sub(1) else {
            return false;
        };
        self.truncate(last);
        true
    }

    /// Drops every element from position `len` on.
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.len();
        if len >= old_len {
            return;
        }
        // SAFETY: The first `len` entries stay initialized.
        unsafe { self.index.set_len(len) };
        self.bytes_used = self.end_of_last();
        for position in len..old_len {
            // SAFETY: The entry was live until the length was reduced above, so
            // it is still initialized and no longer reachable.
            let entry = unsafe { self.index.read(position) };
            // SAFETY: Entry offsets are at most the byte capacity.
            let ptr = unsafe { self.storage.at(entry.offset()) };
            // SAFETY: The entry addressed a live value of its vtable's type,
            // which is dropped exactly once here.
            unsafe { entry.vtable().drop(ptr) };
        }
    }

    /// Drops every element, keeping the capacities.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Creates a deep copy with the same capacities and alignment.
    pub fn try_clone(&self) -> Result<Self, RawError<P::Error>>
    where
        A: Clone,
    {
        let alloc = self.alloc.clone();
        let mut staged = Staged::allocate(
            &alloc,
            self.capacity(),
            self.byte_capacity(),
            self.max_align(),
        )?;
        for &entry in self.index.as_slice() {
            // SAFETY: The staged buffer has the same capacities and alignment,
            // so the entry fits at the same offset, and it is not yet occupied
            // because offsets are visited in order.
            unsafe { staged.clone_entry::<P>(entry, self.element(entry)) }
                .map_err(RawError::Clone)?;
        }
        let (storage, index) = staged.finish();
        Ok(Self {
            storage,
            index,
            bytes_used: self.bytes_used,
            alloc,
            _owns: PhantomData,
            _policy: PhantomData,
        })
    }

    /// Replaces the contents with a deep copy of `source`.
    ///
    /// The current buffer is reused when it is large and aligned enough. On
    /// failure the container holds the elements copied so far.
    pub fn clone_from(&mut self, source: &Self) -> Result<(), RawError<P::Error>> {
        self.clear();
        self.reserve(source.len(), source.bytes_used, source.max_align())?;
        for &entry in source.index.as_slice() {
            // SAFETY: The reservation above guarantees room for the entry at
            // the same offset, in a buffer aligned at least like the source's.
            let destination = unsafe { self.storage.at(entry.offset()) };
            // SAFETY: `entry` describes the source element, and the destination
            // lies in a different buffer.
            unsafe {
                P::clone_element(
                    entry.meta(),
                    source.element(entry),
                    entry.vtable(),
                    destination,
                )
            }
            .map_err(RawError::Clone)?;
            // SAFETY: The reservation left an index slot for every source
            // element.
            unsafe { self.index.push(entry) };
            self.bytes_used = entry.end();
        }
        Ok(())
    }

    /// Moves the contents out, leaving an empty container without storage.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let alloc = self.alloc.clone();
        mem::replace(self, Self::new_in(alloc))
    }

    /// Makes room for one more element ending at `required_bytes` and aligned
    /// to `align`, growing with `growth`.
    fn make_room(
        &mut self,
        growth: Growth,
        required_bytes: usize,
        align: usize,
    ) -> Result<(), RawError<P::Error>> {
        let required_elements = self.len() + 1;
        if required_elements <= self.capacity()
            && required_bytes <= self.byte_capacity()
            && align <= self.max_align()
        {
            return Ok(());
        }
        let (elements, bytes) = growth.next(
            self.capacity(),
            self.byte_capacity(),
            required_elements,
            required_bytes,
        );
        self.reallocate(elements, bytes, align.max(self.max_align()))
    }

    /// Replaces the buffer and index table, migrating every element to the
    /// same offset in the new buffer.
    ///
    /// The old buffer is only released once every element is in place. If any
    /// migration fails, the partial copies and the new buffer are released and
    /// the container is unchanged.
    fn reallocate(
        &mut self,
        elements: usize,
        bytes: usize,
        align: usize,
    ) -> Result<(), RawError<P::Error>> {
        debug_assert!(elements >= self.len() && bytes >= self.bytes_used);
        let mut staged = Staged::allocate(&self.alloc, elements, bytes, align)?;
        if P::RELOCATE {
            // SAFETY: The staged buffer is at least `bytes_used` long and holds
            // at least `len` index slots. The old elements are not dropped
            // below.
            unsafe { staged.relocate(&self.storage, &self.index, self.bytes_used) };
        } else {
            for &entry in self.index.as_slice() {
                // SAFETY: The staged buffer is large and aligned enough for the
                // entry at its offset, and offsets are visited in order.
                unsafe { staged.clone_entry::<P>(entry, self.element(entry)) }
                    .map_err(RawError::Clone)?;
            }
        }
        let (storage, index) = staged.finish();

        let old_storage = mem::replace(&mut self.storage, storage);
        let old_index = mem::replace(&mut self.index, index);
        if !P::RELOCATE {
            for &entry in old_index.as_slice() {
                // SAFETY: Entry offsets are at most the old byte capacity.
                let ptr = unsafe { old_storage.at(entry.offset()) };
                // SAFETY: The originals were cloned, not moved, and are no
                // longer reachable from the container.
                unsafe { entry.vtable().drop(ptr) };
            }
        }
        // SAFETY: The old buffer came from `self.alloc`, and no live values
        // remain in it.
        unsafe { old_storage.deallocate(&self.alloc) };
        // SAFETY: The old table came from `self.alloc`.
        unsafe { old_index.deallocate(&self.alloc) };
        Ok(())
    }

    /// End of the last live element, or 0.
    #[inline]
    fn end_of_last(&self) -> usize {
        self.index.as_slice().last().map_or(0, |entry| entry.end())
    }

    /// Pointer to the element described by `entry`.
    #[inline]
    fn element_ptr(&self, entry: IndexEntry<B, P::Meta>) -> NonNull<B> {
        // SAFETY: Entry offsets are at most the byte capacity.
        let ptr = unsafe { self.storage.at(entry.offset()) };
        entry.vtable().upcast(ptr)
    }

    /// Reference to the live element described by `entry`.
    #[inline]
    fn element(&self, entry: IndexEntry<B, P::Meta>) -> &B {
        // SAFETY: Callers only pass entries of live elements, which are
        // initialized values of the vtable's type (invariant 1).
        unsafe { self.element_ptr(entry).as_ref() }
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Drop for RawPolyVec<B, P, A> {
    fn drop(&mut self) {
        self.clear();
        let storage = mem::replace(&mut self.storage, RawStorage::new());
        let index = mem::replace(&mut self.index, IndexTable::new());
        // SAFETY: The buffer came from `self.alloc`, and every element was
        // dropped.
        unsafe { storage.deallocate(&self.alloc) };
        // SAFETY: The table came from `self.alloc`.
        unsafe { index.deallocate(&self.alloc) };
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator + Default> Default
    for RawPolyVec<B, P, A>
{
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<B, P, A> core::fmt::Debug for RawPolyVec<B, P, A>
where
    B: ?Sized + core::fmt::Debug + 'static,
    P: ClonePolicy<B>,
    A: Allocator,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::{any::Any, convert::Infallible, ptr::NonNull};

    use super::*;

    /// A relocating policy that can clone `u8` and `u64` only.
    struct Copying;

    // SAFETY: Values are copied by their concrete type, looked up by `TypeId`.
    unsafe impl ClonePolicy<dyn Any> for Copying {
        const NAME: &'static str = "Copying";
        const RELOCATE: bool = true;
        type Meta = ();
        type Error = Infallible;

        unsafe fn clone_element(
            _meta: (),
            source: &dyn Any,
            _vtable: &'static ElementVtable<dyn Any>,
            destination: NonNull<u8>,
        ) -> Result<(), Infallible> {
            if let Some(value) = source.downcast_ref::<u8>() {
                // SAFETY: The destination is valid for a `u8`.
                unsafe { destination.cast::<u8>().write(*value) };
            } else if let Some(value) = source.downcast_ref::<u64>() {
                // SAFETY: The destination is valid and aligned for a `u64`.
                unsafe { destination.cast::<u64>().write(*value) };
            } else {
                unreachable!("only u8 and u64 are captured")
            }
            Ok(())
        }
    }

    impl Captures<dyn Any, u8> for Copying {
        fn capture() {}
    }

    impl Captures<dyn Any, u64> for Copying {
        fn capture() {}
    }

    type Poly = RawPolyVec<dyn Any, Copying>;

    fn offsets(vec: &Poly) -> Vec<usize> {
        let base = vec.as_ptr().addr();
        vec.iter()
            .map(|element| (element as *const dyn Any).cast::<u8>().addr() - base)
            .collect()
    }

    #[test]
    fn test_new_is_empty() {
        let vec = Poly::new_in(Global);
        assert!(vec.is_empty());
        assert_eq!(vec.capacity(), 0);
        assert_eq!(vec.byte_capacity(), 0);
        assert_eq!(vec.max_align(), 1);
        assert_eq!(vec.bytes_used(), 0);
    }

    #[test]
    fn test_push_packs_and_aligns() {
        let mut vec = Poly::new_in(Global);
        vec.push(1u8, Growth::DEFAULT).unwrap();
        vec.push(2u64, Growth::DEFAULT).unwrap();
        vec.push(3u8, Growth::DEFAULT).unwrap();

        assert_eq!(offsets(&vec), [0, 8, 16]);
        assert_eq!(vec.bytes_used(), 17);
        assert_eq!(vec.max_align(), 8);
        assert_eq!(vec.get(1).unwrap().downcast_ref::<u64>(), Some(&2));
    }

    #[test]
    fn test_insert_shifts_by_alignment_multiple() {
        let mut vec = Poly::new_in(Global);
        vec.push(1u64, Growth::DEFAULT).unwrap();
        vec.push(2u64, Growth::DEFAULT).unwrap();
        vec.insert_with(1, || 9u8, Growth::DEFAULT).unwrap();

        assert_eq!(offsets(&vec), [0, 8, 16]);
        assert_eq!(vec.bytes_used(), 24);
        assert_eq!(vec.get(1).unwrap().downcast_ref::<u8>(), Some(&9));
        assert_eq!(vec.get(2).unwrap().downcast_ref::<u64>(), Some(&2));
    }

    #[test]
    fn test_erase_compacts() {
        let mut vec = Poly::new_in(Global);
        vec.push(1u8, Growth::DEFAULT).unwrap();
        vec.push(2u64, Growth::DEFAULT).unwrap();
        vec.push(3u8, Growth::DEFAULT).unwrap();
        vec.push(4u64, Growth::DEFAULT).unwrap();

        vec.erase(1..2).unwrap();
        assert_eq!(offsets(&vec), [0, 1, 8]);
        assert_eq!(vec.bytes_used(), 16);
        assert_eq!(vec.get(2).unwrap().downcast_ref::<u64>(), Some(&4));
    }

    #[test]
    fn test_reserve_is_exact_and_never_shrinks() {
        let mut vec = Poly::new_in(Global);
        vec.reserve(10, 100, 16).unwrap();
        assert_eq!(vec.capacity(), 10);
        assert_eq!(vec.byte_capacity(), 100);
        assert_eq!(vec.max_align(), 16);

        let base = vec.as_ptr();
        vec.reserve(5, 50, 8).unwrap();
        assert_eq!(vec.as_ptr(), base);
        assert_eq!(vec.capacity(), 10);
        assert_eq!(vec.byte_capacity(), 100);
    }

    #[test]
    fn test_pop_and_truncate() {
        let mut vec = Poly::new_in(Global);
        assert!(!vec.pop());
        vec.push(1u8, Growth::DEFAULT).unwrap();
        vec.push(2u64, Growth::DEFAULT).unwrap();
        let capacity = vec.capacity();

        assert!(vec.pop());
        assert_eq!(vec.bytes_used(), 1);
        vec.truncate(0);
        assert!(vec.is_empty());
        assert_eq!(vec.bytes_used(), 0);
        assert_eq!(vec.capacity(), capacity);
    }

    #[test]
    fn test_take_leaves_empty() {
        let mut vec = Poly::new_in(Global);
        vec.push(5u64, Growth::DEFAULT).unwrap();
        let taken = vec.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(vec.capacity(), 0);
        assert_eq!(vec.max_align(), 1);
    }
}
