//! Iterators over the elements of a [`RawPolyVec`](super::RawPolyVec).

use core::{iter::FusedIterator, marker::PhantomData, ptr::NonNull, slice};

use crate::index::IndexEntry;

/// Iterator over `&B`, in index order.
pub struct RawIter<'a, B: ?Sized + 'static, M> {
    /// Base of the container's buffer.
    base: NonNull<u8>,
    /// Entries not yet yielded.
    entries: slice::Iter<'a, IndexEntry<B, M>>,
    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a B`
    _marker: PhantomData<&'a B>,
}

/// Iterator over `&mut B`, in index order.
pub struct RawIterMut<'a, B: ?Sized + 'static, M> {
    /// Base of the container's buffer.
    base: NonNull<u8>,
    /// Entries not yet yielded.
    entries: slice::Iter<'a, IndexEntry<B, M>>,
    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a mut B`
    _marker: PhantomData<&'a mut B>,
}

// SAFETY: The iterator only hands out `&B`.
unsafe impl<B: ?Sized + Sync + 'static, M: Sync> Send for RawIter<'_, B, M> {}
// SAFETY: As above.
unsafe impl<B: ?Sized + Sync + 'static, M: Sync> Sync for RawIter<'_, B, M> {}
// SAFETY: The iterator hands out `&mut B` to distinct elements, like
// `slice::IterMut`.
unsafe impl<B: ?Sized + Send + 'static, M: Sync> Send for RawIterMut<'_, B, M> {}
// SAFETY: Shared access to the iterator exposes no elements.
unsafe impl<B: ?Sized + Sync + 'static, M: Sync> Sync for RawIterMut<'_, B, M> {}

impl<'a, B: ?Sized + 'static, M: Copy> RawIter<'a, B, M> {
    /// Iterates over the elements described by `entries`.
    ///
    /// The caller (the container) must own live elements at every entry and
    /// keep them alive and unaliased by `&mut` for `'a`.
    pub(crate) fn new(base: NonNull<u8>, entries: &'a [IndexEntry<B, M>]) -> Self {
        Self {
            base,
            entries: entries.iter(),
            _marker: PhantomData,
        }
    }

    /// The element described by `entry`.
    #[inline]
    fn resolve(&self, entry: &IndexEntry<B, M>) -> &'a B {
        // SAFETY: Live offsets lie within the buffer starting at `base`.
        let ptr = unsafe { self.base.add(entry.offset()) };
        // SAFETY: The entry describes a live element in the buffer starting at
        // `base`, which outlives `'a` and is only shared during that time.
        unsafe { entry.vtable().upcast(ptr).as_ref() }
    }
}

impl<'a, B: ?Sized + 'static, M: Copy> RawIterMut<'a, B, M> {
    /// Iterates mutably over the elements described by `entries`.
    ///
    /// The caller (the container) must own live elements at every entry and
    /// grant exclusive access to them for `'a`.
    pub(crate) fn new(base: NonNull<u8>, entries: &'a [IndexEntry<B, M>]) -> Self {
        Self {
            base,
            entries: entries.iter(),
            _marker: PhantomData,
        }
    }

    /// The element described by `entry`.
    #[inline]
    fn resolve(&self, entry: &IndexEntry<B, M>) -> &'a mut B {
        // SAFETY: Live offsets lie within the buffer starting at `base`.
        let ptr = unsafe { self.base.add(entry.offset()) };
        // SAFETY: The entry describes a live element that no other entry
        // overlaps, and exclusive access to it was granted for `'a`. Every
        // entry is yielded at most once.
        unsafe { entry.vtable().upcast(ptr).as_mut() }
    }
}

impl<B: ?Sized + 'static, M> Clone for RawIter<'_, B, M> {
    fn clone(&self) -> Self {
        Self {
            base: self.base,
            entries: self.entries.clone(),
            _marker: PhantomData,
        }
    }
}

macro_rules! iterator_impls {
    ($name:ident, $item:ty) => {
        impl<'a, B: ?Sized + 'static, M: Copy> Iterator for $name<'a, B, M> {
            type Item = $item;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                let entry = self.entries.next()?;
                Some(self.resolve(entry))
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.entries.size_hint()
            }
        }

        impl<'a, B: ?Sized + 'static, M: Copy> DoubleEndedIterator for $name<'a, B, M> {
            #[inline]
            fn next_back(&mut self) -> Option<Self::Item> {
                let entry = self.entries.next_back()?;
                Some(self.resolve(entry))
            }
        }

        impl<'a, B: ?Sized + 'static, M: Copy> ExactSizeIterator for $name<'a, B, M> {}

        impl<'a, B: ?Sized + 'static, M: Copy> FusedIterator for $name<'a, B, M> {}
    };
}

iterator_impls!(RawIter, &'a B);
iterator_impls!(RawIterMut, &'a mut B);
