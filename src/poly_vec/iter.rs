use core::iter::FusedIterator;

use polyvec_internals::{
    allocator::Allocator,
    raw::{RawIter, RawIterMut},
};

use crate::{DelegateCloning, PolyVec, cloning::ClonePolicy};

/// Iterator over the elements of a [`PolyVec`], created by [`PolyVec::iter`].
pub struct Iter<'a, B: ?Sized + 'static, P: ClonePolicy<B> = DelegateCloning> {
    raw: RawIter<'a, B, P::Meta>,
}

/// Mutable iterator over the elements of a [`PolyVec`], created by
/// [`PolyVec::iter_mut`].
pub struct IterMut<'a, B: ?Sized + 'static, P: ClonePolicy<B> = DelegateCloning> {
    raw: RawIterMut<'a, B, P::Meta>,
}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>> Iter<'a, B, P> {
    pub(crate) fn new(raw: RawIter<'a, B, P::Meta>) -> Self {
        Self { raw }
    }
}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>> IterMut<'a, B, P> {
    pub(crate) fn new(raw: RawIterMut<'a, B, P::Meta>) -> Self {
        Self { raw }
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> Clone for Iter<'_, B, P> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
        }
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> core::fmt::Debug for Iter<'_, B, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.raw.len())
            .finish()
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> core::fmt::Debug for IterMut<'_, B, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.raw.len())
            .finish()
    }
}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>> Iterator for Iter<'a, B, P> {
    type Item = &'a B;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.raw.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> DoubleEndedIterator for Iter<'_, B, P> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.raw.next_back()
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> ExactSizeIterator for Iter<'_, B, P> {}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> FusedIterator for Iter<'_, B, P> {}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>> Iterator for IterMut<'a, B, P> {
    type Item = &'a mut B;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.raw.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> DoubleEndedIterator for IterMut<'_, B, P> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.raw.next_back()
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> ExactSizeIterator for IterMut<'_, B, P> {}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> FusedIterator for IterMut<'_, B, P> {}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> IntoIterator
    for &'a PolyVec<B, P, A>
{
    type Item = &'a B;
    type IntoIter = Iter<'a, B, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> IntoIterator
    for &'a mut PolyVec<B, P, A>
{
    type Item = &'a mut B;
    type IntoIter = IterMut<'a, B, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
