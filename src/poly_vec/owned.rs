use core::{
    any::TypeId,
    fmt,
    ops::{Bound, Index, IndexMut, Range, RangeBounds},
};

use polyvec_internals::{
    MAX_NATURAL_ALIGNMENT, RawError, RawPolyVec, TryReserveError,
    allocator::{Allocator, Global},
    element::Element,
};
use tracing::{debug, trace};

use crate::{
    DelegateCloning, Error,
    cloning::{Captures, ClonePolicy},
    config,
    poly_vec::{Cursor, Iter, IterMut},
};

/// A vector of values of different concrete types, stored back to back in one
/// buffer and viewed as the base type `B`.
///
/// `B` is usually a trait object such as `dyn Shape`. Element types are made
/// insertable with [`impl_element!`](crate::impl_element). `P` is the
/// [cloning policy](crate::cloning) and `A` the allocator both the element
/// buffer and the index table are obtained from.
///
/// # Capacities
///
/// A container tracks two capacities: the number of element slots
/// ([`capacity`](Self::capacity)) and the size of the byte buffer
/// ([`capacities`](Self::capacities)). It also guarantees an alignment for the
/// buffer base ([`max_align`](Self::max_align)), which grows when an element
/// with a larger alignment is inserted. None of them shrinks unless the
/// container is [taken](Self::take) from.
///
/// # Failure guarantees
///
/// Insertion and reservation have the strong guarantee: on failure, including
/// a panicking clone, the container is exactly as before. Erasure has the basic
/// guarantee: on failure, every element that should survive is still present
/// exactly once, in order.
///
/// # Examples
///
/// ```
/// use polyvec::prelude::*;
///
/// trait Shape {
///     fn area(&self) -> f64;
/// }
///
/// #[derive(Clone)]
/// struct Square(f64);
///
/// #[derive(Clone)]
/// struct Circle(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
/// }
///
/// impl Shape for Circle {
///     fn area(&self) -> f64 {
///         3.0 * self.0 * self.0
///     }
/// }
///
/// impl_element!(dyn Shape: Square, Circle);
///
/// let mut shapes: PolyVec<dyn Shape> = PolyVec::new();
/// shapes.push(Square(2.0))?;
/// shapes.push(Circle(1.0))?;
///
/// let total: f64 = shapes.iter().map(|shape| shape.area()).sum();
/// assert_eq!(total, 7.0);
/// # Ok::<(), polyvec::Error>(())
/// ```
pub struct PolyVec<B: ?Sized + 'static, P: ClonePolicy<B> = DelegateCloning, A: Allocator = Global>
{
    raw: RawPolyVec<B, P, A>,
}

/// Capacities before an operation, to detect reallocation.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Capacities {
    elements: usize,
    bytes: usize,
    align: usize,
}

impl Capacities {
    fn of<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator>(raw: &RawPolyVec<B, P, A>) -> Self {
        Self {
            elements: raw.capacity(),
            bytes: raw.byte_capacity(),
            align: raw.max_align(),
        }
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>> PolyVec<B, P, Global> {
    /// Creates an empty container.
    ///
    /// Nothing is allocated until the first reservation or insertion. The new
    /// container has zero capacities and `max_align() == 1`.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> PolyVec<B, P, A> {
    /// Creates an empty container that allocates from `alloc`.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            raw: RawPolyVec::new_in(alloc),
        }
    }

    /// The number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the container holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The number of element slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// The element slot capacity and the byte capacity.
    #[inline]
    pub fn capacities(&self) -> (usize, usize) {
        (self.raw.capacity(), self.raw.byte_capacity())
    }

    /// The number of elements and the number of bytes from the buffer base to
    /// the end of the last element.
    #[inline]
    pub fn sizes(&self) -> (usize, usize) {
        (self.raw.len(), self.raw.bytes_used())
    }

    /// The alignment guaranteed for the buffer base.
    #[inline]
    pub fn max_align(&self) -> usize {
        self.raw.max_align()
    }

    /// The base of the byte buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.raw.as_ptr()
    }

    /// The occupied part of the byte buffer.
    #[inline]
    pub fn as_ptr_range(&self) -> Range<*const u8> {
        self.raw.as_ptr_range()
    }

    /// The allocator the container draws from.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.raw.allocator()
    }

    /// Returns the element at `index`, or [`None`] if out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&B> {
        self.raw.get(index)
    }

    /// Returns the element at `index` mutably, or [`None`] if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut B> {
        self.raw.get_mut(index)
    }

    /// Returns the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `index < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &B {
        // SAFETY: Guaranteed by the caller.
        unsafe { self.raw.get_unchecked(index) }
    }

    /// Returns the element at `index` mutably without bounds checking.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `index < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut B {
        // SAFETY: Guaranteed by the caller.
        unsafe { self.raw.get_unchecked_mut(index) }
    }

    /// Returns the element at `index`, or [`Error::OutOfRange`].
    pub fn at(&self, index: usize) -> Result<&B, Error> {
        let len = self.len();
        self.raw.get(index).ok_or(Error::OutOfRange { index, len })
    }

    /// Returns the element at `index` mutably, or [`Error::OutOfRange`].
    pub fn at_mut(&mut self, index: usize) -> Result<&mut B, Error> {
        let len = self.len();
        self.raw
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// The first element.
    #[inline]
    pub fn front(&self) -> Option<&B> {
        self.get(0)
    }

    /// The first element, mutably.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut B> {
        self.get_mut(0)
    }

    /// The last element.
    #[inline]
    pub fn back(&self) -> Option<&B> {
        self.get(self.len().checked_sub(1)?)
    }

    /// The last element, mutably.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut B> {
        let last = self.len().checked_sub(1)?;
        self.get_mut(last)
    }

    /// The [`TypeId`] of the concrete type of the element at `index`.
    #[inline]
    pub fn type_id_at(&self, index: usize) -> Option<TypeId> {
        Some(self.raw.vtable(index)?.type_id())
    }

    /// The name of the concrete type of the element at `index`.
    #[inline]
    pub fn type_name_at(&self, index: usize) -> Option<&'static str> {
        Some(self.raw.vtable(index)?.type_name())
    }

    /// Returns the element at `index` as its concrete type `T`.
    ///
    /// Returns [`None`] if out of bounds or if the element is not a `T`.
    pub fn downcast_ref<T: 'static>(&self, index: usize) -> Option<&T> {
        if self.type_id_at(index)? != TypeId::of::<T>() {
            return None;
        }
        let element: *const B = self.raw.get(index)?;
        // SAFETY: The element is a `T` stored at this address, since upcasting
        // keeps the address.
        Some(unsafe { &*element.cast::<T>() })
    }

    /// Returns the element at `index` mutably as its concrete type `T`.
    pub fn downcast_mut<T: 'static>(&mut self, index: usize) -> Option<&mut T> {
        if self.type_id_at(index)? != TypeId::of::<T>() {
            return None;
        }
        let element: *mut B = self.raw.get_mut(index)?;
        // SAFETY: The element is a `T` stored at this address, and the mutable
        // borrow of `self` makes the access exclusive.
        Some(unsafe { &mut *element.cast::<T>() })
    }

    /// Removes and drops the last element.
    ///
    /// Returns `false`, doing nothing, if the container is empty. Capacities
    /// are kept.
    #[doc(alias = "pop_back")]
    pub fn pop(&mut self) -> bool {
        self.raw.pop()
    }

    /// Drops every element from position `len` on.
    pub fn truncate(&mut self, len: usize) {
        self.raw.truncate(len);
    }

    /// Drops every element. Capacities are kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Exchanges the contents of two containers without moving any element.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Moves the contents out, leaving this container empty with zero
    /// capacities and `max_align() == 1`.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        Self {
            raw: self.raw.take(),
        }
    }

    /// Iterates over the elements in order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, B, P> {
        Iter::new(self.raw.iter())
    }

    /// Iterates mutably over the elements in order.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, B, P> {
        IterMut::new(self.raw.iter_mut())
    }

    /// A cursor at `position`.
    #[inline]
    pub fn cursor(&self, position: usize) -> Cursor<'_, B, P, A> {
        Cursor::new(self, position)
    }

    /// A cursor at the first element.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, B, P, A> {
        self.cursor(0)
    }

    /// A cursor at the end position, one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<'_, B, P, A> {
        self.cursor(self.len())
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> PolyVec<B, P, A>
where
    Error: From<P::Error>,
{
    /// Reserves room for `elements` elements of `bytes_per_element` bytes on
    /// average.
    ///
    /// The buffer is aligned to at least [`MAX_NATURAL_ALIGNMENT`] afterwards.
    /// Does nothing if the container is already large enough; never shrinks.
    /// A reallocation migrates the existing elements through the cloning
    /// policy, and on failure leaves the container unchanged.
    pub fn reserve(&mut self, elements: usize, bytes_per_element: usize) -> Result<(), Error> {
        let align = self.max_align().max(MAX_NATURAL_ALIGNMENT);
        self.reserve_aligned(elements, bytes_per_element, align)
    }

    /// Like [`reserve`](Self::reserve), with an explicit minimum alignment.
    ///
    /// Alignments that are not a power of two are rounded up to one.
    pub fn reserve_aligned(
        &mut self,
        elements: usize,
        bytes_per_element: usize,
        align: usize,
    ) -> Result<(), Error> {
        let bytes = elements
            .checked_mul(bytes_per_element)
            .ok_or(TryReserveError::CapacityOverflow)?;
        let before = Capacities::of(&self.raw);
        let result = self.raw.reserve(elements, bytes, align);
        self.settle("reserve", before, result)
    }

    /// Appends `value` and returns a reference to it.
    ///
    /// Grows according to [`config::growth`] when full. On failure the
    /// container is unchanged and `value` is dropped.
    #[doc(alias = "push_back")]
    pub fn push<T>(&mut self, value: T) -> Result<&mut B, Error>
    where
        T: Element<B>,
        P: Captures<B, T>,
    {
        self.push_with(move || value)
    }

    /// Appends the value returned by `f`, which is only called once room for
    /// it exists.
    #[doc(alias = "emplace_back")]
    pub fn push_with<T, F>(&mut self, f: F) -> Result<&mut B, Error>
    where
        T: Element<B>,
        P: Captures<B, T>,
        F: FnOnce() -> T,
    {
        let before = Capacities::of(&self.raw);
        let result = self.raw.push_with(f, config::growth()).map(|_| ());
        self.settle("push", before, result)?;
        let last = self.len() - 1;
        // SAFETY: The push succeeded, so `last` is a valid position.
        Ok(unsafe { self.raw.get_unchecked_mut(last) })
    }

    /// Inserts `value` before position `index` and returns a cursor at it.
    ///
    /// Later elements are shifted towards the end of the buffer. Has the same
    /// guarantees as [`push`](Self::push).
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert<T>(&mut self, index: usize, value: T) -> Result<Cursor<'_, B, P, A>, Error>
    where
        T: Element<B>,
        P: Captures<B, T>,
    {
        self.insert_with(index, move || value)
    }

    /// Inserts the value returned by `f` before position `index` and returns
    /// a cursor at it.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_with<T, F>(
        &mut self,
        index: usize,
        f: F,
    ) -> Result<Cursor<'_, B, P, A>, Error>
    where
        T: Element<B>,
        P: Captures<B, T>,
        F: FnOnce() -> T,
    {
        let before = Capacities::of(&self.raw);
        let result = self
            .raw
            .insert_with(index, f, config::growth())
            .map(|_| ());
        self.settle("insert", before, result)?;
        Ok(self.cursor(index))
    }

    /// Removes and drops the elements in `range`, moving later elements
    /// forward. Returns a cursor at the position the range started at, which
    /// now holds the first survivor after it.
    ///
    /// If moving a survivor fails, the error is returned and the survivors
    /// that were not moved stay where they are: the container holds exactly
    /// the elements outside `range`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn erase<R>(&mut self, range: R) -> Result<Cursor<'_, B, P, A>, Error>
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.len(),
        };
        let before = Capacities::of(&self.raw);
        let result = self.raw.erase(start..end);
        self.settle("erase", before, result)?;
        Ok(self.cursor(start))
    }

    /// Removes and drops the element at `index`, returning a cursor at the
    /// element that followed it.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<Cursor<'_, B, P, A>, Error> {
        let len = self.len();
        assert!(
            index < len,
            "removal index (is {index}) should be < len (is {len})"
        );
        self.erase(index..=index)
    }

    /// Creates a deep copy with the same capacities and alignment.
    pub fn try_clone(&self) -> Result<Self, Error>
    where
        A: Clone,
    {
        trace!(len = self.len(), "copying container");
        match self.raw.try_clone() {
            Ok(raw) => Ok(Self { raw }),
            Err(error) => {
                let error = <Error as From<RawError<P::Error>>>::from(error);
                debug!(operation = "try_clone", %error, "copy failed");
                Err(error)
            }
        }
    }

    /// Replaces the contents with a deep copy of `source`.
    ///
    /// The current storage is reused when it is large enough. On failure this
    /// container holds a prefix of `source`.
    pub fn clone_from_poly(&mut self, source: &Self) -> Result<(), Error> {
        trace!(len = source.len(), "copying container into existing storage");
        let before = Capacities::of(&self.raw);
        let result = self.raw.clone_from(&source.raw);
        self.settle("clone_from_poly", before, result)
    }

    /// Logs the outcome of a mutating operation and converts its error.
    fn settle(
        &self,
        operation: &'static str,
        before: Capacities,
        result: Result<(), RawError<P::Error>>,
    ) -> Result<(), Error> {
        match result {
            Ok(()) => {
                let after = Capacities::of(&self.raw);
                if after != before {
                    debug!(
                        operation,
                        old_capacity = before.elements,
                        new_capacity = after.elements,
                        old_byte_capacity = before.bytes,
                        new_byte_capacity = after.bytes,
                        max_align = after.align,
                        "reallocated storage"
                    );
                }
                Ok(())
            }
            Err(error) => {
                let error = <Error as From<RawError<P::Error>>>::from(error);
                debug!(operation, len = self.len(), %error, "operation failed");
                Err(error)
            }
        }
    }
}

impl<B: ?Sized + 'static, A: Allocator + Clone> Clone for PolyVec<B, DelegateCloning, A> {
    fn clone(&self) -> Self {
        trace!(len = self.len(), "copying container");
        match self.raw.try_clone() {
            Ok(raw) => Self { raw },
            Err(RawError::Reserve(error)) => error.handle(),
            Err(RawError::Clone(never)) => match never {},
        }
    }

    fn clone_from(&mut self, source: &Self) {
        trace!(len = source.len(), "copying container into existing storage");
        match self.raw.clone_from(&source.raw) {
            Ok(()) => {}
            Err(RawError::Reserve(error)) => error.handle(),
            Err(RawError::Clone(never)) => match never {},
        }
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator + Default> Default for PolyVec<B, P, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<B, P, A> fmt::Debug for PolyVec<B, P, A>
where
    B: ?Sized + fmt::Debug + 'static,
    P: ClonePolicy<B>,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<B, P, A> PartialEq for PolyVec<B, P, A>
where
    B: ?Sized + PartialEq + 'static,
    P: ClonePolicy<B>,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<B, P, A> Eq for PolyVec<B, P, A>
where
    B: ?Sized + Eq + 'static,
    P: ClonePolicy<B>,
    A: Allocator,
{
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Index<usize> for PolyVec<B, P, A> {
    type Output = B;

    fn index(&self, index: usize) -> &B {
        let len = self.len();
        match self.raw.get(index) {
            Some(element) => element,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> IndexMut<usize> for PolyVec<B, P, A> {
    fn index_mut(&mut self, index: usize) -> &mut B {
        let len = self.len();
        match self.raw.get_mut(index) {
            Some(element) => element,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}
