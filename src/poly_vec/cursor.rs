use core::{
    cmp::Ordering,
    fmt,
    ops::{Add, AddAssign, Deref, Sub, SubAssign},
    ptr,
};

use polyvec_internals::allocator::{Allocator, Global};

use crate::{DelegateCloning, PolyVec, cloning::ClonePolicy};

/// A position in a [`PolyVec`], with random-access arithmetic.
///
/// A cursor is a pair of a shared reference to the container and a slot
/// index. Positions from `0` to `len()` are meaningful, `len()` being the end
/// position; arithmetic may move a cursor anywhere, but dereferencing a cursor
/// that is not on an element panics.
///
/// Since the cursor borrows the container, it cannot outlive a mutation. Use
/// [`position`](Cursor::position) to pass its place to a mutating operation.
///
/// ```
/// use core::any::Any;
///
/// use polyvec::PolyVec;
///
/// let mut values = PolyVec::<dyn Any>::new();
/// values.push(1u8)?;
/// values.push(2u16)?;
/// values.push(3u32)?;
///
/// let mut cursor = values.begin();
/// cursor += 2;
/// assert_eq!(cursor.downcast_ref::<u32>(), Some(&3));
/// assert_eq!(values.end() - cursor, 1);
/// assert_eq!(cursor - 1, values.cursor(1));
/// # Ok::<(), polyvec::Error>(())
/// ```
pub struct Cursor<'a, B: ?Sized + 'static, P: ClonePolicy<B> = DelegateCloning, A: Allocator = Global>
{
    vec: &'a PolyVec<B, P, A>,
    position: usize,
}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Cursor<'a, B, P, A> {
    pub(crate) fn new(vec: &'a PolyVec<B, P, A>, position: usize) -> Self {
        Self { vec, position }
    }

    /// The slot index the cursor is at.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The container the cursor points into.
    #[inline]
    pub fn container(&self) -> &'a PolyVec<B, P, A> {
        self.vec
    }

    /// Whether the cursor is at or past the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.position >= self.vec.len()
    }

    /// The element under the cursor, or [`None`] at or past the end.
    #[inline]
    pub fn get(&self) -> Option<&'a B> {
        self.vec.get(self.position)
    }

    /// The element under the cursor, if it has the concrete type `T`.
    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&'a T> {
        self.vec.downcast_ref(self.position)
    }

    /// Advances the cursor by one slot.
    #[inline]
    pub fn move_next(&mut self) {
        *self += 1;
    }

    /// Moves the cursor back by one slot.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at position 0.
    #[inline]
    pub fn move_prev(&mut self) {
        *self -= 1;
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Clone for Cursor<'_, B, P, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Copy for Cursor<'_, B, P, A> {}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Deref for Cursor<'_, B, P, A> {
    type Target = B;

    fn deref(&self) -> &B {
        match self.get() {
            Some(element) => element,
            None => panic!(
                "cannot dereference a cursor at position {} of a container of length {}",
                self.position,
                self.vec.len()
            ),
        }
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> AddAssign<usize>
    for Cursor<'_, B, P, A>
{
    fn add_assign(&mut self, rhs: usize) {
        self.position = match self.position.checked_add(rhs) {
            Some(position) => position,
            None => panic!("cursor position overflow"),
        };
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> SubAssign<usize>
    for Cursor<'_, B, P, A>
{
    fn sub_assign(&mut self, rhs: usize) {
        self.position = match self.position.checked_sub(rhs) {
            Some(position) => position,
            None => panic!(
                "cannot move a cursor at position {} back by {rhs}",
                self.position
            ),
        };
    }
}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Add<usize> for Cursor<'a, B, P, A> {
    type Output = Self;

    fn add(mut self, rhs: usize) -> Self {
        self += rhs;
        self
    }
}

impl<'a, B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Sub<usize> for Cursor<'a, B, P, A> {
    type Output = Self;

    fn sub(mut self, rhs: usize) -> Self {
        self -= rhs;
        self
    }
}

/// The signed distance between two cursors.
///
/// # Panics
///
/// Panics if the cursors point into different containers.
impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Sub for Cursor<'_, B, P, A> {
    type Output = isize;

    fn sub(self, rhs: Self) -> isize {
        assert!(
            ptr::eq(self.vec, rhs.vec),
            "cannot measure the distance between cursors of different containers"
        );
        // Positions fit in `isize`: no container holds more slots than that.
        self.position.wrapping_sub(rhs.position).cast_signed()
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> PartialEq for Cursor<'_, B, P, A> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.vec, other.vec) && self.position == other.position
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> Eq for Cursor<'_, B, P, A> {}

/// Cursors into different containers are unordered.
impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> PartialOrd for Cursor<'_, B, P, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        ptr::eq(self.vec, other.vec).then(|| self.position.cmp(&other.position))
    }
}

impl<B: ?Sized + 'static, P: ClonePolicy<B>, A: Allocator> fmt::Debug for Cursor<'_, B, P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("container", &ptr::from_ref(self.vec))
            .field("position", &self.position)
            .field("len", &self.vec.len())
            .finish()
    }
}
