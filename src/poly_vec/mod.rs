//! The container and the types that borrow from it.
//!
//! - [`PolyVec`]: the owning container.
//! - [`Iter`] and [`IterMut`]: forward and backward iteration over the
//!   elements as the base type.
//! - [`Cursor`]: a position with random-access arithmetic, for code that
//!   needs to compute distances or step back and forth.

mod cursor;
mod iter;
mod owned;

pub use self::{
    cursor::Cursor,
    iter::{Iter, IterMut},
    owned::PolyVec,
};
