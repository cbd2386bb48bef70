//! Cloning policies.
//!
//! A [`PolyVec`](crate::PolyVec) erases the concrete types of its elements, so
//! it cannot call [`Clone::clone`] on them directly. The container's policy
//! parameter decides how elements are duplicated:
//!
//! | Policy | Requirement | Growth and erase |
//! |---|---|---|
//! | [`DelegateCloning`] (default) | every element type is [`Clone`] | relocate bitwise, never fail |
//! | [`VirtualCloning`] | the base type is [`CloneIntoSlot`] | clone into the new place, may fail |
//! | [`NoCloning`] | nothing | fail with [`Error::CloningUnsupported`] once elements must move |
//!
//! ```
//! use polyvec::prelude::*;
//!
//! trait Shape: CloneIntoSlot {
//!     fn area(&self) -> f64;
//! }
//!
//! #[derive(Clone)]
//! struct Square(f64);
//!
//! impl Shape for Square {
//!     fn area(&self) -> f64 {
//!         self.0 * self.0
//!     }
//! }
//!
//! impl CloneIntoSlot for Square {
//!     fn clone_into_slot<'a>(&self, slot: Slot<'a>) -> Result<Filled<'a>, CloneError> {
//!         slot.write(self.clone())
//!     }
//! }
//!
//! impl_element!(dyn Shape: Square);
//!
//! let mut shapes = PolyVec::<dyn Shape, VirtualCloning>::new();
//! shapes.push(Square(2.0))?;
//! let copy = shapes.try_clone()?;
//! assert_eq!(copy[0].area(), 4.0);
//! # Ok::<(), polyvec::Error>(())
//! ```
//!
//! Custom policies implement [`ClonePolicy`] and [`Captures`]. Their error type
//! must convert into [`Error`].

mod slot;

use core::{convert::Infallible, ptr::NonNull};

pub use polyvec_internals::policy::{Captures, ClonePolicy};
use polyvec_internals::element::{Element, ElementVtable};

pub use self::slot::{Filled, Slot};
use crate::{CloneError, Error};

/// Clones elements with the [`Clone`] implementation of their concrete type.
///
/// The clone function is captured when an element is inserted, so the base
/// type needs no cloning capability, but every inserted type must implement
/// [`Clone`]. Elements are relocated bitwise when the buffer grows or is
/// compacted, so those operations never fail.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct DelegateCloning;

/// Clones elements through the [`CloneIntoSlot`] capability of the base type.
///
/// Growth and compaction clone every moved element into its new place and
/// then drop the original, so a failing clone is reported by the operation
/// that triggered the move.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct VirtualCloning;

/// Refuses to clone.
///
/// Elements can be inserted as long as no existing element has to move:
/// growing a non-empty container, compacting after an erase and copying all
/// fail with [`Error::CloningUnsupported`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct NoCloning;

/// A base type whose values can clone themselves into a [`Slot`].
///
/// Implementations almost always forward to [`Slot::write`]:
///
/// ```
/// use polyvec::{CloneError, cloning::{CloneIntoSlot, Filled, Slot}};
///
/// #[derive(Clone)]
/// struct Circle(f64);
///
/// impl CloneIntoSlot for Circle {
///     fn clone_into_slot<'a>(&self, slot: Slot<'a>) -> Result<Filled<'a>, CloneError> {
///         slot.write(self.clone())
///     }
/// }
/// ```
///
/// To report a failure, return [`CloneError::new`] without writing. A value
/// written into the slot of a failed clone is leaked.
pub trait CloneIntoSlot {
    /// Writes a clone of `self` into `slot`.
    fn clone_into_slot<'a>(&self, slot: Slot<'a>) -> Result<Filled<'a>, CloneError>;
}

/// A clone function captured by [`DelegateCloning`].
///
/// Clones the value behind the first pointer into the uninitialized memory
/// behind the second. Both must be valid and aligned for the captured type.
type CloneFn = unsafe fn(NonNull<u8>, NonNull<u8>);

/// Clones the `T` at `source` into `destination`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `source` points to an initialized `T`.
/// 2. `destination` is valid for writes and aligned for `T`.
unsafe fn clone_as<T: Clone>(source: NonNull<u8>, destination: NonNull<u8>) {
    // SAFETY: `source` points to an initialized `T`, guaranteed by the caller.
    let value = unsafe { source.cast::<T>().as_ref() }.clone();
    // SAFETY: `destination` is valid and aligned, guaranteed by the caller.
    unsafe { destination.cast::<T>().write(value) };
}

// SAFETY: The captured function writes a clone of the source's concrete type,
// or panics before writing anything.
unsafe impl<B: ?Sized + 'static> ClonePolicy<B> for DelegateCloning {
    const NAME: &'static str = "DelegateCloning";
    const RELOCATE: bool = true;
    type Meta = CloneFn;
    type Error = Infallible;

    unsafe fn clone_element(
        meta: CloneFn,
        source: &B,
        _vtable: &'static ElementVtable<B>,
        destination: NonNull<u8>,
    ) -> Result<(), Infallible> {
        // SAFETY: `meta` was captured for the source's concrete type, whose
        // address is the address of `source`. The destination is valid and
        // aligned for it, guaranteed by the caller.
        unsafe { meta(NonNull::from(source).cast::<u8>(), destination) };
        Ok(())
    }
}

impl<B: ?Sized + 'static, T: Element<B> + Clone> Captures<B, T> for DelegateCloning {
    #[inline]
    fn capture() -> CloneFn {
        clone_as::<T>
    }
}

// SAFETY: A `Filled` proof can only come from `Slot::write` with the slot's
// exact type, so a successful clone leaves a value of the source's type.
unsafe impl<B: ?Sized + CloneIntoSlot + 'static> ClonePolicy<B> for VirtualCloning {
    const NAME: &'static str = "VirtualCloning";
    const RELOCATE: bool = false;
    type Meta = ();
    type Error = Error;

    unsafe fn clone_element(
        _meta: (),
        source: &B,
        vtable: &'static ElementVtable<B>,
        destination: NonNull<u8>,
    ) -> Result<(), Error> {
        // SAFETY: The destination is valid and aligned for the source's type,
        // which `vtable` describes, and is empty, guaranteed by the caller.
        let slot = unsafe { Slot::new(destination, vtable.type_id(), vtable.type_name()) };
        match source.clone_into_slot(slot) {
            Ok(_filled) => Ok(()),
            Err(source) => Err(Error::CloneFailed {
                type_name: vtable.type_name(),
                source,
            }),
        }
    }
}

impl<B: ?Sized + CloneIntoSlot + 'static, T: Element<B>> Captures<B, T> for VirtualCloning {
    #[inline]
    fn capture() {}
}

// SAFETY: Never writes anything.
unsafe impl<B: ?Sized + 'static> ClonePolicy<B> for NoCloning {
    const NAME: &'static str = "NoCloning";
    const RELOCATE: bool = false;
    type Meta = ();
    type Error = Error;

    unsafe fn clone_element(
        _meta: (),
        _source: &B,
        _vtable: &'static ElementVtable<B>,
        _destination: NonNull<u8>,
    ) -> Result<(), Error> {
        Err(Error::CloningUnsupported {
            policy: <Self as ClonePolicy<B>>::NAME,
        })
    }
}

impl<B: ?Sized + 'static, T: Element<B>> Captures<B, T> for NoCloning {
    #[inline]
    fn capture() {}
}

#[cfg(test)]
mod tests {
    use core::any::Any;

    use super::*;

    #[test]
    fn test_delegate_clone_fn() {
        let source = 0x1234_5678u32;
        let mut destination = 0u32;
        let clone = <DelegateCloning as Captures<dyn Any, u32>>::capture();
        // SAFETY: Both pointers are valid and aligned `u32`s.
        unsafe {
            clone(
                NonNull::from(&source).cast(),
                NonNull::from(&mut destination).cast(),
            );
        }
        assert_eq!(destination, source);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(<DelegateCloning as ClonePolicy<dyn Any>>::NAME, "DelegateCloning");
        assert_eq!(<VirtualCloning as ClonePolicy<dyn CloneIntoSlot>>::NAME, "VirtualCloning");
        assert_eq!(<NoCloning as ClonePolicy<dyn Any>>::NAME, "NoCloning");
        const {
            assert!(<DelegateCloning as ClonePolicy<dyn Any>>::RELOCATE);
            assert!(!<NoCloning as ClonePolicy<dyn Any>>::RELOCATE);
        }
    }
}
