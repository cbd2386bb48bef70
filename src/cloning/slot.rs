//! Typed, single-use destinations for [`CloneIntoSlot`](super::CloneIntoSlot).
//!
//! This module encapsulates the fields of [`Slot`] and [`Filled`]. A [`Filled`]
//! can only be obtained by writing a value of the slot's exact type, which is
//! what lets [`VirtualCloning`](super::VirtualCloning) trust a successful
//! [`clone_into_slot`](super::CloneIntoSlot::clone_into_slot).

use core::{
    any::{TypeId, type_name},
    marker::PhantomData,
    ptr::NonNull,
};

use crate::CloneError;

/// Makes a lifetime invariant, so that a [`Filled`] cannot be passed off as
/// the proof for a different slot.
type Invariant<'a> = PhantomData<fn(&'a ()) -> &'a ()>;

/// Uninitialized memory reserved for a clone of one element.
///
/// Created by the container and handed to
/// [`CloneIntoSlot::clone_into_slot`](super::CloneIntoSlot::clone_into_slot).
/// The slot accepts exactly one value of the element's concrete type.
#[allow(missing_copy_implementations)]
#[derive(Debug)]
pub struct Slot<'a> {
    /// # Safety
    ///
    /// Valid for writes and aligned for the type identified by `type_id`.
    ptr: NonNull<u8>,
    type_id: TypeId,
    type_name: &'static str,
    _lifetime: Invariant<'a>,
}

/// Proof that a [`Slot`] was filled.
#[allow(missing_copy_implementations)]
#[derive(Debug)]
#[must_use = "return the proof from `clone_into_slot`"]
pub struct Filled<'a> {
    _lifetime: Invariant<'a>,
}

impl<'a> Slot<'a> {
    /// Creates a slot for a value of the type identified by `type_id`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `ptr` is valid for writes and aligned for
    /// the type identified by `type_id` for the whole lifetime `'a`, and that
    /// it holds no value that still needs to be dropped.
    pub(crate) unsafe fn new(ptr: NonNull<u8>, type_id: TypeId, type_name: &'static str) -> Self {
        Self {
            ptr,
            type_id,
            type_name,
            _lifetime: PhantomData,
        }
    }

    /// The [`TypeId`] of the value the slot accepts.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The name of the type the slot accepts.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Moves `value` into the slot.
    ///
    /// Fails with [`CloneError::TypeMismatch`], dropping `value`, when `T` is
    /// not the slot's type.
    ///
    /// ```
    /// use polyvec::{CloneError, cloning::{CloneIntoSlot, Filled, Slot}};
    ///
    /// trait Shape: CloneIntoSlot {}
    ///
    /// #[derive(Clone)]
    /// struct Square(f64);
    ///
    /// impl Shape for Square {}
    ///
    /// impl CloneIntoSlot for Square {
    ///     fn clone_into_slot<'a>(&self, slot: Slot<'a>) -> Result<Filled<'a>, CloneError> {
    ///         slot.write(self.clone())
    ///     }
    /// }
    /// ```
    pub fn write<T: 'static>(self, value: T) -> Result<Filled<'a>, CloneError> {
        if TypeId::of::<T>() != self.type_id {
            return Err(CloneError::TypeMismatch {
                expected: self.type_name,
                found: type_name::<T>(),
            });
        }
        // SAFETY: `T` is the slot's type, so the pointer is valid and aligned
        // for it, as guaranteed when the slot was created.
        unsafe { self.ptr.cast::<T>().write(value) };
        Ok(Filled {
            _lifetime: PhantomData,
        })
    }
}
