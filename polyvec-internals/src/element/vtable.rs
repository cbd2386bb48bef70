//! Vtable for type-erased element operations.
//!
//! This module contains the [`ElementVtable`] which enables dropping,
//! upcasting and describing elements whose concrete type `T` has been erased.
//! The vtable stores function pointers that dispatch to the correct typed
//! implementations.
//!
//! This module encapsulates the fields of [`ElementVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter matches the element it was created
//! for**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`ElementVtable::new`], which pairs the function pointers
//! with a specific type `T` at compile time.

use core::{alloc::Layout, any::TypeId, ptr::NonNull};

use crate::element::Element;

/// Vtable for type-erased element operations.
///
/// Contains function pointers for performing operations on elements without
/// knowing their concrete type at compile time.
///
/// # Safety Invariant
///
/// The fields `layout`, `drop` and `upcast` are guaranteed to describe and
/// point to the functions defined below instantiated with the element type `T`
/// that was used to create this [`ElementVtable`].
pub struct ElementVtable<B: ?Sized + 'static> {
    /// Gets the [`TypeId`] of the element type that was used to create this
    /// [`ElementVtable`].
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the element type.
    type_name: fn() -> &'static str,
    /// The layout of the element type.
    layout: Layout,
    /// Drops the `T` stored at the given address in place.
    drop: unsafe fn(NonNull<u8>),
    /// Views the `T` stored at the given address as a `B`.
    upcast: fn(NonNull<u8>) -> NonNull<B>,
}

impl<B: ?Sized + 'static> ElementVtable<B> {
    /// Creates a new [`ElementVtable`] for the element type `T`.
    pub(crate) const fn new<T: Element<B>>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                layout: Layout::new::<T>(),
                drop: drop::<T>,
                upcast: upcast::<T, B>,
            }
        }
    }

    /// Gets the [`TypeId`] of the element type that was used to create this
    /// [`ElementVtable`].
    #[inline]
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the element type that was used to
    /// create this [`ElementVtable`].
    #[inline]
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// The layout of the element type.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Drops the element stored at `ptr` in place.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the element type used to
    ///    create this [`ElementVtable`].
    /// 2. The value is not used again after this call, except to overwrite it.
    #[inline]
    pub(crate) unsafe fn drop(&self, ptr: NonNull<u8>) {
        // SAFETY: We know that `self.drop` points to the function `drop::<T>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            (self.drop)(ptr);
        }
    }

    /// Views the element stored at `ptr` as a pointer to the base type.
    ///
    /// The returned pointer is only dereferenceable if `ptr` points to an
    /// initialized value of the element type used to create this vtable.
    #[inline]
    pub(crate) fn upcast(&self, ptr: NonNull<u8>) -> NonNull<B> {
        (self.upcast)(ptr)
    }
}

impl<B: ?Sized + 'static> core::fmt::Debug for ElementVtable<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementVtable")
            .field("type_name", &self.type_name())
            .field("layout", &self.layout)
            .finish()
    }
}

/// Drops the `T` stored at `ptr` in place.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized value of type `T`.
/// 2. The value is not used again after this call, except to overwrite it.
unsafe fn drop<T>(ptr: NonNull<u8>) {
    let ptr: NonNull<T> = ptr.cast();
    // SAFETY: The pointer is aligned and points to an initialized `T`, and the
    // caller promises not to use the value afterwards.
    unsafe { ptr.drop_in_place() }
}

/// Views the `T` stored at `ptr` as a `B`.
fn upcast<T: Element<B>, B: ?Sized + 'static>(ptr: NonNull<u8>) -> NonNull<B> {
    T::upcast(ptr.cast::<T>())
}
