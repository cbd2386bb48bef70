//! Element types and their type-erased vtables.
//!
//! A concrete type `T` can be stored in a container of base type `B` when it
//! implements [`Element<B>`], which knows how to turn a pointer to `T` into a
//! pointer to `B`. On stable Rust this unsizing step cannot be written
//! generically, so it is captured once per type here and then stored in the
//! [`ElementVtable`] of every element of that type.

mod vtable;

use core::{any::Any, ptr::NonNull};

pub use self::vtable::ElementVtable;

/// A concrete type that can be viewed as the base type `B`.
///
/// For trait objects this is almost always implemented through the
/// `impl_element!` macro of the `polyvec` crate, which expands to the plain
/// unsizing coercion:
///
/// ```
/// use core::ptr::NonNull;
///
/// use polyvec_internals::element::Element;
///
/// trait Shape {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
/// }
///
/// // SAFETY: The coercion keeps the address and provenance of the pointer.
/// unsafe impl Element<dyn Shape> for Square {
///     fn upcast(ptr: NonNull<Self>) -> NonNull<dyn Shape> {
///         ptr
///     }
/// }
/// ```
///
/// # Safety
///
/// The pointer returned by [`upcast`](Element::upcast) must point to the same
/// address, with the same provenance, as its argument, and must describe the
/// value of type `Self` stored there. The unsizing coercion always satisfies
/// this.
///
/// If `B` is [`Send`] or [`Sync`], `Self` must be as well. Again the unsizing
/// coercion enforces this on its own.
pub unsafe trait Element<B: ?Sized + 'static>: Sized + 'static {
    /// Views a pointer to `Self` as a pointer to the base type.
    fn upcast(ptr: NonNull<Self>) -> NonNull<B>;
}

// SAFETY: The identity conversion keeps the pointer unchanged.
unsafe impl<T: 'static> Element<T> for T {
    #[inline]
    fn upcast(ptr: NonNull<Self>) -> NonNull<T> {
        ptr
    }
}

// SAFETY: The unsizing coercion keeps the address and provenance.
unsafe impl<T: Any> Element<dyn Any> for T {
    #[inline]
    fn upcast(ptr: NonNull<Self>) -> NonNull<dyn Any> {
        ptr
    }
}

// SAFETY: The unsizing coercion keeps the address and provenance.
unsafe impl<T: Any + Send> Element<dyn Any + Send> for T {
    #[inline]
    fn upcast(ptr: NonNull<Self>) -> NonNull<dyn Any + Send> {
        ptr
    }
}

// SAFETY: The unsizing coercion keeps the address and provenance.
unsafe impl<T: Any + Send + Sync> Element<dyn Any + Send + Sync> for T {
    #[inline]
    fn upcast(ptr: NonNull<Self>) -> NonNull<dyn Any + Send + Sync> {
        ptr
    }
}
