//! The cloning policy seam.
//!
//! A container of type-erased elements cannot call `Clone::clone` on them: it
//! no longer knows their concrete types. A [`ClonePolicy`] supplies that
//! knowledge, either from data captured when the element was inserted (the
//! policy's [`Meta`](ClonePolicy::Meta), stored next to every element), or from
//! a capability of the base type itself.
//!
//! The policy also decides how elements are migrated when the buffer is
//! replaced or compacted:
//!
//! - If [`RELOCATE`](ClonePolicy::RELOCATE) is `true`, elements are moved
//!   bitwise. This never fails.
//! - Otherwise every migration is a clone into the new place followed by a
//!   drop of the original, and a failing clone aborts the migration.

use core::ptr::NonNull;

use crate::element::{Element, ElementVtable};

/// A strategy for duplicating type-erased elements of base type `B`.
///
/// # Safety
///
/// Implementors must guarantee that a successful
/// [`clone_element`](ClonePolicy::clone_element) leaves an initialized value of
/// the source's concrete type at the destination, and that a failed one leaves
/// no value there that needs to be dropped.
pub unsafe trait ClonePolicy<B: ?Sized + 'static>: 'static {
    /// The name of the policy, used in diagnostics.
    const NAME: &'static str;

    /// Whether elements may be migrated by a bitwise move instead of a clone.
    const RELOCATE: bool;

    /// Per-element data captured at insertion time.
    type Meta: Copy + 'static;

    /// The error returned when an element cannot be cloned.
    type Error;

    /// Clones `source` into the uninitialized memory at `destination`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `vtable` and `meta` were created for the concrete type of `source`.
    /// 2. `destination` is valid for writes of `vtable.layout().size()` bytes
    ///    and aligned to `vtable.layout().align()`.
    /// 3. `destination` does not overlap the memory of `source`.
    unsafe fn clone_element(
        meta: Self::Meta,
        source: &B,
        vtable: &'static ElementVtable<B>,
        destination: NonNull<u8>,
    ) -> Result<(), Self::Error>;
}

/// A [`ClonePolicy`] that can store elements of the concrete type `T`.
///
/// This is where a policy states its requirements on element types, for
/// example that they implement [`Clone`].
pub trait Captures<B: ?Sized + 'static, T: Element<B>>: ClonePolicy<B> {
    /// Captures the per-element data for `T`.
    fn capture() -> Self::Meta;
}
