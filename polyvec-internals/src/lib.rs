#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`polyvec`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased data structures and unsafe
//! operations that power the [`polyvec`] container. It stores values of many
//! concrete types back to back in one byte buffer and hands them out as a
//! common base type `B` (usually a trait object such as `dyn Shape`).
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`polyvec`] crate, not this one.
//!
//! # Architecture
//!
//! - **[`allocator`]**: The [`Allocator`] capability used for every byte the
//!   container owns, and the [`Global`] default.
//! - **`storage`**: [`RawStorage`](storage::RawStorage), the byte buffer with
//!   its byte capacity and guaranteed alignment.
//! - **`index`**: [`IndexTable`](index::IndexTable), one [`IndexEntry`] per
//!   live element, giving O(1) positional lookup.
//! - **[`element`]**: The [`Element`] upcast capability and the
//!   [`ElementVtable`] that drops, upcasts and describes an erased element.
//! - **[`policy`]**: The [`ClonePolicy`] seam through which elements are
//!   duplicated and migrated.
//! - **[`raw`]**: [`RawPolyVec`], the lifecycle engine tying the pieces
//!   together.
//!
//! # Safety Strategy
//!
//! Every element is stored as raw bytes next to a `&'static ElementVtable<B>`
//! that was created for its concrete type at insertion time. As long as the
//! vtable stored in an [`IndexEntry`] matches the bytes at the entry's offset,
//! every operation on the element is sound.
//!
//! This crate maintains that pairing through:
//!
//! - **Module-based encapsulation**: the fields of [`IndexEntry`],
//!   [`ElementVtable`] and [`RawPolyVec`] are private to their modules, so the
//!   pairing can only be established by code that just wrote a value of the
//!   matching type.
//! - **Offsets, not pointers**: entries record offsets relative to the buffer
//!   base, so replacing the buffer never leaves stale addresses behind.
//! - **Documented vtable contracts**: each vtable function states exactly
//!   when it can be called.
//!
//! [`polyvec`]: https://docs.rs/polyvec/latest/polyvec/
//! [`Allocator`]: allocator::Allocator
//! [`Global`]: allocator::Global
//! [`IndexEntry`]: index::IndexEntry
//! [`ElementVtable`]: element::ElementVtable
//! [`Element`]: element::Element
//! [`ClonePolicy`]: policy::ClonePolicy

extern crate alloc;

pub mod allocator;
pub mod element;
mod error;
pub mod growth;
mod index;
pub mod policy;
pub mod raw;
mod storage;
mod util;

pub use self::{
    error::{RawError, TryReserveError},
    raw::RawPolyVec,
    util::{DEFAULT_ALIGNMENT, MAX_NATURAL_ALIGNMENT},
};
