#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A vector of trait objects stored back to back in one buffer.
//!
//! ## Overview
//!
//! A `Vec<Box<dyn Shape>>` allocates every shape on its own and scatters them
//! over the heap. A [`PolyVec<dyn Shape>`](PolyVec) stores the shapes
//! themselves, each at its natural alignment, in a single byte buffer, and
//! keeps a small index of where each one starts. Elements of different sizes
//! and types live side by side, and the container still behaves like a value:
//! it can be cloned, moved and swapped.
//!
//! ## Quick Example
//!
//! ```
//! use polyvec::prelude::*;
//!
//! trait Shape {
//!     fn area(&self) -> f64;
//! }
//!
//! #[derive(Clone)]
//! struct Rect {
//!     width: f64,
//!     height: f64,
//! }
//!
//! #[derive(Clone)]
//! struct Dot;
//!
//! impl Shape for Rect {
//!     fn area(&self) -> f64 {
//!         self.width * self.height
//!     }
//! }
//!
//! impl Shape for Dot {
//!     fn area(&self) -> f64 {
//!         0.0
//!     }
//! }
//!
//! impl_element!(dyn Shape: Rect, Dot);
//!
//! let mut shapes = PolyVec::<dyn Shape>::new();
//! shapes.push(Rect {
//!     width: 2.0,
//!     height: 3.0,
//! })?;
//! shapes.push(Dot)?;
//! shapes.insert(0, Dot)?;
//!
//! let areas: Vec<f64> = shapes.iter().map(Shape::area).collect();
//! assert_eq!(areas, [0.0, 6.0, 0.0]);
//!
//! let copy = shapes.clone();
//! assert_eq!(copy.len(), 3);
//! # Ok::<(), polyvec::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! ### Base type and elements
//!
//! The first type parameter `B` is what elements are viewed as, usually a
//! trait object. A concrete type `T` can be inserted when it implements
//! [`Element<B>`](Element), normally through [`impl_element!`]. Containers of
//! `dyn Any` (optionally `+ Send` and `+ Sync`) accept every `'static` type
//! out of the box, and can hand elements back as their concrete type with
//! [`PolyVec::downcast_ref`].
//!
//! ### Cloning policies
//!
//! Once the concrete types are erased, the container needs another way to
//! duplicate elements: when the whole container is cloned, and when the
//! buffer is replaced or compacted and the policy does not allow moving
//! elements bitwise. The second type parameter picks the [cloning policy]:
//!
//! - [`DelegateCloning`] (the default) remembers each element's [`Clone`]
//!   implementation at insertion time and moves elements bitwise.
//! - [`VirtualCloning`] asks the base type, which implements
//!   [`CloneIntoSlot`](cloning::CloneIntoSlot). Cloning may fail, and the
//!   container keeps its guarantees when it does.
//! - [`NoCloning`] never clones, and fails as soon as an element would need
//!   to move.
//!
//! ### Capacities
//!
//! A container has an element capacity, a byte capacity and a guaranteed
//! buffer alignment. [`PolyVec::reserve`] grows all three at once; pushing
//! grows them by the process-wide [`Growth`](config::Growth) strategy in
//! [`config`].
//!
//! ### Failure guarantees
//!
//! Growth, reservation and insertion either succeed or leave the container
//! exactly as it was, including when an element's clone panics. Erasure
//! keeps every surviving element exactly once and in order, whatever fails.
//!
//! ## Logging
//!
//! Reallocations and failed operations are reported as `debug` events through
//! [`tracing`], with targets under `polyvec`. Copies of whole containers are
//! reported at `trace` level. Without a subscriber, nothing is recorded.
//!
//! ## Features
//!
//! - `std`: uses [`std::sync::RwLock`] for the process-wide configuration
//!   instead of a spin lock, and enables the `std` features of `tracing` and
//!   `thiserror`.
//!
//! For the unsafe layer underneath, see the [`polyvec-internals`] crate.
//!
//! [cloning policy]: cloning
//! [`polyvec-internals`]: polyvec_internals

extern crate alloc;

#[cfg(all(feature = "std", not(doc)))]
extern crate std;

#[macro_use]
mod macros;

pub mod cloning;
pub mod config;
pub mod prelude;

mod error;
mod poly_vec;

pub use polyvec_internals::{
    DEFAULT_ALIGNMENT, MAX_NATURAL_ALIGNMENT,
    allocator::{Allocator, Global},
    element::Element,
};

pub use self::{
    cloning::{DelegateCloning, NoCloning, VirtualCloning},
    error::{CloneError, Error, TryReserveError},
    poly_vec::{Cursor, Iter, IterMut, PolyVec},
};

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    pub use core::ptr::NonNull;
}
