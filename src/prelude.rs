//! Commonly used items for convenient importing.
//!
//! ```
//! use polyvec::prelude::*;
//!
//! let mut values = PolyVec::<dyn Any>::new();
//! values.push(7u8)?;
//! assert!(values[0].is::<u8>());
//! # Ok::<(), polyvec::Error>(())
//! ```
//!
//! # What's Included
//!
//! - **[`PolyVec`]**: the container
//! - **[`DelegateCloning`]**, **[`VirtualCloning`]** and **[`NoCloning`]**:
//!   the cloning policies
//! - **[`CloneIntoSlot`]**, **[`Slot`]** and **[`Filled`]**: what a base type
//!   needs for [`VirtualCloning`]
//! - **[`Error`]** and **[`CloneError`]**
//! - **[`impl_element!`]**: declares which types a trait object container
//!   accepts
//! - **[`Any`]**: re-exported from `core::any`

pub use core::any::Any;

pub use crate::{
    CloneError, DelegateCloning, Error, NoCloning, PolyVec, VirtualCloning,
    cloning::{CloneIntoSlot, Filled, Slot},
    impl_element,
};
