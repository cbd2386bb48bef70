//! Errors returned by container operations.
//!
//! Every fallible operation on a [`PolyVec`](crate::PolyVec) returns
//! [`Error`]. Which variants can actually occur depends on the cloning policy:
//! with [`DelegateCloning`](crate::DelegateCloning) only
//! [`Error::Reserve`] and [`Error::OutOfRange`] are possible, since cloning and
//! relocating elements cannot fail under it.

use alloc::boxed::Box;
use core::convert::Infallible;

use polyvec_internals::RawError;
pub use polyvec_internals::TryReserveError;

/// The error type of [`PolyVec`](crate::PolyVec) operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An element had to be cloned, but the container's policy cannot clone.
    #[error("cloning is not supported by the `{policy}` policy")]
    CloningUnsupported {
        /// The name of the policy.
        policy: &'static str,
    },
    /// Cloning an element failed.
    #[error("failed to clone an element of type `{type_name}`")]
    CloneFailed {
        /// The concrete type of the element.
        type_name: &'static str,
        /// The error returned by the element's clone implementation.
        #[source]
        source: CloneError,
    },
    /// A position was not smaller than the length.
    #[error("index {index} is out of range for a container of length {len}")]
    OutOfRange {
        /// The requested position.
        index: usize,
        /// The length of the container.
        len: usize,
    },
    /// Storage could not be reserved.
    #[error(transparent)]
    Reserve(#[from] TryReserveError),
}

impl From<Infallible> for Error {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

impl<E> From<RawError<E>> for Error
where
    Error: From<E>,
{
    fn from(value: RawError<E>) -> Self {
        match value {
            RawError::Reserve(error) => Self::Reserve(error),
            RawError::Clone(error) => Self::from(error),
        }
    }
}

/// An error produced while cloning a single element.
///
/// Element types report their own failures through [`CloneError::new`]; the
/// container adds the element's type name when wrapping it into
/// [`Error::CloneFailed`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CloneError {
    /// A [`Slot`](crate::cloning::Slot) was filled with a value of the wrong
    /// type.
    #[error("a `{found}` was written into a slot for `{expected}`")]
    TypeMismatch {
        /// The type the slot was created for.
        expected: &'static str,
        /// The type that was written.
        found: &'static str,
    },
    /// The element's clone implementation failed.
    #[error(transparent)]
    Custom(Box<dyn core::error::Error + Send + Sync + 'static>),
}

impl CloneError {
    /// Wraps an arbitrary error, or a message.
    ///
    /// ```
    /// use polyvec::CloneError;
    ///
    /// let error = CloneError::new("the connection cannot be duplicated");
    /// assert_eq!(error.to_string(), "the connection cannot be duplicated");
    /// ```
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn core::error::Error + Send + Sync + 'static>>,
    {
        Self::Custom(error.into())
    }
}
