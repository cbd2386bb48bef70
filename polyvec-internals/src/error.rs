//! Errors produced by the raw container.

use core::{alloc::Layout, fmt};

/// The error type for reservations and growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TryReserveError {
    /// The requested capacity does not fit in `usize` or in a valid
    /// [`Layout`].
    CapacityOverflow,
    /// The allocator returned no memory for the given layout.
    AllocFailed {
        /// The layout of the failed request.
        layout: Layout,
    },
}

impl TryReserveError {
    /// Diverges the way the standard collections do when they cannot grow:
    /// panics on capacity overflow and calls
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) on allocation
    /// failure.
    #[cold]
    pub fn handle(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::AllocFailed { layout } => alloc::alloc::handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => {
                f.write_str("memory allocation failed because the computed capacity exceeded the collection's maximum")
            }
            Self::AllocFailed { layout } => write!(
                f,
                "memory allocation of {} bytes aligned to {} failed",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl core::error::Error for TryReserveError {}

/// The error type of fallible [`RawPolyVec`](crate::RawPolyVec) operations.
///
/// `E` is the error type of the container's
/// [`ClonePolicy`](crate::policy::ClonePolicy).
#[derive(Debug, PartialEq, Eq)]
pub enum RawError<E> {
    /// Storage could not be reserved.
    Reserve(TryReserveError),
    /// An element could not be cloned.
    Clone(E),
}

impl<E> From<TryReserveError> for RawError<E> {
    #[inline]
    fn from(value: TryReserveError) -> Self {
        Self::Reserve(value)
    }
}

impl<E: fmt::Display> fmt::Display for RawError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserve(error) => fmt::Display::fmt(error, f),
            Self::Clone(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl<E: core::error::Error + 'static> core::error::Error for RawError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Reserve(error) => Some(error),
            Self::Clone(error) => Some(error),
        }
    }
}
