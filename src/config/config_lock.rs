#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// A process-wide configuration value behind a reader/writer lock.
///
/// Uses [`std::sync::RwLock`] when the `std` feature is enabled and
/// [`spin::RwLock`] otherwise. The value is `Copy`, so a poisoned std lock
/// still holds a consistent value and is used as is.
#[repr(transparent)]
pub(crate) struct ConfigLock<T: Copy + Send + Sync + 'static>(impl_::RwLock<T>);

impl<T: Copy + Send + Sync + 'static> ConfigLock<T> {
    #[must_use]
    pub(crate) const fn new(value: T) -> Self {
        Self(impl_::RwLock::new(value))
    }

    #[inline]
    pub(crate) fn get(&'static self) -> T {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        #[cfg(feature = "std")]
        let guard = self.0.read().unwrap_or_else(std::sync::PoisonError::into_inner);

        *guard
    }

    /// Stores `value`, returning the previous one.
    #[inline]
    pub(crate) fn replace(&'static self, value: T) -> T {
        #[cfg(not(feature = "std"))]
        let mut guard = self.0.write();

        #[cfg(feature = "std")]
        let mut guard = self
            .0
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        core::mem::replace(&mut *guard, value)
    }
}
