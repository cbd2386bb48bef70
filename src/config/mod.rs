//! Process-wide configuration.
//!
//! Every container reads the current [`Growth`] strategy when it has to grow.
//! Changing it affects later growth of all containers, but never reallocates
//! existing ones.
//!
//! ```
//! use polyvec::config::{self, Growth};
//!
//! // Grow by 4x, starting with room for 16 elements.
//! let previous = config::set_growth(Growth::new(4, 16));
//! assert_eq!(config::growth().factor(), 4);
//!
//! config::set_growth(previous);
//! ```

mod config_lock;

pub use polyvec_internals::growth::Growth;
use tracing::debug;

use self::config_lock::ConfigLock;

static GROWTH: ConfigLock<Growth> = ConfigLock::new(Growth::DEFAULT);

/// The current growth strategy.
#[inline]
pub fn growth() -> Growth {
    GROWTH.get()
}

/// Replaces the growth strategy, returning the previous one.
pub fn set_growth(growth: Growth) -> Growth {
    let previous = GROWTH.replace(growth);
    debug!(
        factor = growth.factor(),
        min_elements = growth.min_elements(),
        "growth strategy changed"
    );
    previous
}

/// Restores [`Growth::DEFAULT`], returning the previous strategy.
pub fn reset_growth() -> Growth {
    set_growth(Growth::DEFAULT)
}
