//! The process-wide growth strategy.
//!
//! Runs as its own test binary, since the strategy is shared by every
//! container in the process.

use std::any::Any;

use polyvec::{
    PolyVec,
    config::{self, Growth},
};

#[test]
fn test_growth_strategy() {
    assert_eq!(config::growth(), Growth::DEFAULT);
    assert_eq!(Growth::new(0, 0), Growth::new(2, 1));

    let previous = config::set_growth(Growth::new(3, 10));
    assert_eq!(previous, Growth::DEFAULT);

    let mut vec = PolyVec::<dyn Any>::new();
    vec.push(0u64).unwrap();
    assert_eq!(vec.capacities(), (10, 80));

    for value in 1..10u64 {
        vec.push(value).unwrap();
    }
    assert_eq!(vec.capacity(), 10);
    vec.push(10u64).unwrap();
    assert_eq!(vec.capacities(), (30, 240));

    // Existing containers keep their storage when the strategy changes.
    assert_eq!(config::reset_growth(), Growth::new(3, 10));
    assert_eq!(vec.capacities(), (30, 240));

    let mut fresh = PolyVec::<dyn Any>::new();
    fresh.push(0u64).unwrap();
    assert_eq!(fresh.capacity(), Growth::DEFAULT.min_elements());
    assert_eq!(config::growth(), Growth::DEFAULT);
}
