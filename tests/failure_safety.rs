//! Failure guarantees of the container.
//!
//! ## Strong Guarantee Tests (5 tests)
//! - `test_failed_clone_during_growth`: A refused clone while growing leaves
//!   pointer, sizes, capacities, offsets and contents untouched
//! - `test_panicking_clone_during_growth`: Same for a panicking clone
//! - `test_failed_allocation_during_growth`: Same for a refused allocation
//! - `test_failed_insert`: Inserting in front with a refused clone keeps the
//!   order and offsets
//! - `test_failed_reserve`: A refused reserve keeps the container usable
//!
//! ## Basic Guarantee Tests (2 tests)
//! - `test_failed_erase_keeps_survivors`: A refused clone while compacting
//!   keeps every survivor once, in order
//! - `test_panicking_erase_keeps_survivors`: Same for a panicking clone
//!
//! ## Resource Tests (1 test)
//! - `test_no_leaks_after_failures`: Every block and element is released

mod common;

use std::panic::{AssertUnwindSafe, catch_unwind};

use common::{Counting, Interface, Large, Small, Tracker, contents, ids, offsets};
use polyvec::{Error, PolyVec, TryReserveError, VirtualCloning};

type Container = PolyVec<dyn Interface, VirtualCloning, Counting>;

/// A container with three elements and no spare element slot.
fn full(tracker: &std::rc::Rc<Tracker>, alloc: &Counting) -> Container {
    let mut vec = Container::new_in(alloc.clone());
    vec.reserve(3, 32).unwrap();
    vec.push(Small::new(1, tracker)).unwrap();
    vec.push(Small::new(2, tracker)).unwrap();
    vec.push(Small::new(3, tracker)).unwrap();
    assert_eq!(vec.len(), vec.capacity());
    vec
}

struct Snapshot {
    ptr: *const u8,
    sizes: (usize, usize),
    capacities: (usize, usize),
    max_align: usize,
    offsets: Vec<usize>,
    contents: Vec<(&'static str, u32, Vec<u8>)>,
}

impl Snapshot {
    fn of(vec: &Container) -> Self {
        Self {
            ptr: vec.as_ptr(),
            sizes: vec.sizes(),
            capacities: vec.capacities(),
            max_align: vec.max_align(),
            offsets: offsets(vec),
            contents: contents(vec),
        }
    }

    fn assert_unchanged(&self, vec: &Container) {
        assert_eq!(vec.as_ptr(), self.ptr);
        assert_eq!(vec.sizes(), self.sizes);
        assert_eq!(vec.capacities(), self.capacities);
        assert_eq!(vec.max_align(), self.max_align);
        assert_eq!(offsets(vec), self.offsets);
        assert_eq!(contents(vec), self.contents);
    }
}

#[test]
fn test_failed_clone_during_growth() {
    let tracker = Tracker::new();
    let alloc = Counting::default();
    let mut vec = full(&tracker, &alloc);
    let before = Snapshot::of(&vec);

    tracker.fail_after(1);
    let error = vec.push(Small::new(4, &tracker)).unwrap_err();

    assert!(matches!(error, Error::CloneFailed { .. }));
    assert!(error.to_string().contains("Probe"));
    before.assert_unchanged(&vec);
    assert_eq!(ids(&vec), [1, 2, 3]);
    assert_eq!(tracker.live(), 3);
    assert_eq!(alloc.live_blocks(), 2);

    tracker.allow_all();
    vec.push(Small::new(4, &tracker)).unwrap();
    assert_eq!(ids(&vec), [1, 2, 3, 4]);
}

#[test]
fn test_panicking_clone_during_growth() {
    let tracker = Tracker::new();
    let alloc = Counting::default();
    let mut vec = full(&tracker, &alloc);
    let before = Snapshot::of(&vec);

    tracker.panic_on_clone(true);
    let result = catch_unwind(AssertUnwindSafe(|| {
        vec.push(Small::new(4, &tracker)).map(|_| ())
    }));
    tracker.allow_all();

    assert!(result.is_err());
    before.assert_unchanged(&vec);
    assert_eq!(tracker.live(), 3);
    assert_eq!(alloc.live_blocks(), 2);
}

#[test]
fn test_failed_allocation_during_growth() {
    let tracker = Tracker::new();
    let alloc = Counting::default();
    let mut vec = full(&tracker, &alloc);
    let before = Snapshot::of(&vec);

    alloc.fail(true);
    let error = vec.push(Large::new(4, &tracker)).unwrap_err();
    alloc.fail(false);

    assert!(matches!(
        error,
        Error::Reserve(TryReserveError::AllocFailed { .. })
    ));
    before.assert_unchanged(&vec);
    assert_eq!(tracker.live(), 3);
    assert_eq!(tracker.clones(), 0);
}

#[test]
fn test_failed_insert() {
    let tracker = Tracker::new();
    let alloc = Counting::default();
    let mut vec = full(&tracker, &alloc);
    let before = Snapshot::of(&vec);

    tracker.fail_after(2);
    assert!(vec.insert(0, Large::new(0, &tracker)).is_err());

    before.assert_unchanged(&vec);
    assert_eq!(tracker.live(), 3);

    tracker.allow_all();
    let inserted = vec.insert(1, Large::new(0, &tracker)).unwrap();
    assert_eq!(inserted.position(), 1);
    assert_eq!(inserted.get().map(|element| element.id()), Some(0));
    assert_eq!(ids(&vec), [1, 0, 2, 3]);
}

#[test]
fn test_failed_reserve() {
    let tracker = Tracker::new();
    let alloc = Counting::default();
    let mut vec = full(&tracker, &alloc);
    let before = Snapshot::of(&vec);

    assert!(matches!(
        vec.reserve(usize::MAX, 2),
        Err(Error::Reserve(TryReserveError::CapacityOverflow))
    ));
    tracker.fail_after(0);
    assert!(vec.reserve(100, 64).is_err());
    before.assert_unchanged(&vec);

    tracker.allow_all();
    vec.reserve(100, 64).unwrap();
    assert_eq!(vec.capacities(), (100, 6400));
    assert_eq!(ids(&vec), [1, 2, 3]);
}

/// Two large elements followed by three small survivors, whose new places do
/// not overlap their old ones once the large elements are erased.
fn with_survivors(tracker: &std::rc::Rc<Tracker>, alloc: &Counting) -> Container {
    let mut vec = Container::new_in(alloc.clone());
    vec.reserve(8, 64).unwrap();
    vec.push(Large::new(1, tracker)).unwrap();
    vec.push(Large::new(2, tracker)).unwrap();
    for id in 3..=5 {
        vec.push(Small::new(id, tracker)).unwrap();
    }
    vec
}

#[test]
fn test_failed_erase_keeps_survivors() {
    let tracker = Tracker::new();
    let alloc = Counting::default();
    let mut vec = with_survivors(&tracker, &alloc);
    let capacities = vec.capacities();

    tracker.fail_after(1);
    assert!(matches!(vec.erase(0..2), Err(Error::CloneFailed { .. })));

    assert_eq!(vec.len(), 3);
    assert_eq!(ids(&vec), [3, 4, 5]);
    assert_eq!(vec.capacities(), capacities);
    assert_eq!(tracker.live(), 3);

    let offsets = offsets(&vec);
    assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));

    tracker.allow_all();
    vec.push(Small::new(6, &tracker)).unwrap();
    vec.erase(..1).unwrap();
    assert_eq!(ids(&vec), [4, 5, 6]);
}

#[test]
fn test_panicking_erase_keeps_survivors() {
    let tracker = Tracker::new();
    let alloc = Counting::default();
    let mut vec = with_survivors(&tracker, &alloc);

    tracker.panic_on_clone(true);
    let result = catch_unwind(AssertUnwindSafe(|| vec.erase(0..2).map(|_| ())));
    tracker.allow_all();

    assert!(result.is_err());
    assert_eq!(ids(&vec), [3, 4, 5]);
    assert_eq!(tracker.live(), 3);
}

#[test]
fn test_no_leaks_after_failures() {
    let tracker = Tracker::new();
    let alloc = Counting::default();
    {
        let mut vec = with_survivors(&tracker, &alloc);
        tracker.fail_after(0);
        let _ = vec.push(Large::new(6, &tracker));
        let _ = vec.try_clone();
        let _ = vec.erase(1..2);
        tracker.allow_all();

        let mut copy = vec.try_clone().unwrap();
        copy.clone_from_poly(&vec).unwrap();
        copy.clear();
        assert_eq!(copy.sizes(), (0, 0));
    }
    assert_eq!(tracker.live(), 0);
    assert_eq!(alloc.live_blocks(), 0);
}
