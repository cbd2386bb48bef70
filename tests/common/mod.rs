//! Fixtures shared by the integration tests.
//!
//! Elements implement [`Interface`], carry a stable id, and report to a
//! [`Tracker`] that counts live values and can make clones fail or panic.
//! [`Counting`] is an allocator that counts live blocks and can be told to
//! fail.

#![allow(dead_code)]

use std::{alloc::Layout, cell::Cell, ptr::NonNull, rc::Rc};

use polyvec::{
    Allocator, CloneError, PolyVec,
    cloning::{CloneIntoSlot, ClonePolicy, Filled, Slot},
    impl_element,
};

/// Bookkeeping shared by the elements of one test.
#[derive(Debug, Default)]
pub struct Tracker {
    live: Cell<isize>,
    clones: Cell<usize>,
    budget: Cell<Option<usize>>,
    panic_on_clone: Cell<bool>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("clone of element {id} refused")]
pub struct Refused {
    pub id: u32,
}

impl Tracker {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// The number of elements currently alive.
    pub fn live(&self) -> isize {
        self.live.get()
    }

    /// The number of clones made so far.
    pub fn clones(&self) -> usize {
        self.clones.get()
    }

    /// Lets `remaining` more clones through [`CloneIntoSlot`] succeed.
    pub fn fail_after(&self, remaining: usize) {
        self.budget.set(Some(remaining));
    }

    pub fn panic_on_clone(&self, enabled: bool) {
        self.panic_on_clone.set(enabled);
    }

    pub fn allow_all(&self) {
        self.budget.set(None);
        self.panic_on_clone.set(false);
    }

    fn permit(&self, id: u32) -> Result<(), Refused> {
        match self.budget.get() {
            Some(0) => Err(Refused { id }),
            Some(remaining) => {
                self.budget.set(Some(remaining - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// The base trait of the test containers.
pub trait Interface: CloneIntoSlot {
    fn id(&self) -> u32;

    fn set_id(&mut self, id: u32);
}

impl PartialEq for dyn Interface {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl core::fmt::Debug for dyn Interface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.id())
    }
}

/// An element with a payload of `N` bytes.
pub struct Probe<const N: usize> {
    id: u32,
    tracker: Rc<Tracker>,
    payload: [u8; N],
}

pub type Small = Probe<0>;
pub type Large = Probe<64>;

impl<const N: usize> Probe<N> {
    pub fn new(id: u32, tracker: &Rc<Tracker>) -> Self {
        tracker.live.set(tracker.live.get() + 1);
        Self {
            id,
            tracker: tracker.clone(),
            payload: [id as u8; N],
        }
    }

    pub fn payload(&self) -> &[u8; N] {
        &self.payload
    }
}

impl<const N: usize> Clone for Probe<N> {
    fn clone(&self) -> Self {
        if self.tracker.panic_on_clone.get() {
            panic!("clone of element {} panicked", self.id);
        }
        self.tracker.clones.set(self.tracker.clones.get() + 1);
        let mut copy = Self::new(self.id, &self.tracker);
        copy.payload = self.payload;
        copy
    }
}

impl<const N: usize> Drop for Probe<N> {
    fn drop(&mut self) {
        self.tracker.live.set(self.tracker.live.get() - 1);
    }
}

/// A small element aligned to 32 bytes.
#[derive(Clone)]
#[repr(align(32))]
pub struct Aligned(pub Small);

impl<const N: usize> CloneIntoSlot for Probe<N> {
    fn clone_into_slot<'a>(&self, slot: Slot<'a>) -> Result<Filled<'a>, CloneError> {
        self.tracker.permit(self.id).map_err(CloneError::new)?;
        slot.write(self.clone())
    }
}

impl<const N: usize> Interface for Probe<N> {
    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

impl CloneIntoSlot for Aligned {
    fn clone_into_slot<'a>(&self, slot: Slot<'a>) -> Result<Filled<'a>, CloneError> {
        self.0.tracker.permit(self.0.id).map_err(CloneError::new)?;
        slot.write(self.clone())
    }
}

impl Interface for Aligned {
    fn id(&self) -> u32 {
        self.0.id
    }

    fn set_id(&mut self, id: u32) {
        self.0.id = id;
    }
}

impl_element!(dyn Interface: Small, Large, Aligned);

/// The ids of the elements, in order.
pub fn ids<P: ClonePolicy<dyn Interface>, A: Allocator>(
    vec: &PolyVec<dyn Interface, P, A>,
) -> Vec<u32> {
    vec.iter().map(|element| element.id()).collect()
}

/// The element addresses relative to the buffer base.
pub fn offsets<P: ClonePolicy<dyn Interface>, A: Allocator>(
    vec: &PolyVec<dyn Interface, P, A>,
) -> Vec<usize> {
    let base = vec.as_ptr().addr();
    vec.iter()
        .map(|element| (element as *const dyn Interface).cast::<u8>().addr() - base)
        .collect()
}

/// Type name, id and payload of each element.
pub fn contents<P: ClonePolicy<dyn Interface>, A: Allocator>(
    vec: &PolyVec<dyn Interface, P, A>,
) -> Vec<(&'static str, u32, Vec<u8>)> {
    (0..vec.len())
        .map(|index| {
            let payload = vec
                .downcast_ref::<Large>(index)
                .map(|large| large.payload().to_vec())
                .unwrap_or_default();
            (vec.type_name_at(index).unwrap(), vec[index].id(), payload)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct AllocState {
    live: Cell<usize>,
    fail: Cell<bool>,
}

/// Forwards to the global allocator, counting live blocks.
#[derive(Clone, Debug, Default)]
pub struct Counting(Rc<AllocState>);

impl Counting {
    pub fn live_blocks(&self) -> usize {
        self.0.live.get()
    }

    pub fn fail(&self, enabled: bool) {
        self.0.fail.set(enabled);
    }
}

// SAFETY: Forwards to the global allocator.
unsafe impl Allocator for Counting {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.0.fail.get() {
            return None;
        }
        // SAFETY: The container never requests zero-sized blocks.
        let ptr = NonNull::new(unsafe { std::alloc::alloc(layout) })?;
        self.0.live.set(self.0.live.get() + 1);
        Some(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.0.live.set(self.0.live.get() - 1);
        // SAFETY: The block came from `allocate` with the same layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}
