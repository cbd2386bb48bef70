//! Internal utility constants and helpers for offset arithmetic.

use core::ptr::NonNull;

/// The alignment guaranteed by a container that has never reserved or stored
/// anything.
pub const DEFAULT_ALIGNMENT: usize = 1;

/// The largest alignment of any fundamental type on the target.
///
/// An explicit reservation that does not name an alignment adopts at least this
/// alignment, so that any ordinary type can later be stored without a
/// reallocation.
pub const MAX_NATURAL_ALIGNMENT: usize = {
    let mut align = core::mem::align_of::<u128>();
    if core::mem::align_of::<f64>() > align {
        align = core::mem::align_of::<f64>();
    }
    if core::mem::align_of::<usize>() > align {
        align = core::mem::align_of::<usize>();
    }
    align
};

/// Rounds `offset` up to the next multiple of `align`.
///
/// Returns [`None`] on overflow. `align` must be a power of two.
#[inline]
pub(crate) const fn align_up(offset: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    match offset.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}

/// Rounds a user supplied alignment to a valid one.
#[inline]
pub(crate) const fn normalize_align(align: usize) -> usize {
    if align <= 1 {
        1
    } else if align.is_power_of_two() {
        align
    } else {
        match align.checked_next_power_of_two() {
            Some(align) => align,
            None => 1 << (usize::BITS - 1),
        }
    }
}

/// Returns a non-null, well aligned pointer without provenance, used as the
/// base of a buffer that owns no bytes.
#[inline]
pub(crate) const fn dangling(align: usize) -> NonNull<u8> {
    let ptr = core::ptr::without_provenance_mut::<u8>(align);
    // SAFETY: Alignments are always at least one, so the address is non-null.
    unsafe { NonNull::new_unchecked(ptr) }
}
