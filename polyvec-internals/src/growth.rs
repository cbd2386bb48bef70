//! Amortized growth arithmetic.
//!
//! A container grows along two axes at once: the number of index slots and the
//! number of bytes. [`Growth`] turns the minimal requirement of an insertion
//! into the capacities of the replacement buffer, so that a long sequence of
//! insertions only reallocates a logarithmic number of times.

/// Parameters of the growth strategy.
///
/// Both fields are clamped on construction: the factor is at least 2 and the
/// minimum slot count is at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Growth {
    /// Multiplier applied to both capacities, at least 2.
    factor: usize,
    /// Element slots allocated by the first growth, at least 1.
    min_elements: usize,
}

impl Growth {
    /// Doubling, with room for at least four elements.
    pub const DEFAULT: Self = Self {
        factor: 2,
        min_elements: 4,
    };

    /// Creates a growth strategy, clamping out-of-range values.
    pub const fn new(factor: usize, min_elements: usize) -> Self {
        Self {
            factor: if factor < 2 { 2 } else { factor },
            min_elements: if min_elements < 1 { 1 } else { min_elements },
        }
    }

    /// The factor both capacities are multiplied by when growing.
    #[inline]
    pub const fn factor(&self) -> usize {
        self.factor
    }

    /// The smallest number of element slots a growing container ends up with.
    #[inline]
    pub const fn min_elements(&self) -> usize {
        self.min_elements
    }

    /// Computes the capacities of a replacement buffer.
    ///
    /// `capacity` and `byte_capacity` are the current capacities.
    /// `required_elements` and `required_bytes` are what the pending operation
    /// needs; they are always part of the result. Returns
    /// `(element_capacity, byte_capacity)`.
    ///
    /// The byte capacity leaves room for the new slots at the average footprint
    /// of the elements after the operation, so that a container of similar
    /// elements grows both axes in step.
    pub fn next(
        &self,
        capacity: usize,
        byte_capacity: usize,
        required_elements: usize,
        required_bytes: usize,
    ) -> (usize, usize) {
        let elements = capacity
            .checked_mul(self.factor)
            .unwrap_or(capacity)
            .max(required_elements)
            .max(self.min_elements);

        let average = required_bytes.div_ceil(required_elements.max(1));
        let bytes = byte_capacity
            .checked_mul(self.factor)
            .unwrap_or(byte_capacity)
            .max(required_bytes)
            .max(elements.checked_mul(average).unwrap_or(required_bytes));

        (elements, bytes)
    }
}

impl Default for Growth {
    fn default() -> Self {
        Self::DEFAULT
    }
}
