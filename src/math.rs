use std::mem::size_of;

use num_traits::{PrimInt, Zero};

/// Commonly used logarithms on integer primitives.
pub(crate) trait Log: PrimInt + Zero {
    /// The minimum number of bits required to store a positive integer in binary, or 0 for a non-positive integer.
    #[inline(always)]
    fn significant_bits(self) -> u32 {
        (size_of::<Self>() * 8) as u32 - self.leading_zeros()
    }

    /// Log base 2, rounded down. Self needs to be > 0.
    #[inline(always)]
    fn floor_log2(self) -> u32 {
        debug_assert!(!self.is_zero());
        self.significant_bits() - 1
    }
}

impl Log for u16 {}

impl Log for u32 {}

/// Undoes the recentering of `v` around the reference `r`.
///
/// Small values of `v` alternate around `r`, values above `2 * r` are taken as is.
#[inline]
pub(crate) fn inverse_recenter(r: u32, v: u32) -> u32 {
    if v > (r << 1) {
        v
    } else if v & 1 != 0 {
        r - ((v + 1) >> 1)
    } else {
        r + (v >> 1)
    }
}
