use crate::utilities::vector::LANES;

pub const VECTOR_MASK: usize = LANES - 1;
pub const VECTOR_SHIFT: usize = LANES.trailing_zeros() as usize;

const _: () = assert!(LANES.is_power_of_two());

/// Some helpers for indexing into vector bundles.
pub struct BundleIndexing;

impl BundleIndexing {
    /// Gets the mask value such that x & VECTOR_MASK computes x % LANES.
    #[inline(always)]
    pub const fn vector_mask() -> usize {
        VECTOR_MASK
    }

    /// Gets the shift value such that x >> VECTOR_SHIFT divides x by LANES.
    #[inline(always)]
    pub const fn vector_shift() -> usize {
        VECTOR_SHIFT
    }

    #[inline(always)]
    pub fn get_bundle_count(element_count: usize) -> usize {
        (element_count + Self::vector_mask()) >> Self::vector_shift()
    }
}
