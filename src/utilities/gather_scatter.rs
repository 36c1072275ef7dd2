use crate::utilities::vector::{Vector, LANES};
use std::simd::SimdElement;

/// Lane level access into bundle vectors.
///
/// Bundles are structure-of-arrays: each field holds one value per lane. These helpers read and write a
/// single lane, which is how narrow records are transposed into and out of a bundle.
pub struct GatherScatter;

impl GatherScatter {
    /// Reads one lane of a vector.
    #[inline(always)]
    pub fn get<T: SimdElement>(vector: &Vector<T>, index: usize) -> T {
        debug_assert!(index < LANES, "Lane index out of range.");
        vector[index]
    }

    /// Overwrites one lane of a vector.
    #[inline(always)]
    pub fn set<T: SimdElement>(vector: &mut Vector<T>, index: usize, value: T) {
        debug_assert!(index < LANES, "Lane index out of range.");
        vector[index] = value;
    }
}
