use crate::utilities::vector::{Vector, VectorMask, LANES};
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::simd::cmp::SimdPartialOrd;
use std::simd::num::SimdFloat;

/// Arithmetic shared by the narrow (`f32`) and wide (`Vector<f32>`) solver paths.
///
/// The scalar solver instantiates it with `f32` (width 1) and the bundled solver with `Vector<f32>` (width `LANES`).
pub trait Lane:
    Copy
    + Default
    + Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
    /// Per-lane boolean produced by comparisons.
    type Mask: Copy;

    /// Number of independent values carried.
    const WIDTH: usize;

    fn splat(value: f32) -> Self;

    fn lane_max(self, other: Self) -> Self;

    fn lane_min(self, other: Self) -> Self;

    /// Clamps each lane into `[min, max]`.
    #[inline(always)]
    fn lane_clamp(self, min: Self, max: Self) -> Self {
        self.lane_max(min).lane_min(max)
    }

    fn lanes_gt(self, other: Self) -> Self::Mask;

    fn lanes_le(self, other: Self) -> Self::Mask;

    fn mask_and(a: Self::Mask, b: Self::Mask) -> Self::Mask;

    /// Picks `if_true` in lanes where `mask` is set, `if_false` elsewhere.
    fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;

    /// Returns `1 / value` in lanes where `value > 0`, zero elsewhere.
    #[inline(always)]
    fn positive_reciprocal(self) -> Self {
        let zero = Self::splat(0.0);
        let positive = self.lanes_gt(zero);
        // Keeps the division well defined in lanes that get discarded.
        let safe = Self::select(positive, self, Self::splat(1.0));
        Self::select(positive, Self::splat(1.0) / safe, zero)
    }
}

impl Lane for f32 {
    type Mask = bool;
    const WIDTH: usize = 1;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        value
    }

    #[inline(always)]
    fn lane_max(self, other: Self) -> Self {
        if self > other {
            self
        } else {
            other
        }
    }

    #[inline(always)]
    fn lane_min(self, other: Self) -> Self {
        if self < other {
            self
        } else {
            other
        }
    }

    #[inline(always)]
    fn lanes_gt(self, other: Self) -> bool {
        self > other
    }

    #[inline(always)]
    fn lanes_le(self, other: Self) -> bool {
        self <= other
    }

    #[inline(always)]
    fn mask_and(a: bool, b: bool) -> bool {
        a && b
    }

    #[inline(always)]
    fn select(mask: bool, if_true: Self, if_false: Self) -> Self {
        if mask {
            if_true
        } else {
            if_false
        }
    }
}

impl Lane for Vector<f32> {
    type Mask = VectorMask;
    const WIDTH: usize = LANES;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Vector::<f32>::splat(value)
    }

    #[inline(always)]
    fn lane_max(self, other: Self) -> Self {
        self.simd_max(other)
    }

    #[inline(always)]
    fn lane_min(self, other: Self) -> Self {
        self.simd_min(other)
    }

    #[inline(always)]
    fn lanes_gt(self, other: Self) -> VectorMask {
        self.simd_gt(other)
    }

    #[inline(always)]
    fn lanes_le(self, other: Self) -> VectorMask {
        self.simd_le(other)
    }

    #[inline(always)]
    fn mask_and(a: VectorMask, b: VectorMask) -> VectorMask {
        a & b
    }

    #[inline(always)]
    fn select(mask: VectorMask, if_true: Self, if_false: Self) -> Self {
        std::simd::Select::select(mask, if_true, if_false)
    }
}
