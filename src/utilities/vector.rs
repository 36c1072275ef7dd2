/// Number of contacts processed together by the batched solver path. Independent of the target's register width.
pub const LANES: usize = 8;

/// Wide vector type used by all bundled data.
pub type Vector<T> = std::simd::Simd<T, LANES>;

/// Mask type produced by lane comparisons on `Vector<f32>`.
pub type VectorMask = std::simd::Mask<i32, LANES>;
