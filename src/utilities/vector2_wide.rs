use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::lane::Lane;
use crate::utilities::vector::Vector;
use glam::Vec2;

/// Two dimensional vector whose components are lanes.
///
/// `Vector2Wide<f32>` is a plain 2D vector; the default `Vector2Wide` holds one vector per bundle lane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2Wide<L: Lane = Vector<f32>> {
    /// First component of the vector.
    pub x: L,
    /// Second component of the vector.
    pub y: L,
}

impl<L: Lane> Vector2Wide<L> {
    #[inline(always)]
    pub fn new(x: L, y: L) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn dot(a: &Self, b: &Self) -> L {
        a.x * b.x + a.y * b.y
    }

    #[inline(always)]
    pub fn scale(vector: &Self, scalar: L) -> Self {
        Self {
            x: vector.x * scalar,
            y: vector.y * scalar,
        }
    }

    /// Computes the scalar 2D cross product `a.x * b.y - a.y * b.x`.
    #[inline(always)]
    pub fn cross(a: &Self, b: &Self) -> L {
        a.x * b.y - a.y * b.x
    }

    /// Crosses an angular scalar with a vector, producing `(-s * v.y, s * v.x)`.
    #[inline(always)]
    pub fn cross_scalar(s: L, v: &Self) -> Self {
        Self {
            x: -(s * v.y),
            y: s * v.x,
        }
    }

    /// Rotates the vector by -90 degrees: `(y, -x)`.
    #[inline(always)]
    pub fn right_perp(v: &Self) -> Self {
        Self { x: v.y, y: -v.x }
    }
}

impl Vector2Wide<f32> {
    #[inline(always)]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for Vector2Wide<f32> {
    #[inline(always)]
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl Vector2Wide {
    /// Pulls one lane out of the wide representation.
    #[inline(always)]
    pub fn read_slot(wide: &Self, slot_index: usize) -> Vec2 {
        Vec2::new(
            GatherScatter::get(&wide.x, slot_index),
            GatherScatter::get(&wide.y, slot_index),
        )
    }

    /// Writes a value into a slot of the target bundle.
    #[inline(always)]
    pub fn write_slot(source: Vec2, slot_index: usize, target: &mut Self) {
        GatherScatter::set(&mut target.x, slot_index, source.x);
        GatherScatter::set(&mut target.y, slot_index, source.y);
    }
}

impl<L: Lane> std::ops::Add for Vector2Wide<L> {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl<L: Lane> std::ops::Sub for Vector2Wide<L> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}
