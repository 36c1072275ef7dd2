use glam::Vec2;

use crate::physics::handles::BodyHandle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of points in a single contact manifold.
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// One contact point as produced by narrow phase and updated by the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifoldPoint {
    /// Location of the contact relative to body A's center of mass.
    pub anchor_a: Vec2,
    /// Location of the contact relative to body B's center of mass.
    pub anchor_b: Vec2,
    /// Signed distance along the normal. Negative when penetrating.
    pub separation: f32,
    /// Accumulated normal impulse from the last step. Read for warm starting and written at store.
    pub normal_impulse: f32,
    /// Accumulated friction impulse from the last step.
    pub tangent_impulse: f32,
    /// Largest incremental normal impulse applied during the last step.
    pub max_normal_impulse: f32,
}

impl ManifoldPoint {
    pub fn new(anchor_a: Vec2, anchor_b: Vec2, separation: f32) -> Self {
        Self {
            anchor_a,
            anchor_b,
            separation,
            ..Default::default()
        }
    }
}

/// Up to two contact points sharing one normal.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactManifold {
    /// Unit normal pointing from body A to body B.
    pub normal: Vec2,
    pub points: [ManifoldPoint; MAX_MANIFOLD_POINTS],
    pub point_count: usize,
    /// Accumulated rolling resistance impulse from the last step.
    pub rolling_impulse: f32,
}

impl ContactManifold {
    /// Creates a manifold from a normal and at most `MAX_MANIFOLD_POINTS` points. Extra points are dropped.
    pub fn new(normal: Vec2, points: &[ManifoldPoint]) -> Self {
        let mut manifold = Self {
            normal,
            ..Default::default()
        };
        let point_count = points.len().min(MAX_MANIFOLD_POINTS);
        manifold.points[..point_count].copy_from_slice(&points[..point_count]);
        manifold.point_count = point_count;
        manifold
    }

    #[inline(always)]
    pub fn active_points(&self) -> &[ManifoldPoint] {
        &self.points[..self.point_count.min(MAX_MANIFOLD_POINTS)]
    }

    #[inline(always)]
    pub fn active_points_mut(&mut self) -> &mut [ManifoldPoint] {
        let count = self.point_count.min(MAX_MANIFOLD_POINTS);
        &mut self.points[..count]
    }
}

/// Surface properties of a contact, already combined from both shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactMaterial {
    /// Coulomb friction coefficient.
    pub friction: f32,
    /// Coefficient of restitution. Zero disables the restitution pass for the contact.
    pub restitution: f32,
    /// Resistance to rolling, scaled by the normal load.
    pub rolling_resistance: f32,
    /// Target tangential surface speed, as for conveyor belts.
    pub tangent_speed: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: 0.6,
            restitution: 0.0,
            rolling_resistance: 0.0,
            tangent_speed: 0.0,
        }
    }
}

impl ContactMaterial {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
            ..Default::default()
        }
    }

    pub fn with_rolling_resistance(mut self, rolling_resistance: f32) -> Self {
        self.rolling_resistance = rolling_resistance;
        self
    }

    pub fn with_tangent_speed(mut self, tangent_speed: f32) -> Self {
        self.tangent_speed = tangent_speed;
        self
    }
}

/// A touching pair of bodies handed to the solver for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactPair {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub material: ContactMaterial,
    pub manifold: ContactManifold,
}

impl ContactPair {
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        material: ContactMaterial,
        manifold: ContactManifold,
    ) -> Self {
        Self {
            body_a,
            body_b,
            material,
            manifold,
        }
    }
}
