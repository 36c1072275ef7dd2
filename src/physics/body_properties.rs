use glam::Vec2;
use std::fmt;

use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::lane::Lane;
use crate::utilities::vector::Vector;
use crate::utilities::vector2_wide::Vector2Wide;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Linear and angular velocity for a body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyVelocity {
    /// Linear velocity associated with the body.
    pub linear: Vec2,
    /// Angular velocity associated with the body.
    pub angular: f32,
}

impl BodyVelocity {
    /// Creates a new set of body velocities.
    #[inline(always)]
    pub fn new(linear: Vec2, angular: f32) -> Self {
        Self { linear, angular }
    }

    /// Creates a new set of body velocities. Angular velocity is set to zero.
    #[inline(always)]
    pub fn from_linear(linear: Vec2) -> Self {
        Self {
            linear,
            angular: 0.0,
        }
    }
}

impl From<Vec2> for BodyVelocity {
    fn from(linear: Vec2) -> Self {
        Self::from_linear(linear)
    }
}

impl fmt::Display for BodyVelocity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}", self.linear, self.angular)
    }
}

/// Stores the inertia for a body.
///
/// This representation stores the inverse mass and inverse rotational inertia.
/// Zero in both means the body cannot be moved by the solver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyInertia {
    /// Inverse of the body's mass.
    pub inverse_mass: f32,
    /// Inverse of the body's rotational inertia about its center of mass.
    pub inverse_inertia: f32,
}

impl BodyInertia {
    #[inline(always)]
    pub fn new(inverse_mass: f32, inverse_inertia: f32) -> Self {
        Self {
            inverse_mass,
            inverse_inertia,
        }
    }

    /// Gets whether the body has infinite mass and inertia.
    #[inline(always)]
    pub fn is_immovable(&self) -> bool {
        self.inverse_mass == 0.0 && self.inverse_inertia == 0.0
    }
}

impl fmt::Display for BodyInertia {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}", self.inverse_mass, self.inverse_inertia)
    }
}

/// Per-body mutable state used only while solving one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolverBody {
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    /// Position change since the start of the step.
    ///
    /// Stored as a delta to avoid round-off error when far from the origin.
    pub delta_position: Vec2,
    /// Rotation change since the start of the step.
    pub delta_angle: f32,
    pub inverse_mass: f32,
    pub inverse_inertia: f32,
}

impl SolverBody {
    /// The body every static reference resolves to. It has zero velocity and zero inverse mass, so impulses applied to it
    /// have no effect.
    pub const STATIC: Self = Self {
        linear_velocity: Vec2::ZERO,
        angular_velocity: 0.0,
        delta_position: Vec2::ZERO,
        delta_angle: 0.0,
        inverse_mass: 0.0,
        inverse_inertia: 0.0,
    };

    #[inline(always)]
    pub fn new(velocity: BodyVelocity, inertia: BodyInertia) -> Self {
        Self {
            linear_velocity: velocity.linear,
            angular_velocity: velocity.angular,
            inverse_mass: inertia.inverse_mass,
            inverse_inertia: inertia.inverse_inertia,
            ..Self::STATIC
        }
    }

    #[inline(always)]
    pub fn velocity(&self) -> BodyVelocity {
        BodyVelocity::new(self.linear_velocity, self.angular_velocity)
    }

    #[inline(always)]
    pub fn inertia(&self) -> BodyInertia {
        BodyInertia::new(self.inverse_mass, self.inverse_inertia)
    }

    /// Computes the velocity of the material point at `offset` from the center of mass.
    #[inline(always)]
    pub fn velocity_at_offset(&self, offset: Vec2) -> Vec2 {
        self.linear_velocity + self.angular_velocity * offset.perp()
    }
}

// --- Wide types ---

#[derive(Clone, Copy, Debug, Default)]
pub struct BodyVelocityWide<L: Lane = Vector<f32>> {
    pub linear: Vector2Wide<L>,
    pub angular: L,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BodyInertiaWide<L: Lane = Vector<f32>> {
    pub inverse_mass: L,
    pub inverse_inertia: L,
}

/// Lane form of `SolverBody` used by the contact math.
///
/// `SolverBodyWide<f32>` carries a single body for the scalar solver; the default width carries one body per bundle lane.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolverBodyWide<L: Lane = Vector<f32>> {
    pub velocity: BodyVelocityWide<L>,
    pub delta_position: Vector2Wide<L>,
    pub delta_angle: L,
    pub inertia: BodyInertiaWide<L>,
}

impl<L: Lane> SolverBodyWide<L> {
    /// Computes the velocity of the material point at `offset` from each body's center of mass.
    #[inline(always)]
    pub fn velocity_at_offset(&self, offset: &Vector2Wide<L>) -> Vector2Wide<L> {
        self.velocity.linear + Vector2Wide::cross_scalar(self.velocity.angular, offset)
    }

    /// Moves an anchor by the rotation accumulated since the start of the step, using the small angle approximation,
    /// and adds the accumulated translation.
    #[inline(always)]
    pub fn displacement_at_offset(&self, offset: &Vector2Wide<L>) -> Vector2Wide<L> {
        self.delta_position + Vector2Wide::cross_scalar(self.delta_angle, offset)
    }

    /// Applies `impulse` at `offset`, scaled by `sign` (+1 for the body the impulse pushes, -1 for the other one).
    #[inline(always)]
    pub fn apply_impulse(&mut self, offset: &Vector2Wide<L>, impulse: &Vector2Wide<L>, sign: L) {
        let linear_change = Vector2Wide::scale(impulse, self.inertia.inverse_mass * sign);
        self.velocity.linear = self.velocity.linear + linear_change;
        self.velocity.angular += self.inertia.inverse_inertia * sign * Vector2Wide::cross(offset, impulse);
    }

    /// Applies a pure angular impulse scaled by `sign`.
    #[inline(always)]
    pub fn apply_angular_impulse(&mut self, impulse: L, sign: L) {
        self.velocity.angular += self.inertia.inverse_inertia * sign * impulse;
    }
}

impl From<SolverBody> for SolverBodyWide<f32> {
    #[inline(always)]
    fn from(body: SolverBody) -> Self {
        Self {
            velocity: BodyVelocityWide {
                linear: body.linear_velocity.into(),
                angular: body.angular_velocity,
            },
            delta_position: body.delta_position.into(),
            delta_angle: body.delta_angle,
            inertia: BodyInertiaWide {
                inverse_mass: body.inverse_mass,
                inverse_inertia: body.inverse_inertia,
            },
        }
    }
}

impl SolverBodyWide<f32> {
    /// Copies the solved velocity back into a narrow body record.
    #[inline(always)]
    pub fn write_velocity(&self, body: &mut SolverBody) {
        body.linear_velocity = self.velocity.linear.to_vec2();
        body.angular_velocity = self.velocity.angular;
    }
}

impl SolverBodyWide {
    /// Writes a narrow body into one lane of the bundle.
    #[inline(always)]
    pub fn write_slot(body: &SolverBody, slot_index: usize, target: &mut Self) {
        Vector2Wide::write_slot(body.linear_velocity, slot_index, &mut target.velocity.linear);
        GatherScatter::set(&mut target.velocity.angular, slot_index, body.angular_velocity);
        Vector2Wide::write_slot(body.delta_position, slot_index, &mut target.delta_position);
        GatherScatter::set(&mut target.delta_angle, slot_index, body.delta_angle);
        GatherScatter::set(&mut target.inertia.inverse_mass, slot_index, body.inverse_mass);
        GatherScatter::set(&mut target.inertia.inverse_inertia, slot_index, body.inverse_inertia);
    }

    /// Reads the velocity held in one lane of the bundle.
    #[inline(always)]
    pub fn read_velocity_slot(source: &Self, slot_index: usize) -> BodyVelocity {
        BodyVelocity::new(
            Vector2Wide::read_slot(&source.velocity.linear, slot_index),
            GatherScatter::get(&source.velocity.angular, slot_index),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn static_sentinel_ignores_impulses() {
        let mut wide = SolverBodyWide::<f32>::from(SolverBody::STATIC);
        wide.apply_impulse(&Vec2::new(1.0, 0.0).into(), &Vec2::new(0.0, 5.0).into(), 1.0);
        let mut narrow = SolverBody::STATIC;
        wide.write_velocity(&mut narrow);
        assert_eq!(narrow, SolverBody::STATIC);
    }

    #[test]
    fn impulse_at_offset_spins_the_body() {
        let body = SolverBody::new(BodyVelocity::default(), BodyInertia::new(0.5, 2.0));
        let mut wide = SolverBodyWide::<f32>::from(body);
        wide.apply_impulse(&Vec2::new(1.0, 0.0).into(), &Vec2::new(0.0, 2.0).into(), 1.0);
        assert_relative_eq!(wide.velocity.linear.y, 1.0);
        // cross((1, 0), (0, 2)) = 2, scaled by inverse inertia 2.
        assert_relative_eq!(wide.velocity.angular, 4.0);
        let point = wide.velocity_at_offset(&Vec2::new(1.0, 0.0).into());
        assert_relative_eq!(point.y, 5.0);
    }

    #[test]
    fn only_zero_mass_and_inertia_is_immovable() {
        assert!(BodyInertia::default().is_immovable());
        assert!(!BodyInertia::new(0.0, 1.0).is_immovable());
        assert!(!BodyInertia::new(1.0, 0.0).is_immovable());
    }

    #[test]
    fn wide_slots_carry_bodies() {
        let body = SolverBody::new(
            BodyVelocity::new(Vec2::new(1.0, 2.0), 3.0),
            BodyInertia::new(1.0, 1.0),
        );
        let mut wide = SolverBodyWide::default();
        SolverBodyWide::write_slot(&body, 2, &mut wide);
        let velocity = SolverBodyWide::read_velocity_slot(&wide, 2);
        assert_eq!(velocity, body.velocity());
        assert_eq!(SolverBodyWide::read_velocity_slot(&wide, 1), BodyVelocity::default());
    }
}
