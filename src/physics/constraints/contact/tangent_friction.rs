use crate::physics::body_properties::SolverBodyWide;
use crate::physics::constraints::contact::contact_constraint::ContactPointData;
use crate::physics::constraints::contact::penetration_limit::PenetrationLimit;
use crate::physics::constraints::inequality_helpers::InequalityHelpers;
use crate::utilities::lane::Lane;
use crate::utilities::vector2_wide::Vector2Wide;

/// Handles the tangent friction implementation.
pub struct TangentFriction;

impl TangentFriction {
    /// Friction direction for a contact normal.
    #[inline(always)]
    pub fn tangent<L: Lane>(normal: &Vector2Wide<L>) -> Vector2Wide<L> {
        Vector2Wide::right_perp(normal)
    }

    /// Solves the friction row of one point. The accumulated tangent impulse stays inside
    /// `[-friction * normal_impulse, friction * normal_impulse]`.
    #[inline(always)]
    pub fn solve<L: Lane>(
        point: &mut ContactPointData<L>,
        tangent: &Vector2Wide<L>,
        friction: L,
        tangent_speed: L,
        body_a: &mut SolverBodyWide<L>,
        body_b: &mut SolverBodyWide<L>,
    ) {
        let dv = PenetrationLimit::relative_velocity(point, body_a, body_b);
        let vt = Vector2Wide::dot(&dv, tangent) - tangent_speed;
        let impulse = -(point.tangent_mass * vt);
        let maximum = friction * point.normal_impulse;
        let applied = InequalityHelpers::clamp_symmetric(&mut point.tangent_impulse, impulse, maximum);
        PenetrationLimit::apply_impulse(point, tangent, applied, body_a, body_b);
    }
}
