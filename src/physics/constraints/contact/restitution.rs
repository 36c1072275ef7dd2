use crate::physics::body_properties::SolverBodyWide;
use crate::physics::constraints::contact::contact_constraint::ContactPointData;
use crate::physics::constraints::contact::penetration_limit::PenetrationLimit;
use crate::physics::constraints::inequality_helpers::InequalityHelpers;
use crate::utilities::lane::Lane;
use crate::utilities::vector2_wide::Vector2Wide;

/// Post-iteration bounce of a contact point.
///
/// Drives the normal velocity towards `-restitution * relative_velocity`, where `relative_velocity` is the approach
/// speed cached before the step. Points that approached slower than `threshold` or never carried load are skipped.
pub struct Restitution;

impl Restitution {
    #[inline(always)]
    pub fn apply<L: Lane>(
        point: &mut ContactPointData<L>,
        normal: &Vector2Wide<L>,
        restitution: L,
        threshold: L,
        body_a: &mut SolverBodyWide<L>,
        body_b: &mut SolverBodyWide<L>,
    ) {
        let zero = L::splat(0.0);
        let active = L::mask_and(
            L::mask_and(
                restitution.lanes_gt(zero),
                point.relative_velocity.lanes_le(-threshold),
            ),
            point.normal_impulse.lanes_gt(zero),
        );

        let dv = PenetrationLimit::relative_velocity(point, body_a, body_b);
        let vn = Vector2Wide::dot(&dv, normal);
        let impulse = -(point.normal_mass * (vn + restitution * point.relative_velocity));
        let mut accumulated = point.normal_impulse;
        let applied = InequalityHelpers::clamp_positive(&mut accumulated, impulse);
        let applied = L::select(active, applied, zero);
        point.normal_impulse += applied;
        point.max_normal_impulse = point.max_normal_impulse.lane_max(applied);

        PenetrationLimit::apply_impulse(point, normal, applied, body_a, body_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body_properties::{BodyInertia, BodyVelocity, SolverBody};
    use approx::assert_relative_eq;
    use glam::Vec2;

    fn resting_point(normal_impulse: f32) -> ContactPointData<f32> {
        ContactPointData {
            normal_impulse,
            normal_mass: 1.0,
            relative_velocity: -10.0,
            ..Default::default()
        }
    }

    fn stopped_ball() -> (SolverBodyWide<f32>, SolverBodyWide<f32>) {
        (
            SolverBodyWide::from(SolverBody::STATIC),
            SolverBodyWide::from(SolverBody::new(BodyVelocity::default(), BodyInertia::new(1.0, 0.0))),
        )
    }

    #[test]
    fn bounces_at_the_restitution_fraction() {
        let (mut ground, mut ball) = stopped_ball();
        let mut point = resting_point(10.0);
        let normal = Vector2Wide::<f32>::from(Vec2::Y);
        Restitution::apply(&mut point, &normal, 0.5, 1.0, &mut ground, &mut ball);
        assert_relative_eq!(ball.velocity.linear.y, 5.0);
        assert_relative_eq!(point.normal_impulse, 15.0);
    }

    #[test]
    fn skipped_without_load_or_below_threshold() {
        let normal = Vector2Wide::<f32>::from(Vec2::Y);

        let (mut ground, mut ball) = stopped_ball();
        let mut unloaded = resting_point(0.0);
        Restitution::apply(&mut unloaded, &normal, 0.5, 1.0, &mut ground, &mut ball);
        assert_eq!(unloaded.normal_impulse, 0.0);
        assert_eq!(ball.velocity.linear.y, 0.0);

        let mut slow = resting_point(10.0);
        Restitution::apply(&mut slow, &normal, 0.5, 20.0, &mut ground, &mut ball);
        assert_eq!(slow.normal_impulse, 10.0);
        assert_eq!(ball.velocity.linear.y, 0.0);

        let mut inelastic = resting_point(10.0);
        Restitution::apply(&mut inelastic, &normal, 0.0, 1.0, &mut ground, &mut ball);
        assert_eq!(inelastic.normal_impulse, 10.0);
    }
}
