use crate::physics::body_properties::SolverBodyWide;
use crate::physics::constraints::contact::contact_constraint::ContactConstraintData;
use crate::physics::constraints::inequality_helpers::InequalityHelpers;
use crate::utilities::lane::Lane;

/// Angular friction that resists relative rolling of the two bodies.
///
/// The limit scales with the total normal load of the manifold, like a friction cone about the rolling axis.
pub struct RollingResistance;

impl RollingResistance {
    #[inline(always)]
    pub fn solve<L: Lane>(
        data: &mut ContactConstraintData<L>,
        total_normal_impulse: L,
        body_a: &mut SolverBodyWide<L>,
        body_b: &mut SolverBodyWide<L>,
    ) {
        let relative_angular_velocity = body_b.velocity.angular - body_a.velocity.angular;
        let impulse = -(data.rolling_mass * relative_angular_velocity);
        let maximum = data.rolling_resistance * total_normal_impulse;
        let applied = InequalityHelpers::clamp_symmetric(&mut data.rolling_impulse, impulse, maximum);
        Self::apply_impulse(applied, body_a, body_b);
    }

    #[inline(always)]
    pub fn apply_impulse<L: Lane>(impulse: L, body_a: &mut SolverBodyWide<L>, body_b: &mut SolverBodyWide<L>) {
        body_a.apply_angular_impulse(impulse, L::splat(-1.0));
        body_b.apply_angular_impulse(impulse, L::splat(1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body_properties::{BodyInertia, BodyVelocity, SolverBody};
    use approx::assert_relative_eq;
    use glam::Vec2;

    fn spinning_wheel() -> (SolverBodyWide<f32>, SolverBodyWide<f32>) {
        (
            SolverBodyWide::from(SolverBody::STATIC),
            SolverBodyWide::from(SolverBody::new(
                BodyVelocity::new(Vec2::ZERO, 4.0),
                BodyInertia::new(1.0, 1.0),
            )),
        )
    }

    #[test]
    fn zero_resistance_is_neutral() {
        let (mut ground, mut wheel) = spinning_wheel();
        let mut data = ContactConstraintData::<f32> {
            rolling_mass: 1.0,
            ..Default::default()
        };
        RollingResistance::solve(&mut data, 10.0, &mut ground, &mut wheel);
        assert_eq!(data.rolling_impulse, 0.0);
        assert_eq!(wheel.velocity.angular, 4.0);
    }

    #[test]
    fn impulse_is_bounded_by_the_load() {
        let (mut ground, mut wheel) = spinning_wheel();
        let mut data = ContactConstraintData::<f32> {
            rolling_mass: 1.0,
            rolling_resistance: 0.1,
            ..Default::default()
        };
        RollingResistance::solve(&mut data, 10.0, &mut ground, &mut wheel);
        assert_relative_eq!(data.rolling_impulse, -1.0);
        assert_relative_eq!(wheel.velocity.angular, 3.0);
        assert_eq!(ground.velocity.angular, 0.0);
    }
}
