use glam::Vec2;

use crate::physics::body_properties::SolverBody;

/// Integrates solver bodies between the iterations of a substep.
///
/// The contact solver calls `integrate_velocities` at the start of every substep and `integrate_positions` after the
/// biased iterations. Positions are tracked as deltas from the start of the step.
pub trait IPoseIntegrator: Sync {
    fn integrate_velocities(&self, bodies: &mut [SolverBody], h: f32);

    fn integrate_positions(&self, bodies: &mut [SolverBody], h: f32);
}

/// Applies gravity and damping to velocities and advances position and angle deltas with semi-implicit Euler.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeltaPoseIntegrator {
    pub gravity: Vec2,
    /// Fraction of linear velocity removed per second.
    pub linear_damping: f32,
    /// Fraction of angular velocity removed per second.
    pub angular_damping: f32,
}

impl DeltaPoseIntegrator {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_damping(mut self, linear_damping: f32, angular_damping: f32) -> Self {
        self.linear_damping = linear_damping;
        self.angular_damping = angular_damping;
        self
    }
}

impl IPoseIntegrator for DeltaPoseIntegrator {
    fn integrate_velocities(&self, bodies: &mut [SolverBody], h: f32) {
        // Implicit damping: v / (1 + h * c).
        let linear_factor = 1.0 / (1.0 + h * self.linear_damping);
        let angular_factor = 1.0 / (1.0 + h * self.angular_damping);
        for body in bodies.iter_mut() {
            if body.inverse_mass > 0.0 {
                body.linear_velocity += h * self.gravity;
            }
            body.linear_velocity *= linear_factor;
            body.angular_velocity *= angular_factor;
        }
    }

    fn integrate_positions(&self, bodies: &mut [SolverBody], h: f32) {
        for body in bodies.iter_mut() {
            body.delta_position += h * body.linear_velocity;
            body.delta_angle += h * body.angular_velocity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body_properties::{BodyInertia, BodyVelocity};
    use approx::assert_relative_eq;

    #[test]
    fn gravity_only_moves_bodies_with_finite_mass() {
        let integrator = DeltaPoseIntegrator::new(Vec2::new(0.0, -10.0));
        let mut bodies = [
            SolverBody::new(BodyVelocity::default(), BodyInertia::new(1.0, 1.0)),
            SolverBody::new(BodyVelocity::new(Vec2::ZERO, 2.0), BodyInertia::new(0.0, 1.0)),
        ];
        integrator.integrate_velocities(&mut bodies, 0.5);
        assert_relative_eq!(bodies[0].linear_velocity.y, -5.0);
        assert_eq!(bodies[1].linear_velocity, Vec2::ZERO);

        integrator.integrate_positions(&mut bodies, 0.5);
        assert_relative_eq!(bodies[0].delta_position.y, -2.5);
        assert_relative_eq!(bodies[1].delta_angle, 1.0);
    }

    #[test]
    fn damping_slows_bodies() {
        let integrator = DeltaPoseIntegrator::default().with_damping(1.0, 3.0);
        let mut bodies = [SolverBody::new(
            BodyVelocity::new(Vec2::new(4.0, 0.0), 4.0),
            BodyInertia::new(1.0, 1.0),
        )];
        integrator.integrate_velocities(&mut bodies, 1.0);
        assert_relative_eq!(bodies[0].linear_velocity.x, 2.0);
        assert_relative_eq!(bodies[0].angular_velocity, 1.0);
    }
}
