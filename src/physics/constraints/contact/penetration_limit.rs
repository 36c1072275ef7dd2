use crate::physics::body_properties::SolverBodyWide;
use crate::physics::constraints::contact::contact_constraint::ContactPointData;
use crate::physics::constraints::inequality_helpers::InequalityHelpers;
use crate::physics::constraints::softness::Softness;
use crate::utilities::lane::Lane;
use crate::utilities::vector2_wide::Vector2Wide;

/// Substep inputs shared by every normal row solved in one pass.
#[derive(Clone, Copy, Debug)]
pub struct PenetrationSolveContext<L: Lane> {
    pub inverse_dt: L,
    pub max_pushout_velocity: L,
    pub use_bias: bool,
}

/// Non-penetration row of a contact point.
pub struct PenetrationLimit;

impl PenetrationLimit {
    /// Relative velocity of the contact point, B minus A.
    #[inline(always)]
    pub fn relative_velocity<L: Lane>(
        point: &ContactPointData<L>,
        body_a: &SolverBodyWide<L>,
        body_b: &SolverBodyWide<L>,
    ) -> Vector2Wide<L> {
        body_b.velocity_at_offset(&point.anchor_b) - body_a.velocity_at_offset(&point.anchor_a)
    }

    /// Separation reprojected through the motion the bodies accumulated since the start of the step.
    #[inline(always)]
    pub fn current_separation<L: Lane>(
        point: &ContactPointData<L>,
        normal: &Vector2Wide<L>,
        body_a: &SolverBodyWide<L>,
        body_b: &SolverBodyWide<L>,
    ) -> L {
        let d = body_b.displacement_at_offset(&point.anchor_b)
            - body_a.displacement_at_offset(&point.anchor_a);
        point.base_separation + Vector2Wide::dot(&d, normal)
    }

    /// Computes the velocity bias and the softness scales for one point.
    ///
    /// Separated points (`s > 0`) are speculative: they only remove the approach speed that would close the gap
    /// within the substep. Penetrating points are pushed apart at the soft rate, capped by the pushout velocity,
    /// or not at all during relax passes.
    #[inline(always)]
    pub fn compute_bias<L: Lane>(
        separation: L,
        softness: &Softness<L>,
        context: &PenetrationSolveContext<L>,
    ) -> (L, L, L) {
        let zero = L::splat(0.0);
        let one = L::splat(1.0);
        let speculative = separation.lanes_gt(zero);
        let speculative_bias = separation * context.inverse_dt;
        if context.use_bias {
            let soft_bias = (softness.bias_rate * separation).lane_max(-context.max_pushout_velocity);
            (
                L::select(speculative, speculative_bias, soft_bias),
                L::select(speculative, one, softness.mass_scale),
                L::select(speculative, zero, softness.impulse_scale),
            )
        } else {
            (L::select(speculative, speculative_bias, zero), one, zero)
        }
    }

    /// Applies `impulse` along `direction` at the point, pushing B along the direction and A against it.
    #[inline(always)]
    pub fn apply_impulse<L: Lane>(
        point: &ContactPointData<L>,
        direction: &Vector2Wide<L>,
        impulse: L,
        body_a: &mut SolverBodyWide<L>,
        body_b: &mut SolverBodyWide<L>,
    ) {
        let p = Vector2Wide::scale(direction, impulse);
        body_a.apply_impulse(&point.anchor_a, &p, L::splat(-1.0));
        body_b.apply_impulse(&point.anchor_b, &p, L::splat(1.0));
    }

    /// Solves the normal row of one point and returns the accumulated normal impulse afterwards.
    #[inline(always)]
    pub fn solve<L: Lane>(
        point: &mut ContactPointData<L>,
        normal: &Vector2Wide<L>,
        softness: &Softness<L>,
        context: &PenetrationSolveContext<L>,
        body_a: &mut SolverBodyWide<L>,
        body_b: &mut SolverBodyWide<L>,
    ) -> L {
        let separation = Self::current_separation(point, normal, body_a, body_b);
        let (bias, mass_scale, impulse_scale) = Self::compute_bias(separation, softness, context);

        let dv = Self::relative_velocity(point, body_a, body_b);
        let vn = Vector2Wide::dot(&dv, normal);
        let impulse =
            -(point.normal_mass * mass_scale * (vn + bias)) - impulse_scale * point.normal_impulse;
        let applied = InequalityHelpers::clamp_positive(&mut point.normal_impulse, impulse);
        point.max_normal_impulse = point.max_normal_impulse.lane_max(applied);

        Self::apply_impulse(point, normal, applied, body_a, body_b);
        point.normal_impulse
    }
}
