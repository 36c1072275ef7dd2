use crate::physics::body_properties::SolverBodyWide;
use crate::physics::constraints::contact::contact_constraint::ContactConstraintData;
use crate::physics::constraints::contact::penetration_limit::{PenetrationLimit, PenetrationSolveContext};
use crate::physics::constraints::contact::restitution::Restitution;
use crate::physics::constraints::contact::rolling_resistance::RollingResistance;
use crate::physics::constraints::contact::tangent_friction::TangentFriction;
use crate::utilities::lane::Lane;
use crate::utilities::vector2_wide::Vector2Wide;

/// Per contact pipeline shared by the narrow and bundled solvers.
///
/// Every function here is generic over the lane type, so the overflow bucket (`f32`) and the colored bundles
/// (`Vector<f32>`) run the exact same arithmetic. `point_count` bounds the loops; points past a lane's own count
/// carry zero masses and impulses and contribute nothing.
pub struct ContactSolve;

impl ContactSolve {
    /// Applies the accumulated impulses seeded from the previous step.
    #[inline(always)]
    pub fn warm_start<L: Lane>(
        data: &ContactConstraintData<L>,
        point_count: usize,
        body_a: &mut SolverBodyWide<L>,
        body_b: &mut SolverBodyWide<L>,
    ) {
        let tangent = TangentFriction::tangent(&data.normal);
        for point in &data.points[..point_count] {
            let p = Vector2Wide::scale(&data.normal, point.normal_impulse)
                + Vector2Wide::scale(&tangent, point.tangent_impulse);
            body_a.apply_impulse(&point.anchor_a, &p, L::splat(-1.0));
            body_b.apply_impulse(&point.anchor_b, &p, L::splat(1.0));
        }
        RollingResistance::apply_impulse(data.rolling_impulse, body_a, body_b);
    }

    /// One velocity iteration: normal rows, then friction rows, then rolling resistance.
    #[inline(always)]
    pub fn solve<L: Lane>(
        data: &mut ContactConstraintData<L>,
        point_count: usize,
        context: &PenetrationSolveContext<L>,
        body_a: &mut SolverBodyWide<L>,
        body_b: &mut SolverBodyWide<L>,
    ) {
        let mut total_normal_impulse = L::splat(0.0);
        for point in data.points[..point_count].iter_mut() {
            total_normal_impulse += PenetrationLimit::solve(
                point,
                &data.normal,
                &data.softness,
                context,
                body_a,
                body_b,
            );
        }

        let tangent = TangentFriction::tangent(&data.normal);
        for point in data.points[..point_count].iter_mut() {
            TangentFriction::solve(
                point,
                &tangent,
                data.friction,
                data.tangent_speed,
                body_a,
                body_b,
            );
        }

        RollingResistance::solve(data, total_normal_impulse, body_a, body_b);
    }

    #[inline(always)]
    pub fn apply_restitution<L: Lane>(
        data: &mut ContactConstraintData<L>,
        point_count: usize,
        threshold: L,
        body_a: &mut SolverBodyWide<L>,
        body_b: &mut SolverBodyWide<L>,
    ) {
        for point in data.points[..point_count].iter_mut() {
            Restitution::apply(
                point,
                &data.normal,
                data.restitution,
                threshold,
                body_a,
                body_b,
            );
        }
    }
}
