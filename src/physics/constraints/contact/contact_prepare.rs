use crate::physics::body_properties::SolverBodyWide;
use crate::physics::constraints::contact::contact_constraint::{
    ContactConstraint, ContactConstraintData, ContactConstraintWide, ContactPointData,
};
use crate::physics::constraints::contact::penetration_limit::PenetrationLimit;
use crate::physics::constraints::contact::tangent_friction::TangentFriction;
use crate::physics::constraints::softness::Softness;
use crate::physics::contact_manifold::ContactPair;
use crate::physics::handles::{ContactId, SolverBodyRef};
use crate::physics::solver_settings::ContactSolverSettings;
use crate::utilities::lane::Lane;
use crate::utilities::vector2_wide::Vector2Wide;

/// Values shared by every constraint built for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrepareContext {
    /// Softness of contacts between two movable bodies.
    pub contact_softness: Softness<f32>,
    /// Softness of contacts against a static body. Twice as stiff.
    pub static_softness: Softness<f32>,
    pub warm_starting: bool,
}

impl PrepareContext {
    pub fn new(settings: &ContactSolverSettings, h: f32) -> Self {
        let contact_hertz = settings.effective_contact_hertz(h);
        Self {
            contact_softness: Softness::new(contact_hertz, settings.damping_ratio, h),
            static_softness: Softness::new(2.0 * contact_hertz, settings.damping_ratio, h),
            warm_starting: settings.warm_starting,
        }
    }
}

/// Builds contact constraints from manifolds.
pub struct ContactPrepare;

impl ContactPrepare {
    /// Copies the manifold and material of a pair into a narrow constraint.
    ///
    /// Effective masses are left at zero; `compute_masses` fills them once the bodies are gathered.
    pub fn describe(
        contact_id: ContactId,
        pair: &ContactPair,
        body_a: SolverBodyRef,
        body_b: SolverBodyRef,
        context: &PrepareContext,
    ) -> ContactConstraint {
        let manifold = &pair.manifold;
        let softness = if body_a.is_static() || body_b.is_static() {
            context.static_softness
        } else {
            context.contact_softness
        };
        let mut data = ContactConstraintData::<f32> {
            normal: manifold.normal.into(),
            friction: pair.material.friction,
            restitution: pair.material.restitution,
            rolling_resistance: pair.material.rolling_resistance,
            tangent_speed: pair.material.tangent_speed,
            softness,
            rolling_impulse: if context.warm_starting {
                manifold.rolling_impulse
            } else {
                0.0
            },
            ..Default::default()
        };
        let points = manifold.active_points();
        for (source, target) in points.iter().zip(data.points.iter_mut()) {
            *target = ContactPointData {
                anchor_a: source.anchor_a.into(),
                anchor_b: source.anchor_b.into(),
                base_separation: source.separation,
                ..Default::default()
            };
            if context.warm_starting {
                target.normal_impulse = source.normal_impulse;
                target.tangent_impulse = source.tangent_impulse;
            }
        }
        ContactConstraint {
            contact_id,
            body_a,
            body_b,
            point_count: points.len(),
            data,
        }
    }

    /// Computes effective masses and the pre-solve relative normal velocity from the gathered bodies.
    #[inline(always)]
    pub fn compute_masses<L: Lane>(
        data: &mut ContactConstraintData<L>,
        point_count: usize,
        body_a: &SolverBodyWide<L>,
        body_b: &SolverBodyWide<L>,
    ) {
        let m_a = body_a.inertia.inverse_mass;
        let m_b = body_b.inertia.inverse_mass;
        let i_a = body_a.inertia.inverse_inertia;
        let i_b = body_b.inertia.inverse_inertia;
        let normal = data.normal;
        let tangent = TangentFriction::tangent(&normal);

        for point in data.points[..point_count].iter_mut() {
            let rn_a = Vector2Wide::cross(&point.anchor_a, &normal);
            let rn_b = Vector2Wide::cross(&point.anchor_b, &normal);
            let k_normal = m_a + m_b + i_a * rn_a * rn_a + i_b * rn_b * rn_b;
            point.normal_mass = k_normal.positive_reciprocal();

            let rt_a = Vector2Wide::cross(&point.anchor_a, &tangent);
            let rt_b = Vector2Wide::cross(&point.anchor_b, &tangent);
            let k_tangent = m_a + m_b + i_a * rt_a * rt_a + i_b * rt_b * rt_b;
            point.tangent_mass = k_tangent.positive_reciprocal();

            let dv = PenetrationLimit::relative_velocity(point, body_a, body_b);
            point.relative_velocity = Vector2Wide::dot(&dv, &normal);
            point.max_normal_impulse = L::splat(0.0);
        }
        data.rolling_mass = (i_a + i_b).positive_reciprocal();
    }

    /// Builds a narrow constraint for the overflow bucket.
    pub fn prepare(
        contact_id: ContactId,
        pair: &ContactPair,
        body_a: SolverBodyRef,
        body_b: SolverBodyRef,
        bodies: (&SolverBodyWide<f32>, &SolverBodyWide<f32>),
        context: &PrepareContext,
    ) -> ContactConstraint {
        let mut constraint = Self::describe(contact_id, pair, body_a, body_b, context);
        Self::compute_masses(&mut constraint.data, constraint.point_count, bodies.0, bodies.1);
        constraint
    }

    /// Builds a bundle from up to `LANES` described constraints.
    pub fn prepare_bundle(
        constraints: &[ContactConstraint],
        gather: impl Fn(&ContactConstraintWide) -> (SolverBodyWide, SolverBodyWide),
    ) -> ContactConstraintWide {
        let mut bundle = ContactConstraintWide::default();
        for constraint in constraints {
            bundle.push(constraint);
        }
        let (body_a, body_b) = gather(&bundle);
        Self::compute_masses(&mut bundle.data, bundle.point_count, &body_a, &body_b);
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body_properties::{BodyInertia, BodyVelocity, SolverBody};
    use crate::physics::contact_manifold::{ContactManifold, ContactMaterial, ManifoldPoint};
    use crate::physics::handles::{BodyHandle, SolverBodyHandle};
    use approx::assert_relative_eq;
    use glam::Vec2;

    fn falling_box_pair() -> ContactPair {
        let mut point = ManifoldPoint::new(Vec2::new(0.5, -0.5), Vec2::new(0.5, 0.0), -0.01);
        point.normal_impulse = 3.0;
        point.tangent_impulse = -1.0;
        let mut manifold = ContactManifold::new(Vec2::Y, &[point]);
        manifold.rolling_impulse = 0.5;
        ContactPair::new(
            BodyHandle(1),
            BodyHandle(0),
            ContactMaterial::new(0.4, 0.2),
            manifold,
        )
    }

    fn context(warm_starting: bool) -> PrepareContext {
        PrepareContext::new(
            &ContactSolverSettings::default().with_warm_starting(warm_starting),
            1.0 / 240.0,
        )
    }

    #[test]
    fn static_contacts_use_stiffer_softness() {
        let pair = falling_box_pair();
        let dynamic = SolverBodyRef::Dynamic(SolverBodyHandle(0));
        let against_static =
            ContactPrepare::describe(ContactId(0), &pair, dynamic, SolverBodyRef::Static, &context(true));
        let against_dynamic = ContactPrepare::describe(
            ContactId(0),
            &pair,
            dynamic,
            SolverBodyRef::Dynamic(SolverBodyHandle(1)),
            &context(true),
        );
        assert_eq!(against_static.data.softness, context(true).static_softness);
        assert_eq!(against_dynamic.data.softness, context(true).contact_softness);
        assert!(against_static.data.softness.bias_rate > against_dynamic.data.softness.bias_rate);
    }

    #[test]
    fn impulses_are_seeded_only_when_warm_starting() {
        let pair = falling_box_pair();
        let dynamic = SolverBodyRef::Dynamic(SolverBodyHandle(0));
        let warm = ContactPrepare::describe(ContactId(0), &pair, dynamic, SolverBodyRef::Static, &context(true));
        assert_eq!(warm.point_count, 1);
        assert_eq!(warm.data.points[0].normal_impulse, 3.0);
        assert_eq!(warm.data.points[0].tangent_impulse, -1.0);
        assert_eq!(warm.data.rolling_impulse, 0.5);
        let cold = ContactPrepare::describe(ContactId(0), &pair, dynamic, SolverBodyRef::Static, &context(false));
        assert_eq!(cold.data.points[0].normal_impulse, 0.0);
        assert_eq!(cold.data.rolling_impulse, 0.0);
        assert_eq!(cold.data.points[0].base_separation, -0.01);
    }

    #[test]
    fn effective_masses_follow_the_anchors() {
        let pair = falling_box_pair();
        let body = SolverBody::new(
            BodyVelocity::from_linear(Vec2::new(0.0, -4.0)),
            BodyInertia::new(0.5, 2.0),
        );
        let constraint = ContactPrepare::prepare(
            ContactId(0),
            &pair,
            SolverBodyRef::Dynamic(SolverBodyHandle(0)),
            SolverBodyRef::Static,
            (&body.into(), &SolverBody::STATIC.into()),
            &context(true),
        );
        let point = &constraint.data.points[0];
        // r_a = (0.5, -0.5), n = (0, 1): r_a x n = 0.5, k = 0.5 + 2 * 0.25 = 1.
        assert_relative_eq!(point.normal_mass, 1.0);
        // t = (1, 0): r_a x t = 0.5, same k.
        assert_relative_eq!(point.tangent_mass, 1.0);
        assert_relative_eq!(constraint.data.rolling_mass, 0.5);
        // B is static, so the relative velocity is the negated velocity of A.
        assert_relative_eq!(point.relative_velocity, 4.0);
    }

    #[test]
    fn immovable_pairs_get_zero_mass() {
        let pair = falling_box_pair();
        let constraint = ContactPrepare::prepare(
            ContactId(0),
            &pair,
            SolverBodyRef::Static,
            SolverBodyRef::Static,
            (&SolverBody::STATIC.into(), &SolverBody::STATIC.into()),
            &context(true),
        );
        assert_eq!(constraint.data.points[0].normal_mass, 0.0);
        assert_eq!(constraint.data.points[0].tangent_mass, 0.0);
        assert_eq!(constraint.data.rolling_mass, 0.0);
    }
}
