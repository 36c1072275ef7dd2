use crate::physics::constraints::softness::Softness;
use crate::physics::contact_manifold::MAX_MANIFOLD_POINTS;
use crate::physics::handles::{ContactId, SolverBodyRef};
use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::lane::Lane;
use crate::utilities::vector::{Vector, LANES};
use crate::utilities::vector2_wide::Vector2Wide;

/// Per point solver state.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContactPointData<L: Lane = Vector<f32>> {
    /// Contact location relative to body A's center of mass.
    pub anchor_a: Vector2Wide<L>,
    /// Contact location relative to body B's center of mass.
    pub anchor_b: Vector2Wide<L>,
    /// Separation at the start of the step.
    pub base_separation: L,
    pub normal_impulse: L,
    pub tangent_impulse: L,
    pub max_normal_impulse: L,
    pub normal_mass: L,
    pub tangent_mass: L,
    /// Relative normal velocity before any impulse of this step was applied. Used by restitution.
    pub relative_velocity: L,
}

/// Solver state of a contact manifold, shared by the narrow and bundled solvers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContactConstraintData<L: Lane = Vector<f32>> {
    /// Unit normal pointing from A to B.
    pub normal: Vector2Wide<L>,
    pub friction: L,
    pub restitution: L,
    pub rolling_resistance: L,
    pub tangent_speed: L,
    pub softness: Softness<L>,
    pub rolling_mass: L,
    pub rolling_impulse: L,
    pub points: [ContactPointData<L>; MAX_MANIFOLD_POINTS],
}

impl ContactPointData {
    pub fn write_slot(source: &ContactPointData<f32>, slot_index: usize, target: &mut Self) {
        Vector2Wide::write_slot(source.anchor_a.to_vec2(), slot_index, &mut target.anchor_a);
        Vector2Wide::write_slot(source.anchor_b.to_vec2(), slot_index, &mut target.anchor_b);
        GatherScatter::set(&mut target.base_separation, slot_index, source.base_separation);
        GatherScatter::set(&mut target.normal_impulse, slot_index, source.normal_impulse);
        GatherScatter::set(&mut target.tangent_impulse, slot_index, source.tangent_impulse);
        GatherScatter::set(&mut target.max_normal_impulse, slot_index, source.max_normal_impulse);
        GatherScatter::set(&mut target.normal_mass, slot_index, source.normal_mass);
        GatherScatter::set(&mut target.tangent_mass, slot_index, source.tangent_mass);
        GatherScatter::set(&mut target.relative_velocity, slot_index, source.relative_velocity);
    }

    /// Reads the accumulated impulses of one lane. Other fields are left at their defaults.
    pub fn read_impulses_slot(source: &Self, slot_index: usize) -> ContactPointData<f32> {
        ContactPointData {
            normal_impulse: GatherScatter::get(&source.normal_impulse, slot_index),
            tangent_impulse: GatherScatter::get(&source.tangent_impulse, slot_index),
            max_normal_impulse: GatherScatter::get(&source.max_normal_impulse, slot_index),
            ..Default::default()
        }
    }
}

impl ContactConstraintData {
    /// Transposes a narrow constraint into one lane of the bundle.
    pub fn write_slot(source: &ContactConstraintData<f32>, slot_index: usize, target: &mut Self) {
        Vector2Wide::write_slot(source.normal.to_vec2(), slot_index, &mut target.normal);
        GatherScatter::set(&mut target.friction, slot_index, source.friction);
        GatherScatter::set(&mut target.restitution, slot_index, source.restitution);
        GatherScatter::set(&mut target.rolling_resistance, slot_index, source.rolling_resistance);
        GatherScatter::set(&mut target.tangent_speed, slot_index, source.tangent_speed);
        Softness::write_slot(&source.softness, slot_index, &mut target.softness);
        GatherScatter::set(&mut target.rolling_mass, slot_index, source.rolling_mass);
        GatherScatter::set(&mut target.rolling_impulse, slot_index, source.rolling_impulse);
        for (source_point, target_point) in source.points.iter().zip(target.points.iter_mut()) {
            ContactPointData::write_slot(source_point, slot_index, target_point);
        }
    }

    /// Reads the accumulated impulses of one lane, which is all store-back needs.
    pub fn read_impulses_slot(source: &Self, slot_index: usize) -> ContactConstraintData<f32> {
        let mut target = ContactConstraintData::<f32> {
            rolling_impulse: GatherScatter::get(&source.rolling_impulse, slot_index),
            ..Default::default()
        };
        for (source_point, target_point) in source.points.iter().zip(target.points.iter_mut()) {
            *target_point = ContactPointData::read_impulses_slot(source_point, slot_index);
        }
        target
    }
}

/// Narrow contact constraint, solved one at a time. Used for the overflow bucket.
#[derive(Clone, Copy, Debug)]
pub struct ContactConstraint {
    pub contact_id: ContactId,
    pub body_a: SolverBodyRef,
    pub body_b: SolverBodyRef,
    pub point_count: usize,
    pub data: ContactConstraintData<f32>,
}

/// Bundle of up to `LANES` contact constraints sharing no dynamic body.
///
/// Lanes at or beyond `lane_count` are empty: both body references are static and all masses and impulses are zero,
/// so the shared math produces no change for them.
#[derive(Clone, Copy, Debug)]
pub struct ContactConstraintWide {
    pub contact_ids: [ContactId; LANES],
    pub body_a: [SolverBodyRef; LANES],
    pub body_b: [SolverBodyRef; LANES],
    pub lane_count: usize,
    /// Largest point count of any occupied lane. Missing points of other lanes are zero filled.
    pub point_count: usize,
    pub data: ContactConstraintData,
}

impl Default for ContactConstraintWide {
    fn default() -> Self {
        Self {
            contact_ids: [ContactId(0); LANES],
            body_a: [SolverBodyRef::Static; LANES],
            body_b: [SolverBodyRef::Static; LANES],
            lane_count: 0,
            point_count: 0,
            data: ContactConstraintData::default(),
        }
    }
}

impl ContactConstraintWide {
    /// Moves a narrow constraint into the next free lane.
    pub fn push(&mut self, constraint: &ContactConstraint) {
        debug_assert!(self.lane_count < LANES, "Bundle is full.");
        let slot_index = self.lane_count;
        self.contact_ids[slot_index] = constraint.contact_id;
        self.body_a[slot_index] = constraint.body_a;
        self.body_b[slot_index] = constraint.body_b;
        self.point_count = self.point_count.max(constraint.point_count);
        ContactConstraintData::write_slot(&constraint.data, slot_index, &mut self.data);
        self.lane_count += 1;
    }

    /// Iterates the contact ids of the occupied lanes with their slot index.
    pub fn occupied_lanes(&self) -> impl Iterator<Item = (usize, ContactId)> + '_ {
        self.contact_ids[..self.lane_count].iter().copied().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn narrow(contact: u32, normal_impulse: f32) -> ContactConstraint {
        let mut data = ContactConstraintData::<f32> {
            normal: Vec2::Y.into(),
            friction: 0.5,
            rolling_impulse: 0.25,
            ..Default::default()
        };
        data.points[0].normal_impulse = normal_impulse;
        data.points[0].tangent_impulse = -0.5;
        ContactConstraint {
            contact_id: ContactId(contact),
            body_a: SolverBodyRef::Static,
            body_b: SolverBodyRef::Static,
            point_count: 1,
            data,
        }
    }

    #[test]
    fn pushed_lanes_keep_their_impulses() {
        let mut bundle = ContactConstraintWide::default();
        bundle.push(&narrow(4, 1.0));
        bundle.push(&narrow(9, 3.0));
        assert_eq!(bundle.lane_count, 2);
        assert_eq!(bundle.point_count, 1);
        let lanes: Vec<_> = bundle.occupied_lanes().collect();
        assert_eq!(lanes, vec![(0, ContactId(4)), (1, ContactId(9))]);

        let second = ContactConstraintData::read_impulses_slot(&bundle.data, 1);
        assert_eq!(second.points[0].normal_impulse, 3.0);
        assert_eq!(second.points[0].tangent_impulse, -0.5);
        assert_eq!(second.rolling_impulse, 0.25);
        let empty = ContactConstraintData::read_impulses_slot(&bundle.data, 2);
        assert_eq!(empty.points[0].normal_impulse, 0.0);
    }
}
