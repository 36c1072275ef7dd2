use std::collections::HashMap;
use std::marker::PhantomData;

use tracing::trace;

use crate::physics::body_properties::{BodyInertia, BodyVelocity, SolverBody, SolverBodyWide};
use crate::physics::handles::{BodyHandle, SolverBodyHandle, SolverBodyRef};
use crate::utilities::vector::LANES;

/// Source of body state for building the solver's per-step body records.
pub trait IBodyQuery {
    fn velocity(&self, body: BodyHandle) -> BodyVelocity;

    fn inertia(&self, body: BodyHandle) -> BodyInertia;
}

/// Arena of solver body records for a single step.
///
/// Only bodies the solver can move get a record. Everything else resolves to `SolverBodyRef::Static`,
/// which reads back as `SolverBody::STATIC` and ignores writes. Body handles may be sparse; storage grows with the
/// number of movable bodies only.
#[derive(Debug, Default)]
pub struct SolverBodies {
    bodies: Vec<SolverBody>,
    handles: Vec<BodyHandle>,
    handle_to_index: HashMap<BodyHandle, SolverBodyHandle>,
}

impl SolverBodies {
    /// Gathers a record for every movable body among `handles`. Duplicate handles share one record.
    pub fn build<Q: IBodyQuery + ?Sized>(
        query: &Q,
        handles: impl IntoIterator<Item = BodyHandle>,
    ) -> Self {
        let mut store = Self::default();
        for handle in handles {
            store.add(query, handle);
        }
        trace!(body_count = store.bodies.len(), "built solver bodies");
        store
    }

    fn add<Q: IBodyQuery + ?Sized>(&mut self, query: &Q, handle: BodyHandle) {
        if self.handle_to_index.contains_key(&handle) {
            return;
        }
        let inertia = query.inertia(handle);
        if inertia.is_immovable() {
            return;
        }
        self.handle_to_index
            .insert(handle, SolverBodyHandle(self.bodies.len() as u32));
        self.bodies.push(SolverBody::new(query.velocity(handle), inertia));
        self.handles.push(handle);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Maps a body to its solver record, or `Static` if the body has none.
    #[inline(always)]
    pub fn resolve(&self, handle: BodyHandle) -> SolverBodyRef {
        match self.handle_to_index.get(&handle) {
            Some(index) => SolverBodyRef::Dynamic(*index),
            None => SolverBodyRef::Static,
        }
    }

    #[inline(always)]
    pub fn gather(&self, body: SolverBodyRef) -> SolverBody {
        match body {
            SolverBodyRef::Dynamic(handle) => self.bodies[handle.index()],
            SolverBodyRef::Static => SolverBody::STATIC,
        }
    }

    /// Writes the velocity of `source` back to the record. Static references are ignored.
    #[inline(always)]
    pub fn scatter(&mut self, body: SolverBodyRef, source: &SolverBodyWide<f32>) {
        if let SolverBodyRef::Dynamic(handle) = body {
            source.write_velocity(&mut self.bodies[handle.index()]);
        }
    }

    /// Transposes the bodies of a bundle into lanes. Static lanes hold zeros.
    pub fn gather_wide(&self, bodies: &[SolverBodyRef; LANES]) -> SolverBodyWide {
        let mut wide = SolverBodyWide::default();
        for (slot_index, body) in bodies.iter().enumerate() {
            if !body.is_static() {
                SolverBodyWide::write_slot(&self.gather(*body), slot_index, &mut wide);
            }
        }
        wide
    }

    /// Writes the velocity of every dynamic lane back. Static and empty lanes are discarded.
    pub fn scatter_wide(&mut self, bodies: &[SolverBodyRef; LANES], source: &SolverBodyWide) {
        for (slot_index, body) in bodies.iter().enumerate() {
            if let SolverBodyRef::Dynamic(handle) = body {
                let velocity = SolverBodyWide::read_velocity_slot(source, slot_index);
                let target = &mut self.bodies[handle.index()];
                target.linear_velocity = velocity.linear;
                target.angular_velocity = velocity.angular;
            }
        }
    }

    #[inline(always)]
    pub fn bodies(&self) -> &[SolverBody] {
        &self.bodies
    }

    #[inline(always)]
    pub fn bodies_mut(&mut self) -> &mut [SolverBody] {
        &mut self.bodies
    }

    /// Final velocities of every movable body, for the caller to write back to its body storage.
    pub fn velocities(&self) -> impl Iterator<Item = (BodyHandle, BodyVelocity)> + '_ {
        self.handles
            .iter()
            .zip(self.bodies.iter())
            .map(|(handle, body)| (*handle, body.velocity()))
    }

    /// Creates a view through which several workers can access disjoint bodies at the same time.
    pub fn view(&mut self) -> SolverBodiesView<'_> {
        SolverBodiesView {
            bodies: self.bodies.as_mut_ptr(),
            count: self.bodies.len(),
            _marker: PhantomData,
        }
    }
}

/// Shared access to the body records used while one constraint color is solved.
///
/// The view itself performs no synchronization. Constraints in one color never share a dynamic body, so workers
/// handling different bundles of the same color never touch the same record.
pub struct SolverBodiesView<'a> {
    bodies: *mut SolverBody,
    count: usize,
    _marker: PhantomData<&'a mut [SolverBody]>,
}

unsafe impl Send for SolverBodiesView<'_> {}
unsafe impl Sync for SolverBodiesView<'_> {}

impl SolverBodiesView<'_> {
    /// # Safety
    /// No other thread may be writing any of the referenced bodies.
    pub unsafe fn gather_wide(&self, bodies: &[SolverBodyRef; LANES]) -> SolverBodyWide {
        let mut wide = SolverBodyWide::default();
        for (slot_index, body) in bodies.iter().enumerate() {
            if let SolverBodyRef::Dynamic(handle) = body {
                let index = handle.index();
                assert!(index < self.count, "Solver body handle out of range.");
                SolverBodyWide::write_slot(&*self.bodies.add(index), slot_index, &mut wide);
            }
        }
        wide
    }

    /// # Safety
    /// No other thread may be reading or writing any of the referenced bodies.
    pub unsafe fn scatter_wide(&self, bodies: &[SolverBodyRef; LANES], source: &SolverBodyWide) {
        for (slot_index, body) in bodies.iter().enumerate() {
            if let SolverBodyRef::Dynamic(handle) = body {
                let index = handle.index();
                assert!(index < self.count, "Solver body handle out of range.");
                let velocity = SolverBodyWide::read_velocity_slot(source, slot_index);
                let target = &mut *self.bodies.add(index);
                target.linear_velocity = velocity.linear;
                target.angular_velocity = velocity.angular;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use glam::Vec2;
    use std::collections::HashMap;

    /// Body storage used by tests across the crate.
    #[derive(Default)]
    pub(crate) struct TestBodies {
        pub bodies: HashMap<BodyHandle, (BodyVelocity, BodyInertia)>,
    }

    impl TestBodies {
        pub fn insert(&mut self, handle: u32, velocity: BodyVelocity, inertia: BodyInertia) -> BodyHandle {
            let handle = BodyHandle(handle);
            self.bodies.insert(handle, (velocity, inertia));
            handle
        }
    }

    impl IBodyQuery for TestBodies {
        fn velocity(&self, body: BodyHandle) -> BodyVelocity {
            self.bodies.get(&body).map(|b| b.0).unwrap_or_default()
        }

        fn inertia(&self, body: BodyHandle) -> BodyInertia {
            self.bodies.get(&body).map(|b| b.1).unwrap_or_default()
        }
    }

    fn sample() -> (TestBodies, BodyHandle, BodyHandle, BodyHandle) {
        let mut world = TestBodies::default();
        let ground = world.insert(0, BodyVelocity::default(), BodyInertia::default());
        let ball = world.insert(
            7,
            BodyVelocity::new(Vec2::new(1.0, -2.0), 0.5),
            BodyInertia::new(1.0, 2.0),
        );
        let crate_body = world.insert(3, BodyVelocity::default(), BodyInertia::new(0.5, 0.0));
        (world, ground, ball, crate_body)
    }

    #[test]
    fn immovable_bodies_resolve_to_static() {
        let (world, ground, ball, crate_body) = sample();
        let store = SolverBodies::build(&world, [ground, ball, crate_body, ball]);
        assert_eq!(store.len(), 2);
        assert!(store.resolve(ground).is_static());
        assert!(store.resolve(BodyHandle(1000)).is_static());
        assert_eq!(store.gather(store.resolve(ground)), SolverBody::STATIC);
        let ball_ref = store.resolve(ball);
        assert_eq!(store.gather(ball_ref).linear_velocity, Vec2::new(1.0, -2.0));
        assert_eq!(store.gather(ball_ref).delta_position, Vec2::ZERO);
    }

    #[test]
    fn sparse_handles_only_store_movable_bodies() {
        let mut world = TestBodies::default();
        let far = world.insert(u32::MAX, BodyVelocity::new(Vec2::X, 1.0), BodyInertia::new(1.0, 1.0));
        let near = world.insert(2, BodyVelocity::default(), BodyInertia::new(2.0, 2.0));
        let store = SolverBodies::build(&world, [far, BodyHandle(50_000_000), near]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.handle_to_index.len(), 2);
        assert_eq!(store.resolve(far), SolverBodyRef::Dynamic(SolverBodyHandle(0)));
        assert_eq!(store.resolve(near), SolverBodyRef::Dynamic(SolverBodyHandle(1)));
        assert!(store.resolve(BodyHandle(50_000_000)).is_static());
        assert_eq!(store.gather(store.resolve(far)).linear_velocity, Vec2::X);
    }

    #[test]
    fn scatter_ignores_static_and_writes_dynamic() {
        let (world, ground, ball, _) = sample();
        let mut store = SolverBodies::build(&world, [ground, ball]);
        let mut moved = SolverBodyWide::<f32>::from(SolverBody::STATIC);
        moved.velocity.angular = 9.0;
        store.scatter(store.resolve(ground), &moved);
        store.scatter(store.resolve(ball), &moved);
        let velocities: Vec<_> = store.velocities().collect();
        assert_eq!(velocities.len(), 1);
        assert_eq!(velocities[0].0, ball);
        assert_eq!(velocities[0].1.angular, 9.0);
    }

    #[test]
    fn wide_gather_scatter_through_view() {
        let (world, ground, ball, crate_body) = sample();
        let mut store = SolverBodies::build(&world, [ground, ball, crate_body]);
        let mut refs = [SolverBodyRef::Static; LANES];
        refs[1] = store.resolve(ball);
        refs[4] = store.resolve(crate_body);
        let mut wide = store.gather_wide(&refs);
        assert_eq!(
            SolverBodyWide::read_velocity_slot(&wide, 1).linear,
            Vec2::new(1.0, -2.0)
        );
        wide.velocity.angular = crate::utilities::vector::Vector::splat(-1.0);

        let view = store.view();
        unsafe {
            let through_view = view.gather_wide(&refs);
            assert_eq!(through_view.velocity.angular[1], 0.5);
            view.scatter_wide(&refs, &wide);
        }
        assert_eq!(store.gather(refs[1]).angular_velocity, -1.0);
        assert_eq!(store.gather(refs[4]).angular_velocity, -1.0);
        assert_eq!(store.gather(refs[1]).linear_velocity, Vec2::new(1.0, -2.0));
    }
}
