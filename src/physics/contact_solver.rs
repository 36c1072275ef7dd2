use tracing::{debug, debug_span, trace, warn};

use crate::physics::body_properties::SolverBodyWide;
use crate::physics::constraint_graph::ColorPartition;
use crate::physics::constraints::contact::contact_constraint::{
    ContactConstraint, ContactConstraintData, ContactConstraintWide,
};
use crate::physics::constraints::contact::contact_prepare::{ContactPrepare, PrepareContext};
use crate::physics::constraints::contact::contact_solve::ContactSolve;
use crate::physics::constraints::contact::penetration_limit::PenetrationSolveContext;
use crate::physics::contact_manifold::ContactPair;
use crate::physics::error::SolverError;
use crate::physics::handles::ContactId;
use crate::physics::pose_integrator::IPoseIntegrator;
use crate::physics::solve_description::SolveDescription;
use crate::physics::solver_bodies::SolverBodies;
use crate::physics::solver_settings::ContactSolverSettings;
use crate::utilities::bundle_indexing::BundleIndexing;
use crate::utilities::thread_dispatcher::{IThreadDispatcher, SequentialDispatcher};
use crate::utilities::vector::{Vector, LANES};

/// Overflow bucket size above which a warning is logged.
pub const OVERFLOW_WARNING_COUNT: usize = 256;

/// Soft step contact solver.
///
/// Overflow constraints are kept narrow and solved one at a time on the calling thread. Colored constraints are packed
/// into bundles of `LANES` and each color's bundles are spread over the dispatcher's workers. Both paths run the
/// same per contact math from `ContactSolve`.
pub struct ContactSolver<D: IThreadDispatcher = SequentialDispatcher> {
    settings: ContactSolverSettings,
    dispatcher: D,
    overflow: Vec<ContactConstraint>,
    colors: Vec<Vec<ContactConstraintWide>>,
    h: f32,
}

impl ContactSolver {
    /// Creates a solver that runs everything on the calling thread.
    pub fn new(settings: ContactSolverSettings) -> Result<Self, SolverError> {
        Self::with_dispatcher(settings, SequentialDispatcher)
    }
}

impl<D: IThreadDispatcher> ContactSolver<D> {
    pub fn with_dispatcher(settings: ContactSolverSettings, dispatcher: D) -> Result<Self, SolverError> {
        settings.validate()?;
        Ok(Self {
            settings,
            dispatcher,
            overflow: Vec::new(),
            colors: Vec::new(),
            h: 0.0,
        })
    }

    #[inline(always)]
    pub fn settings(&self) -> &ContactSolverSettings {
        &self.settings
    }

    #[inline(always)]
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Number of constraints built by the last `prepare`.
    pub fn constraint_count(&self) -> usize {
        self.overflow.len()
            + self
                .colors
                .iter()
                .flatten()
                .map(|bundle| bundle.lane_count)
                .sum::<usize>()
    }

    #[inline(always)]
    pub fn overflow(&self) -> &[ContactConstraint] {
        &self.overflow
    }

    #[inline(always)]
    pub fn colors(&self) -> &[Vec<ContactConstraintWide>] {
        &self.colors
    }

    /// Builds the constraints for a step with substep length `h`.
    ///
    /// Existing constraints are discarded. Impulses stored in the manifolds seed the new constraints when warm
    /// starting is enabled; call `warm_start` afterwards to apply them.
    ///
    /// The partition is checked with `ColorPartition::validate`: a color touching a dynamic body twice is rejected,
    /// since its bundles are solved concurrently.
    pub fn prepare(
        &mut self,
        pairs: &[ContactPair],
        partition: &ColorPartition,
        bodies: &SolverBodies,
        h: f32,
    ) -> Result<(), SolverError> {
        if !(h.is_finite() && h > 0.0) {
            return Err(SolverError::InvalidTimeStep(h));
        }
        partition.validate(pairs, bodies)?;
        self.h = h;
        let context = PrepareContext::new(&self.settings, h);

        let describe = |contact: &ContactId| {
            let pair = &pairs[contact.index()];
            ContactPrepare::describe(
                *contact,
                pair,
                bodies.resolve(pair.body_a),
                bodies.resolve(pair.body_b),
                &context,
            )
        };

        self.overflow.clear();
        for contact in &partition.overflow {
            let pair = &pairs[contact.index()];
            let body_a = bodies.resolve(pair.body_a);
            let body_b = bodies.resolve(pair.body_b);
            self.overflow.push(ContactPrepare::prepare(
                *contact,
                pair,
                body_a,
                body_b,
                (
                    &SolverBodyWide::from(bodies.gather(body_a)),
                    &SolverBodyWide::from(bodies.gather(body_b)),
                ),
                &context,
            ));
        }

        self.colors.clear();
        let mut narrow = Vec::with_capacity(LANES);
        for color in &partition.colors {
            let mut bundles = Vec::with_capacity(BundleIndexing::get_bundle_count(color.len()));
            for chunk in color.chunks(LANES) {
                narrow.clear();
                narrow.extend(chunk.iter().map(&describe));
                bundles.push(ContactPrepare::prepare_bundle(&narrow, |bundle| {
                    (bodies.gather_wide(&bundle.body_a), bodies.gather_wide(&bundle.body_b))
                }));
            }
            self.colors.push(bundles);
        }

        let bundle_count: usize = self.colors.iter().map(Vec::len).sum();
        debug!(
            color_count = self.colors.len(),
            bundle_count,
            overflow_count = self.overflow.len(),
            "prepared contact constraints"
        );
        if self.overflow.len() > OVERFLOW_WARNING_COUNT {
            warn!(
                overflow_count = self.overflow.len(),
                "large overflow bucket; consider raising the graph color count"
            );
        }
        Ok(())
    }

    /// Applies the impulses seeded by `prepare` to the bodies.
    pub fn warm_start(&mut self, bodies: &mut SolverBodies) {
        self.run_pass(
            bodies,
            |constraint, body_a, body_b| {
                ContactSolve::warm_start(&constraint.data, constraint.point_count, body_a, body_b)
            },
            |bundle, body_a, body_b| {
                ContactSolve::warm_start(&bundle.data, bundle.point_count, body_a, body_b)
            },
        );
    }

    /// Runs one velocity iteration over every constraint. `use_bias` selects between a biased pass and a relax pass.
    pub fn solve(&mut self, bodies: &mut SolverBodies, use_bias: bool) {
        let narrow_context = PenetrationSolveContext {
            inverse_dt: 1.0 / self.h,
            max_pushout_velocity: self.settings.max_pushout_velocity,
            use_bias,
        };
        let wide_context = PenetrationSolveContext {
            inverse_dt: Vector::<f32>::splat(narrow_context.inverse_dt),
            max_pushout_velocity: Vector::<f32>::splat(narrow_context.max_pushout_velocity),
            use_bias,
        };
        trace!(use_bias, "solving contacts");
        self.run_pass(
            bodies,
            |constraint, body_a, body_b| {
                ContactSolve::solve(
                    &mut constraint.data,
                    constraint.point_count,
                    &narrow_context,
                    body_a,
                    body_b,
                )
            },
            |bundle, body_a, body_b| {
                ContactSolve::solve(&mut bundle.data, bundle.point_count, &wide_context, body_a, body_b)
            },
        );
    }

    /// Applies restitution to every constraint. Runs once, after all iterations of the step.
    pub fn apply_restitution(&mut self, bodies: &mut SolverBodies) {
        let threshold = self.settings.restitution_threshold;
        let wide_threshold = Vector::<f32>::splat(threshold);
        self.run_pass(
            bodies,
            |constraint, body_a, body_b| {
                ContactSolve::apply_restitution(
                    &mut constraint.data,
                    constraint.point_count,
                    threshold,
                    body_a,
                    body_b,
                )
            },
            |bundle, body_a, body_b| {
                ContactSolve::apply_restitution(
                    &mut bundle.data,
                    bundle.point_count,
                    wide_threshold,
                    body_a,
                    body_b,
                )
            },
        );
    }

    /// Copies the accumulated impulses of every constraint into its manifold.
    pub fn store_impulses(&self, pairs: &mut [ContactPair]) {
        for constraint in &self.overflow {
            Self::store(&constraint.data, &mut pairs[constraint.contact_id.index()]);
        }
        for bundle in self.colors.iter().flatten() {
            for (slot_index, contact) in bundle.occupied_lanes() {
                let data = ContactConstraintData::read_impulses_slot(&bundle.data, slot_index);
                Self::store(&data, &mut pairs[contact.index()]);
            }
        }
    }

    fn store(data: &ContactConstraintData<f32>, pair: &mut ContactPair) {
        let manifold = &mut pair.manifold;
        manifold.rolling_impulse = data.rolling_impulse;
        for (source, target) in data.points.iter().zip(manifold.active_points_mut()) {
            target.normal_impulse = source.normal_impulse;
            target.tangent_impulse = source.tangent_impulse;
            target.max_normal_impulse = source.max_normal_impulse;
        }
    }

    /// Solves the contacts of one step of length `dt`.
    ///
    /// Builds and warm starts the constraints, then runs each substep: integrate velocities, the biased iterations,
    /// integrate positions, the relax iterations. Restitution follows the last substep and the impulses are stored
    /// back into `pairs`. Final velocities are left in `bodies`.
    pub fn step<I: IPoseIntegrator + ?Sized>(
        &mut self,
        pairs: &mut [ContactPair],
        partition: &ColorPartition,
        bodies: &mut SolverBodies,
        integrator: &I,
        description: &SolveDescription,
        dt: f32,
    ) -> Result<(), SolverError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SolverError::InvalidTimeStep(dt));
        }
        let substep_count = description.substep_count.max(1);
        let h = dt / substep_count as f32;
        let span = debug_span!("contact_step", dt, substep_count, contacts = pairs.len());
        let _guard = span.enter();

        self.prepare(pairs, partition, bodies, h)?;
        if self.settings.warm_starting {
            self.warm_start(bodies);
        }

        for substep_index in 0..substep_count {
            integrator.integrate_velocities(bodies.bodies_mut(), h);
            for _ in 0..description.velocity_iterations_for_substep(substep_index) {
                self.solve(bodies, true);
            }
            integrator.integrate_positions(bodies.bodies_mut(), h);
            for _ in 0..description.relax_iteration_count {
                self.solve(bodies, false);
            }
        }

        self.apply_restitution(bodies);
        self.store_impulses(pairs);
        Ok(())
    }

    /// Runs one operation over every constraint: the overflow bucket first, then each color in order.
    fn run_pass<N, W>(&mut self, bodies: &mut SolverBodies, narrow: N, wide: W)
    where
        N: Fn(&mut ContactConstraint, &mut SolverBodyWide<f32>, &mut SolverBodyWide<f32>),
        W: Fn(&mut ContactConstraintWide, &mut SolverBodyWide, &mut SolverBodyWide) + Sync,
    {
        for constraint in self.overflow.iter_mut() {
            let mut body_a = SolverBodyWide::<f32>::from(bodies.gather(constraint.body_a));
            let mut body_b = SolverBodyWide::<f32>::from(bodies.gather(constraint.body_b));
            narrow(constraint, &mut body_a, &mut body_b);
            bodies.scatter(constraint.body_a, &body_a);
            bodies.scatter(constraint.body_b, &body_b);
        }

        for color in self.colors.iter_mut() {
            let view = bodies.view();
            self.dispatcher.dispatch_chunks(color, |_, bundles| {
                for bundle in bundles.iter_mut() {
                    // Safety: `prepare` rejected any color whose bundles share a dynamic body, and the color is
                    // finished before the next one starts.
                    unsafe {
                        let mut body_a = view.gather_wide(&bundle.body_a);
                        let mut body_b = view.gather_wide(&bundle.body_b);
                        wide(bundle, &mut body_a, &mut body_b);
                        view.scatter_wide(&bundle.body_a, &body_a);
                        view.scatter_wide(&bundle.body_b, &body_b);
                    }
                }
            });
        }
    }
}
