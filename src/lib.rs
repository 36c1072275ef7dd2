#![feature(portable_simd)]

//! Soft step contact constraint solver for 2D rigid bodies.
//!
//! Contacts are partitioned by [`physics::constraint_graph::ConstraintGraph`] into body-disjoint colors plus an
//! overflow bucket. [`physics::contact_solver::ContactSolver`] builds a constraint per manifold, warm starts it from
//! the impulses of the previous step, runs substepped biased and relax iterations, applies restitution and writes the
//! accumulated impulses back into the manifolds. Colored contacts are solved `LANES` at a time with `std::simd`;
//! the overflow bucket runs the same math one contact at a time.

pub mod physics;
pub mod utilities;
