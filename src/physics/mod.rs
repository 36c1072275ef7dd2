pub mod body_properties;
pub mod constraint_graph;
pub mod constraints;
pub mod contact_manifold;
pub mod contact_solver;
pub mod error;
pub mod handles;
pub mod pose_integrator;
pub mod solve_description;
pub mod solver_bodies;
pub mod solver_settings;

pub use self::body_properties::{BodyInertia, BodyVelocity, SolverBody};
pub use self::constraint_graph::{ColorPartition, ConstraintGraph, GRAPH_COLOR_COUNT};
pub use self::contact_manifold::{ContactManifold, ContactMaterial, ContactPair, ManifoldPoint};
pub use self::contact_solver::ContactSolver;
pub use self::error::SolverError;
pub use self::handles::{BodyHandle, ContactId, SolverBodyHandle, SolverBodyRef};
pub use self::pose_integrator::{DeltaPoseIntegrator, IPoseIntegrator};
pub use self::solve_description::SolveDescription;
pub use self::solver_bodies::{IBodyQuery, SolverBodies};
pub use self::solver_settings::ContactSolverSettings;
