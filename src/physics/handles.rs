use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier of a body, owned by the body subsystem outside the solver.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyHandle(pub u32);

/// Index of a contact pair in the list handed to the solver for one step.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactId(pub u32);

/// Index of a body record inside `SolverBodies`. Only valid for the step it was created in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SolverBodyHandle(pub(crate) u32);

impl SolverBodyHandle {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ContactId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reference from a constraint to one of its bodies.
///
/// Bodies that cannot move in the solver (static, kinematic, or with infinite mass) are `Static`; they resolve
/// to the read-only zero body and are never written.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum SolverBodyRef {
    Dynamic(SolverBodyHandle),
    #[default]
    Static,
}

impl SolverBodyRef {
    #[inline(always)]
    pub fn is_static(self) -> bool {
        matches!(self, SolverBodyRef::Static)
    }

    #[inline(always)]
    pub fn handle(self) -> Option<SolverBodyHandle> {
        match self {
            SolverBodyRef::Dynamic(handle) => Some(handle),
            SolverBodyRef::Static => None,
        }
    }
}

impl std::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "BodyHandle<{}>", self.0)
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ContactId<{}>", self.0)
    }
}

impl std::fmt::Display for SolverBodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SolverBodyHandle<{}>", self.0)
    }
}
