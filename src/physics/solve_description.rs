use crate::physics::error::SolverError;

/// Callback executed to determine how many biased velocity iterations should be used for a given substep.
///
/// Returns the number of iterations to use for the substep. If zero,
/// `SolveDescription::velocity_iteration_count` will be used for the substep instead.
pub type SubstepVelocityIterationScheduler = Box<dyn Fn(u32) -> u32 + Send + Sync>;

/// Describes how the solver should schedule substeps and iterations.
///
/// Each substep runs `velocity_iteration_count` passes with position bias, integrates positions, and then runs
/// `relax_iteration_count` passes without bias to remove the velocity the bias added.
pub struct SolveDescription {
    /// Number of substeps to execute each time the solver runs.
    pub substep_count: u32,
    /// Number of biased velocity iterations per substep if there is no `velocity_iteration_scheduler`
    /// or if it returns zero for a substep.
    pub velocity_iteration_count: u32,
    /// Number of relax iterations per substep.
    pub relax_iteration_count: u32,
    /// Callback executed to determine how many biased velocity iterations should be used for a given substep.
    pub velocity_iteration_scheduler: Option<SubstepVelocityIterationScheduler>,
}

impl SolveDescription {
    fn validate_description(&self) -> Result<(), SolverError> {
        SolverError::check_count("substep_count", self.substep_count)?;
        SolverError::check_count("velocity_iteration_count", self.velocity_iteration_count)?;
        SolverError::check_count("relax_iteration_count", self.relax_iteration_count)?;
        Ok(())
    }

    /// Creates a solve description.
    ///
    /// # Arguments
    /// * `substep_count` - Number of substeps in the solve.
    /// * `velocity_iteration_count` - Number of biased velocity iterations per substep.
    /// * `relax_iteration_count` - Number of relax iterations per substep.
    pub fn new(
        substep_count: u32,
        velocity_iteration_count: u32,
        relax_iteration_count: u32,
    ) -> Result<Self, SolverError> {
        let desc = Self {
            substep_count,
            velocity_iteration_count,
            relax_iteration_count,
            velocity_iteration_scheduler: None,
        };
        desc.validate_description()?;
        Ok(desc)
    }

    /// Creates a solve description with a velocity iteration scheduler.
    pub fn with_scheduler(
        substep_count: u32,
        velocity_iteration_scheduler: SubstepVelocityIterationScheduler,
        fallback_velocity_iteration_count: u32,
        relax_iteration_count: u32,
    ) -> Result<Self, SolverError> {
        let desc = Self {
            substep_count,
            velocity_iteration_count: fallback_velocity_iteration_count,
            relax_iteration_count,
            velocity_iteration_scheduler: Some(velocity_iteration_scheduler),
        };
        desc.validate_description()?;
        Ok(desc)
    }

    /// Creates a solve description from a slice of per-substep biased iteration counts.
    pub fn from_substep_iterations(
        substep_velocity_iterations: &[u32],
        fallback_velocity_iteration_count: u32,
        relax_iteration_count: u32,
    ) -> Result<Self, SolverError> {
        let copy = substep_velocity_iterations.to_vec();
        Self::with_scheduler(
            copy.len() as u32,
            Box::new(move |substep_index| copy.get(substep_index as usize).copied().unwrap_or(0)),
            fallback_velocity_iteration_count,
            relax_iteration_count,
        )
    }

    /// Gets the number of biased velocity iterations for the given substep.
    pub fn velocity_iterations_for_substep(&self, substep_index: u32) -> u32 {
        match &self.velocity_iteration_scheduler {
            Some(scheduler) => match scheduler(substep_index) {
                0 => self.velocity_iteration_count,
                count => count,
            },
            None => self.velocity_iteration_count,
        }
    }
}

impl std::fmt::Debug for SolveDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveDescription")
            .field("substep_count", &self.substep_count)
            .field("velocity_iteration_count", &self.velocity_iteration_count)
            .field("relax_iteration_count", &self.relax_iteration_count)
            .field(
                "velocity_iteration_scheduler",
                &self.velocity_iteration_scheduler.is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_are_rejected() {
        assert!(SolveDescription::new(4, 1, 1).is_ok());
        assert_eq!(
            SolveDescription::new(0, 1, 1).unwrap_err(),
            SolverError::ZeroCount {
                name: "substep_count"
            }
        );
        assert!(SolveDescription::new(4, 0, 1).is_err());
        assert!(SolveDescription::new(4, 1, 0).is_err());
        assert!(SolveDescription::from_substep_iterations(&[], 1, 1).is_err());
    }

    #[test]
    fn scheduler_overrides_fallback_count() {
        let desc = SolveDescription::from_substep_iterations(&[3, 0, 2], 5, 1).unwrap();
        assert_eq!(desc.substep_count, 3);
        assert_eq!(desc.velocity_iterations_for_substep(0), 3);
        assert_eq!(desc.velocity_iterations_for_substep(1), 5);
        assert_eq!(desc.velocity_iterations_for_substep(2), 2);
        let plain = SolveDescription::new(2, 4, 1).unwrap();
        assert_eq!(plain.velocity_iterations_for_substep(1), 4);
    }
}
