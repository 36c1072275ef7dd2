use thiserror::Error;

/// Errors reported by the contact solver's configuration and input checks.
///
/// Numerical degeneracies such as zero effective mass are handled by the solver math and never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// A setting is negative or not finite.
    #[error("invalid setting {name}: {value} (must be finite and nonnegative)")]
    InvalidSetting {
        /// Name of the setting.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// Step duration is not positive and finite.
    #[error("invalid time step: {0}")]
    InvalidTimeStep(f32),

    /// A count in the iteration schedule is zero.
    #[error("{name} must be at least 1")]
    ZeroCount {
        /// Name of the count.
        name: &'static str,
    },

    /// The color partition names a contact that was not handed to the solver.
    #[error("contact {contact} out of range for {contact_count} contacts")]
    ContactOutOfRange {
        /// Offending contact index.
        contact: u32,
        /// Number of contacts in the step.
        contact_count: usize,
    },

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// A color holds more than one constraint acting on the same dynamic body.
    #[error("color {color} contains body {body} more than once")]
    ColorConflict {
        /// Index of the color.
        color: usize,
        /// Handle of the shared body.
        body: u32,
    },
}

impl SolverError {
    /// Checks that `value` is finite and nonnegative.
    pub(crate) fn check_nonnegative(name: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidSetting { name, value })
        }
    }

    pub(crate) fn check_count(name: &'static str, count: u32) -> Result<(), Self> {
        if count == 0 {
            Err(Self::ZeroCount { name })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let error = SolverError::check_nonnegative("contact_hertz", -1.0).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid setting contact_hertz: -1 (must be finite and nonnegative)"
        );
        assert!(SolverError::check_nonnegative("damping_ratio", f32::NAN).is_err());
        assert!(SolverError::check_nonnegative("damping_ratio", 0.0).is_ok());
        assert_eq!(
            SolverError::check_count("substep_count", 0),
            Err(SolverError::ZeroCount { name: "substep_count" })
        );
    }
}
