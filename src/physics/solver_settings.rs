use crate::physics::error::SolverError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning values for contact constraints that stay fixed across steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContactSolverSettings {
    /// Stiffness of contacts in cycles per second. Zero makes contacts rigid.
    ///
    /// Clamped to a quarter of the substep rate when the constraints are built.
    pub contact_hertz: f32,
    /// Damping ratio of the contact spring. 1 is critically damped.
    pub damping_ratio: f32,
    /// Upper bound on the speed at which overlapping bodies are pushed apart.
    pub max_pushout_velocity: f32,
    /// Approach speed below which restitution is not applied.
    pub restitution_threshold: f32,
    /// Whether last step's impulses seed the solve.
    pub warm_starting: bool,
}

impl Default for ContactSolverSettings {
    fn default() -> Self {
        Self {
            contact_hertz: Self::DEFAULT_CONTACT_HERTZ,
            damping_ratio: Self::DEFAULT_DAMPING_RATIO,
            max_pushout_velocity: Self::DEFAULT_MAX_PUSHOUT_VELOCITY,
            restitution_threshold: Self::DEFAULT_RESTITUTION_THRESHOLD,
            warm_starting: true,
        }
    }
}

impl ContactSolverSettings {
    pub const DEFAULT_CONTACT_HERTZ: f32 = 30.0;
    pub const DEFAULT_DAMPING_RATIO: f32 = 10.0;
    pub const DEFAULT_MAX_PUSHOUT_VELOCITY: f32 = 3.0;
    pub const DEFAULT_RESTITUTION_THRESHOLD: f32 = 1.0;

    #[must_use]
    pub fn with_contact_hertz(mut self, contact_hertz: f32) -> Self {
        self.contact_hertz = contact_hertz;
        self
    }

    #[must_use]
    pub fn with_damping_ratio(mut self, damping_ratio: f32) -> Self {
        self.damping_ratio = damping_ratio;
        self
    }

    #[must_use]
    pub fn with_max_pushout_velocity(mut self, max_pushout_velocity: f32) -> Self {
        self.max_pushout_velocity = max_pushout_velocity;
        self
    }

    #[must_use]
    pub fn with_restitution_threshold(mut self, restitution_threshold: f32) -> Self {
        self.restitution_threshold = restitution_threshold;
        self
    }

    #[must_use]
    pub fn with_warm_starting(mut self, warm_starting: bool) -> Self {
        self.warm_starting = warm_starting;
        self
    }

    /// Checks that every value is finite and nonnegative.
    pub fn validate(&self) -> Result<(), SolverError> {
        SolverError::check_nonnegative("contact_hertz", self.contact_hertz)?;
        SolverError::check_nonnegative("damping_ratio", self.damping_ratio)?;
        SolverError::check_nonnegative("max_pushout_velocity", self.max_pushout_velocity)?;
        SolverError::check_nonnegative("restitution_threshold", self.restitution_threshold)?;
        Ok(())
    }

    /// Contact frequency used for a substep of length `h`.
    #[inline(always)]
    pub fn effective_contact_hertz(&self, h: f32) -> f32 {
        self.contact_hertz.min(0.25 / h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = ContactSolverSettings::default();
        assert_eq!(settings.contact_hertz, 30.0);
        assert_eq!(settings.damping_ratio, 10.0);
        assert_eq!(settings.max_pushout_velocity, 3.0);
        assert!(settings.warm_starting);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let settings = ContactSolverSettings::default().with_contact_hertz(-5.0);
        assert_eq!(
            settings.validate(),
            Err(SolverError::InvalidSetting {
                name: "contact_hertz",
                value: -5.0
            })
        );
        let settings = ContactSolverSettings::default().with_max_pushout_velocity(f32::INFINITY);
        assert!(settings.validate().is_err());
        let settings = ContactSolverSettings::default()
            .with_damping_ratio(0.0)
            .with_restitution_threshold(0.0)
            .with_warm_starting(false);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn contact_hertz_is_limited_by_substep_rate() {
        let settings = ContactSolverSettings::default();
        assert_eq!(settings.effective_contact_hertz(1.0 / 256.0), 30.0);
        assert_eq!(settings.effective_contact_hertz(1.0 / 32.0), 8.0);
    }
}
