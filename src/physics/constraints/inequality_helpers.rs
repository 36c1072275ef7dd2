use crate::utilities::lane::Lane;

/// Helpers for clamping accumulated impulses of inequality constraints.
pub struct InequalityHelpers;

impl InequalityHelpers {
    /// Adds `impulse` to `accumulated_impulse` while keeping the sum nonnegative.
    ///
    /// Returns the impulse that was actually applied.
    #[inline(always)]
    pub fn clamp_positive<L: Lane>(accumulated_impulse: &mut L, impulse: L) -> L {
        let previous = *accumulated_impulse;
        *accumulated_impulse = (previous + impulse).lane_max(L::splat(0.0));
        *accumulated_impulse - previous
    }

    /// Adds `impulse` to `accumulated_impulse` while keeping the sum within `[-maximum, maximum]`.
    ///
    /// Returns the impulse that was actually applied.
    #[inline(always)]
    pub fn clamp_symmetric<L: Lane>(accumulated_impulse: &mut L, impulse: L, maximum: L) -> L {
        let previous = *accumulated_impulse;
        *accumulated_impulse = (previous + impulse).lane_clamp(-maximum, maximum);
        *accumulated_impulse - previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::vector::Vector;

    #[test]
    fn positive_clamp_returns_applied_change() {
        let mut accumulated = 2.0f32;
        assert_eq!(InequalityHelpers::clamp_positive(&mut accumulated, -5.0), -2.0);
        assert_eq!(accumulated, 0.0);
        assert_eq!(InequalityHelpers::clamp_positive(&mut accumulated, 1.5), 1.5);
        assert_eq!(accumulated, 1.5);
    }

    #[test]
    fn symmetric_clamp_is_lanewise() {
        let mut accumulated = Vector::<f32>::splat(0.5);
        let impulse = Vector::<f32>::from_array([1.0, -1.0, 0.25, -3.0, 0.0, 2.0, -0.5, 0.25]);
        let applied =
            InequalityHelpers::clamp_symmetric(&mut accumulated, impulse, Vector::splat(1.0));
        assert_eq!(
            accumulated.to_array(),
            [1.0, -0.5, 0.75, -1.0, 0.5, 1.0, 0.0, 0.75]
        );
        assert_eq!(applied[0], 0.5);
        assert_eq!(applied[3], -1.5);
    }
}
