use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::lane::Lane;
use crate::utilities::vector::Vector;

/// Soft constraint coefficients for one substep size.
///
/// A soft contact behaves like a damped spring with the given natural frequency and damping ratio,
/// integrated implicitly over the substep. The solver consumes the spring as three scales:
/// `bias_rate` converts penetration into a target velocity, `mass_scale` softens the effective mass,
/// and `impulse_scale` bleeds off part of the accumulated impulse.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Softness<L: Lane = Vector<f32>> {
    pub bias_rate: L,
    pub mass_scale: L,
    pub impulse_scale: L,
}

impl Softness<f32> {
    /// Coefficients of a rigid constraint: no bias, full mass, no impulse feedback.
    pub const RIGID: Self = Self {
        bias_rate: 0.0,
        mass_scale: 1.0,
        impulse_scale: 0.0,
    };

    /// Computes the coefficients for a spring of `hertz` with damping ratio `zeta` over a substep of length `h`.
    ///
    /// A frequency of zero produces `RIGID`.
    pub fn new(hertz: f32, zeta: f32, h: f32) -> Self {
        if hertz == 0.0 {
            return Self::RIGID;
        }
        let omega = 2.0 * std::f32::consts::PI * hertz;
        let a1 = 2.0 * zeta + h * omega;
        let a2 = h * omega * a1;
        let a3 = 1.0 / (1.0 + a2);
        Self {
            bias_rate: omega / a1,
            mass_scale: a2 * a3,
            impulse_scale: a3,
        }
    }
}

impl Softness {
    #[inline(always)]
    pub fn write_slot(source: &Softness<f32>, slot_index: usize, target: &mut Self) {
        GatherScatter::set(&mut target.bias_rate, slot_index, source.bias_rate);
        GatherScatter::set(&mut target.mass_scale, slot_index, source.mass_scale);
        GatherScatter::set(&mut target.impulse_scale, slot_index, source.impulse_scale);
    }
}
