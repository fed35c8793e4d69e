use ndarray::{Array1, Axis, Zip};
use serde::Deserialize;

use crate::euler::state::ConservedState;

/// Thermodynamic closure of the Euler system. Evaluations are pointwise and
/// unguarded: vanishing density or negative pressure yield NaN/Inf.
pub trait EquationOfState {
    fn gamma(&self) -> f64;
    fn gas_const(&self) -> f64;
    fn pressure(&self, q: &ConservedState) -> Array1<f64>;
    fn sound_speed(&self, q: &ConservedState) -> Array1<f64>;
    fn temperature(&self, q: &ConservedState) -> Array1<f64>;
    /// Internal energy per unit volume at pressure `p`.
    fn internal_energy_from_pressure(&self, p: f64) -> f64 {
        p / (self.gamma() - 1.0)
    }
}

/// Calorically perfect single-species gas.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct IdealSingleGas {
    pub gamma: f64,
    pub gas_const: f64,
}
impl Default for IdealSingleGas {
    fn default() -> Self {
        Self {
            gamma: 1.4,
            gas_const: 287.1,
        }
    }
}
impl IdealSingleGas {
    pub fn new(gamma: f64, gas_const: f64) -> Self {
        Self { gamma, gas_const }
    }
    /// `rho E - |rho V|^2 / (2 rho)`.
    pub fn internal_energy(q: &ConservedState) -> Array1<f64> {
        let momentum_sq = q.momentum().map_axis(Axis(0), |m| m.dot(&m));
        let mut internal_energy = Array1::zeros(q.num_points());
        Zip::from(&mut internal_energy)
            .and(&q.mass())
            .and(&q.energy())
            .and(&momentum_sq)
            .for_each(|e, &rho, &rho_e, &m2| *e = rho_e - 0.5 * m2 / rho);
        internal_energy
    }
}
impl EquationOfState for IdealSingleGas {
    fn gamma(&self) -> f64 {
        self.gamma
    }
    fn gas_const(&self) -> f64 {
        self.gas_const
    }
    fn pressure(&self, q: &ConservedState) -> Array1<f64> {
        Self::internal_energy(q) * (self.gamma - 1.0)
    }
    fn sound_speed(&self, q: &ConservedState) -> Array1<f64> {
        let mut c = self.pressure(q);
        Zip::from(&mut c)
            .and(&q.mass())
            .for_each(|c, &rho| *c = (self.gamma * *c / rho).sqrt());
        c
    }
    fn temperature(&self, q: &ConservedState) -> Array1<f64> {
        let mut temperature = Self::internal_energy(q);
        let factor = (self.gamma - 1.0) / self.gas_const;
        Zip::from(&mut temperature)
            .and(&q.mass())
            .for_each(|t, &rho| *t = factor * *t / rho);
        temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn state(rho: f64, p: f64, v: [f64; 2], gamma: f64) -> ConservedState {
        let e = p / (gamma - 1.0) + 0.5 * rho * (v[0] * v[0] + v[1] * v[1]);
        ConservedState::new(array![[rho], [e], [rho * v[0]], [rho * v[1]]])
    }

    #[test]
    fn test_pressure_and_sound_speed_recover_primitives() {
        let eos = IdealSingleGas::default();
        let q = state(1.2, 0.8, [0.3, -1.1], eos.gamma);
        assert_relative_eq!(eos.pressure(&q)[0], 0.8, epsilon = 1e-14);
        assert_relative_eq!(eos.sound_speed(&q)[0], (1.4_f64 * 0.8 / 1.2).sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_positive_for_physical_states() {
        let eos = IdealSingleGas::default();
        for (rho, p) in [(0.1, 0.01), (1.0, 1.0), (5.0, 30.0)] {
            let q = state(rho, p, [2.0, 0.5], eos.gamma);
            assert!(eos.pressure(&q)[0] > 0.0);
            assert!(eos.sound_speed(&q)[0] > 0.0);
            assert!(eos.temperature(&q)[0] > 0.0);
        }
    }

    #[test]
    fn test_scaling_with_conserved_variables() {
        // P is homogeneous of degree one in Q, c is invariant under Q -> a Q
        let eos = IdealSingleGas::default();
        let q = state(1.3, 2.0, [0.7, 0.2], eos.gamma);
        let scaled = &q * 3.0;
        assert_relative_eq!(eos.pressure(&scaled)[0], 3.0 * eos.pressure(&q)[0], epsilon = 1e-13);
        assert_relative_eq!(eos.sound_speed(&scaled)[0], eos.sound_speed(&q)[0], epsilon = 1e-13);
    }

    #[test]
    fn test_temperature_follows_ideal_gas_law() {
        let eos = IdealSingleGas::default();
        let q = state(1.1, 1.0e5, [10.0, 0.0], eos.gamma);
        let t = eos.temperature(&q)[0];
        assert_relative_eq!(1.1 * eos.gas_const * t, 1.0e5, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_density_propagates_non_finite() {
        let eos = IdealSingleGas::default();
        let q = ConservedState::new(array![[0.0], [1.0], [1.0], [0.0]]);
        assert!(!eos.sound_speed(&q)[0].is_finite());
    }
}
