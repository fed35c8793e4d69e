use ndarray::{Array1, ArrayView2, Axis, Zip};
use serde::Deserialize;

use crate::disc::TracePair;
use crate::euler::eos::EquationOfState;
use crate::euler::flux::inviscid_flux;
use crate::euler::state::{ConservedState, NumericalFlux};

/// Which side's wave speed scales the Lax-Friedrichs penalty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltySpeed {
    /// Interior side only. Not symmetric in the two states.
    #[default]
    Interior,
    /// Larger of the two sides.
    Max,
}

/// `|V| + c` at every point.
pub fn wave_speed(q: &ConservedState, eos: &dyn EquationOfState) -> Array1<f64> {
    let speed = q.velocity().map_axis(Axis(0), |v| v.dot(&v).sqrt());
    speed + eos.sound_speed(q)
}

pub fn wave_speeds(
    tpair: &TracePair<ConservedState>,
    eos: &dyn EquationOfState,
) -> TracePair<Array1<f64>> {
    TracePair::new(
        wave_speed(&tpair.interior, eos),
        wave_speed(&tpair.exterior, eos),
    )
}

/// Rusanov (local Lax-Friedrichs) numerical flux.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RusanovFlux {
    #[serde(default)]
    pub penalty_speed: PenaltySpeed,
}
impl RusanovFlux {
    pub fn new(penalty_speed: PenaltySpeed) -> Self {
        Self { penalty_speed }
    }
    pub fn penalty(&self, speeds: &TracePair<Array1<f64>>) -> Array1<f64> {
        match self.penalty_speed {
            PenaltySpeed::Interior => speeds.interior.clone(),
            PenaltySpeed::Max => {
                let mut lam = speeds.interior.clone();
                Zip::from(&mut lam)
                    .and(&speeds.exterior)
                    .for_each(|l, &e| *l = l.max(e));
                lam
            }
        }
    }
    /// `1/2 (F_int + F_ext) . n - 1/2 lam (Q_ext - Q_int)` with `n` the outward
    /// normal of the interior side, shape `(dim, n_face_points)`.
    pub fn facial_flux(
        &self,
        tpair: &TracePair<ConservedState>,
        normal: ArrayView2<f64>,
        eos: &dyn EquationOfState,
    ) -> NumericalFlux {
        let flux_int = inviscid_flux(&tpair.interior, eos);
        let flux_ext = inviscid_flux(&tpair.exterior, eos);
        let mut numerical_flux = (&flux_int + &flux_ext).dot_normal(normal) * 0.5;

        let lam = self.penalty(&wave_speeds(tpair, eos));
        let jump = tpair.jump();
        Zip::from(numerical_flux.data.rows_mut())
            .and(jump.data.rows())
            .for_each(|mut flux_row, jump_row| {
                Zip::from(&mut flux_row)
                    .and(&jump_row)
                    .and(&lam)
                    .for_each(|f, &dq, &l| *f -= 0.5 * l * dq);
            });
        numerical_flux
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::euler::eos::IdealSingleGas;
    use ndarray::{Array2, array};

    /// A handful of distinct physical states at `npts` points.
    fn sample_state(dim: usize, npts: usize, phase: f64) -> ConservedState {
        let mut data = Array2::zeros((dim + 2, npts));
        for ipt in 0..npts {
            let t = ipt as f64 + phase;
            let rho = 1.0 + 0.5 * (0.7 * t).sin().abs();
            let p = 1.0 + 0.3 * (1.3 * t).cos();
            let mut kinetic = 0.0;
            for idim in 0..dim {
                let v = (0.9 * t + idim as f64).sin();
                data[[2 + idim, ipt]] = rho * v;
                kinetic += 0.5 * rho * v * v;
            }
            data[[0, ipt]] = rho;
            data[[1, ipt]] = p / 0.4 + kinetic;
        }
        ConservedState::new(data)
    }

    fn unit_normals(dim: usize, npts: usize) -> Array2<f64> {
        let mut normal = Array2::zeros((dim, npts));
        for ipt in 0..npts {
            let angle = 0.4 * ipt as f64;
            normal[[0, ipt]] = angle.cos();
            normal[[1, ipt]] = angle.sin();
        }
        normal
    }

    #[test]
    fn test_flux_is_antisymmetric_with_max_penalty() {
        let eos = IdealSingleGas::default();
        let solver = RusanovFlux::new(PenaltySpeed::Max);
        for dim in [2, 3] {
            let a = sample_state(dim, 7, 0.0);
            let b = sample_state(dim, 7, 2.5);
            let n = unit_normals(dim, 7);
            let forward = solver.facial_flux(&TracePair::new(a.clone(), b.clone()), n.view(), &eos);
            let backward = solver.facial_flux(&TracePair::new(b, a), (-&n).view(), &eos);
            for (f, g) in forward.data.iter().zip(backward.data.iter()) {
                assert!((f + g).abs() < 1e-12, "F(A,B,n) = {f}, F(B,A,-n) = {g}");
            }
        }
    }

    #[test]
    fn test_interior_penalty_uses_interior_wave_speed() {
        let eos = IdealSingleGas::default();
        let a = sample_state(2, 5, 0.0);
        let b = sample_state(2, 5, 1.0);
        let tpair = TracePair::new(a.clone(), b);
        let speeds = wave_speeds(&tpair, &eos);
        let lam = RusanovFlux::default().penalty(&speeds);
        assert_eq!(lam, wave_speed(&a, &eos));
    }

    #[test]
    fn test_equal_states_give_physical_normal_flux() {
        let eos = IdealSingleGas::default();
        let a = sample_state(2, 4, 0.3);
        let n = unit_normals(2, 4);
        let numerical = RusanovFlux::default().facial_flux(
            &TracePair::new(a.clone(), a.clone()),
            n.view(),
            &eos,
        );
        let physical = inviscid_flux(&a, &eos).dot_normal(n.view());
        for (f, g) in numerical.data.iter().zip(physical.data.iter()) {
            assert!((f - g).abs() < 1e-13);
        }
    }

    #[test]
    fn test_penalty_scales_with_wave_speed() {
        // at rest with equal pressure the central part cancels in the difference,
        // leaving -1/2 lam [rho] in the mass flux
        let eos = IdealSingleGas::default();
        let int = ConservedState::new(array![[1.0], [2.5], [0.0], [0.0]]);
        let ext = ConservedState::new(array![[2.0], [2.5], [0.0], [0.0]]);
        let n = array![[1.0], [0.0]];
        let flux = RusanovFlux::default().facial_flux(&TracePair::new(int.clone(), ext), n.view(), &eos);
        let c_int = (1.4_f64 * 1.0 / 1.0).sqrt();
        assert!((flux.data[[0, 0]] + 0.5 * c_int * 1.0).abs() < 1e-14);
    }
}
