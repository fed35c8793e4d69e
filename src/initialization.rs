use std::f64::consts::PI;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2, Zip};
use serde::Deserialize;

use crate::error::EulerError;
use crate::euler::eos::EquationOfState;
use crate::euler::state::ConservedState;
use crate::io::param_parser::SolverParamParser;
use crate::solver::SolverParameters;

/// Flow field known in closed form, used for initial and prescribed boundary
/// states and for error measurement.
pub trait ExactSolution {
    /// State at time `t` at the points `nodes`, shape `(dim, n_points)`.
    fn evaluate(&self, t: f64, nodes: ArrayView2<f64>, eos: &dyn EquationOfState)
    -> ConservedState;
}

/// Isentropic vortex translating with a uniform free stream.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Vortex2D {
    pub beta: f64,
    pub center: [f64; 2],
    pub velocity: [f64; 2],
}
impl Default for Vortex2D {
    fn default() -> Self {
        Self {
            beta: 5.0,
            center: [0.0, 0.0],
            velocity: [0.0, 0.0],
        }
    }
}
impl ExactSolution for Vortex2D {
    fn evaluate(
        &self,
        t: f64,
        nodes: ArrayView2<f64>,
        eos: &dyn EquationOfState,
    ) -> ConservedState {
        assert_eq!(nodes.nrows(), 2, "vortex is two-dimensional");
        let gamma = eos.gamma();
        let npts = nodes.ncols();
        let loc = [
            self.center[0] + t * self.velocity[0],
            self.center[1] + t * self.velocity[1],
        ];
        let mut q = ConservedState::zeros(2, npts);
        for ipt in 0..npts {
            let x_rel = nodes[[0, ipt]] - loc[0];
            let y_rel = nodes[[1, ipt]] - loc[1];
            let r_sq = x_rel * x_rel + y_rel * y_rel;
            let expterm = self.beta * (1.0 - r_sq).exp();
            let u = self.velocity[0] - expterm * y_rel / (2.0 * PI);
            let v = self.velocity[1] + expterm * x_rel / (2.0 * PI);
            let rho = (1.0 - (gamma - 1.0) / (16.0 * gamma * PI * PI) * expterm * expterm)
                .powf(1.0 / (gamma - 1.0));
            let p = rho.powf(gamma);
            q.data[[0, ipt]] = rho;
            q.data[[1, ipt]] = eos.internal_energy_from_pressure(p) + 0.5 * rho * (u * u + v * v);
            q.data[[2, ipt]] = rho * u;
            q.data[[3, ipt]] = rho * v;
        }
        q
    }
}

/// Gaussian density lump advected at constant velocity and pressure, in any
/// dimension.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Lump {
    pub rho0: f64,
    pub rhoamp: f64,
    pub p0: f64,
    pub center: Vec<f64>,
    pub velocity: Vec<f64>,
}
impl Default for Lump {
    fn default() -> Self {
        Self {
            rho0: 1.0,
            rhoamp: 1.0,
            p0: 1.0,
            center: vec![0.0, 0.0],
            velocity: vec![0.0, 0.0],
        }
    }
}
impl Lump {
    /// Displacement from the lump center at time `t` and `rhoamp exp(1 - r^2)`.
    fn profile(&self, t: f64, nodes: ArrayView2<f64>) -> (Array2<f64>, Array1<f64>) {
        let dim = nodes.nrows();
        assert_eq!(self.center.len(), dim, "lump center dimension differs from nodes");
        assert_eq!(self.velocity.len(), dim, "lump velocity dimension differs from nodes");
        let mut rel = nodes.to_owned();
        for (idim, mut row) in rel.rows_mut().into_iter().enumerate() {
            row -= self.center[idim] + t * self.velocity[idim];
        }
        let mut expterm = Array1::zeros(nodes.ncols());
        Zip::from(&mut expterm)
            .and(rel.columns())
            .for_each(|e, r| *e = self.rhoamp * (1.0 - r.dot(&r)).exp());
        (rel, expterm)
    }
    /// Time derivative of the exact solution; what a consistent RHS
    /// approaches under refinement.
    pub fn exact_rhs(
        &self,
        t: f64,
        nodes: ArrayView2<f64>,
        _eos: &dyn EquationOfState,
    ) -> ConservedState {
        let dim = nodes.nrows();
        let (rel, expterm) = self.profile(t, nodes);
        let v_sq: f64 = self.velocity.iter().map(|v| v * v).sum();
        let mut rdotv = Array1::zeros(nodes.ncols());
        for (idim, row) in rel.rows().into_iter().enumerate() {
            rdotv.scaled_add(self.velocity[idim], &row);
        }
        // rho_t = -v . grad(rho), grad(rho) = -2 rel expterm
        let mass_rhs = 2.0 * &rdotv * &expterm;
        let energy_rhs = 0.5 * v_sq * &mass_rhs;
        let mut momentum_rhs = Array2::zeros((dim, nodes.ncols()));
        for (idim, mut row) in momentum_rhs.rows_mut().into_iter().enumerate() {
            row.assign(&(self.velocity[idim] * &mass_rhs));
        }
        ConservedState::from_parts(mass_rhs.view(), energy_rhs.view(), momentum_rhs.view())
    }
}
impl ExactSolution for Lump {
    fn evaluate(
        &self,
        t: f64,
        nodes: ArrayView2<f64>,
        eos: &dyn EquationOfState,
    ) -> ConservedState {
        let dim = nodes.nrows();
        let (_, expterm) = self.profile(t, nodes);
        let mass = expterm + self.rho0;
        let v_sq: f64 = self.velocity.iter().map(|v| v * v).sum();
        let energy = mass.mapv(|rho| eos.internal_energy_from_pressure(self.p0) + 0.5 * v_sq * rho);
        let mut momentum = Array2::zeros((dim, nodes.ncols()));
        for (idim, mut row) in momentum.rows_mut().into_iter().enumerate() {
            row.assign(&(self.velocity[idim] * &mass));
        }
        ConservedState::from_parts(mass.view(), energy.view(), momentum.view())
    }
}

/// Constant state.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Uniform {
    pub rho: f64,
    pub p: f64,
    pub velocity: Vec<f64>,
}
impl Default for Uniform {
    fn default() -> Self {
        Self {
            rho: 1.0,
            p: 1.0,
            velocity: vec![0.0, 0.0],
        }
    }
}
impl ExactSolution for Uniform {
    fn evaluate(
        &self,
        _t: f64,
        nodes: ArrayView2<f64>,
        eos: &dyn EquationOfState,
    ) -> ConservedState {
        let dim = nodes.nrows();
        assert_eq!(self.velocity.len(), dim, "uniform velocity dimension differs from nodes");
        let npts = nodes.ncols();
        let v_sq: f64 = self.velocity.iter().map(|v| v * v).sum();
        let mut q = ConservedState::zeros(dim, npts);
        q.data.row_mut(0).fill(self.rho);
        q.data
            .row_mut(1)
            .fill(eos.internal_energy_from_pressure(self.p) + 0.5 * self.rho * v_sq);
        for idim in 0..dim {
            q.data.row_mut(2 + idim).fill(self.rho * self.velocity[idim]);
        }
        q
    }
}

/// Flow selected in the parameter file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowCase {
    Vortex(Vortex2D),
    Lump(Lump),
    Uniform(Uniform),
}
impl Default for FlowCase {
    fn default() -> Self {
        FlowCase::Vortex(Vortex2D::default())
    }
}
impl FlowCase {
    pub fn name(&self) -> &'static str {
        match self {
            FlowCase::Vortex(_) => "vortex",
            FlowCase::Lump(_) => "lump",
            FlowCase::Uniform(_) => "uniform",
        }
    }
}
impl ExactSolution for FlowCase {
    fn evaluate(
        &self,
        t: f64,
        nodes: ArrayView2<f64>,
        eos: &dyn EquationOfState,
    ) -> ConservedState {
        match self {
            FlowCase::Vortex(vortex) => vortex.evaluate(t, nodes, eos),
            FlowCase::Lump(lump) => lump.evaluate(t, nodes, eos),
            FlowCase::Uniform(uniform) => uniform.evaluate(t, nodes, eos),
        }
    }
}

pub fn initialize_params_by_file<P: AsRef<Path>>(path: P) -> Result<SolverParameters, EulerError> {
    let parser = SolverParamParser::parse(path)?;
    SolverParameters::try_from(parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::euler::eos::IdealSingleGas;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_vortex_far_field_is_free_stream() {
        let eos = IdealSingleGas::default();
        let vortex = Vortex2D {
            velocity: [1.0, 0.5],
            ..Default::default()
        };
        let nodes = array![[40.0], [-35.0]];
        let q = vortex.evaluate(0.0, nodes.view(), &eos);
        assert_relative_eq!(q.data[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.data[[2, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.data[[3, 0]], 0.5, epsilon = 1e-12);
        assert_relative_eq!(eos.pressure(&q)[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vortex_is_isentropic() {
        let eos = IdealSingleGas::default();
        let vortex = Vortex2D::default();
        let nodes = array![[0.3, -1.0, 0.0], [0.1, 0.4, 0.0]];
        let q = vortex.evaluate(0.0, nodes.view(), &eos);
        let p = eos.pressure(&q);
        for i in 0..3 {
            assert_relative_eq!(p[i], q.data[[0, i]].powf(1.4), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lump_translates_with_velocity() {
        let eos = IdealSingleGas::default();
        let lump = Lump {
            velocity: vec![1.0, 2.0],
            ..Default::default()
        };
        let q0 = lump.evaluate(0.0, array![[0.0], [0.0]].view(), &eos);
        let q1 = lump.evaluate(0.5, array![[0.5], [1.0]].view(), &eos);
        for ieq in 0..4 {
            assert_relative_eq!(q0.data[[ieq, 0]], q1.data[[ieq, 0]], epsilon = 1e-13);
        }
        assert_relative_eq!(q0.data[[0, 0]], 1.0 + std::f64::consts::E, epsilon = 1e-13);
        assert_relative_eq!(eos.pressure(&q0)[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lump_exact_rhs_matches_time_derivative() {
        let eos = IdealSingleGas::default();
        let lump = Lump {
            center: vec![0.2, -0.1, 0.0],
            velocity: vec![0.7, -0.4, 0.3],
            ..Default::default()
        };
        let nodes = array![[0.5, -0.3], [0.2, 0.8], [0.1, -0.6]];
        let h = 1e-6;
        let ahead = lump.evaluate(0.3 + h, nodes.view(), &eos);
        let behind = lump.evaluate(0.3 - h, nodes.view(), &eos);
        let finite_diff = (&ahead - &behind) * (0.5 / h);
        let exact = lump.exact_rhs(0.3, nodes.view(), &eos);
        for (a, b) in exact.data.iter().zip(finite_diff.data.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn test_flow_case_from_json() {
        let case: FlowCase =
            serde_json::from_str(r#"{"kind": "lump", "velocity": [1.0, 1.0]}"#).unwrap();
        match case {
            FlowCase::Lump(lump) => {
                assert_eq!(lump.velocity, vec![1.0, 1.0]);
                assert_eq!(lump.rho0, 1.0);
            }
            other => panic!("unexpected case {other:?}"),
        }
    }
}
