use std::fs;
use std::path::PathBuf;

use ndarray::{Array1, Array2, ArrayView2, Axis, s};
use ndarray_stats::QuantileExt;

use crate::disc::Discretization;
use crate::disc::boundary::BoundaryTag;
use crate::disc::dg_quad::DgQuadDiscretization;
use crate::disc::mesh::mesh2d::Mesh2d;
use crate::error::EulerError;
use crate::euler::boundary::{BoundaryFluxAggregator, PrescribedBoundary};
use crate::euler::eos::{EquationOfState, IdealSingleGas};
use crate::euler::riemann_solver::{PenaltySpeed, RusanovFlux};
use crate::euler::{ConservedState, EulerRhs};
use crate::initialization::{ExactSolution, FlowCase};
use crate::io::IoError;
use crate::io::param_parser::SolverParamParser;
use crate::io::write_to_csv::{DiagnosticsLog, StatusRow};
use crate::io::write_to_vtu::{SnapshotField, VtuWriter};
use crate::temporal_disc::rk4_step;

/// Relative slack when deciding that the final time has been reached.
const TIME_EPS: f64 = 1e-12;

/// Validated run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParameters {
    pub casename: String,
    pub dim: usize,
    pub polynomial_order: usize,
    pub nel_1d: usize,
    pub domain: [f64; 2],
    pub dt: f64,
    pub final_time: f64,
    pub nstatus: usize,
    pub exittol: f64,
    pub penalty_speed: PenaltySpeed,
    pub gas: IdealSingleGas,
    pub flow: FlowCase,
    pub output_dir: PathBuf,
    pub write_vis: bool,
}

/// `(1 - 0.25 (dim - 1)) / (nel_1d order^2)`
pub fn default_time_step(dim: usize, nel_1d: usize, order: usize) -> f64 {
    (1.0 - 0.25 * (dim as f64 - 1.0)) / (nel_1d * order * order) as f64
}

fn invalid(name: &'static str, reason: impl Into<String>) -> EulerError {
    EulerError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

impl TryFrom<SolverParamParser> for SolverParameters {
    type Error = EulerError;

    fn try_from(param: SolverParamParser) -> Result<Self, Self::Error> {
        if param.dim != 2 {
            return Err(invalid(
                "dim",
                format!("only two-dimensional meshes are supported, got {}", param.dim),
            ));
        }
        if param.polynomial_order == 0 {
            return Err(invalid("polynomial_order", "must be at least 1"));
        }
        if param.nel_1d == 0 {
            return Err(invalid("nel_1d", "must be at least 1"));
        }
        let [lo, hi] = param.domain;
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return Err(invalid("domain", format!("[{lo}, {hi}] is not an interval")));
        }
        if !(param.final_time.is_finite() && param.final_time >= 0.0) {
            return Err(invalid("final_time", "must be finite and non-negative"));
        }
        let dt = param
            .dt
            .unwrap_or_else(|| default_time_step(param.dim, param.nel_1d, param.polynomial_order));
        if !(dt.is_finite() && dt > 0.0) {
            return Err(invalid("dt", format!("must be positive, got {dt}")));
        }
        if param.nstatus == 0 {
            return Err(invalid("nstatus", "must be at least 1"));
        }
        if param.exittol.is_nan() || param.exittol <= 0.0 {
            return Err(invalid("exittol", "must be positive"));
        }
        if !(param.gas.gamma() > 1.0 && param.gas.gas_const() > 0.0) {
            return Err(invalid("gas", "needs gamma > 1 and a positive gas constant"));
        }
        let flow_dims: Vec<(&str, usize)> = match &param.flow {
            FlowCase::Vortex(_) => vec![],
            FlowCase::Lump(lump) => vec![
                ("lump center", lump.center.len()),
                ("lump velocity", lump.velocity.len()),
            ],
            FlowCase::Uniform(uniform) => vec![("uniform velocity", uniform.velocity.len())],
        };
        if let Some((what, len)) = flow_dims.iter().find(|(_, len)| *len != param.dim) {
            return Err(invalid(
                "flow",
                format!("{what} has {len} components, mesh has {}", param.dim),
            ));
        }

        Ok(Self {
            casename: param.casename,
            dim: param.dim,
            polynomial_order: param.polynomial_order,
            nel_1d: param.nel_1d,
            domain: param.domain,
            dt,
            final_time: param.final_time,
            nstatus: param.nstatus,
            exittol: param.exittol,
            penalty_speed: param.penalty_speed,
            gas: param.gas,
            flow: param.flow,
            output_dir: PathBuf::from(param.output_dir),
            write_vis: param.write_vis,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub time: f64,
    /// Largest per-component max-norm error at the last status check.
    pub maxerr: f64,
}

/// Advances a flow case with RK4 from `t = 0` to `final_time`, checking it
/// against its exact solution every `nstatus` steps.
pub struct FlowStepper {
    params: SolverParameters,
}
impl FlowStepper {
    pub fn new(params: SolverParameters) -> Self {
        Self { params }
    }
    pub fn params(&self) -> &SolverParameters {
        &self.params
    }
    pub fn build_discretization(&self) -> Result<DgQuadDiscretization, EulerError> {
        let [lo, hi] = self.params.domain;
        let n = self.params.nel_1d;
        let mesh = Mesh2d::create_rect_mesh([lo, lo], [hi, hi], [n, n]);
        DgQuadDiscretization::new(mesh, self.params.polynomial_order)
    }
    pub fn run(&self) -> Result<RunSummary, EulerError> {
        let params = &self.params;
        let disc = self.build_discretization()?;
        let eos = params.gas;
        let boundaries = BoundaryFluxAggregator::new().with(
            BoundaryTag::All,
            PrescribedBoundary::new(params.flow.clone()),
        );
        let rhs = EulerRhs::new(
            &disc,
            &eos,
            &boundaries,
            RusanovFlux::new(params.penalty_speed),
        )?;
        let mut reporter = StatusReporter::new(params, &disc)?;

        log::info!(
            "{}: {} case, order {}, {} elements, dt = {:e}, final time = {}",
            params.casename,
            params.flow.name(),
            params.polynomial_order,
            disc.num_elements(),
            params.dt,
            params.final_time
        );

        let mut q = params.flow.evaluate(0.0, reporter.nodes.view(), &eos);
        let mut t = 0.0;
        let mut istep = 0;
        let mut maxerr;
        loop {
            let done = params.final_time - t <= TIME_EPS * params.final_time.max(1.0);
            if done || istep % params.nstatus == 0 {
                maxerr = reporter.report(&rhs, &eos, &q, istep, t)?;
                if done {
                    break;
                }
            }
            let dt = params.dt.min(params.final_time - t);
            q = rk4_step(&q, t, dt, |state, time| rhs.evaluate(state, time));
            t += dt;
            istep += 1;
            if !q.is_finite() {
                log::error!("solution is no longer finite after step {istep}, t = {t}");
                return Err(EulerError::Diverged {
                    step: istep,
                    time: t,
                });
            }
        }

        log::info!("{} maxerr = {maxerr:e}", params.casename);
        if maxerr > params.exittol {
            return Err(EulerError::ToleranceExceeded {
                maxerr,
                exittol: params.exittol,
            });
        }
        Ok(RunSummary {
            steps: istep,
            time: t,
            maxerr,
        })
    }
}

/// Status-time diagnostics: error against the exact solution, pressure and
/// temperature range, CSV history and optional snapshots.
struct StatusReporter<'a> {
    params: &'a SolverParameters,
    disc: &'a DgQuadDiscretization,
    nodes: Array2<f64>,
    diagnostics: DiagnosticsLog,
    vtu: Option<VtuWriter>,
}
impl<'a> StatusReporter<'a> {
    fn new(params: &'a SolverParameters, disc: &'a DgQuadDiscretization) -> Result<Self, IoError> {
        fs::create_dir_all(&params.output_dir).map_err(|source| IoError::CreateDir {
            path: params.output_dir.clone(),
            source,
        })?;
        let diagnostics = DiagnosticsLog::create(
            params
                .output_dir
                .join(format!("{}-status.csv", params.casename)),
        )?;
        let vtu = if params.write_vis {
            Some(VtuWriter::new(&params.output_dir, &params.casename)?)
        } else {
            None
        };
        Ok(Self {
            params,
            disc,
            nodes: disc.nodes(),
            diagnostics,
            vtu,
        })
    }
    /// Returns the largest component error.
    fn report(
        &mut self,
        rhs: &EulerRhs,
        eos: &IdealSingleGas,
        q: &ConservedState,
        istep: usize,
        t: f64,
    ) -> Result<f64, EulerError> {
        let diverged = || EulerError::Diverged {
            step: istep,
            time: t,
        };
        if !q.is_finite() {
            return Err(diverged());
        }
        let expected = self.params.flow.evaluate(t, self.nodes.view(), eos);
        let errors = (q - &expected).max_norms();
        let maxerr = errors.iter().fold(0.0_f64, |m, &e| m.max(e));

        let pressure = eos.pressure(q);
        let temperature = eos.temperature(q);
        let (p_min, p_max) = extremes(&pressure).ok_or_else(diverged)?;
        let (t_min, t_max) = extremes(&temperature).ok_or_else(diverged)?;

        log::info!(
            "step {istep:>6}  t = {t:.6}  errors = {:.4e}  p in [{p_min:.6}, {p_max:.6}]  T in [{t_min:.6e}, {t_max:.6e}]",
            errors
        );
        self.diagnostics.append(&StatusRow {
            step: istep,
            time: t,
            err_density: errors[0],
            err_energy: errors[1],
            err_momentum_x: errors[2],
            err_momentum_y: errors[3],
            pressure_min: p_min,
            pressure_max: p_max,
            temperature_min: t_min,
            temperature_max: t_max,
        })?;

        if let Some(vtu) = &self.vtu {
            let residual = rhs.evaluate(q, t);
            let fields = [
                field("density", q.data.slice(s![0..1, ..])),
                field("energy", q.data.slice(s![1..2, ..])),
                field("momentum", q.momentum()),
                field("pressure", pressure.view().insert_axis(Axis(0))),
                field("temperature", temperature.view().insert_axis(Axis(0))),
                field("expected_solution", expected.data.view()),
                field("residual", residual.data.view()),
            ];
            vtu.write_snapshot(self.disc, istep, &fields)?;
        }
        Ok(maxerr)
    }
}

fn field<'a>(name: &'a str, data: ArrayView2<'a, f64>) -> SnapshotField<'a> {
    SnapshotField { name, data }
}

/// `None` when the data is empty or holds a NaN.
fn extremes(values: &Array1<f64>) -> Option<(f64, f64)> {
    let min = *values.min().ok()?;
    let max = *values.max().ok()?;
    Some((min, max))
}
