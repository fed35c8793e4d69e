use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::euler::eos::IdealSingleGas;
use crate::euler::riemann_solver::PenaltySpeed;
use crate::initialization::FlowCase;
use crate::io::IoError;

fn default_casename() -> String {
    "euler".to_string()
}
fn default_dim() -> usize {
    2
}
fn default_domain() -> [f64; 2] {
    [-5.0, 5.0]
}
fn default_nstatus() -> usize {
    10
}
fn default_exittol() -> f64 {
    0.09
}
fn default_output_dir() -> String {
    "outputs".to_string()
}
fn default_write_vis() -> bool {
    true
}

/// Raw contents of the JSON parameter file.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SolverParamParser {
    #[serde(default = "default_casename")]
    pub casename: String,
    #[serde(default = "default_dim")]
    pub dim: usize,
    pub polynomial_order: usize,
    pub nel_1d: usize,
    #[serde(default = "default_domain")]
    pub domain: [f64; 2],
    #[serde(default)]
    pub dt: Option<f64>,
    pub final_time: f64,
    #[serde(default = "default_nstatus")]
    pub nstatus: usize,
    #[serde(default = "default_exittol")]
    pub exittol: f64,
    #[serde(default)]
    pub penalty_speed: PenaltySpeed,
    #[serde(default)]
    pub gas: IdealSingleGas,
    #[serde(default)]
    pub flow: FlowCase,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_write_vis")]
    pub write_vis: bool,
}
impl SolverParamParser {
    pub fn parse<P: AsRef<Path>>(file_path: P) -> Result<Self, IoError> {
        let path = file_path.as_ref();
        let file_content = fs::read_to_string(path).map_err(|source| IoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&file_content).map_err(|source| IoError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
