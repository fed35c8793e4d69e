pub mod boundary;
pub mod eos;
pub mod flux;
pub mod rhs;
pub mod riemann_solver;
pub mod state;

pub use rhs::{EulerRhs, inviscid_operator};
pub use state::{ConservedState, FluxTensor, NumericalFlux};
