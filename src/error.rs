use thiserror::Error;

use crate::disc::boundary::BoundaryTag;
use crate::io::IoError;

#[derive(Debug, Error)]
pub enum EulerError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("interior edge {edge} is not conforming: no matching face point on element {elem}")]
    NonConformingFace { edge: usize, elem: usize },
    #[error("boundary edges {edges:?} are covered by both {first:?} and {second:?}")]
    OverlappingBoundaryTags {
        first: BoundaryTag,
        second: BoundaryTag,
        edges: Vec<usize>,
    },
    #[error("boundary edges {0:?} are not covered by any boundary condition")]
    UncoveredBoundaryEdges(Vec<usize>),
    #[error("boundary tag {0:?} selects no boundary edge")]
    EmptyBoundaryTag(BoundaryTag),
    #[error("solution became non-finite at step {step} (t = {time})")]
    Diverged { step: usize, time: f64 },
    #[error("solution error {maxerr:e} exceeds tolerance {exittol:e}")]
    ToleranceExceeded { maxerr: f64, exittol: f64 },
    #[error(transparent)]
    Io(#[from] IoError),
}
