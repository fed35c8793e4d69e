use hashbrown::HashMap;
use log::debug;
use ndarray::{Axis, Zip, s};

use crate::disc::boundary::BoundaryTag;
use crate::disc::{Discretization, FaceDomain, TracePair};
use crate::error::EulerError;
use crate::euler::eos::EquationOfState;
use crate::euler::riemann_solver::RusanovFlux;
use crate::euler::state::{ConservedState, NumericalFlux};
use crate::initialization::ExactSolution;

/// Everything a boundary condition may consult while computing its flux.
pub struct BoundaryContext<'a> {
    pub disc: &'a dyn Discretization,
    pub eos: &'a dyn EquationOfState,
    pub riemann: &'a RusanovFlux,
    pub tag: BoundaryTag,
}
impl BoundaryContext<'_> {
    pub fn domain(&self) -> FaceDomain {
        FaceDomain::Boundary(self.tag)
    }
    /// Interior trace of `q` on the tagged faces.
    pub fn interior_trace(&self, q: &ConservedState) -> ConservedState {
        let npts = self.disc.num_face_points(self.domain());
        q.map_components(npts, |field| self.disc.interp_to_boundary(self.tag, field))
    }
    /// Riemann flux between the interior trace and a supplied exterior state.
    pub fn flux_from_exterior(
        &self,
        interior: ConservedState,
        exterior: ConservedState,
    ) -> NumericalFlux {
        let normal = self.disc.normal(self.domain());
        self.riemann
            .facial_flux(&TracePair::new(interior, exterior), normal.view(), self.eos)
    }
}

/// Flux contribution of one tagged part of the boundary, laid out on the
/// tag's face points.
pub trait BoundaryCondition {
    fn boundary_flux(&self, ctx: &BoundaryContext<'_>, q: &ConservedState, t: f64)
    -> NumericalFlux;
}

/// Exterior state taken from a known solution at the boundary points.
pub struct PrescribedBoundary<S: ExactSolution> {
    pub solution: S,
}
impl<S: ExactSolution> PrescribedBoundary<S> {
    pub fn new(solution: S) -> Self {
        Self { solution }
    }
}
impl<S: ExactSolution> BoundaryCondition for PrescribedBoundary<S> {
    fn boundary_flux(
        &self,
        ctx: &BoundaryContext<'_>,
        q: &ConservedState,
        t: f64,
    ) -> NumericalFlux {
        let interior = ctx.interior_trace(q);
        let nodes = ctx.disc.face_nodes(ctx.domain());
        let exterior = self.solution.evaluate(t, nodes.view(), ctx.eos);
        ctx.flux_from_exterior(interior, exterior)
    }
}

/// Exterior state equal to the interior trace.
pub struct DummyBoundary;
impl BoundaryCondition for DummyBoundary {
    fn boundary_flux(
        &self,
        ctx: &BoundaryContext<'_>,
        q: &ConservedState,
        _t: f64,
    ) -> NumericalFlux {
        let interior = ctx.interior_trace(q);
        ctx.flux_from_exterior(interior.clone(), interior)
    }
}

/// Inviscid wall: the exterior state mirrors the normal momentum.
pub struct SlipWall;
impl BoundaryCondition for SlipWall {
    fn boundary_flux(
        &self,
        ctx: &BoundaryContext<'_>,
        q: &ConservedState,
        _t: f64,
    ) -> NumericalFlux {
        let interior = ctx.interior_trace(q);
        let normal = ctx.disc.normal(ctx.domain());
        let mut exterior = interior.clone();
        let momentum_n = (&interior.momentum() * &normal).sum_axis(Axis(0));
        for (mut m_ext, n) in exterior
            .data
            .slice_mut(s![2.., ..])
            .axis_iter_mut(Axis(0))
            .zip(normal.axis_iter(Axis(0)))
        {
            Zip::from(&mut m_ext)
                .and(&n)
                .and(&momentum_n)
                .for_each(|m, &n, &mn| *m -= 2.0 * mn * n);
        }
        ctx.flux_from_exterior(interior, exterior)
    }
}

/// Boundary conditions keyed by tag. The tags must cover every boundary edge
/// exactly once.
#[derive(Default)]
pub struct BoundaryFluxAggregator {
    conditions: HashMap<BoundaryTag, Box<dyn BoundaryCondition>>,
}
impl BoundaryFluxAggregator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with<B: BoundaryCondition + 'static>(mut self, tag: BoundaryTag, condition: B) -> Self {
        self.insert(tag, Box::new(condition));
        self
    }
    pub fn insert(
        &mut self,
        tag: BoundaryTag,
        condition: Box<dyn BoundaryCondition>,
    ) -> Option<Box<dyn BoundaryCondition>> {
        self.conditions.insert(tag, condition)
    }
    pub fn tags(&self) -> Vec<BoundaryTag> {
        let mut tags: Vec<BoundaryTag> = self.conditions.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
    pub fn validate_coverage(&self, disc: &dyn Discretization) -> Result<(), EulerError> {
        let mut owner: HashMap<usize, BoundaryTag> = HashMap::new();
        for tag in self.tags() {
            let edges = disc.boundary_edges(tag);
            if edges.is_empty() {
                return Err(EulerError::EmptyBoundaryTag(tag));
            }
            let mut overlap: Option<(BoundaryTag, Vec<usize>)> = None;
            for iedge in edges {
                if let Some(&first) = owner.get(&iedge) {
                    overlap.get_or_insert_with(|| (first, Vec::new())).1.push(iedge);
                } else {
                    owner.insert(iedge, tag);
                }
            }
            if let Some((first, edges)) = overlap {
                return Err(EulerError::OverlappingBoundaryTags {
                    first,
                    second: tag,
                    edges,
                });
            }
        }
        let uncovered: Vec<usize> = disc
            .all_boundary_edges()
            .into_iter()
            .filter(|iedge| !owner.contains_key(iedge))
            .collect();
        if !uncovered.is_empty() {
            return Err(EulerError::UncoveredBoundaryEdges(uncovered));
        }
        debug!("boundary tags {:?} cover {} edges", self.tags(), owner.len());
        Ok(())
    }
    /// Sum of every tag's flux in the all-faces layout.
    pub fn boundary_flux(
        &self,
        disc: &dyn Discretization,
        eos: &dyn EquationOfState,
        riemann: &RusanovFlux,
        q: &ConservedState,
        t: f64,
    ) -> NumericalFlux {
        let n_all = disc.num_all_face_points();
        let mut total = ConservedState::zeros(q.dim(), n_all);
        for tag in self.tags() {
            let ctx = BoundaryContext {
                disc,
                eos,
                riemann,
                tag,
            };
            let flux = self.conditions[&tag].boundary_flux(&ctx, q, t);
            let projected = flux.map_components(n_all, |row| {
                disc.project_flux_to_all_faces(FaceDomain::Boundary(tag), row)
            });
            total.scaled_add(1.0, &projected);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::boundary::BoundaryPosition;
    use crate::disc::dg_quad::DgQuadDiscretization;
    use crate::disc::mesh::mesh2d::Mesh2d;

    fn disc() -> DgQuadDiscretization {
        let mesh = Mesh2d::create_rect_mesh([0.0, 0.0], [1.0, 1.0], [3, 2]);
        DgQuadDiscretization::new(mesh, 2).unwrap()
    }

    #[test]
    fn test_all_tag_covers_boundary() {
        let disc = disc();
        let boundaries = BoundaryFluxAggregator::new().with(BoundaryTag::All, DummyBoundary);
        assert!(boundaries.validate_coverage(&disc).is_ok());
    }

    #[test]
    fn test_four_sides_cover_boundary() {
        let disc = disc();
        let mut boundaries = BoundaryFluxAggregator::new();
        for position in BoundaryPosition::ALL {
            boundaries.insert(BoundaryTag::Position(position), Box::new(SlipWall));
        }
        assert!(boundaries.validate_coverage(&disc).is_ok());
    }

    #[test]
    fn test_overlapping_tags_are_rejected() {
        let disc = disc();
        let boundaries = BoundaryFluxAggregator::new()
            .with(BoundaryTag::All, DummyBoundary)
            .with(BoundaryTag::Position(BoundaryPosition::Left), SlipWall);
        match boundaries.validate_coverage(&disc) {
            Err(EulerError::OverlappingBoundaryTags { edges, .. }) => assert_eq!(edges.len(), 2),
            other => panic!("expected overlap error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_side_is_rejected() {
        let disc = disc();
        let boundaries = BoundaryFluxAggregator::new()
            .with(BoundaryTag::Position(BoundaryPosition::Lower), SlipWall)
            .with(BoundaryTag::Position(BoundaryPosition::Upper), SlipWall)
            .with(BoundaryTag::Position(BoundaryPosition::Left), SlipWall);
        match boundaries.validate_coverage(&disc) {
            Err(EulerError::UncoveredBoundaryEdges(edges)) => {
                assert_eq!(edges, disc.boundary_edges(BoundaryTag::Position(BoundaryPosition::Right)))
            }
            other => panic!("expected uncovered error, got {other:?}"),
        }
    }

    #[test]
    fn test_slip_wall_flux_is_pressure_only_at_rest() {
        let disc = disc();
        let eos = crate::euler::eos::IdealSingleGas::default();
        let npts = disc.num_volume_points();
        let mut q = ConservedState::zeros(2, npts);
        q.data.row_mut(0).fill(1.0);
        q.data.row_mut(1).fill(2.5);
        let riemann = RusanovFlux::default();
        let ctx = BoundaryContext {
            disc: &disc,
            eos: &eos,
            riemann: &riemann,
            tag: BoundaryTag::All,
        };
        let flux = SlipWall.boundary_flux(&ctx, &q, 0.0);
        let normal = disc.normal(FaceDomain::Boundary(BoundaryTag::All));
        for j in 0..flux.num_points() {
            assert!(flux.data[[0, j]].abs() < 1e-14);
            assert!(flux.data[[1, j]].abs() < 1e-14);
            assert!((flux.data[[2, j]] - normal[[0, j]]).abs() < 1e-14);
            assert!((flux.data[[3, j]] - normal[[1, j]]).abs() < 1e-14);
        }
    }
}
