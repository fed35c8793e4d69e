use crate::disc::{Discretization, FaceDomain};
use crate::error::EulerError;
use crate::euler::boundary::BoundaryFluxAggregator;
use crate::euler::eos::EquationOfState;
use crate::euler::flux::inviscid_flux;
use crate::euler::riemann_solver::RusanovFlux;
use crate::euler::state::{ConservedState, interior_trace_pair};

/// Semi-discrete Euler right-hand side,
/// `M^-1 (weak_div(F(Q)) - face_mass(F*_interior + F*_boundary))`.
pub fn inviscid_operator(
    disc: &dyn Discretization,
    eos: &dyn EquationOfState,
    boundaries: &BoundaryFluxAggregator,
    riemann: &RusanovFlux,
    q: &ConservedState,
    t: f64,
) -> ConservedState {
    let nvol = disc.num_volume_points();
    let n_all = disc.num_all_face_points();
    assert_eq!(q.num_points(), nvol, "state does not live on the volume points");
    assert_eq!(q.dim(), disc.dim(), "state dimension differs from the mesh");

    let volume_flux = inviscid_flux(q, eos);
    let mut residual = ConservedState::zeros(q.dim(), nvol);
    for ieq in 0..q.num_equations() {
        residual
            .data
            .row_mut(ieq)
            .assign(&disc.weak_div(volume_flux.component(ieq)));
    }

    let tpair = interior_trace_pair(disc, q);
    let normal = disc.normal(FaceDomain::Interior);
    let interior_flux = riemann.facial_flux(&tpair, normal.view(), eos);
    let mut face_flux = interior_flux.map_components(n_all, |row| {
        disc.project_flux_to_all_faces(FaceDomain::Interior, row)
    });
    face_flux.scaled_add(1.0, &boundaries.boundary_flux(disc, eos, riemann, q, t));

    residual.scaled_add(-1.0, &face_flux.map_components(nvol, |row| disc.face_mass(row)));
    residual.map_components(nvol, |row| disc.inverse_mass(row))
}

/// Borrowed collaborators of [`inviscid_operator`]; a pure function of
/// `(q, t)` once built.
pub struct EulerRhs<'a> {
    pub disc: &'a dyn Discretization,
    pub eos: &'a dyn EquationOfState,
    pub boundaries: &'a BoundaryFluxAggregator,
    pub riemann: RusanovFlux,
}
impl<'a> EulerRhs<'a> {
    /// Fails when the boundary tags do not cover the mesh boundary exactly once.
    pub fn new(
        disc: &'a dyn Discretization,
        eos: &'a dyn EquationOfState,
        boundaries: &'a BoundaryFluxAggregator,
        riemann: RusanovFlux,
    ) -> Result<Self, EulerError> {
        boundaries.validate_coverage(disc)?;
        Ok(Self {
            disc,
            eos,
            boundaries,
            riemann,
        })
    }
    pub fn evaluate(&self, q: &ConservedState, t: f64) -> ConservedState {
        inviscid_operator(self.disc, self.eos, self.boundaries, &self.riemann, q, t)
    }
}
