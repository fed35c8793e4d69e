use log::info;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

use crate::disc::basis::quadrilateral::QuadrilateralBasis;
use crate::disc::boundary::{BoundaryPosition, BoundaryTag};
use crate::disc::geometric::Geometric2D;
use crate::disc::mesh::mesh2d::{Mesh2d, QuadrilateralElement};
use crate::disc::{Discretization, FaceDomain, TracePair};
use crate::error::EulerError;

/// Relative distance below which two face points are considered coincident.
const MATCH_TOL: f64 = 1e-8;

#[derive(Clone, Debug)]
pub struct InteriorFace {
    pub iedge: usize,
    pub elems: [usize; 2],
    pub local_ids: [usize; 2],
    /// Face node of the second parent matching face node `j` of the first.
    pub exterior_perm: Vec<usize>,
}
#[derive(Clone, Debug)]
pub struct BoundaryFace {
    pub iedge: usize,
    pub elem: usize,
    pub local_id: usize,
    pub position: BoundaryPosition,
}

/// Nodal DG on straight-sided quadrilaterals with GLL collocation. Mass and
/// face mass matrices are the diagonal GLL quadratures.
pub struct DgQuadDiscretization {
    pub basis: QuadrilateralBasis,
    pub mesh: Mesh2d<QuadrilateralElement>,
    /// Node coordinates, shape `(n_elements, n_nodes)`.
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    pub jacob_det: Array2<f64>,
    pub rx: Array2<f64>,
    pub ry: Array2<f64>,
    pub sx: Array2<f64>,
    pub sy: Array2<f64>,
    /// Lumped mass `w_i J_i` per volume point.
    pub mass: Array1<f64>,
    /// Outward normals and surface jacobians, shape `(n_elements * 4, n_face_nodes)`.
    pub face_nx: Array2<f64>,
    pub face_ny: Array2<f64>,
    pub face_sj: Array2<f64>,
    pub interior_faces: Vec<InteriorFace>,
    pub boundary_faces: Vec<BoundaryFace>,
}

impl DgQuadDiscretization {
    pub fn new(mesh: Mesh2d<QuadrilateralElement>, order: usize) -> Result<Self, EulerError> {
        if order == 0 {
            return Err(EulerError::InvalidParameter {
                name: "order",
                reason: "GLL collocation needs polynomial order >= 1".to_string(),
            });
        }
        let basis = QuadrilateralBasis::new(order);
        let nelem = mesh.elem_num;
        let np = basis.num_nodes();
        let nfp = basis.num_face_nodes();

        let mut x = Array2::zeros((nelem, np));
        let mut y = Array2::zeros((nelem, np));
        let mut jacob_det = Array2::zeros((nelem, np));
        let mut rx = Array2::zeros((nelem, np));
        let mut ry = Array2::zeros((nelem, np));
        let mut sx = Array2::zeros((nelem, np));
        let mut sy = Array2::zeros((nelem, np));
        let mut mass = Array1::zeros(nelem * np);
        for ielem in 0..nelem {
            let (x_vert, y_vert) = mesh.element_coords(ielem);
            for i in 0..np {
                let (r, s) = (basis.r[i], basis.s[i]);
                let (xp, yp) = QuadrilateralElement::map_to_physical(r, s, &x_vert, &y_vert);
                let (det, inv_t) = QuadrilateralElement::evaluate_jacob(r, s, &x_vert, &y_vert);
                if det <= 0.0 {
                    return Err(EulerError::InvalidMesh(format!(
                        "element {ielem} has non-positive jacobian {det} at node {i}"
                    )));
                }
                x[[ielem, i]] = xp;
                y[[ielem, i]] = yp;
                jacob_det[[ielem, i]] = det;
                rx[[ielem, i]] = inv_t[0];
                sx[[ielem, i]] = inv_t[1];
                ry[[ielem, i]] = inv_t[2];
                sy[[ielem, i]] = inv_t[3];
                mass[ielem * np + i] = basis.volume_weight(i) * det;
            }
        }

        // Nanson: n sJ = J (J^-T n_ref)
        let mut face_nx = Array2::zeros((nelem * 4, nfp));
        let mut face_ny = Array2::zeros((nelem * 4, nfp));
        let mut face_sj = Array2::zeros((nelem * 4, nfp));
        for ielem in 0..nelem {
            for iface in 0..4 {
                let [nr, ns] = QuadrilateralElement::compute_ref_normal(iface);
                for j in 0..nfp {
                    let i = basis.nodes_along_edges[[iface, j]];
                    let nx = rx[[ielem, i]] * nr + sx[[ielem, i]] * ns;
                    let ny = ry[[ielem, i]] * nr + sy[[ielem, i]] * ns;
                    let magnitude = (nx * nx + ny * ny).sqrt();
                    face_nx[[ielem * 4 + iface, j]] = nx / magnitude;
                    face_ny[[ielem * 4 + iface, j]] = ny / magnitude;
                    face_sj[[ielem * 4 + iface, j]] = jacob_det[[ielem, i]] * magnitude;
                }
            }
        }

        let mut interior_faces = Vec::with_capacity(mesh.internal_edges.len());
        for &iedge in mesh.internal_edges.iter() {
            let edge = &mesh.edges[iedge];
            let elems = [edge.parents[0], edge.parents[1]];
            let local_ids = [edge.local_ids[0], edge.local_ids[1]];
            let length = {
                let (n0, n1) = (&mesh.nodes[edge.inodes[0]], &mesh.nodes[edge.inodes[1]]);
                ((n1.x - n0.x).powi(2) + (n1.y - n0.y).powi(2)).sqrt()
            };
            let mut exterior_perm = Vec::with_capacity(nfp);
            for j in 0..nfp {
                let i0 = basis.nodes_along_edges[[local_ids[0], j]];
                let (x0, y0) = (x[[elems[0], i0]], y[[elems[0], i0]]);
                let matched = (0..nfp).find(|&jj| {
                    let i1 = basis.nodes_along_edges[[local_ids[1], jj]];
                    let dist = ((x[[elems[1], i1]] - x0).powi(2)
                        + (y[[elems[1], i1]] - y0).powi(2))
                    .sqrt();
                    dist < MATCH_TOL * length
                });
                match matched {
                    Some(jj) => exterior_perm.push(jj),
                    None => {
                        return Err(EulerError::NonConformingFace {
                            edge: iedge,
                            elem: elems[1],
                        });
                    }
                }
            }
            interior_faces.push(InteriorFace {
                iedge,
                elems,
                local_ids,
                exterior_perm,
            });
        }

        let mut boundary_faces = Vec::with_capacity(mesh.boundary_edges.len());
        for &iedge in mesh.boundary_edges.iter() {
            let edge = &mesh.edges[iedge];
            let position = edge.boundary.ok_or_else(|| {
                EulerError::InvalidMesh(format!("boundary edge {iedge} has no position"))
            })?;
            boundary_faces.push(BoundaryFace {
                iedge,
                elem: edge.parents[0],
                local_id: edge.local_ids[0],
                position,
            });
        }
        boundary_faces.sort_by_key(|face| face.iedge);

        info!(
            "DG discretization: order {order}, {nelem} elements, {} volume points, {} interior faces, {} boundary faces",
            nelem * np,
            interior_faces.len(),
            boundary_faces.len()
        );
        Ok(Self {
            basis,
            mesh,
            x,
            y,
            jacob_det,
            rx,
            ry,
            sx,
            sy,
            mass,
            face_nx,
            face_ny,
            face_sj,
            interior_faces,
            boundary_faces,
        })
    }
    pub fn order(&self) -> usize {
        self.basis.n
    }
    pub fn num_elements(&self) -> usize {
        self.mesh.elem_num
    }
    fn selected_boundary_faces(&self, tag: BoundaryTag) -> impl Iterator<Item = &BoundaryFace> {
        self.boundary_faces.iter().filter(move |face| match tag {
            BoundaryTag::All => true,
            BoundaryTag::Position(position) => face.position == position,
        })
    }
    /// `(element, local face, face node)` triples of a face domain in layout order.
    fn face_points(&self, domain: FaceDomain) -> Vec<(usize, usize, usize)> {
        let nfp = self.basis.num_face_nodes();
        match domain {
            FaceDomain::Interior => self
                .interior_faces
                .iter()
                .flat_map(|face| (0..nfp).map(move |j| (face.elems[0], face.local_ids[0], j)))
                .collect(),
            FaceDomain::Boundary(tag) => self
                .selected_boundary_faces(tag)
                .flat_map(|face| (0..nfp).map(move |j| (face.elem, face.local_id, j)))
                .collect(),
        }
    }
    fn volume_index(&self, ielem: usize, iface: usize, j: usize) -> usize {
        ielem * self.basis.num_nodes() + self.basis.nodes_along_edges[[iface, j]]
    }
    fn all_faces_index(&self, ielem: usize, iface: usize, j: usize) -> usize {
        (ielem * 4 + iface) * self.basis.num_face_nodes() + j
    }
}

impl Discretization for DgQuadDiscretization {
    fn dim(&self) -> usize {
        2
    }
    fn num_volume_points(&self) -> usize {
        self.mesh.elem_num * self.basis.num_nodes()
    }
    fn num_all_face_points(&self) -> usize {
        self.mesh.elem_num * 4 * self.basis.num_face_nodes()
    }
    fn num_face_points(&self, domain: FaceDomain) -> usize {
        let nfp = self.basis.num_face_nodes();
        match domain {
            FaceDomain::Interior => self.interior_faces.len() * nfp,
            FaceDomain::Boundary(tag) => self.selected_boundary_faces(tag).count() * nfp,
        }
    }
    fn nodes(&self) -> Array2<f64> {
        let mut nodes = Array2::zeros((2, self.num_volume_points()));
        nodes.row_mut(0).assign(&Array1::from_iter(self.x.iter().copied()));
        nodes.row_mut(1).assign(&Array1::from_iter(self.y.iter().copied()));
        nodes
    }
    fn face_nodes(&self, domain: FaceDomain) -> Array2<f64> {
        let points = self.face_points(domain);
        let mut nodes = Array2::zeros((2, points.len()));
        for (ipt, &(ielem, iface, j)) in points.iter().enumerate() {
            let i = self.basis.nodes_along_edges[[iface, j]];
            nodes[[0, ipt]] = self.x[[ielem, i]];
            nodes[[1, ipt]] = self.y[[ielem, i]];
        }
        nodes
    }
    fn normal(&self, domain: FaceDomain) -> Array2<f64> {
        let points = self.face_points(domain);
        let mut normal = Array2::zeros((2, points.len()));
        for (ipt, &(ielem, iface, j)) in points.iter().enumerate() {
            normal[[0, ipt]] = self.face_nx[[ielem * 4 + iface, j]];
            normal[[1, ipt]] = self.face_ny[[ielem * 4 + iface, j]];
        }
        normal
    }
    fn boundary_edges(&self, tag: BoundaryTag) -> Vec<usize> {
        self.selected_boundary_faces(tag)
            .map(|face| face.iedge)
            .collect()
    }
    fn all_boundary_edges(&self) -> Vec<usize> {
        self.boundary_faces.iter().map(|face| face.iedge).collect()
    }
    fn weak_div(&self, flux: ArrayView2<f64>) -> Array1<f64> {
        let np = self.basis.num_nodes();
        let mut div = Array1::zeros(self.num_volume_points());
        for ielem in 0..self.mesh.elem_num {
            let fx = flux.slice(s![0, ielem * np..(ielem + 1) * np]);
            let fy = flux.slice(s![1, ielem * np..(ielem + 1) * np]);
            let mass = self.mass.slice(s![ielem * np..(ielem + 1) * np]);
            // metric terms times quadrature weight and jacobian
            let gr: Array1<f64> = &mass * &(&self.rx.row(ielem) * &fx + &self.ry.row(ielem) * &fy);
            let gs: Array1<f64> = &mass * &(&self.sx.row(ielem) * &fx + &self.sy.row(ielem) * &fy);
            let mut div_elem: Array1<f64> = self.basis.dr.t().dot(&gr);
            let div_s: Array1<f64> = self.basis.ds.t().dot(&gs);
            div_elem.scaled_add(1.0, &div_s);
            div.slice_mut(s![ielem * np..(ielem + 1) * np])
                .assign(&div_elem);
        }
        div
    }
    fn interior_trace_pair(&self, field: ArrayView1<f64>) -> TracePair<Array1<f64>> {
        let nfp = self.basis.num_face_nodes();
        let npts = self.interior_faces.len() * nfp;
        let mut interior = Array1::zeros(npts);
        let mut exterior = Array1::zeros(npts);
        for (iface, face) in self.interior_faces.iter().enumerate() {
            for j in 0..nfp {
                let jj = face.exterior_perm[j];
                interior[iface * nfp + j] =
                    field[self.volume_index(face.elems[0], face.local_ids[0], j)];
                exterior[iface * nfp + j] =
                    field[self.volume_index(face.elems[1], face.local_ids[1], jj)];
            }
        }
        TracePair::new(interior, exterior)
    }
    fn interp_to_boundary(&self, tag: BoundaryTag, field: ArrayView1<f64>) -> Array1<f64> {
        self.face_points(FaceDomain::Boundary(tag))
            .into_iter()
            .map(|(ielem, iface, j)| field[self.volume_index(ielem, iface, j)])
            .collect()
    }
    fn project_flux_to_all_faces(
        &self,
        domain: FaceDomain,
        flux: ArrayView1<f64>,
    ) -> Array1<f64> {
        let nfp = self.basis.num_face_nodes();
        let mut all_faces = Array1::zeros(self.num_all_face_points());
        match domain {
            FaceDomain::Interior => {
                for (iface, face) in self.interior_faces.iter().enumerate() {
                    for j in 0..nfp {
                        let value = flux[iface * nfp + j];
                        let jj = face.exterior_perm[j];
                        all_faces[self.all_faces_index(face.elems[0], face.local_ids[0], j)] =
                            value;
                        all_faces[self.all_faces_index(face.elems[1], face.local_ids[1], jj)] =
                            -value;
                    }
                }
            }
            FaceDomain::Boundary(tag) => {
                for (iface, face) in self.selected_boundary_faces(tag).enumerate() {
                    for j in 0..nfp {
                        all_faces[self.all_faces_index(face.elem, face.local_id, j)] =
                            flux[iface * nfp + j];
                    }
                }
            }
        }
        all_faces
    }
    fn face_mass(&self, all_faces: ArrayView1<f64>) -> Array1<f64> {
        let nfp = self.basis.num_face_nodes();
        let mut lifted = Array1::zeros(self.num_volume_points());
        for ielem in 0..self.mesh.elem_num {
            for iface in 0..4 {
                for j in 0..nfp {
                    let weight = self.basis.quad_w[j] * self.face_sj[[ielem * 4 + iface, j]];
                    lifted[self.volume_index(ielem, iface, j)] +=
                        weight * all_faces[self.all_faces_index(ielem, iface, j)];
                }
            }
        }
        lifted
    }
    fn inverse_mass(&self, field: ArrayView1<f64>) -> Array1<f64> {
        &field / &self.mass
    }
}
