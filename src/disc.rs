use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::disc::boundary::BoundaryTag;

pub mod basis;
pub mod boundary;
pub mod dg_quad;
pub mod gauss_points;
pub mod geometric;
pub mod mesh;

/// Set of face points an operator acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceDomain {
    /// Faces shared by two elements, oriented from their first parent.
    Interior,
    /// Boundary faces selected by a tag.
    Boundary(BoundaryTag),
}

/// Anything that can be paired across a face; both sides must agree in shape.
pub trait PointField {
    fn field_shape(&self) -> &[usize];
}
impl PointField for Array1<f64> {
    fn field_shape(&self) -> &[usize] {
        self.shape()
    }
}

/// Interior and exterior samples of a field at the same face points.
#[derive(Clone, Debug)]
pub struct TracePair<T> {
    pub interior: T,
    pub exterior: T,
}
impl<T: PointField> TracePair<T> {
    pub fn new(interior: T, exterior: T) -> Self {
        assert_eq!(
            interior.field_shape(),
            exterior.field_shape(),
            "interior and exterior traces differ in shape"
        );
        Self { interior, exterior }
    }
}
/// Structural operators of a nodal discretization. Scalar fields are 1-D
/// arrays over volume points, face points of a [`FaceDomain`], or all faces
/// of all elements.
pub trait Discretization {
    fn dim(&self) -> usize;
    fn num_volume_points(&self) -> usize;
    fn num_all_face_points(&self) -> usize;
    fn num_face_points(&self, domain: FaceDomain) -> usize;
    /// Volume node coordinates, shape `(dim, n_volume_points)`.
    fn nodes(&self) -> Array2<f64>;
    fn face_nodes(&self, domain: FaceDomain) -> Array2<f64>;
    /// Unit outward normals, shape `(dim, n_face_points)`.
    fn normal(&self, domain: FaceDomain) -> Array2<f64>;
    /// Mesh edges selected by `tag`, ascending.
    fn boundary_edges(&self, tag: BoundaryTag) -> Vec<usize>;
    fn all_boundary_edges(&self) -> Vec<usize>;
    /// Weak divergence of a vector field of shape `(dim, n_volume_points)`.
    fn weak_div(&self, flux: ArrayView2<f64>) -> Array1<f64>;
    fn interior_trace_pair(&self, field: ArrayView1<f64>) -> TracePair<Array1<f64>>;
    fn interp_to_boundary(&self, tag: BoundaryTag, field: ArrayView1<f64>) -> Array1<f64>;
    /// Scatter a normal flux living on `domain` into the all-faces layout. On
    /// interior faces the second parent receives the negated value.
    fn project_flux_to_all_faces(&self, domain: FaceDomain, flux: ArrayView1<f64>)
    -> Array1<f64>;
    fn face_mass(&self, all_faces: ArrayView1<f64>) -> Array1<f64>;
    fn inverse_mass(&self, field: ArrayView1<f64>) -> Array1<f64>;
}
