use std::ops::{Add, Mul, Neg, Sub};

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis, Zip, s};

use crate::disc::{Discretization, FaceDomain, PointField, TracePair};

/// Conserved variables `[rho, rho E, rho V_0, .., rho V_{dim-1}]` per point,
/// stored as rows of a `(dim + 2, n_points)` array.
///
/// The same layout carries numerical fluxes and right-hand sides.
#[derive(Clone, Debug, PartialEq)]
pub struct ConservedState {
    pub data: Array2<f64>,
}

/// Normal flux of each conserved quantity at face points.
pub type NumericalFlux = ConservedState;

impl ConservedState {
    pub fn new(data: Array2<f64>) -> Self {
        assert!(
            data.nrows() >= 3,
            "conserved state needs density, energy and at least one momentum row"
        );
        Self { data }
    }
    pub fn zeros(dim: usize, num_points: usize) -> Self {
        Self::new(Array2::zeros((dim + 2, num_points)))
    }
    pub fn from_parts(mass: ArrayView1<f64>, energy: ArrayView1<f64>, momentum: ArrayView2<f64>) -> Self {
        let mut data = Array2::zeros((momentum.nrows() + 2, mass.len()));
        data.row_mut(0).assign(&mass);
        data.row_mut(1).assign(&energy);
        data.slice_mut(s![2.., ..]).assign(&momentum);
        Self::new(data)
    }
    pub fn dim(&self) -> usize {
        self.data.nrows() - 2
    }
    pub fn num_equations(&self) -> usize {
        self.data.nrows()
    }
    pub fn num_points(&self) -> usize {
        self.data.ncols()
    }
    pub fn mass(&self) -> ArrayView1<'_, f64> {
        self.data.row(0)
    }
    pub fn energy(&self) -> ArrayView1<'_, f64> {
        self.data.row(1)
    }
    pub fn momentum(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![2.., ..])
    }
    pub fn component(&self, ieq: usize) -> ArrayView1<'_, f64> {
        self.data.row(ieq)
    }
    /// `rho V / rho`, shape `(dim, n_points)`.
    pub fn velocity(&self) -> Array2<f64> {
        let mut velocity = self.momentum().to_owned();
        for mut row in velocity.axis_iter_mut(Axis(0)) {
            Zip::from(&mut row)
                .and(&self.mass())
                .for_each(|v, &rho| *v /= rho);
        }
        velocity
    }
    /// Apply a scalar-field operator to every conserved quantity.
    pub fn map_components<F>(&self, num_points: usize, mut f: F) -> ConservedState
    where
        F: FnMut(ArrayView1<f64>) -> Array1<f64>,
    {
        let mut data = Array2::zeros((self.num_equations(), num_points));
        for (ieq, mut row) in data.axis_iter_mut(Axis(0)).enumerate() {
            row.assign(&f(self.component(ieq)));
        }
        ConservedState::new(data)
    }
    /// Max-norm of every component.
    pub fn max_norms(&self) -> Array1<f64> {
        self.data
            .map_axis(Axis(1), |row| row.iter().fold(0.0_f64, |m, v| m.max(v.abs())))
    }
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
    pub fn scaled_add(&mut self, alpha: f64, other: &ConservedState) {
        assert_same_shape(self, other);
        self.data.scaled_add(alpha, &other.data);
    }
}
fn assert_same_shape(a: &ConservedState, b: &ConservedState) {
    assert_eq!(
        a.data.shape(),
        b.data.shape(),
        "conserved states differ in shape"
    );
}

impl PointField for ConservedState {
    fn field_shape(&self) -> &[usize] {
        self.data.shape()
    }
}

impl Add for &ConservedState {
    type Output = ConservedState;
    fn add(self, rhs: &ConservedState) -> ConservedState {
        assert_same_shape(self, rhs);
        ConservedState::new(&self.data + &rhs.data)
    }
}
impl Add for ConservedState {
    type Output = ConservedState;
    fn add(self, rhs: ConservedState) -> ConservedState {
        assert_same_shape(&self, &rhs);
        ConservedState::new(self.data + rhs.data)
    }
}
impl Sub for &ConservedState {
    type Output = ConservedState;
    fn sub(self, rhs: &ConservedState) -> ConservedState {
        assert_same_shape(self, rhs);
        ConservedState::new(&self.data - &rhs.data)
    }
}
impl Sub for ConservedState {
    type Output = ConservedState;
    fn sub(self, rhs: ConservedState) -> ConservedState {
        assert_same_shape(&self, &rhs);
        ConservedState::new(self.data - rhs.data)
    }
}
impl Mul<f64> for &ConservedState {
    type Output = ConservedState;
    fn mul(self, rhs: f64) -> ConservedState {
        ConservedState::new(&self.data * rhs)
    }
}
impl Mul<f64> for ConservedState {
    type Output = ConservedState;
    fn mul(self, rhs: f64) -> ConservedState {
        ConservedState::new(self.data * rhs)
    }
}
impl Mul<&ConservedState> for f64 {
    type Output = ConservedState;
    fn mul(self, rhs: &ConservedState) -> ConservedState {
        rhs * self
    }
}
impl Neg for ConservedState {
    type Output = ConservedState;
    fn neg(self) -> ConservedState {
        ConservedState::new(-self.data)
    }
}

/// Physical flux per conserved quantity and direction, shape
/// `(dim + 2, dim, n_points)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FluxTensor {
    pub data: Array3<f64>,
}
impl FluxTensor {
    pub fn dim(&self) -> usize {
        self.data.shape()[1]
    }
    pub fn num_points(&self) -> usize {
        self.data.shape()[2]
    }
    /// Vector flux of conserved quantity `ieq`, shape `(dim, n_points)`.
    pub fn component(&self, ieq: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), ieq)
    }
    /// `F . n` per conserved quantity.
    pub fn dot_normal(&self, normal: ArrayView2<f64>) -> ConservedState {
        assert_eq!(
            normal.shape(),
            &self.data.shape()[1..],
            "normal does not match flux tensor shape"
        );
        let mut data = Array2::zeros((self.data.shape()[0], self.num_points()));
        for (ieq, mut row) in data.axis_iter_mut(Axis(0)).enumerate() {
            for idim in 0..self.dim() {
                Zip::from(&mut row)
                    .and(&self.data.slice(s![ieq, idim, ..]))
                    .and(&normal.row(idim))
                    .for_each(|acc, &f, &n| *acc += f * n);
            }
        }
        ConservedState::new(data)
    }
}
impl Add for &FluxTensor {
    type Output = FluxTensor;
    fn add(self, rhs: &FluxTensor) -> FluxTensor {
        assert_eq!(
            self.data.shape(),
            rhs.data.shape(),
            "flux tensors differ in shape"
        );
        FluxTensor {
            data: &self.data + &rhs.data,
        }
    }
}

/// Pair the interior and exterior values of every conserved quantity across
/// the interior faces of `disc`.
pub fn interior_trace_pair(
    disc: &dyn Discretization,
    q: &ConservedState,
) -> TracePair<ConservedState> {
    let npts = disc.num_face_points(FaceDomain::Interior);
    let mut interior = Array2::zeros((q.num_equations(), npts));
    let mut exterior = Array2::zeros((q.num_equations(), npts));
    for ieq in 0..q.num_equations() {
        let tpair = disc.interior_trace_pair(q.component(ieq));
        interior.row_mut(ieq).assign(&tpair.interior);
        exterior.row_mut(ieq).assign(&tpair.exterior);
    }
    TracePair::new(ConservedState::new(interior), ConservedState::new(exterior))
}

impl TracePair<ConservedState> {
    pub fn jump(&self) -> ConservedState {
        &self.exterior - &self.interior
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_component_accessors() {
        let q = ConservedState::new(array![[1.0, 2.0], [5.0, 6.0], [0.5, 1.0], [0.0, -2.0]]);
        assert_eq!(q.dim(), 2);
        assert_eq!(q.num_points(), 2);
        assert_eq!(q.mass(), array![1.0, 2.0]);
        assert_eq!(q.velocity(), array![[0.5, 0.5], [0.0, -1.0]]);
        assert_eq!(q.max_norms(), array![2.0, 6.0, 1.0, 2.0]);
    }

    #[test]
    fn test_elementwise_operators() {
        let a = ConservedState::new(array![[1.0], [2.0], [3.0]]);
        let b = ConservedState::new(array![[0.5], [0.5], [-1.0]]);
        assert_eq!((&a + &b).data, array![[1.5], [2.5], [2.0]]);
        assert_eq!((&a - &b).data, array![[0.5], [1.5], [4.0]]);
        assert_eq!((2.0 * &a).data, array![[2.0], [4.0], [6.0]]);
        assert_eq!((-a).data, array![[-1.0], [-2.0], [-3.0]]);
    }

    #[test]
    #[should_panic(expected = "differ in shape")]
    fn test_trace_pair_rejects_mismatched_shapes() {
        let a = ConservedState::zeros(2, 3);
        let b = ConservedState::zeros(2, 4);
        let _ = TracePair::new(a, b);
    }

    #[test]
    #[should_panic(expected = "differ in shape")]
    fn test_add_rejects_mismatched_point_counts() {
        let a = ConservedState::zeros(2, 5);
        let b = ConservedState::new(array![[1.0], [2.0], [3.0], [4.0]]);
        let _ = &a + &b;
    }

    #[test]
    #[should_panic(expected = "differ in shape")]
    fn test_owned_sub_rejects_mismatched_point_counts() {
        let a = ConservedState::zeros(2, 5);
        let b = ConservedState::zeros(2, 1);
        let _ = a - b;
    }

    #[test]
    #[should_panic(expected = "differ in shape")]
    fn test_scaled_add_rejects_mismatched_point_counts() {
        let mut a = ConservedState::zeros(2, 5);
        let b = ConservedState::new(array![[1.0], [1.0], [1.0], [1.0]]);
        a.scaled_add(1.0, &b);
    }

    #[test]
    fn test_flux_dot_normal() {
        let mut data = Array3::zeros((4, 2, 1));
        data[[0, 0, 0]] = 2.0;
        data[[0, 1, 0]] = 3.0;
        let flux = FluxTensor { data };
        let n = array![[0.6], [0.8]];
        let fn_ = flux.dot_normal(n.view());
        assert!((fn_.data[[0, 0]] - (2.0 * 0.6 + 3.0 * 0.8)).abs() < 1e-15);
        assert_eq!(fn_.data[[1, 0]], 0.0);
    }
}
