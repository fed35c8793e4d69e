use ndarray::{Array, Ix1};

pub mod lobatto_points;

/// Gauss-Lobatto-Legendre points and weights on [-1, 1].
pub struct GaussPoints1d {
    pub points: Array<f64, Ix1>,
    pub weights: Array<f64, Ix1>,
}
impl GaussPoints1d {
    pub fn new(points_num: usize) -> Self {
        let (points, weights) = lobatto_points::get_lobatto_points_interval(points_num);
        Self { points, weights }
    }
}
