use ndarray::{Array1, Array2, ArrayView1, s};

use crate::disc::basis::{Basis, invert};
use crate::disc::gauss_points::GaussPoints1d;

/// Tensor-product nodal basis on [-1, 1]^2 collocated at GLL points.
///
/// Nodes are numbered with `r` running fastest. Faces are counter-clockwise:
/// 0 bottom (s = -1), 1 right (r = 1), 2 top (s = 1), 3 left (r = -1), and the
/// nodes of face `f` run from vertex `f` towards vertex `(f + 1) % 4`.
pub struct QuadrilateralBasis {
    pub n: usize,
    pub r: Array1<f64>,
    pub s: Array1<f64>,
    pub vandermonde: Array2<f64>,
    pub inv_vandermonde: Array2<f64>,
    pub dr: Array2<f64>,
    pub ds: Array2<f64>,
    pub nodes_along_edges: Array2<usize>,
    pub quad_p: Array1<f64>,
    pub quad_w: Array1<f64>,
}

impl QuadrilateralBasis {
    pub fn new(n: usize) -> Self {
        let (r, s) = Self::nodes2d(n);
        let vandermonde = Self::vandermonde2d(n, r.view(), s.view());
        let inv_vandermonde = invert(vandermonde.view());
        let (dr, ds) = Self::dmatrices_2d(n, r.view(), s.view(), vandermonde.view());
        let nodes_along_edges = Self::set_nodes_along_edges(n);
        let gauss_points = GaussPoints1d::new(n + 1);
        Self {
            n,
            r,
            s,
            vandermonde,
            inv_vandermonde,
            dr,
            ds,
            nodes_along_edges,
            quad_p: gauss_points.points,
            quad_w: gauss_points.weights,
        }
    }
    pub fn num_nodes(&self) -> usize {
        self.r.len()
    }
    pub fn num_face_nodes(&self) -> usize {
        self.n + 1
    }
    /// Tensor-product quadrature weight of volume node `i`.
    pub fn volume_weight(&self, i: usize) -> f64 {
        let nfp = self.n + 1;
        self.quad_w[i % nfp] * self.quad_w[i / nfp]
    }
    fn ortho_basis_ij(r: ArrayView1<f64>, s: ArrayView1<f64>, i: i32, j: i32) -> Array1<f64> {
        let p_i_r = Self::jacobi_polynomial(r, 0.0, 0.0, i);
        let p_j_s = Self::jacobi_polynomial(s, 0.0, 0.0, j);
        &p_i_r * &p_j_s
    }
    fn set_nodes_along_edges(n: usize) -> Array2<usize> {
        let nfp = n + 1;
        let mut nodes_along_edges = Array2::<usize>::zeros((4, nfp));
        // bottom, s = -1
        let fmask1: Vec<usize> = (0..nfp).collect();
        // right, r = 1
        let fmask2: Vec<usize> = (0..nfp).map(|i| (i + 1) * nfp - 1).collect();
        // top, s = 1
        let fmask3: Vec<usize> = (n * nfp..(n + 1) * nfp).rev().collect();
        // left, r = -1
        let fmask4: Vec<usize> = (0..nfp).map(|i| (n - i) * nfp).collect();

        for (iface, fmask) in [fmask1, fmask2, fmask3, fmask4].into_iter().enumerate() {
            nodes_along_edges
                .slice_mut(s![iface, ..])
                .assign(&Array1::from_vec(fmask));
        }
        nodes_along_edges
    }
}
impl Basis for QuadrilateralBasis {
    fn vandermonde2d(n: usize, r: ArrayView1<f64>, s: ArrayView1<f64>) -> Array2<f64> {
        let n_basis_1d = n + 1;
        let mut v = Array2::zeros((r.len(), n_basis_1d * n_basis_1d));
        let mut sk = 0;
        for i in 0..n_basis_1d {
            for j in 0..n_basis_1d {
                v.column_mut(sk)
                    .assign(&Self::ortho_basis_ij(r, s, i as i32, j as i32));
                sk += 1;
            }
        }
        v
    }
    fn nodes2d(n: usize) -> (Array1<f64>, Array1<f64>) {
        let n_pts_1d = n + 1;
        let n_pts_2d = n_pts_1d * n_pts_1d;
        let mut r = Array1::<f64>::zeros(n_pts_2d);
        let mut s = Array1::<f64>::zeros(n_pts_2d);
        let zeta = Self::jacobi_gauss_lobatto(n);
        let mut sk = 0;
        for i in 0..n_pts_1d {
            for j in 0..n_pts_1d {
                r[sk] = zeta[j];
                s[sk] = zeta[i];
                sk += 1;
            }
        }
        (r, s)
    }
    fn grad_vandermonde_2d(
        n: usize,
        r: ArrayView1<f64>,
        s: ArrayView1<f64>,
    ) -> (Array2<f64>, Array2<f64>) {
        let n_basis_1d = n + 1;
        let num_points = r.len();
        let n_basis_2d = n_basis_1d * n_basis_1d;
        let mut vr = Array2::zeros((num_points, n_basis_2d));
        let mut vs = Array2::zeros((num_points, n_basis_2d));
        let mut sk = 0;
        for i in 0..n_basis_1d {
            let p_i_r = Self::jacobi_polynomial(r, 0.0, 0.0, i as i32);
            let dp_i_r = Self::grad_jacobi_polynomial(r, 0.0, 0.0, i as i32);
            for j in 0..n_basis_1d {
                let p_j_s = Self::jacobi_polynomial(s, 0.0, 0.0, j as i32);
                let dp_j_s = Self::grad_jacobi_polynomial(s, 0.0, 0.0, j as i32);
                vr.column_mut(sk).assign(&(&dp_i_r * &p_j_s));
                vs.column_mut(sk).assign(&(&p_i_r * &dp_j_s));
                sk += 1;
            }
        }
        (vr, vs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dr_ds_exact_on_bilinear_field() {
        let basis = QuadrilateralBasis::new(3);
        // u = 2 + 3r - s + 0.5 r s
        let u = 2.0 + 3.0 * &basis.r - &basis.s + 0.5 * &basis.r * &basis.s;
        let du_dr = basis.dr.dot(&u);
        let du_ds = basis.ds.dot(&u);
        for i in 0..basis.num_nodes() {
            assert_relative_eq!(du_dr[i], 3.0 + 0.5 * basis.s[i], epsilon = 1e-11);
            assert_relative_eq!(du_ds[i], -1.0 + 0.5 * basis.r[i], epsilon = 1e-11);
        }
    }

    #[test]
    fn test_vandermonde_inverse() {
        let basis = QuadrilateralBasis::new(2);
        let identity = basis.vandermonde.dot(&basis.inv_vandermonde);
        for ((i, j), value) in identity.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((value - expected).abs() < 1e-12, "V V^-1 [{i},{j}] = {value}");
        }
    }

    #[test]
    fn test_face_nodes_lie_on_faces() {
        let basis = QuadrilateralBasis::new(4);
        let on_face = |f: usize, i: usize| match f {
            0 => basis.s[i] == -1.0,
            1 => basis.r[i] == 1.0,
            2 => basis.s[i] == 1.0,
            _ => basis.r[i] == -1.0,
        };
        for f in 0..4 {
            for j in 0..basis.num_face_nodes() {
                let i = basis.nodes_along_edges[[f, j]];
                assert!(on_face(f, i), "node {i} is not on face {f}");
            }
            // counter-clockwise: face f starts at vertex f
            let first = basis.nodes_along_edges[[f, 0]];
            let (r0, s0) = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)][f];
            assert_eq!((basis.r[first], basis.s[first]), (r0, s0));
        }
    }

    #[test]
    fn test_volume_weights_sum_to_reference_area() {
        let basis = QuadrilateralBasis::new(3);
        let total: f64 = (0..basis.num_nodes()).map(|i| basis.volume_weight(i)).sum();
        assert_relative_eq!(total, 4.0, epsilon = 1e-13);
    }
}
