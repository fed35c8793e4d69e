use faer::linalg::solvers::DenseSolveCore;
use faer_ext::{IntoFaer, IntoNdarray};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use statrs::function::gamma::gamma;

use crate::disc::gauss_points::lobatto_points::get_lobatto_points_interval;

pub mod quadrilateral;

/// Dense inverse through faer's partial-pivot LU.
pub fn invert(a: ArrayView2<f64>) -> Array2<f64> {
    let a_faer = a.into_faer();
    let a_inv = a_faer.partial_piv_lu().inverse();
    a_inv.as_ref().into_ndarray().to_owned()
}

pub trait Basis {
    /// GLL nodes for polynomial order `n` (n + 1 points).
    fn jacobi_gauss_lobatto(n: usize) -> Array1<f64> {
        let (points, _) = get_lobatto_points_interval(n + 1);
        points
    }
    #[allow(non_snake_case)]
    fn calculate_Ak(k_order: f64, alpha: f64, beta: f64) -> f64 {
        if k_order < 1.0 {
            panic!("A_k recurrence coefficient is only defined for k >= 1");
        }
        let h1_for_Ak = 2.0 * (k_order - 1.0) + alpha + beta;
        2.0 / (h1_for_Ak + 2.0)
            * (k_order * (k_order + alpha + beta) * (k_order + alpha) * (k_order + beta)
                / (h1_for_Ak + 1.0)
                / (h1_for_Ak + 3.0))
                .sqrt()
    }
    /// Orthonormal Jacobi polynomial P_n^(alpha, beta) evaluated at `x`.
    fn jacobi_polynomial(x: ArrayView1<f64>, alpha: f64, beta: f64, n: i32) -> Array1<f64> {
        let gamma0 = 2.0_f64.powf(alpha + beta + 1.0) / (alpha + beta + 1.0)
            * gamma(alpha + 1.0)
            * gamma(beta + 1.0)
            / gamma(alpha + beta + 1.0);
        let p0 = Array1::from_elem(x.len(), 1.0 / gamma0.sqrt());
        if n == 0 {
            return p0;
        }
        let gamma1 = (alpha + 1.0) * (beta + 1.0) / (alpha + beta + 3.0) * gamma0;
        let p1 = ((alpha + beta + 2.0) * &x * 0.5 + (alpha - beta) * 0.5) / gamma1.sqrt();
        if n == 1 {
            return p1;
        }
        // P_k = ((x - B_k) P_{k-1} - A_{k-1} P_{k-2}) / A_k
        let mut pn_2 = p0;
        let mut pn_1 = p1;
        let mut a_old = Self::calculate_Ak(1.0, alpha, beta);
        for k in 2..=n {
            let k_f = k as f64;
            let a_new = Self::calculate_Ak(k_f, alpha, beta);
            let h1 = 2.0 * (k_f - 1.0) + alpha + beta;
            let b_new = -(alpha.powi(2) - beta.powi(2)) / h1 / (h1 + 2.0);
            let pn = ((&x - b_new) * &pn_1 - a_old * &pn_2) / a_new;
            pn_2 = pn_1;
            pn_1 = pn;
            a_old = a_new;
        }
        pn_1
    }
    fn grad_jacobi_polynomial(r: ArrayView1<f64>, alpha: f64, beta: f64, n: i32) -> Array1<f64> {
        match n {
            0 => Array1::zeros(r.len()),
            _ => {
                let pn = Self::jacobi_polynomial(r, alpha + 1.0, beta + 1.0, n - 1);
                let n = n as f64;
                (n * (n + alpha + beta + 1.0)).sqrt() * pn
            }
        }
    }
    /// Nodal differentiation matrices, Dr = Vr V^-1 and Ds = Vs V^-1.
    fn dmatrices_2d(
        n: usize,
        r: ArrayView1<f64>,
        s: ArrayView1<f64>,
        v: ArrayView2<f64>,
    ) -> (Array2<f64>, Array2<f64>) {
        let (vr, vs) = Self::grad_vandermonde_2d(n, r, s);
        let inv_v = invert(v);
        let dr = vr.dot(&inv_v);
        let ds = vs.dot(&inv_v);
        (dr, ds)
    }
    fn vandermonde2d(n: usize, r: ArrayView1<f64>, s: ArrayView1<f64>) -> Array2<f64>;
    fn grad_vandermonde_2d(
        n: usize,
        r: ArrayView1<f64>,
        s: ArrayView1<f64>,
    ) -> (Array2<f64>, Array2<f64>);
    fn nodes2d(n: usize) -> (Array1<f64>, Array1<f64>);
}
