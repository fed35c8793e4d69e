/// Bilinear map from the reference square [-1, 1]^2 onto a straight-sided
/// quadrilateral with counter-clockwise vertices.
pub trait Geometric2D {
    fn compute_ref_normal(local_id: usize) -> [f64; 2] {
        match local_id {
            0 => [0.0, -1.0],
            1 => [1.0, 0.0],
            2 => [0.0, 1.0],
            3 => [-1.0, 0.0],
            _ => panic!("Invalid edge ID"),
        }
    }
    fn shape_functions(xi: f64, eta: f64) -> [f64; 4] {
        [
            0.25 * (1.0 - xi) * (1.0 - eta),
            0.25 * (1.0 + xi) * (1.0 - eta),
            0.25 * (1.0 + xi) * (1.0 + eta),
            0.25 * (1.0 - xi) * (1.0 + eta),
        ]
    }
    fn map_to_physical(xi: f64, eta: f64, x: &[f64], y: &[f64]) -> (f64, f64) {
        let n = Self::shape_functions(xi, eta);
        let mut x_phys = 0.0;
        let mut y_phys = 0.0;
        for k in 0..4 {
            x_phys += n[k] * x[k];
            y_phys += n[k] * y[k];
        }
        (x_phys, y_phys)
    }
    /// Jacobian determinant and inverse-transpose entries
    /// `[xi_x, eta_x, xi_y, eta_y]` at a reference point.
    fn evaluate_jacob(xi: f64, eta: f64, x: &[f64], y: &[f64]) -> (f64, [f64; 4]) {
        let dn_dxi = [
            -0.25 * (1.0 - eta),
            0.25 * (1.0 - eta),
            0.25 * (1.0 + eta),
            -0.25 * (1.0 + eta),
        ];
        let dn_deta = [
            -0.25 * (1.0 - xi),
            -0.25 * (1.0 + xi),
            0.25 * (1.0 + xi),
            0.25 * (1.0 - xi),
        ];
        let mut dx_dxi = 0.0;
        let mut dx_deta = 0.0;
        let mut dy_dxi = 0.0;
        let mut dy_deta = 0.0;
        for k in 0..4 {
            dx_dxi += dn_dxi[k] * x[k];
            dx_deta += dn_deta[k] * x[k];
            dy_dxi += dn_dxi[k] * y[k];
            dy_deta += dn_deta[k] * y[k];
        }
        let jacob_det = dx_dxi * dy_deta - dx_deta * dy_dxi;
        let jacob_inv_t = [
            dy_deta / jacob_det,
            -dy_dxi / jacob_det,
            -dx_deta / jacob_det,
            dx_dxi / jacob_det,
        ];
        (jacob_det, jacob_inv_t)
    }
}
