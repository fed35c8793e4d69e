use ndarray::{Array, Ix1, array};

const NEWTON_TOL: f64 = 1e-15;
const NEWTON_MAX_ITER: usize = 100;

/// GLL points and weights on [-1, 1]; weights sum to 2.
pub fn get_lobatto_points_interval(points_num: usize) -> (Array<f64, Ix1>, Array<f64, Ix1>) {
    let (gauss_points, gauss_weights) = match points_num {
        0 | 1 => panic!("Gauss-Lobatto rule needs at least two points"),
        2 => (array![-1.0, 1.0], array![1.0, 1.0]),
        3 => {
            let points = array![-1.0, 0.0, 1.0];
            let weights = array![1.0 / 3.0, 4.0 / 3.0, 1.0 / 3.0];
            (points, weights)
        }
        4 => {
            let sqrt5 = 5.0_f64.sqrt();
            let points = array![-1.0, -1.0 / 5.0 * sqrt5, 1.0 / 5.0 * sqrt5, 1.0];
            let weights = array![1.0 / 6.0, 5.0 / 6.0, 5.0 / 6.0, 1.0 / 6.0];
            (points, weights)
        }
        5 => {
            let sqrt21 = (21.0_f64).sqrt();
            let points = array![-1.0, -1.0 / 7.0 * sqrt21, 0.0, 1.0 / 7.0 * sqrt21, 1.0];
            let weights = array![
                1.0 / 10.0,
                49.0 / 90.0,
                32.0 / 45.0,
                49.0 / 90.0,
                1.0 / 10.0
            ];
            (points, weights)
        }
        _ => newton_lobatto(points_num),
    };
    (gauss_points, gauss_weights)
}

/// Legendre polynomials (P_{n-1}, P_n) at `x` by the three-term recurrence, n >= 1.
fn legendre_pair(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.0;
    let mut p = x;
    for k in 2..=n {
        let k = k as f64;
        let p_next = ((2.0 * k - 1.0) * x * p - (k - 1.0) * p_prev) / k;
        p_prev = p;
        p = p_next;
    }
    (p_prev, p)
}

/// Interior GLL nodes are the roots of P'_N, found by Newton iteration from
/// Chebyshev-Gauss-Lobatto initial guesses.
fn newton_lobatto(points_num: usize) -> (Array<f64, Ix1>, Array<f64, Ix1>) {
    let n = points_num - 1;
    let n_f = n as f64;
    let mut points = Array::<f64, Ix1>::zeros(points_num);
    let mut weights = Array::<f64, Ix1>::zeros(points_num);
    for i in 0..points_num {
        let mut x = -(std::f64::consts::PI * i as f64 / n_f).cos();
        if i != 0 && i != n {
            // (1 - x^2) P'_N = N (P_{N-1} - x P_N), and the bracket has derivative -(N + 1) P_N
            for _ in 0..NEWTON_MAX_ITER {
                let (p_prev, p) = legendre_pair(n, x);
                let dx = (p_prev - x * p) / (-(n_f + 1.0) * p);
                x -= dx;
                if dx.abs() < NEWTON_TOL {
                    break;
                }
            }
        }
        let (_, p) = legendre_pair(n, x);
        points[i] = x;
        weights[i] = 2.0 / (n_f * (n_f + 1.0) * p * p);
    }
    (points, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weights_sum_to_interval_length() {
        for npts in 2..10 {
            let (_, w) = get_lobatto_points_interval(npts);
            assert_relative_eq!(w.sum(), 2.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_newton_matches_table() {
        for npts in 3..=5 {
            let (p_table, w_table) = get_lobatto_points_interval(npts);
            let (p_newton, w_newton) = newton_lobatto(npts);
            for i in 0..npts {
                assert_relative_eq!(p_table[i], p_newton[i], epsilon = 1e-13);
                assert_relative_eq!(w_table[i], w_newton[i], epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn test_exact_for_degree_2n_minus_3() {
        // N points integrate polynomials up to degree 2N - 3 exactly
        for npts in 3..9 {
            let (p, w) = get_lobatto_points_interval(npts);
            for degree in 0..=(2 * npts - 3) {
                let numeric: f64 = p
                    .iter()
                    .zip(w.iter())
                    .map(|(x, wi)| wi * x.powi(degree as i32))
                    .sum();
                let exact = if degree % 2 == 0 {
                    2.0 / (degree as f64 + 1.0)
                } else {
                    0.0
                };
                assert!(
                    (numeric - exact).abs() < 1e-12,
                    "npts {npts}, degree {degree}: {numeric} vs {exact}"
                );
            }
        }
    }
}
