use ndarray::{Array3, Zip, s};

use crate::euler::eos::EquationOfState;
use crate::euler::state::{ConservedState, FluxTensor};

/// Inviscid Euler flux of `q`.
pub fn inviscid_flux(q: &ConservedState, eos: &dyn EquationOfState) -> FluxTensor {
    let dim = q.dim();
    let npts = q.num_points();
    let p = eos.pressure(q);
    let rho = q.mass();
    let rho_e = q.energy();
    let momentum = q.momentum();
    let mut data = Array3::zeros((dim + 2, dim, npts));

    data.slice_mut(s![0, .., ..]).assign(&momentum);
    for i in 0..dim {
        Zip::from(data.slice_mut(s![1, i, ..]))
            .and(&momentum.row(i))
            .and(&rho)
            .and(&rho_e)
            .and(&p)
            .for_each(|f, &m, &rho, &rho_e, &p| *f = (rho_e + p) / rho * m);
        for j in 0..dim {
            let diag = if i == j { 1.0 } else { 0.0 };
            Zip::from(data.slice_mut(s![2 + i, j, ..]))
                .and(&momentum.row(i))
                .and(&momentum.row(j))
                .and(&rho)
                .and(&p)
                .for_each(|f, &mi, &mj, &rho, &p| *f = mi * mj / rho + diag * p);
        }
    }
    FluxTensor { data }
}
