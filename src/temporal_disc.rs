use ndarray::Array1;

use crate::euler::state::ConservedState;

/// Vector-space operations an explicit integrator needs.
pub trait Integrable: Clone {
    /// self <- c * self
    fn scale(&mut self, c: f64);
    /// self <- self + c * other
    fn axpy(&mut self, c: f64, other: &Self);
}
impl Integrable for f64 {
    fn scale(&mut self, c: f64) {
        *self *= c;
    }
    fn axpy(&mut self, c: f64, other: &Self) {
        *self += c * other;
    }
}
impl Integrable for Array1<f64> {
    fn scale(&mut self, c: f64) {
        *self *= c;
    }
    fn axpy(&mut self, c: f64, other: &Self) {
        self.scaled_add(c, other);
    }
}
impl Integrable for ConservedState {
    fn scale(&mut self, c: f64) {
        self.data *= c;
    }
    fn axpy(&mut self, c: f64, other: &Self) {
        self.scaled_add(c, other);
    }
}

/// Classical fourth-order Runge-Kutta step. `rhs(state, time)` is called
/// exactly four times; `state` is left untouched.
pub fn rk4_step<S, F>(state: &S, t: f64, dt: f64, mut rhs: F) -> S
where
    S: Integrable,
    F: FnMut(&S, f64) -> S,
{
    let stage = |k: &S, c: f64| {
        let mut q = state.clone();
        q.axpy(c * dt, k);
        q
    };
    let k1 = rhs(state, t);
    let k2 = rhs(&stage(&k1, 0.5), t + 0.5 * dt);
    let k3 = rhs(&stage(&k2, 0.5), t + 0.5 * dt);
    let k4 = rhs(&stage(&k3, 1.0), t + dt);

    let mut next = state.clone();
    next.axpy(dt / 6.0, &k1);
    next.axpy(dt / 3.0, &k2);
    next.axpy(dt / 3.0, &k3);
    next.axpy(dt / 6.0, &k4);
    next
}
