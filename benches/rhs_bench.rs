//! Euler RHS and RK4 step on the translating vortex.
//!
//! Run with: `cargo bench --bench rhs_bench`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use euler_dg::disc::Discretization;
use euler_dg::disc::boundary::BoundaryTag;
use euler_dg::disc::dg_quad::DgQuadDiscretization;
use euler_dg::disc::mesh::mesh2d::Mesh2d;
use euler_dg::euler::boundary::{BoundaryFluxAggregator, PrescribedBoundary};
use euler_dg::euler::eos::IdealSingleGas;
use euler_dg::euler::riemann_solver::RusanovFlux;
use euler_dg::euler::{ConservedState, EulerRhs};
use euler_dg::initialization::{ExactSolution, Vortex2D};
use euler_dg::temporal_disc::rk4_step;

fn setup(nel_1d: usize, order: usize) -> (DgQuadDiscretization, Vortex2D) {
    let mesh = Mesh2d::create_rect_mesh([-5.0, -5.0], [5.0, 5.0], [nel_1d, nel_1d]);
    let disc = DgQuadDiscretization::new(mesh, order).unwrap();
    let vortex = Vortex2D {
        velocity: [1.0, 1.0],
        ..Vortex2D::default()
    };
    (disc, vortex)
}

fn initial_state(disc: &DgQuadDiscretization, vortex: &Vortex2D, eos: &IdealSingleGas) -> ConservedState {
    vortex.evaluate(0.0, disc.nodes().view(), eos)
}

fn bench_rhs_mesh_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("rhs_mesh_size");
    group.sample_size(20);
    let eos = IdealSingleGas::default();
    for nel_1d in [4, 8, 16] {
        let (disc, vortex) = setup(nel_1d, 3);
        let boundaries = BoundaryFluxAggregator::new()
            .with(BoundaryTag::All, PrescribedBoundary::new(vortex.clone()));
        let rhs = EulerRhs::new(&disc, &eos, &boundaries, RusanovFlux::default()).unwrap();
        let q = initial_state(&disc, &vortex, &eos);
        group.bench_with_input(BenchmarkId::from_parameter(nel_1d), &q, |b, q| {
            b.iter(|| rhs.evaluate(black_box(q), 0.0))
        });
    }
    group.finish();
}

fn bench_rk4_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("rk4_polynomial_order");
    group.sample_size(10);
    let eos = IdealSingleGas::default();
    for order in [1, 2, 3, 4] {
        let (disc, vortex) = setup(8, order);
        let boundaries = BoundaryFluxAggregator::new()
            .with(BoundaryTag::All, PrescribedBoundary::new(vortex.clone()));
        let rhs = EulerRhs::new(&disc, &eos, &boundaries, RusanovFlux::default()).unwrap();
        let q = initial_state(&disc, &vortex, &eos);
        group.bench_with_input(BenchmarkId::from_parameter(order), &q, |b, q| {
            b.iter(|| rk4_step(black_box(q), 0.0, 1e-3, |state, t| rhs.evaluate(state, t)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rhs_mesh_size, bench_rk4_order);
criterion_main!(benches);
