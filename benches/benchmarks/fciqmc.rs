use criterion::{criterion_group, Criterion};
use fciqmc::basis::Basis;
use fciqmc::fciqmc::{run, FciqmcParams, FciqmcRun};
use fciqmc::hamiltonian::Hamiltonian;

pub fn pairing_steps(c: &mut Criterion) {
    let basis = Basis::new(4, 1.0);
    let hamiltonian = Hamiltonian::pairing_model(&basis, 0.5);
    let params = FciqmcParams {
        time_step: 0.005,
        target_population: 1000.0,
        growth_damping: 0.05,
        initial_population: 1000.0,
        n_electrons: 4,
        n_steps: 100,
        ..Default::default()
    };
    c.bench_function("FCIQMC 100 steps pairing 8 orbitals", |b| {
        b.iter(|| {
            let trajectory: FciqmcRun = run(&basis, &hamiltonian, params.clone()).unwrap();
            trajectory.last()
        })
    });
}

criterion_group!(benches, pairing_steps,);
