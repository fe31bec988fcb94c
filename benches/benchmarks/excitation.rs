use criterion::{black_box, criterion_group, Criterion};
use fciqmc::basis::Basis;
use fciqmc::excitation::ExcitationGenerator;
use fciqmc::Determinant;
use rand::rngs::SmallRng;
use rand::SeedableRng;

pub fn propose_excitation(c: &mut Criterion) {
    let basis = Basis::new(32, 1.0);
    let generator = ExcitationGenerator::new(&basis, 0.5);
    let det: Determinant = basis.aufbau_determinant(16).unwrap();
    let mut rng = SmallRng::seed_from_u64(42);
    c.bench_function("Propose excitation 64 orbitals 16 electrons", |b| {
        b.iter(|| generator.propose(black_box(&det), &mut rng))
    });
}

criterion_group!(benches, propose_excitation,);
