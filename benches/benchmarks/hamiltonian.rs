use criterion::{black_box, criterion_group, Criterion};
use fciqmc::basis::Basis;
use fciqmc::exact::symmetry_sector;
use fciqmc::hamiltonian::Hamiltonian;
use fciqmc::Determinant;

pub fn sector_matrix_elements(c: &mut Criterion) {
    let basis = Basis::new(5, 1.0);
    let hamiltonian = Hamiltonian::pairing_model(&basis, 0.5);
    let reference: Determinant = basis.aufbau_determinant(4).unwrap();
    let sector = symmetry_sector(&basis, &reference).unwrap();
    c.bench_function("Slater-Condon sector 10 orbitals 4 electrons", |b| {
        b.iter(|| {
            let mut res = 0.0;
            for bra in sector.iter() {
                for ket in sector.iter() {
                    res += hamiltonian.matrix_element(black_box(bra), black_box(ket)).unwrap();
                }
            }
            res
        })
    });
}

pub fn diagonal_element(c: &mut Criterion) {
    let basis = Basis::new(16, 1.0);
    let hamiltonian = Hamiltonian::pairing_model(&basis, 0.5);
    let det: Determinant = basis.aufbau_determinant(8).unwrap();
    c.bench_function("Diagonal element 32 orbitals 8 electrons", |b| {
        b.iter(|| hamiltonian.diagonal(black_box(&det)))
    });
}

criterion_group!(benches, sector_matrix_elements, diagonal_element,);
