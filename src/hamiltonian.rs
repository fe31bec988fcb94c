use log::{debug, info};

#[cfg(feature = "python-interface")]
use pyo3::prelude::*;

use crate::basis::{unchecked_degree, Basis};
use crate::exact::symmetry_sector;
use crate::excitation::ExcitationGenerator;
use crate::{BitOps, Determinant, FciqmcError, Occupied};

/// Energy decrease below which the reference search stops.
const DIAGONAL_TOLERANCE: f64 = 1e-12;
/// Candidate count up to which the reference search scans the whole sector.
const EXHAUSTIVE_REFERENCE_LIMIT: usize = 200_000;

/// Second quantized Hamiltonian in a symmetry labelled orbital basis.
/// # Definition
/// $$
/// H=\sum_{pq}h_{pq}a^\dagger_pa_q
/// +\frac12\sum_{pqrs}\langle pq\vert v\vert rs\rangle a^\dagger_pa^\dagger_qa_sa_r
/// $$
/// The integrals are stored dense, row-major, in physicist notation. Entries
/// that break the symmetry channels are never read: the accessors return $0$
/// for them.
#[derive(Debug, Clone)]
pub struct Hamiltonian {
    nmo: usize,
    labels: Vec<i32>,
    h1: Vec<f64>,
    h2: Vec<f64>,
}

impl Hamiltonian {
    /// # Arguments
    /// * __`basis`__ - The orbital basis, fixes $N_{mo}$ and the labels.
    /// * __`h1`__ - One-body integrals $h_{pq}$, length $N_{mo}^2$.
    /// * __`h2`__ - Two-body integrals $\langle pq\vert v\vert rs\rangle$,
    /// length $N_{mo}^4$.
    /// # Errors
    /// [FciqmcError::IntegralDimension] if a length is off.
    pub fn new(basis: &Basis, h1: Vec<f64>, h2: Vec<f64>) -> Result<Self, FciqmcError> {
        let nmo = basis.nmo();
        if h1.len() != nmo * nmo {
            return Err(FciqmcError::IntegralDimension {
                integral: "one-body",
                expected: nmo * nmo,
                found: h1.len(),
            });
        }
        if h2.len() != nmo * nmo * nmo * nmo {
            return Err(FciqmcError::IntegralDimension {
                integral: "two-body",
                expected: nmo * nmo * nmo * nmo,
                found: h2.len(),
            });
        }
        Ok(Hamiltonian {
            nmo,
            labels: basis.orbitals().iter().map(|o| o.s).collect(),
            h1,
            h2,
        })
    }

    /// Pairing model Hamiltonian.
    /// # Definition
    /// $$
    /// H=\sum_{p\sigma}\delta(p-1)a^\dagger_{p\sigma}a_{p\sigma}
    /// -\frac{g}{2}\sum_{pq}a^\dagger_{p+}a^\dagger_{p-}a_{q-}a_{q+}
    /// $$
    /// Only pairs of opposite labels on the same level interact.
    pub fn pairing_model(basis: &Basis, g: f64) -> Self {
        let nmo = basis.nmo();
        let mut h1 = vec![0.0; nmo * nmo];
        for orb in basis.orbitals() {
            h1[orb.index * nmo + orb.index] = orb.energy;
        }
        // (up, down) orbital of every level.
        let pairs: Vec<(usize, usize)> = basis
            .orbitals()
            .iter()
            .filter(|o| o.s > 0)
            .filter_map(|up| {
                basis
                    .orbitals()
                    .iter()
                    .find(|o| o.p == up.p && o.s < 0)
                    .map(|dn| (up.index, dn.index))
            })
            .collect();
        let mut h2 = vec![0.0; nmo * nmo * nmo * nmo];
        for &(pu, pd) in pairs.iter() {
            for &(qu, qd) in pairs.iter() {
                h2[idx4(nmo, pu, pd, qu, qd)] = -0.5 * g;
                h2[idx4(nmo, pd, pu, qd, qu)] = -0.5 * g;
            }
        }
        info!("Built pairing Hamiltonian with {} levels, g={}.", pairs.len(), g);
        Hamiltonian {
            nmo,
            labels: basis.orbitals().iter().map(|o| o.s).collect(),
            h1,
            h2,
        }
    }

    pub fn nmo(&self) -> usize {
        self.nmo
    }

    /// $h_{pq}$, or $0$ if $p$ and $q$ carry different labels.
    #[inline(always)]
    pub fn one_body(&self, p: usize, q: usize) -> f64 {
        if self.labels[p] != self.labels[q] {
            return 0.0;
        }
        self.h1[p * self.nmo + q]
    }

    /// $\langle pq\vert v\vert rs\rangle$, or $0$ if the pair keys differ.
    #[inline(always)]
    pub fn two_body(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        if self.labels[p] + self.labels[q] != self.labels[r] + self.labels[s] {
            return 0.0;
        }
        self.h2[idx4(self.nmo, p, q, r, s)]
    }

    /// $\langle pq\Vert rs\rangle=\langle pq\vert v\vert rs\rangle-\langle pq\vert v\vert sr\rangle$
    #[inline(always)]
    pub fn antisymmetrized(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.two_body(p, q, r, s) - self.two_body(p, q, s, r)
    }

    /// Errors unless the determinant lives in this Hamiltonian's orbital space.
    pub fn check_width<T: BitOps>(&self, det: &Determinant<T>) -> Result<(), FciqmcError> {
        if det.nmo() != self.nmo {
            return Err(FciqmcError::WidthMismatch { left: det.nmo(), right: self.nmo });
        }
        Ok(())
    }

    /// Computes $\langle D_f\vert H\vert D_i\rangle$ with the Slater-Condon
    /// rules.
    /// # Arguments
    /// * __`bra`__ - $D_f$.
    /// * __`ket`__ - $D_i$.
    /// # Returns
    /// The matrix element, exactly $0$ beyond double excitations.
    /// # Errors
    /// [FciqmcError::WidthMismatch] if either width differs from $N_{mo}$.
    pub fn matrix_element<T: BitOps>(&self, bra: &Determinant<T>, ket: &Determinant<T>) -> Result<f64, FciqmcError> {
        self.check_width(bra)?;
        self.check_width(ket)?;
        Ok(self.slater_condon(bra, ket))
    }

    /// [Hamiltonian::matrix_element] without the width checks.
    pub(crate) fn slater_condon<T: BitOps>(&self, bra: &Determinant<T>, ket: &Determinant<T>) -> f64 {
        if bra.occupation_number() != ket.occupation_number() {
            return 0.0;
        }
        match unchecked_degree(bra, ket) {
            0 => self.diagonal(ket),
            1 => self.single(bra, ket),
            2 => self.double(bra, ket),
            _ => 0.0,
        }
    }

    /// Diagonal element
    /// $$
    /// \langle D\vert H\vert D\rangle=\sum_{i}h_{ii}+\sum_{i<j}\langle ij\Vert ij\rangle
    /// $$
    pub fn diagonal<T: BitOps>(&self, det: &Determinant<T>) -> f64 {
        let occ: Vec<usize> = det.occupied().collect();
        let mut energy = 0.0;
        for (k, &i) in occ.iter().enumerate() {
            energy += self.one_body(i, i);
            for &j in occ[k + 1..].iter() {
                energy += self.antisymmetrized(i, j, i, j);
            }
        }
        energy
    }

    // Ket holds i, bra holds a.
    fn single<T: BitOps>(&self, bra: &Determinant<T>, ket: &Determinant<T>) -> f64 {
        let i = (ket.bits() & !bra.bits()).trailing_zeros() as usize;
        let a = (bra.bits() & !ket.bits()).trailing_zeros() as usize;
        let mut element = self.one_body(a, i);
        for j in ket.occupied() {
            if j != i {
                element += self.antisymmetrized(a, j, i, j);
            }
        }
        if ket.count_between(i, a) % 2 == 1 {
            -element
        } else {
            element
        }
    }

    // Ket holds i<j, bra holds a<b.
    fn double<T: BitOps>(&self, bra: &Determinant<T>, ket: &Determinant<T>) -> f64 {
        let mut holes = Occupied::new(ket.bits() & !bra.bits());
        let mut particles = Occupied::new(bra.bits() & !ket.bits());
        let (i, j, a, b) = match (holes.next(), holes.next(), particles.next(), particles.next()) {
            (Some(i), Some(j), Some(a), Some(b)) => (i, j, a, b),
            _ => return 0.0,
        };
        let common = ket.bits() & bra.bits();
        let below = |x: usize| (common & T::mask_below(x)).count_ones();
        let element = self.antisymmetrized(a, b, i, j);
        if (below(i) + below(j) + below(a) + below(b)) % 2 == 1 {
            -element
        } else {
            element
        }
    }

    /// Finds the reference determinant, the lowest diagonal energy state of
    /// the aufbau symmetry sector.
    /// # Definition
    /// When the sector has at most `EXHAUSTIVE_REFERENCE_LIMIT` candidates
    /// they are all scanned, ties keep the aufbau determinant then the lowest
    /// bit pattern. Larger sectors use a steepest descent over the connected
    /// singles and doubles, which stops at a local minimum.
    pub fn lowest_diagonal_reference<T: BitOps>(&self, basis: &Basis, n_electrons: usize) -> Result<Determinant<T>, FciqmcError> {
        if basis.nmo() != self.nmo {
            return Err(FciqmcError::WidthMismatch { left: basis.nmo(), right: self.nmo });
        }
        let aufbau: Determinant<T> = basis.aufbau_determinant(n_electrons)?;
        let (reference, energy) = if binomial(self.nmo, n_electrons) <= EXHAUSTIVE_REFERENCE_LIMIT {
            self.sector_minimum(basis, aufbau)?
        } else {
            debug!("Sector of {} too large for a full scan, descending instead.", aufbau);
            self.descend(basis, aufbau)
        };
        info!("Reference determinant {} with diagonal energy {}.", reference, energy);
        Ok(reference)
    }

    fn sector_minimum<T: BitOps>(&self, basis: &Basis, aufbau: Determinant<T>) -> Result<(Determinant<T>, f64), FciqmcError> {
        let mut best = (aufbau, self.diagonal(&aufbau));
        for det in symmetry_sector(basis, &aufbau)? {
            let energy = self.diagonal(&det);
            if energy < best.1 - DIAGONAL_TOLERANCE {
                best = (det, energy);
            }
        }
        Ok(best)
    }

    fn descend<T: BitOps>(&self, basis: &Basis, aufbau: Determinant<T>) -> (Determinant<T>, f64) {
        let generator = ExcitationGenerator::new(basis, 0.5);
        let mut reference = aufbau;
        let mut energy = self.diagonal(&reference);
        loop {
            let mut best: Option<(Determinant<T>, f64)> = None;
            for trial in generator.connected(&reference) {
                let trial_energy = self.diagonal(&trial);
                let improves = match best {
                    Some((_, e)) => trial_energy < e,
                    None => trial_energy < energy - DIAGONAL_TOLERANCE,
                };
                if improves {
                    best = Some((trial, trial_energy));
                }
            }
            match best {
                Some((det, e)) => {
                    debug!("Reference lowered to {} with diagonal energy {}.", det, e);
                    reference = det;
                    energy = e;
                }
                None => return (reference, energy),
            }
        }
    }
}

// Saturates at usize::MAX.
fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut res: usize = 1;
    for i in 0..k {
        res = match res.checked_mul(n - i) {
            Some(r) => r / (i + 1),
            None => return usize::MAX,
        };
    }
    res
}

/// Builds the Hamiltonian, see [Hamiltonian::new].
pub fn build_hamiltonian(basis: &Basis, h1: Vec<f64>, h2: Vec<f64>) -> Result<Hamiltonian, FciqmcError> {
    Hamiltonian::new(basis, h1, h2)
}

#[inline(always)]
pub(crate) fn idx4(nmo: usize, p: usize, q: usize, r: usize, s: usize) -> usize {
    ((p * nmo + q) * nmo + r) * nmo + s
}

/// Pairing model matrix element between two determinants given by their
/// occupied orbitals.
#[cfg(feature = "python-interface")]
#[pyfunction]
pub fn pairing_matrix_element(bra: Vec<usize>, ket: Vec<usize>, p_max: usize, delta: f64, g: f64) -> PyResult<f64> {
    let basis = Basis::new(p_max, delta);
    let hamiltonian = Hamiltonian::pairing_model(&basis, g);
    let bra: Determinant = Determinant::new(bra, basis.nmo())?;
    let ket: Determinant = Determinant::new(ket, basis.nmo())?;
    Ok(hamiltonian.matrix_element(&bra, &ket)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert::close;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn annihilate(bits: u64, r: usize) -> Option<(u64, f64)> {
        if (bits >> r) & 1 == 0 {
            return None;
        }
        let sign = if (bits & ((1 << r) - 1)).count_ones() % 2 == 0 { 1.0 } else { -1.0 };
        Some((bits ^ (1 << r), sign))
    }

    fn create(bits: u64, p: usize) -> Option<(u64, f64)> {
        if (bits >> p) & 1 == 1 {
            return None;
        }
        let sign = if (bits & ((1 << p) - 1)).count_ones() % 2 == 0 { 1.0 } else { -1.0 };
        Some((bits | (1 << p), sign))
    }

    // Applies every operator string of H to the ket.
    fn brute_force(ham: &Hamiltonian, bra: u64, ket: u64) -> f64 {
        let nmo = ham.nmo();
        let mut total = 0.0;
        for p in 0..nmo {
            for q in 0..nmo {
                let h = ham.one_body(p, q);
                if h == 0.0 {
                    continue;
                }
                if let Some((s1, f1)) = annihilate(ket, q) {
                    if let Some((s2, f2)) = create(s1, p) {
                        if s2 == bra {
                            total += h * f1 * f2;
                        }
                    }
                }
            }
        }
        for p in 0..nmo {
            for q in 0..nmo {
                for r in 0..nmo {
                    for s in 0..nmo {
                        let v = ham.two_body(p, q, r, s);
                        if v == 0.0 {
                            continue;
                        }
                        let state = annihilate(ket, r)
                            .and_then(|(b, f)| annihilate(b, s).map(|(b, g)| (b, f * g)))
                            .and_then(|(b, f)| create(b, q).map(|(b, g)| (b, f * g)))
                            .and_then(|(b, f)| create(b, p).map(|(b, g)| (b, f * g)));
                        if let Some((b, f)) = state {
                            if b == bra {
                                total += 0.5 * v * f;
                            }
                        }
                    }
                }
            }
        }
        total
    }

    // Integrals with the real hermitian and particle exchange symmetries.
    fn random_hamiltonian(basis: &Basis, rng: &mut SmallRng) -> Hamiltonian {
        let n = basis.nmo();
        let mut h1 = vec![0.0; n * n];
        for p in 0..n {
            for q in 0..=p {
                let x: f64 = rng.gen_range(-1.0..1.0);
                h1[p * n + q] = x;
                h1[q * n + p] = x;
            }
        }
        let w: Vec<f64> = (0..n * n * n * n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut h2 = vec![0.0; n * n * n * n];
        for p in 0..n {
            for q in 0..n {
                for r in 0..n {
                    for s in 0..n {
                        h2[idx4(n, p, q, r, s)] = 0.25
                            * (w[idx4(n, p, q, r, s)]
                                + w[idx4(n, q, p, s, r)]
                                + w[idx4(n, r, s, p, q)]
                                + w[idx4(n, s, r, q, p)]);
                    }
                }
            }
        }
        Hamiltonian::new(basis, h1, h2).unwrap()
    }

    fn all_determinants(nmo: usize, n_electrons: u32) -> Vec<Determinant<u64>> {
        (0..(1u64 << nmo))
            .filter(|b| b.count_ones() == n_electrons)
            .map(|b| Determinant::from_bits(b, nmo).unwrap())
            .collect()
    }

    #[test]
    fn test_slater_condon_matches_second_quantization() {
        let mut rng = SmallRng::seed_from_u64(42);
        let basis = Basis::new(3, 1.0);
        let ham = random_hamiltonian(&basis, &mut rng);
        for n_electrons in 1..=4 {
            let dets = all_determinants(basis.nmo(), n_electrons);
            for bra in dets.iter() {
                for ket in dets.iter() {
                    let expected = brute_force(&ham, bra.bits(), ket.bits());
                    let found = ham.matrix_element(bra, ket).unwrap();
                    close(found, expected, 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_matrix_element_hermitian() {
        let mut rng = SmallRng::seed_from_u64(7);
        let basis = Basis::new(4, 1.0);
        let ham = random_hamiltonian(&basis, &mut rng);
        let dets = all_determinants(basis.nmo(), 4);
        for bra in dets.iter() {
            for ket in dets.iter() {
                close(
                    ham.matrix_element(bra, ket).unwrap(),
                    ham.matrix_element(ket, bra).unwrap(),
                    1e-12,
                );
            }
        }
    }

    #[test]
    fn test_zero_beyond_doubles() {
        let mut rng = SmallRng::seed_from_u64(42);
        let basis = Basis::new(4, 1.0);
        let ham = random_hamiltonian(&basis, &mut rng);
        let dets = all_determinants(basis.nmo(), 4);
        let mut checked = 0;
        for bra in dets.iter() {
            for ket in dets.iter() {
                if crate::basis::excitation_degree(bra, ket).unwrap() > 2 {
                    assert_eq!(ham.matrix_element(bra, ket).unwrap(), 0.0);
                    checked += 1;
                }
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_pairing_elements() {
        let basis = Basis::new(2, 1.0);
        let g = 0.8;
        let ham = Hamiltonian::pairing_model(&basis, g);
        let low: Determinant<u64> = Determinant::new([0, 1], 4).unwrap();
        let high: Determinant<u64> = Determinant::new([2, 3], 4).unwrap();
        let broken: Determinant<u64> = Determinant::new([0, 3], 4).unwrap();
        close(ham.matrix_element(&low, &low).unwrap(), -0.5 * g, 1e-14);
        close(ham.matrix_element(&high, &high).unwrap(), 2.0 - 0.5 * g, 1e-14);
        close(ham.matrix_element(&low, &high).unwrap(), -0.5 * g, 1e-14);
        close(ham.matrix_element(&broken, &broken).unwrap(), 1.0, 1e-14);
        assert_eq!(ham.matrix_element(&broken, &low).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_errors() {
        let basis = Basis::new(2, 1.0);
        let h = Hamiltonian::new(&basis, vec![0.0; 15], vec![0.0; 256]);
        assert_eq!(
            h.err(),
            Some(FciqmcError::IntegralDimension { integral: "one-body", expected: 16, found: 15 })
        );
        let h = Hamiltonian::new(&basis, vec![0.0; 16], vec![0.0; 255]);
        assert!(h.is_err());
        let ham = Hamiltonian::new(&basis, vec![0.0; 16], vec![0.0; 256]).unwrap();
        let wide: Determinant<u64> = Determinant::new([0, 1], 6).unwrap();
        let narrow: Determinant<u64> = Determinant::new([0, 1], 4).unwrap();
        assert_eq!(
            ham.matrix_element(&wide, &narrow),
            Err(FciqmcError::WidthMismatch { left: 6, right: 4 })
        );
    }

    #[test]
    fn test_lowest_diagonal_reference() {
        // Level 1 made expensive for the up label only.
        let basis = Basis::new(3, 1.0);
        let n = basis.nmo();
        let mut h1 = vec![0.0; n * n];
        for (i, e) in [5.0, 0.0, 1.0, 1.0, 2.0, 2.0].iter().enumerate() {
            h1[i * n + i] = *e;
        }
        let ham = Hamiltonian::new(&basis, h1, vec![0.0; n * n * n * n]).unwrap();
        let reference: Determinant<u64> = ham.lowest_diagonal_reference(&basis, 2).unwrap();
        assert_eq!(reference.occupied().collect::<Vec<usize>>(), vec![1, 2]);
        close(ham.diagonal(&reference), 1.0, 1e-14);
        // Pairing: aufbau is already the lowest.
        let ham = Hamiltonian::pairing_model(&basis, 0.5);
        let reference: Determinant<u64> = ham.lowest_diagonal_reference(&basis, 4).unwrap();
        assert_eq!(reference, basis.aufbau_determinant(4).unwrap());
    }

    // Only the doubly excited pair is attractive, no single lowers the aufbau energy.
    fn paired_upper_level() -> (Basis, Hamiltonian) {
        let basis = Basis::new(2, 1.0);
        let n = basis.nmo();
        let mut h1 = vec![0.0; n * n];
        h1[2 * n + 2] = 0.5;
        h1[3 * n + 3] = 0.5;
        let mut h2 = vec![0.0; n * n * n * n];
        h2[idx4(n, 2, 3, 2, 3)] = -3.0;
        h2[idx4(n, 3, 2, 3, 2)] = -3.0;
        let ham = Hamiltonian::new(&basis, h1, h2).unwrap();
        (basis, ham)
    }

    #[test]
    fn test_reference_reached_through_double() {
        let (basis, ham) = paired_upper_level();
        let aufbau: Determinant<u64> = basis.aufbau_determinant(2).unwrap();
        close(ham.diagonal(&aufbau), 0.0, 1e-14);
        let reference: Determinant<u64> = ham.lowest_diagonal_reference(&basis, 2).unwrap();
        assert_eq!(reference.occupied().collect::<Vec<usize>>(), vec![2, 3]);
        close(ham.diagonal(&reference), -2.0, 1e-14);
        // Descent for large sectors also takes the double.
        let (descended, energy) = ham.descend(&basis, aufbau);
        assert_eq!(descended, reference);
        close(energy, -2.0, 1e-14);
    }

    #[test]
    fn test_reference_is_sector_minimum() {
        let basis = Basis::new(3, 1.0);
        let n = basis.nmo();
        let mut rng = SmallRng::seed_from_u64(77);
        let h1 = (0..n * n).map(|_| rng.gen::<f64>()).collect::<Vec<f64>>();
        let h2 = (0..n * n * n * n).map(|_| rng.gen::<f64>() - 0.5).collect::<Vec<f64>>();
        let ham = Hamiltonian::new(&basis, h1, h2).unwrap();
        let reference: Determinant<u64> = ham.lowest_diagonal_reference(&basis, 3).unwrap();
        let sector = symmetry_sector(&basis, &reference).unwrap();
        let lowest = sector.iter().map(|d| ham.diagonal(d)).fold(f64::INFINITY, f64::min);
        close(ham.diagonal(&reference), lowest, 1e-12);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(8, 4), 70);
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(200, 100), usize::MAX);
    }
}
