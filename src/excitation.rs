use rand::Rng;

use crate::basis::{unchecked_degree, Basis};
use crate::{BitOps, Determinant, Occupied};

/// A proposed move out of a determinant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Excitation<T> {
    pub target: Determinant<T>,
    /// Probability of proposing exactly this target.
    pub pgen: f64,
    /// 1 for a single, 2 for a double excitation.
    pub degree: usize,
}

/// Uniform, symmetry restricted excitation generator.
/// # Definition
/// With probability $p_s$ a single excitation is drawn: an occupied orbital
/// $i$ uniformly, then an empty orbital $a$ uniformly in the channel of $i$.
/// Otherwise a double: an unordered occupied pair uniformly, then an empty pair
/// uniformly in the channel of the pair.
/// $$
/// p_{gen}(i\to a)=\frac{p_s}{n\,n_a},\quad
/// p_{gen}(ij\to ab)=\frac{2(1-p_s)}{n(n-1)\,n_{ab}}
/// $$
/// with $n$ the electron count, $n_a$ and $n_{ab}$ the number of legal
/// destinations. Draws with no legal destination propose nothing.
#[derive(Debug, Clone, Copy)]
pub struct ExcitationGenerator<'a> {
    basis: &'a Basis,
    single_probability: f64,
}

impl<'a> ExcitationGenerator<'a> {
    pub fn new(basis: &'a Basis, single_probability: f64) -> Self {
        ExcitationGenerator { basis, single_probability }
    }

    /// Draws one excitation of `det`, `None` if the draw found no legal
    /// destination.
    pub fn propose<T: BitOps, R: Rng + ?Sized>(&self, det: &Determinant<T>, rng: &mut R) -> Option<Excitation<T>> {
        let occ: Vec<usize> = det.occupied().collect();
        if rng.gen::<f64>() < self.single_probability {
            self.propose_single(det, &occ, rng)
        } else {
            self.propose_double(det, &occ, rng)
        }
    }

    fn propose_single<T: BitOps, R: Rng + ?Sized>(&self, det: &Determinant<T>, occ: &[usize], rng: &mut R) -> Option<Excitation<T>> {
        if occ.is_empty() {
            return None;
        }
        let i = occ[rng.gen_range(0..occ.len())];
        let n_a = self.empty_singles(det, i).count();
        if n_a == 0 {
            return None;
        }
        let a = self.empty_singles(det, i).nth(rng.gen_range(0..n_a))?;
        Some(Excitation {
            target: det.excite(i, a),
            pgen: self.single_probability / (occ.len() * n_a) as f64,
            degree: 1,
        })
    }

    fn propose_double<T: BitOps, R: Rng + ?Sized>(&self, det: &Determinant<T>, occ: &[usize], rng: &mut R) -> Option<Excitation<T>> {
        let n = occ.len();
        if n < 2 {
            return None;
        }
        let x = rng.gen_range(0..n);
        let mut y = rng.gen_range(0..n - 1);
        if y >= x {
            y += 1;
        }
        let (i, j) = if x < y { (occ[x], occ[y]) } else { (occ[y], occ[x]) };
        let n_ab = self.empty_doubles(det, i, j).count();
        if n_ab == 0 {
            return None;
        }
        let (a, b) = self.empty_doubles(det, i, j).nth(rng.gen_range(0..n_ab))?;
        Some(Excitation {
            target: det.excite(i, a).excite(j, b),
            pgen: 2.0 * (1.0 - self.single_probability) / ((n * (n - 1) * n_ab) as f64),
            degree: 2,
        })
    }

    fn empty_singles<'b, T: BitOps>(&'b self, det: &'b Determinant<T>, i: usize) -> impl Iterator<Item = usize> + 'b {
        self.basis
            .one_body_channel(i)
            .iter()
            .cloned()
            .filter(move |&a| !det.bits().check(a))
    }

    fn empty_doubles<'b, T: BitOps>(&'b self, det: &'b Determinant<T>, i: usize, j: usize) -> impl Iterator<Item = (usize, usize)> + 'b {
        self.basis
            .two_body_channel(i, j)
            .iter()
            .cloned()
            .filter(move |&(a, b)| !det.bits().check(a) && !det.bits().check(b))
    }

    /// Probability that [ExcitationGenerator::propose] returns `target` when
    /// called on `source`. Zero for targets it never proposes.
    pub fn generation_probability<T: BitOps>(&self, target: &Determinant<T>, source: &Determinant<T>) -> f64 {
        if target.nmo() != source.nmo() || target.occupation_number() != source.occupation_number() {
            return 0.0;
        }
        let n = source.occupation_number();
        let holes: Vec<usize> = Occupied::new(source.bits() & !target.bits()).collect();
        let particles: Vec<usize> = Occupied::new(target.bits() & !source.bits()).collect();
        match unchecked_degree(target, source) {
            1 => {
                let (i, a) = (holes[0], particles[0]);
                if !self.basis.one_body_channel(i).contains(&a) {
                    return 0.0;
                }
                let n_a = self.empty_singles(source, i).count();
                self.single_probability / (n * n_a) as f64
            }
            2 => {
                let (i, j, a, b) = (holes[0], holes[1], particles[0], particles[1]);
                if !self.basis.two_body_channel(i, j).contains(&(a, b)) {
                    return 0.0;
                }
                let n_ab = self.empty_doubles(source, i, j).count();
                2.0 * (1.0 - self.single_probability) / ((n * (n - 1) * n_ab) as f64)
            }
            _ => 0.0,
        }
    }

    /// Every determinant the generator can reach from `det` in one proposal,
    /// singles first, in ascending channel order.
    pub fn connected<T: BitOps>(&self, det: &Determinant<T>) -> Vec<Determinant<T>> {
        let occ: Vec<usize> = det.occupied().collect();
        let mut targets = Vec::new();
        if self.single_probability > 0.0 {
            for &i in occ.iter() {
                for a in self.empty_singles(det, i) {
                    targets.push(det.excite(i, a));
                }
            }
        }
        if self.single_probability < 1.0 {
            for (k, &i) in occ.iter().enumerate() {
                for &j in occ[k + 1..].iter() {
                    for (a, b) in self.empty_doubles(det, i, j) {
                        targets.push(det.excite(i, a).excite(j, b));
                    }
                }
            }
        }
        targets
    }
}
