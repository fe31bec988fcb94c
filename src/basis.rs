use log::debug;
use std::collections::BTreeMap;

use crate::orbital::{build_one_body_basis, one_body_key, two_body_key, Orbital};
use crate::{BitOps, Determinant, FciqmcError};

/// One-body states and pairs of states partitioned by their symmetry key.
/// # Invariants
/// Every orbital lies in exactly one one-body channel and every unordered
/// pair $(a, b)$, $a<b$, in exactly one two-body channel. Channel contents are
/// sorted, keys iterate in ascending order.
#[derive(Debug, Clone)]
pub struct Basis {
    p_max: usize,
    delta: f64,
    orbitals: Vec<Orbital>,
    one_body_channels: BTreeMap<i32, Vec<usize>>,
    two_body_pairs: Vec<(usize, usize)>,
    two_body_channels: BTreeMap<i32, Vec<(usize, usize)>>,
}

impl Basis {
    /// Builds the orbitals and both channel maps.
    /// # Arguments
    /// * __`p_max`__ - Number of levels, each holding one orbital per label.
    /// * __`delta`__ - Level spacing.
    pub fn new(p_max: usize, delta: f64) -> Self {
        let orbitals = build_one_body_basis(p_max, delta);

        let mut one_body_channels: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for orb in orbitals.iter() {
            one_body_channels.entry(one_body_key(orb)).or_default().push(orb.index);
        }

        let mut two_body_pairs = Vec::with_capacity(orbitals.len() * orbitals.len() / 2);
        let mut two_body_channels: BTreeMap<i32, Vec<(usize, usize)>> = BTreeMap::new();
        for a in orbitals.iter() {
            for b in orbitals[a.index + 1..].iter() {
                two_body_pairs.push((a.index, b.index));
                two_body_channels.entry(two_body_key(a, b)).or_default().push((a.index, b.index));
            }
        }
        debug!(
            "Built basis of {} orbitals, {} one-body channels, {} two-body channels.",
            orbitals.len(),
            one_body_channels.len(),
            two_body_channels.len()
        );

        Basis {
            p_max,
            delta,
            orbitals,
            one_body_channels,
            two_body_pairs,
            two_body_channels,
        }
    }

    pub fn p_max(&self) -> usize {
        self.p_max
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of one-body states.
    pub fn nmo(&self) -> usize {
        self.orbitals.len()
    }

    pub fn orbitals(&self) -> &[Orbital] {
        &self.orbitals
    }

    /// # Panics
    /// If `i` is not a valid orbital index.
    pub fn orbital(&self, i: usize) -> &Orbital {
        &self.orbitals[i]
    }

    /// Orbitals sharing the label of orbital `i`, including `i` itself. These
    /// are the legal single excitation destinations out of `i`.
    pub fn one_body_channel(&self, i: usize) -> &[usize] {
        self.one_body_channels
            .get(&one_body_key(&self.orbitals[i]))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pairs sharing the two-body key of $(a, b)$. These are the legal double
    /// excitation destinations out of the pair.
    pub fn two_body_channel(&self, a: usize, b: usize) -> &[(usize, usize)] {
        self.two_body_channels
            .get(&two_body_key(&self.orbitals[a], &self.orbitals[b]))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn one_body_channels(&self) -> &BTreeMap<i32, Vec<usize>> {
        &self.one_body_channels
    }

    pub fn two_body_channels(&self) -> &BTreeMap<i32, Vec<(usize, usize)>> {
        &self.two_body_channels
    }

    /// All unordered pairs $(a, b)$, $a<b$.
    pub fn two_body_pairs(&self) -> &[(usize, usize)] {
        &self.two_body_pairs
    }

    pub fn n_one_body_channels(&self) -> usize {
        self.one_body_channels.len()
    }

    pub fn n_two_body_channels(&self) -> usize {
        self.two_body_channels.len()
    }

    /// Sum of the labels of the occupied orbitals. Conserved by every
    /// excitation drawn from the channel maps.
    pub fn total_symmetry<T: BitOps>(&self, det: &Determinant<T>) -> i32 {
        det.occupied().map(|i| one_body_key(&self.orbitals[i])).sum()
    }

    /// Determinant with the `n_electrons` lowest orbitals occupied.
    pub fn aufbau_determinant<T: BitOps>(&self, n_electrons: usize) -> Result<Determinant<T>, FciqmcError> {
        if n_electrons > self.nmo() {
            return Err(FciqmcError::TooManyElectrons { n_electrons, nmo: self.nmo() });
        }
        Determinant::new(0..n_electrons, self.nmo())
    }
}

/// Builds the basis, see [Basis::new].
pub fn build_basis(p_max: usize, delta: f64) -> Basis {
    Basis::new(p_max, delta)
}

/// Number of orbital substitutions between two determinants.
/// # Definition
/// $$
/// \text{degree}(D_f, D_i) = \frac{\text{popcount}(D_f \oplus D_i)}{2}
/// $$
/// Determinants with different electron counts give the rounded down value.
pub fn excitation_degree<T: BitOps>(df: &Determinant<T>, di: &Determinant<T>) -> Result<usize, FciqmcError> {
    df.check_width(di)?;
    Ok(unchecked_degree(df, di))
}

#[inline(always)]
pub(crate) fn unchecked_degree<T: BitOps>(df: &Determinant<T>, di: &Determinant<T>) -> usize {
    (df.bits() ^ di.bits()).count_ones() as usize / 2
}
