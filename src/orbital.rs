use std::fmt;

use crate::strings::{DOWNARROW, UPARROW};

/// Symmetry labels of the one-body states, in basis order.
pub const SPIN_LABELS: [i32; 2] = [1, -1];

/// Single particle state.
/// # Fields
/// * __`index`__ - Position in the one-body basis, zero-based.
/// * __`p`__ - Principal quantum number, starts at 1.
/// * __`s`__ - Symmetry label, the spin projection $\pm1$.
/// * __`energy`__ - Single particle energy $\delta(p-1)$.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbital {
    pub index: usize,
    pub p: usize,
    pub s: i32,
    pub energy: f64,
}

impl Orbital {
    pub fn new(index: usize, p: usize, s: i32, delta: f64) -> Self {
        Orbital {
            index,
            p,
            s,
            energy: delta * (p as f64 - 1.0),
        }
    }
}

impl fmt::Display for Orbital {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let arrow = if self.s > 0 { UPARROW } else { DOWNARROW };
        write!(
            f,
            "Orbital {} (p={}, {}, e={:.4})",
            self.index, self.p, arrow, self.energy
        )
    }
}

/// Builds the one-body basis of the pairing levels.
/// # Arguments
/// * __`p_max`__ - Number of levels.
/// * __`delta`__ - Level spacing.
/// # Returns
/// The $2p_{max}$ orbitals ordered by level, label $+1$ first. Indices are
/// contiguous.
pub fn build_one_body_basis(p_max: usize, delta: f64) -> Vec<Orbital> {
    let mut orbitals = Vec::with_capacity(2 * p_max);
    for p in 1..=p_max {
        for s in SPIN_LABELS {
            orbitals.push(Orbital::new(orbitals.len(), p, s, delta));
        }
    }
    orbitals
}

#[inline(always)]
pub fn one_body_key(orbital: &Orbital) -> i32 {
    orbital.s
}

#[inline(always)]
pub fn two_body_key(a: &Orbital, b: &Orbital) -> i32 {
    a.s + b.s
}

/// True when $a\to b$ conserves the symmetry label.
pub fn check_one_body_symmetry(a: &Orbital, b: &Orbital) -> bool {
    one_body_key(a) == one_body_key(b)
}

/// True when the pair $(a, b)$ can scatter to $(c, d)$.
pub fn check_two_body_symmetry(a: &Orbital, b: &Orbital, c: &Orbital, d: &Orbital) -> bool {
    two_body_key(a, b) == two_body_key(c, d)
}
