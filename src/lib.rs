//! Full configuration interaction quantum Monte Carlo.
//!
//! A signed population of walkers $\{N_i\}$ over Slater determinants is
//! propagated with the projector
//! $$
//! N_i(\tau+\delta\tau)=N_i(\tau)-\delta\tau\sum_j\left(H_{ij}-S\delta_{ij}\right)N_j(\tau)
//! $$
//! until it samples the ground state of $H$. The shift $S$ and the projected
//! energy then estimate the ground state energy.
//!
//! The building blocks go [orbital] $\to$ [basis] $\to$ [hamiltonian] $\to$
//! [fciqmc].
#[cfg(feature = "python-interface")]
use pyo3::prelude::*;

/// Crate error type.
pub mod error;
pub use error::FciqmcError;

/// Input file parsing util.
/// # Subfiles
/// * __`one_body.csv`__ - One-body integrals $h_{pq}$. In csv format, 3
/// columns: `p`, `q` and the value.
/// * __`two_body.csv`__ - Two-body integrals $\langle pq\vert v\vert rs\rangle$.
/// In csv format, 5 columns: `p`, `q`, `r`, `s` and the value.
pub mod parse;

// Have the Determinant struct at the root.
include!("determinant.rs");

/// One-body states.
/// # Definition
/// Level $p=1,\dots,p_{max}$ holds one orbital per label $s=\pm1$, with
/// energy $\epsilon_p=\delta(p-1)$. The one-body symmetry key of an orbital is
/// its label, the two-body key of a pair is the sum of the labels.
pub mod orbital;

/// Symmetry channels over the one-body basis and excitation degree.
pub mod basis;

/// Slater-Condon matrix elements.
/// # Convention
/// Determinants are ordered products of creation operators, lowest orbital
/// first. Two-body integrals are in physicist notation
/// $$
/// \langle pq\vert v\vert rs\rangle=\int\phi^*_p(1)\phi^*_q(2)v(1,2)\phi_r(1)\phi_s(2)
/// $$
/// # Rules
/// | Degree | $\langle D_f\vert H\vert D_i\rangle$ |
/// |--------|------------------------------------|
/// | 0 | $\sum_ih_{ii}+\sum_{i<j}\langle ij\Vert ij\rangle$ |
/// | 1, $i\to a$ | $(-1)^{n_{ia}}\left(h_{ai}+\sum_{j\neq i}\langle aj\Vert ij\rangle\right)$ |
/// | 2, $ij\to ab$ | $(-1)^{n_{ijab}}\langle ab\Vert ij\rangle$ |
/// | $>2$ | $0$ |
///
/// where $n_{ia}$ counts the occupied orbitals between $i$ and $a$ and
/// $n_{ijab}$ the common occupied orbitals below each of $i, j, a, b$.
pub mod hamiltonian;

/// Symmetry restricted excitation generator.
pub mod excitation;

/// Walker propagation.
/// # Step
/// 1. Spawning, in parallel over the occupied determinants.
/// 2. Death and cloning.
/// 3. Annihilation, in a fixed order.
/// 4. Pruning.
/// 5. Shift update.
///
/// Random numbers come from one stream per determinant and step, so a run is
/// bit-identical for any number of threads.
pub mod fciqmc;

/// Dense diagonalisation of a symmetry sector.
pub mod exact;

/// Timing collector.
pub mod profiler;

/// Console strings.
pub mod strings;

#[cfg(feature = "python-interface")]
#[pymodule]
#[pyo3(name = "fciqmc")]
fn fciqmc_py(m:&Bound<'_, PyModule>) -> PyResult<()> {
    use pyo3::wrap_pyfunction;

    m.add_function(wrap_pyfunction!(hamiltonian::pairing_matrix_element, m)?)?;
    m.add_function(wrap_pyfunction!(fciqmc::run_pairing, m)?)?;
    Ok(())
}
