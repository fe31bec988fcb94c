use log::{info, warn};
use nalgebra::DMatrix;

use crate::basis::Basis;
use crate::hamiltonian::Hamiltonian;
use crate::{BitOps, Determinant, FciqmcError};

/// Sector size above which the dense diagonalisation gets slow.
const LARGE_SECTOR: usize = 4000;

/// Ground state of the Hamiltonian restricted to one symmetry sector.
#[derive(Debug, Clone)]
pub struct ExactGroundState<T> {
    pub energy: f64,
    /// Sector basis, ordered by bit pattern.
    pub determinants: Vec<Determinant<T>>,
    /// Normalised coefficients, positive on the reference.
    pub coefficients: Vec<f64>,
}

/// Every determinant with the electron count and total symmetry of
/// `reference`, ordered by bit pattern.
pub fn symmetry_sector<T: BitOps>(basis: &Basis, reference: &Determinant<T>) -> Result<Vec<Determinant<T>>, FciqmcError> {
    if reference.nmo() != basis.nmo() {
        return Err(FciqmcError::WidthMismatch { left: reference.nmo(), right: basis.nmo() });
    }
    let symmetry = basis.total_symmetry(reference);
    let mut sector = Vec::new();
    let mut chosen = Vec::with_capacity(reference.occupation_number());
    combinations(basis.nmo(), reference.occupation_number(), 0, &mut chosen, &mut |occ: &[usize]| {
        // Indices are in range by construction.
        if let Ok(det) = Determinant::new(occ.iter().cloned(), basis.nmo()) {
            if basis.total_symmetry(&det) == symmetry {
                sector.push(det);
            }
        }
    });
    sector.sort();
    Ok(sector)
}

fn combinations<F: FnMut(&[usize])>(n: usize, k: usize, start: usize, chosen: &mut Vec<usize>, visit: &mut F) {
    if chosen.len() == k {
        visit(chosen);
        return;
    }
    for i in start..n {
        if n - i < k - chosen.len() {
            break;
        }
        chosen.push(i);
        combinations(n, k, i + 1, chosen, visit);
        chosen.pop();
    }
}

/// Diagonalises the Hamiltonian in the sector of `reference`.
/// # Returns
/// The lowest eigenpair of the dense sector matrix.
pub fn exact_ground_state<T: BitOps>(
    basis: &Basis,
    hamiltonian: &Hamiltonian,
    reference: &Determinant<T>,
) -> Result<ExactGroundState<T>, FciqmcError> {
    hamiltonian.check_width(reference)?;
    let determinants = symmetry_sector(basis, reference)?;
    let dim = determinants.len();
    if dim > LARGE_SECTOR {
        warn!("Diagonalising a dense sector of dimension {}.", dim);
    }
    let matrix = DMatrix::from_fn(dim, dim, |r, c| hamiltonian.slater_condon(&determinants[r], &determinants[c]));
    let eig = matrix.symmetric_eigen();
    let lowest = eig
        .eigenvalues
        .iter()
        .enumerate()
        .fold(0, |best, (k, e)| if *e < eig.eigenvalues[best] { k } else { best });
    let energy = eig.eigenvalues[lowest];
    let mut coefficients: Vec<f64> = eig.eigenvectors.column(lowest).iter().cloned().collect();
    if let Ok(pos) = determinants.binary_search(reference) {
        if coefficients[pos] < 0.0 {
            coefficients.iter_mut().for_each(|c| *c = -*c);
        }
    }
    info!("Exact ground state energy {} in a sector of dimension {}.", energy, dim);
    Ok(ExactGroundState { energy, determinants, coefficients })
}
