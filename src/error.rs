use derive_more::Error;
use std::fmt;

/// Domain errors of the solver. These are configuration or programming
/// mistakes, never stochastic outcomes of a step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FciqmcError {
    /// An orbital index outside $\[0, N_{mo})$.
    OrbitalOutOfRange { index: usize, nmo: usize },
    /// The bit storage cannot hold that many orbitals.
    CapacityExceeded { nmo: usize, capacity: usize },
    /// Two determinants, or a determinant and an operator, of different widths.
    WidthMismatch { left: usize, right: usize },
    /// Integral array length disagrees with the orbital count.
    IntegralDimension { integral: &'static str, expected: usize, found: usize },
    TooManyElectrons { n_electrons: usize, nmo: usize },
    InvalidParameter { name: &'static str, details: String },
}

impl fmt::Display for FciqmcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FciqmcError::OrbitalOutOfRange { index, nmo } => write!(
                f,
                "Orbital index {} is out of range for a basis of {} orbitals.",
                index, nmo
            ),
            FciqmcError::CapacityExceeded { nmo, capacity } => write!(
                f,
                "Cannot store {} orbitals in a bitstring of capacity {}.",
                nmo, capacity
            ),
            FciqmcError::WidthMismatch { left, right } => write!(
                f,
                "Determinant widths differ: {} and {}.",
                left, right
            ),
            FciqmcError::IntegralDimension { integral, expected, found } => write!(
                f,
                "The {} integrals have {} elements, expected {}.",
                integral, found, expected
            ),
            FciqmcError::TooManyElectrons { n_electrons, nmo } => write!(
                f,
                "Cannot place {} electrons in {} orbitals.",
                n_electrons, nmo
            ),
            FciqmcError::InvalidParameter { name, details } => write!(
                f,
                "Invalid parameter {}: {}",
                name, details
            ),
        }
    }
}

#[cfg(feature = "python-interface")]
impl From<FciqmcError> for pyo3::PyErr {
    fn from(err: FciqmcError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
