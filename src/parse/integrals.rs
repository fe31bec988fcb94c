use csv::{ReaderBuilder, StringRecord, Trim};
use derive_more::{Constructor, Error};
use log::{debug, error};
use std::fmt;
use std::fs::File;
use std::path::Path;

use crate::basis::Basis;
use crate::hamiltonian::{idx4, Hamiltonian};
use crate::FciqmcError;

/// Parse the one-body integrals.
/// # Arguments
/// * __`fp`__ - File path to the definition file, in csv format with the
/// header `p,q,value`.
/// * __`nmo`__ - Number of orbitals.
/// # Returns
/// $h_{pq}$ row-major. Missing entries are zero and every entry also sets
/// its transpose.
pub fn parse_one_body_def(fp: &Path, nmo: usize) -> Result<Vec<f64>> {
    let mut h1 = vec![0.0; nmo * nmo];
    let file = File::open(fp)?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);
    for (k, result) in reader.records().enumerate() {
        let rec = result?;
        if rec.len() != 3 {
            error!("Line {} of {:?} has {} columns, expected 3.", k, fp, rec.len());
            return Err(IntegralParseError::new(format!(
                "Invalid number of columns on line {}.",
                k
            )));
        }
        let p = parse_index(&rec, 0, k, nmo)?;
        let q = parse_index(&rec, 1, k, nmo)?;
        let value = parse_value(&rec, 2, k)?;
        h1[p * nmo + q] = value;
        h1[q * nmo + p] = value;
    }
    debug!("Parsed one-body integrals from {:?}.", fp);
    Ok(h1)
}

/// Parse the two-body integrals.
/// # Arguments
/// * __`fp`__ - File path to the definition file, in csv format with the
/// header `p,q,r,s,value` for $\langle pq\vert v\vert rs\rangle$.
/// * __`nmo`__ - Number of orbitals.
/// # Returns
/// The integrals row-major. Every entry also sets
/// $\langle qp\vert v\vert sr\rangle$, $\langle rs\vert v\vert pq\rangle$ and
/// $\langle sr\vert v\vert qp\rangle$.
pub fn parse_two_body_def(fp: &Path, nmo: usize) -> Result<Vec<f64>> {
    let mut h2 = vec![0.0; nmo * nmo * nmo * nmo];
    let file = File::open(fp)?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);
    for (k, result) in reader.records().enumerate() {
        let rec = result?;
        if rec.len() != 5 {
            error!("Line {} of {:?} has {} columns, expected 5.", k, fp, rec.len());
            return Err(IntegralParseError::new(format!(
                "Invalid number of columns on line {}.",
                k
            )));
        }
        let p = parse_index(&rec, 0, k, nmo)?;
        let q = parse_index(&rec, 1, k, nmo)?;
        let r = parse_index(&rec, 2, k, nmo)?;
        let s = parse_index(&rec, 3, k, nmo)?;
        let value = parse_value(&rec, 4, k)?;
        h2[idx4(nmo, p, q, r, s)] = value;
        h2[idx4(nmo, q, p, s, r)] = value;
        h2[idx4(nmo, r, s, p, q)] = value;
        h2[idx4(nmo, s, r, q, p)] = value;
    }
    debug!("Parsed two-body integrals from {:?}.", fp);
    Ok(h2)
}

/// Reads both integral files and builds the Hamiltonian over `basis`.
pub fn build_hamiltonian_from_files(basis: &Basis, one_body_fp: &Path, two_body_fp: &Path) -> Result<Hamiltonian> {
    let h1 = parse_one_body_def(one_body_fp, basis.nmo())?;
    let h2 = parse_two_body_def(two_body_fp, basis.nmo())?;
    Ok(Hamiltonian::new(basis, h1, h2)?)
}

fn parse_index(line: &StringRecord, col: usize, l: usize, nmo: usize) -> Result<usize> {
    let field = line.get(col).unwrap_or("");
    match field.parse::<usize>() {
        Ok(v) if v < nmo => Ok(v),
        Ok(v) => {
            error!("Orbital index {} out of range at line {}, col {}.", v, l, col);
            Err(IntegralParseError::new(format!(
                "Orbital index {} out of range for {} orbitals.",
                v, nmo
            )))
        }
        Err(error) => {
            error!("Expected a valid orbital index at line {}, col {}.", l, col);
            Err(IntegralParseError::from(error))
        }
    }
}

fn parse_value(line: &StringRecord, col: usize, l: usize) -> Result<f64> {
    match line.get(col).unwrap_or("").parse::<f64>() {
        Ok(v) => Ok(v),
        Err(error) => {
            error!("Expected a real value at line {}, col {}.", l, col);
            Err(IntegralParseError::from(error))
        }
    }
}

type Result<T> = std::result::Result<T, IntegralParseError>;

/// Error in an integral definition file.
#[derive(Debug, Clone, Error, Constructor)]
pub struct IntegralParseError {
    pub details: String,
}

impl fmt::Display for IntegralParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Parsing error encountered in integral file: {}", self.details)
    }
}

impl From<std::num::ParseIntError> for IntegralParseError {
    fn from(err: std::num::ParseIntError) -> Self {
        IntegralParseError::new(format!("Expected to parse an integer. {}", err))
    }
}

impl From<std::num::ParseFloatError> for IntegralParseError {
    fn from(err: std::num::ParseFloatError) -> Self {
        IntegralParseError::new(format!("Expected to parse a real number. {}", err))
    }
}

impl From<csv::Error> for IntegralParseError {
    fn from(err: csv::Error) -> Self {
        IntegralParseError::new(err.to_string())
    }
}

impl From<std::io::Error> for IntegralParseError {
    fn from(err: std::io::Error) -> Self {
        IntegralParseError::new(err.to_string())
    }
}

impl From<FciqmcError> for IntegralParseError {
    fn from(err: FciqmcError) -> Self {
        IntegralParseError::new(err.to_string())
    }
}
