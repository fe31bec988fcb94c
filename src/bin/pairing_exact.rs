use log::info;
use std::error::Error;

use fciqmc::basis::Basis;
use fciqmc::exact::exact_ground_state;
use fciqmc::hamiltonian::Hamiltonian;
use fciqmc::strings::{footer_message, header_message, section_message};
use fciqmc::Determinant;

const P_MAX: usize = 4;
const DELTA: f64 = 1.0;
const NELEC: usize = 4;
const G_MIN: f64 = -1.0;
const G_MAX: f64 = 1.0;
const NPOINTS: usize = 21;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();
    println!("{}", header_message());
    info!("P_MAX = {}, DELTA = {}, NELEC = {}", P_MAX, DELTA, NELEC);

    let basis = Basis::new(P_MAX, DELTA);
    println!("{}", section_message("Exact pairing energies"));
    println!("{:>10} {:>16} {:>16} {:>16}", "g", "E_ref", "E_exact", "E_corr");
    for k in 0..NPOINTS {
        let g = G_MIN + (G_MAX - G_MIN) * k as f64 / (NPOINTS - 1) as f64;
        let hamiltonian = Hamiltonian::pairing_model(&basis, g);
        let reference: Determinant = hamiltonian.lowest_diagonal_reference(&basis, NELEC)?;
        let e_ref = hamiltonian.diagonal(&reference);
        let exact = exact_ground_state(&basis, &hamiltonian, &reference)?;
        println!("{:>10.4} {:>16.10} {:>16.10} {:>16.10}", g, e_ref, exact.energy, exact.energy - e_ref);
    }
    println!("{}", footer_message());
    Ok(())
}
