pub mod excitation;
pub mod fciqmc;
pub mod hamiltonian;
