//! Ground-state energies of small molecules with a variational quantum
//! eigensolver running on an exact statevector simulator.

pub mod app;
pub mod circuit_impl;
pub mod config;
pub mod hamiltonian_impl;
pub mod io;
pub mod optim_impl;
pub mod qubit_impl;
pub mod scf_impl;
pub mod solver_impl;

pub use app::{run_pipeline, RunReport, VqeApplication};
pub use scf_impl::{SimpleSCF, SCF};
