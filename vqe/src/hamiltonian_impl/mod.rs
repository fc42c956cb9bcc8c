//! Electronic structure problem in the molecular-orbital basis
//!
//! The RHF reference is turned into MO integrals, reduced to an active space
//! and written as a second-quantized fermionic Hamiltonian.

mod active_space;
mod fermionic;
mod integrals;
mod problem;

pub use active_space::{count_core_orbitals, ActiveSpaceTransformer};
pub use fermionic::{hartree_fock_bitstring, FermionicOp, Ladder};
pub use integrals::{ElectronicIntegrals, Eri4};
pub use problem::ElectronicStructureProblem;
