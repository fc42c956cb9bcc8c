//! Parameterized circuits and exact statevector simulation

mod circuit;
mod statevector;
mod two_local;
#[cfg(test)]
mod tests;

pub use circuit::{Angle, Gate, QuantumCircuit};
pub use statevector::Statevector;
pub use two_local::{
    hartree_fock_state, EntanglementBlock, Entanglement, InitialStateKind, RotationBlock, TwoLocal,
};
