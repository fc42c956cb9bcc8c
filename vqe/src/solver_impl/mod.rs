//! Minimum-eigenvalue solvers for qubit Hamiltonians
//!
//! `Vqe` minimizes the statevector energy of a parameterized circuit with a
//! classical optimizer; `ExactEigensolver` diagonalizes the same operator as
//! a reference.

mod estimator;
mod exact;
mod variational;
#[cfg(test)]
mod tests;

pub use estimator::{EnergyEstimator, GradientMethod};
pub use exact::{ExactEigensolver, ExactResult};
pub use variational::{InitialPoint, Vqe, VqeResult};
