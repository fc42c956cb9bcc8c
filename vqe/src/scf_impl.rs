//! SCF implementations with DIIS acceleration
//!
//! This module provides the SCF trait definition, DIIS (Direct Inversion in the Iterative Subspace)
//! convergence acceleration, and SimpleSCF, the restricted Hartree-Fock reference used to build
//! the molecular orbitals of the qubit Hamiltonian.

extern crate nalgebra as na;

mod simple;
#[cfg(test)]
mod tests;

pub use simple::SimpleSCF;

use crate::app::BasisMap;
use basis::basis::AOBasis;
use color_eyre::eyre::Result;
use na::{DMatrix, DVector, Vector3};
use periodic_table_on_an_enum::Element;
use std::collections::VecDeque;
use tracing::info;

/// Result of an SCF cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScfOutcome {
    pub converged: bool,
    pub cycles: usize,
    pub energy: f64,
}

/// The SCF trait defines the interface for Self-Consistent Field calculations
pub trait SCF {
    type BasisType: AOBasis;

    fn init_basis(&mut self, elems: &[Element], basis: &BasisMap<Self::BasisType>) -> Result<()>;
    fn init_geometry(&mut self, coords: &[Vector3<f64>], elems: &[Element]);
    fn init_density_matrix(&mut self);
    fn update_density_matrix(&mut self);
    fn init_fock_matrix(&mut self);
    fn scf_cycle(&mut self) -> Result<ScfOutcome>;
    fn calculate_total_energy(&self) -> f64;
}

/// Pulay DIIS extrapolation of the Fock matrix.
///
/// Each stored iterate carries the commutator error e = FDS - SDF. The
/// extrapolated Fock matrix is Σ c_i F_i with the c_i minimizing |Σ c_i e_i|²
/// under Σ c_i = 1.
#[derive(Clone)]
pub struct DIIS {
    history: VecDeque<(DMatrix<f64>, DMatrix<f64>)>,
    capacity: usize,
}

impl DIIS {
    pub fn new(capacity: usize) -> Self {
        DIIS {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn calculate_error_matrix(
        &self,
        fock: &DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
    ) -> DMatrix<f64> {
        let fds = fock * density * overlap;
        &fds - fds.transpose()
    }

    /// Store a Fock matrix with its error, evicting the oldest iterate at
    /// capacity. Returns max |e| of the new error.
    pub fn update(
        &mut self,
        fock: DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
    ) -> f64 {
        let error = self.calculate_error_matrix(&fock, density, overlap);
        let max_error = error.amax();
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back((fock, error));
        max_error
    }

    /// None when nothing is stored or the bordered system is singular.
    pub fn extrapolate(&self) -> Option<DMatrix<f64>> {
        let (first, _) = self.history.front()?;
        let m = self.history.len();

        let system = DMatrix::from_fn(m + 1, m + 1, |i, j| match (i < m, j < m) {
            (true, true) => self.history[i].1.dot(&self.history[j].1),
            (false, false) => 0.0,
            _ => -1.0,
        });
        let rhs = DVector::from_fn(m + 1, |i, _| if i == m { -1.0 } else { 0.0 });

        let Some(weights) = system.lu().solve(&rhs) else {
            info!("DIIS extrapolation failed: singular B matrix");
            return None;
        };

        let zero = DMatrix::zeros(first.nrows(), first.ncols());
        Some(
            self.history
                .iter()
                .zip(weights.iter())
                .fold(zero, |acc, ((fock, _), &w)| acc + fock * w),
        )
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn size(&self) -> usize {
        self.history.len()
    }
}

/// Flip each eigenvector so that its largest-magnitude entry is positive.
pub fn align_eigenvectors(mut eigvecs: DMatrix<f64>) -> DMatrix<f64> {
    for j in 0..eigvecs.ncols() {
        let max_val = eigvecs
            .column(j)
            .iter()
            .copied()
            .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
        if max_val < 0.0 {
            eigvecs.column_mut(j).neg_mut();
        }
    }
    eigvecs
}

/// Solve F C = S C ε through the orthogonalizer X (Xᵀ S X = I).
/// Eigenpairs are returned in ascending order.
pub fn solve_roothaan(fock: &DMatrix<f64>, x: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let f_prime = x.transpose() * fock * x;
    let eig = f_prime.symmetric_eigen();

    let mut indices: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    indices.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));

    let sorted_eigenvalues =
        DVector::from_fn(eig.eigenvalues.len(), |i, _| eig.eigenvalues[indices[i]]);
    let sorted_eigenvectors = eig.eigenvectors.select_columns(&indices);

    (sorted_eigenvalues, align_eigenvectors(x * sorted_eigenvectors))
}
