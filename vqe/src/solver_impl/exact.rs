//! Dense diagonalization of a qubit operator

use crate::qubit_impl::SparsePauliOp;
use color_eyre::eyre::{eyre, Result};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::{info, warn};

/// Dense diagonalization is refused above this many qubits.
pub const MAX_EXACT_QUBITS: usize = 14;

const FILTER_TOLERANCE: f64 = 1e-6;
const DEGENERACY_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct ExactResult {
    pub eigenvalue: f64,
    pub eigenstate: DVector<Complex64>,
    /// Position of the accepted level in the full ascending spectrum
    pub level: usize,
}

/// Lowest eigenvalue whose eigenvector satisfies every `<O> = target` filter.
#[derive(Default)]
pub struct ExactEigensolver {
    filters: Vec<(SparsePauliOp, f64)>,
}

impl ExactEigensolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, observable: SparsePauliOp, target: f64) -> Self {
        self.filters.push((observable, target));
        self
    }

    pub fn num_filters(&self) -> usize {
        self.filters.len()
    }

    fn expectation(matrix: &DMatrix<Complex64>, v: &DVector<Complex64>) -> f64 {
        v.dotc(&(matrix * v)).re
    }

    pub fn compute_minimum_eigenvalue(&self, op: &SparsePauliOp) -> Result<ExactResult> {
        let n = op.num_qubits();
        if n > MAX_EXACT_QUBITS {
            return Err(eyre!(
                "Exact diagonalization limited to {} qubits, operator has {}",
                MAX_EXACT_QUBITS,
                n
            ));
        }
        if let Some((filter, _)) = self.filters.iter().find(|(f, _)| f.num_qubits() != n) {
            return Err(eyre!(
                "Filter acts on {} qubits, operator on {}",
                filter.num_qubits(),
                n
            ));
        }
        if !op.is_hermitian(1e-10) {
            warn!("Operator is not Hermitian; its anti-Hermitian part is ignored");
        }

        let matrix = op.to_matrix();
        let hermitian = (&matrix + matrix.adjoint()) * Complex64::new(0.5, 0.0);
        let eig = hermitian.symmetric_eigen();

        let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));

        let filter_matrices: Vec<(DMatrix<Complex64>, f64)> = self
            .filters
            .iter()
            .map(|(f, target)| (f.to_matrix(), *target))
            .collect();

        // walk degenerate groups upwards; inside a group, rotate onto the
        // eigenbasis of the first filter so mixed sectors separate
        let mut start = 0;
        while start < order.len() {
            let value = eig.eigenvalues[order[start]];
            let mut end = start + 1;
            while end < order.len()
                && (eig.eigenvalues[order[end]] - value).abs() < DEGENERACY_TOLERANCE
            {
                end += 1;
            }

            let group = eig.eigenvectors.select_columns(&order[start..end]);
            let candidates = match filter_matrices.first() {
                Some((first, _)) if end - start > 1 => {
                    let projected = group.adjoint() * first * &group;
                    let rotation = projected.symmetric_eigen().eigenvectors;
                    &group * rotation
                }
                _ => group,
            };

            for column in candidates.column_iter() {
                let v: DVector<Complex64> = column.into_owned();
                let accepted = filter_matrices.iter().all(|(m, target)| {
                    (Self::expectation(m, &v) - target).abs() < FILTER_TOLERANCE
                });
                if accepted {
                    if start > 0 {
                        info!(
                            "Exact solver skipped {} lower levels outside the requested sector",
                            start
                        );
                    }
                    return Ok(ExactResult {
                        eigenvalue: value,
                        eigenstate: v,
                        level: start,
                    });
                }
            }
            start = end;
        }

        Err(eyre!("No eigenstate satisfies the requested filters"))
    }
}
