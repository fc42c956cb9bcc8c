//! Mapping with the optional parity-symmetry reduction

use super::mapper::QubitMapper;
use super::pauli::{PauliString, SparsePauliOp};
use crate::hamiltonian_impl::FermionicOp;
use color_eyre::eyre::{eyre, Result};
use num_complex::Complex64;
use tracing::{info, warn};

/// Removes bits `low` and `high` (low < high) and closes the gaps.
#[inline]
fn drop_two_bits(mask: u64, low: usize, high: usize) -> u64 {
    let below = mask & ((1u64 << low) - 1);
    let middle = (mask >> (low + 1)) & ((1u64 << (high - low - 1)) - 1);
    let above = if high + 1 < 64 { mask >> (high + 1) } else { 0 };
    below | (middle << low) | (above << (high - 1))
}

pub struct QubitConverter {
    mapper: Box<dyn QubitMapper>,
    two_qubit_reduction: bool,
    threshold: f64,
}

impl QubitConverter {
    pub fn new(mapper: Box<dyn QubitMapper>, two_qubit_reduction: bool) -> Self {
        let two_qubit_reduction = if two_qubit_reduction && !mapper.allows_two_qubit_reduction()
        {
            warn!(
                "Two-qubit reduction is only available with the parity mapper; ignored for {}",
                mapper.name()
            );
            false
        } else {
            two_qubit_reduction
        };

        QubitConverter {
            mapper,
            two_qubit_reduction,
            threshold: 1e-8,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn mapper_name(&self) -> &'static str {
        self.mapper.name()
    }

    pub fn reduces(&self) -> bool {
        self.two_qubit_reduction
    }

    pub fn num_qubits(&self, num_modes: usize) -> usize {
        if self.two_qubit_reduction {
            num_modes.saturating_sub(2)
        } else {
            num_modes
        }
    }

    /// Qubits holding (-1)^{Nα} and (-1)^{Nα+Nβ} in block spin ordering.
    fn tapered_qubits(num_modes: usize) -> Result<(usize, usize)> {
        if num_modes < 2 || num_modes % 2 != 0 {
            return Err(eyre!(
                "Two-qubit reduction needs an even number of at least 2 modes, got {}",
                num_modes
            ));
        }
        Ok((num_modes / 2 - 1, num_modes - 1))
    }

    pub fn convert(
        &self,
        op: &FermionicOp,
        num_particles: (usize, usize),
    ) -> Result<SparsePauliOp> {
        let mut qubit_op = self.mapper.map(op)?;
        if self.two_qubit_reduction {
            qubit_op = self.taper(&qubit_op, num_particles)?;
        }
        qubit_op.simplify(self.threshold);
        Ok(qubit_op)
    }

    fn taper(
        &self,
        op: &SparsePauliOp,
        num_particles: (usize, usize),
    ) -> Result<SparsePauliOp> {
        let num_modes = op.num_qubits();
        let (alpha_qubit, total_qubit) = Self::tapered_qubits(num_modes)?;
        let (num_alpha, num_beta) = num_particles;
        let alpha_sign = if num_alpha % 2 == 0 { 1.0 } else { -1.0 };
        let total_sign = if (num_alpha + num_beta) % 2 == 0 {
            1.0
        } else {
            -1.0
        };

        let mut tapered = SparsePauliOp::zero(num_modes - 2);
        for (pauli, coeff) in op.iter() {
            for qubit in [alpha_qubit, total_qubit] {
                if (pauli.x >> qubit) & 1 == 1 {
                    return Err(eyre!(
                        "Term {} flips tapered qubit {}; the operator does not conserve spin parity",
                        pauli.to_label(num_modes),
                        qubit
                    ));
                }
            }

            let mut sign = 1.0;
            if (pauli.z >> alpha_qubit) & 1 == 1 {
                sign *= alpha_sign;
            }
            if (pauli.z >> total_qubit) & 1 == 1 {
                sign *= total_sign;
            }

            let reduced = PauliString {
                x: drop_two_bits(pauli.x, alpha_qubit, total_qubit),
                z: drop_two_bits(pauli.z, alpha_qubit, total_qubit),
            };
            tapered.add_term(reduced, coeff * Complex64::new(sign, 0.0));
        }

        info!(
            "Two-qubit reduction: tapered qubits {} and {} ({} -> {} qubits)",
            alpha_qubit,
            total_qubit,
            num_modes,
            num_modes - 2
        );
        Ok(tapered)
    }

    /// Qubit bitstring (index = qubit) for a fermionic occupation.
    pub fn convert_occupations(&self, occupations: &[bool]) -> Result<Vec<bool>> {
        let bits = self.mapper.map_occupations(occupations);
        if !self.two_qubit_reduction {
            return Ok(bits);
        }
        let (alpha_qubit, total_qubit) = Self::tapered_qubits(bits.len())?;
        Ok(bits
            .into_iter()
            .enumerate()
            .filter(|(q, _)| *q != alpha_qubit && *q != total_qubit)
            .map(|(_, b)| b)
            .collect())
    }
}
