//! Fermion-to-qubit mappers

use super::pauli::{PauliString, SparsePauliOp, MAX_QUBITS};
use crate::hamiltonian_impl::{FermionicOp, Ladder};
use color_eyre::eyre::{eyre, Result};
use num_complex::Complex64;
use std::str::FromStr;

/// Mask with the lowest `n` bits set.
#[inline]
fn low_mask(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

pub trait QubitMapper: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pauli pairs (A_j, B_j) with a†_j = ½(A_j - iB_j) and a_j = ½(A_j + iB_j).
    fn pauli_table(&self, num_modes: usize) -> Vec<(PauliString, PauliString)>;

    /// Qubit basis state encoding a fermionic occupation-number state.
    fn map_occupations(&self, occupations: &[bool]) -> Vec<bool>;

    /// Whether the encoding stores spin-sector parities on dedicated qubits.
    fn allows_two_qubit_reduction(&self) -> bool {
        false
    }

    fn map(&self, op: &FermionicOp) -> Result<SparsePauliOp> {
        let num_modes = op.num_modes();
        if num_modes > MAX_QUBITS {
            return Err(eyre!(
                "{} modes exceed the {} qubit limit",
                num_modes,
                MAX_QUBITS
            ));
        }

        let half = Complex64::new(0.5, 0.0);
        let half_i = Complex64::new(0.0, 0.5);
        let ladders: Vec<(SparsePauliOp, SparsePauliOp)> = self
            .pauli_table(num_modes)
            .into_iter()
            .map(|(a, b)| {
                let mut create = SparsePauliOp::from_term(num_modes, a, half);
                create.add_term(b, -half_i);
                let mut annihilate = SparsePauliOp::from_term(num_modes, a, half);
                annihilate.add_term(b, half_i);
                (create, annihilate)
            })
            .collect();

        let mut qubit_op = SparsePauliOp::zero(num_modes);
        for (ops, coeff) in op.terms() {
            let mut product = SparsePauliOp::identity(num_modes);
            for ladder in ops {
                let (create, annihilate) = &ladders[ladder.mode()];
                product = match ladder {
                    Ladder::Create(_) => product.compose(create),
                    Ladder::Annihilate(_) => product.compose(annihilate),
                };
            }
            qubit_op.add(&product.scale(Complex64::new(coeff, 0.0)));
        }
        Ok(qubit_op)
    }
}

/// a†_j = ½(X_j - iY_j) Z_{j-1} ... Z_0
#[derive(Debug, Clone, Copy, Default)]
pub struct JordanWignerMapper;

impl QubitMapper for JordanWignerMapper {
    fn name(&self) -> &'static str {
        "jordan_wigner"
    }

    fn pauli_table(&self, num_modes: usize) -> Vec<(PauliString, PauliString)> {
        (0..num_modes)
            .map(|j| {
                let string = low_mask(j);
                (
                    PauliString {
                        x: 1 << j,
                        z: string,
                    },
                    PauliString {
                        x: 1 << j,
                        z: string | (1 << j),
                    },
                )
            })
            .collect()
    }

    fn map_occupations(&self, occupations: &[bool]) -> Vec<bool> {
        occupations.to_vec()
    }
}

/// Qubit j stores the parity of modes 0..=j.
/// a†_j = ½(Z_{j-1} X_j - iY_j) X_{j+1} ... X_{n-1}
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityMapper;

impl QubitMapper for ParityMapper {
    fn name(&self) -> &'static str {
        "parity"
    }

    fn pauli_table(&self, num_modes: usize) -> Vec<(PauliString, PauliString)> {
        let all = low_mask(num_modes);
        (0..num_modes)
            .map(|j| {
                let update = all & !low_mask(j);
                let previous = if j > 0 { 1 << (j - 1) } else { 0 };
                (
                    PauliString {
                        x: update,
                        z: previous,
                    },
                    PauliString {
                        x: update,
                        z: 1 << j,
                    },
                )
            })
            .collect()
    }

    fn map_occupations(&self, occupations: &[bool]) -> Vec<bool> {
        let mut parity = false;
        occupations
            .iter()
            .map(|&occupied| {
                parity ^= occupied;
                parity
            })
            .collect()
    }

    fn allows_two_qubit_reduction(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    JordanWigner,
    Parity,
}

impl FromStr for MapperKind {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "parity" => Ok(Self::Parity),
            "jordan_wigner" | "jordanwigner" | "jw" => Ok(Self::JordanWigner),
            _ => Err(eyre!("Unknown mapper: {}", s)),
        }
    }
}

/// Create a mapper based on its configuration name
pub fn create_mapper(name: &str) -> Result<Box<dyn QubitMapper>> {
    match MapperKind::from_str(name)? {
        MapperKind::JordanWigner => Ok(Box::new(JordanWignerMapper)),
        MapperKind::Parity => Ok(Box::new(ParityMapper)),
    }
}
