//! Pauli strings and sparse linear combinations of them

extern crate nalgebra as na;

use color_eyre::eyre::{eyre, Result};
use na::DMatrix;
use num_complex::Complex64;
use std::collections::HashMap;
use std::fmt;

pub const MAX_QUBITS: usize = 64;

/// Tensor product of single-qubit Paulis stored as X and Z bit masks.
///
/// Bit `q` of `x` / `z` is set when qubit `q` carries X / Z; both set means Y.
/// The operator is i^{|x&z|} X^x Z^z, so Y = iXZ carries no extra phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PauliString {
    pub x: u64,
    pub z: u64,
}

impl PauliString {
    pub fn identity() -> Self {
        PauliString { x: 0, z: 0 }
    }

    pub fn x(qubit: usize) -> Self {
        PauliString { x: 1 << qubit, z: 0 }
    }

    pub fn y(qubit: usize) -> Self {
        PauliString {
            x: 1 << qubit,
            z: 1 << qubit,
        }
    }

    pub fn z(qubit: usize) -> Self {
        PauliString { x: 0, z: 1 << qubit }
    }

    pub fn is_identity(&self) -> bool {
        self.x == 0 && self.z == 0
    }

    /// 'I', 'X', 'Y' or 'Z' on one qubit.
    pub fn get(&self, qubit: usize) -> char {
        let xb = (self.x >> qubit) & 1 == 1;
        let zb = (self.z >> qubit) & 1 == 1;
        match (xb, zb) {
            (false, false) => 'I',
            (true, false) => 'X',
            (true, true) => 'Y',
            (false, true) => 'Z',
        }
    }

    /// Parse a label such as "IXYZ"; the rightmost character is qubit 0.
    pub fn from_label(label: &str) -> Result<Self> {
        if label.len() > MAX_QUBITS {
            return Err(eyre!("Pauli labels support at most {} qubits", MAX_QUBITS));
        }
        let mut pauli = PauliString::identity();
        for (qubit, ch) in label.chars().rev().enumerate() {
            match ch.to_ascii_uppercase() {
                'I' => {}
                'X' => pauli.x |= 1 << qubit,
                'Y' => {
                    pauli.x |= 1 << qubit;
                    pauli.z |= 1 << qubit;
                }
                'Z' => pauli.z |= 1 << qubit,
                _ => return Err(eyre!("Invalid Pauli character '{}' in {}", ch, label)),
            }
        }
        Ok(pauli)
    }

    pub fn to_label(&self, num_qubits: usize) -> String {
        (0..num_qubits).rev().map(|q| self.get(q)).collect()
    }

    /// Product self·other = i^k P; returns (k mod 4, P).
    pub fn compose(&self, other: &PauliString) -> (u32, PauliString) {
        let x = self.x ^ other.x;
        let z = self.z ^ other.z;
        let phase = (self.x & self.z).count_ones() as i64
            + (other.x & other.z).count_ones() as i64
            + 2 * (self.z & other.x).count_ones() as i64
            - (x & z).count_ones() as i64;
        (phase.rem_euclid(4) as u32, PauliString { x, z })
    }

    pub fn commutes(&self, other: &PauliString) -> bool {
        let anti = (self.x & other.z).count_ones() + (self.z & other.x).count_ones();
        anti % 2 == 0
    }

    /// Highest qubit index acted on non-trivially, plus one.
    pub fn support_size(&self) -> usize {
        let mask = self.x | self.z;
        (u64::BITS - mask.leading_zeros()) as usize
    }

    /// P|b> = phase |b ^ x>
    #[inline]
    pub fn apply_to_basis(&self, b: u64) -> (Complex64, u64) {
        let k = (self.x & self.z).count_ones() + 2 * (b & self.z).count_ones();
        (i_pow(k), b ^ self.x)
    }
}

#[inline]
pub(crate) fn i_pow(k: u32) -> Complex64 {
    match k % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

/// Linear combination of Pauli strings on a fixed number of qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct SparsePauliOp {
    num_qubits: usize,
    terms: HashMap<PauliString, Complex64>,
}

impl SparsePauliOp {
    pub fn zero(num_qubits: usize) -> Self {
        SparsePauliOp {
            num_qubits,
            terms: HashMap::new(),
        }
    }

    pub fn identity(num_qubits: usize) -> Self {
        Self::from_term(num_qubits, PauliString::identity(), Complex64::new(1.0, 0.0))
    }

    pub fn from_term(num_qubits: usize, pauli: PauliString, coeff: Complex64) -> Self {
        let mut op = SparsePauliOp::zero(num_qubits);
        op.add_term(pauli, coeff);
        op
    }

    /// Build from (label, coefficient) pairs; all labels must have equal length.
    pub fn from_list(list: &[(&str, Complex64)]) -> Result<Self> {
        let num_qubits = list
            .first()
            .map(|(label, _)| label.len())
            .ok_or_else(|| eyre!("Cannot infer the qubit count of an empty list"))?;
        let mut op = SparsePauliOp::zero(num_qubits);
        for (label, coeff) in list {
            if label.len() != num_qubits {
                return Err(eyre!(
                    "Label {} does not act on {} qubits",
                    label,
                    num_qubits
                ));
            }
            op.add_term(PauliString::from_label(label)?, *coeff);
        }
        Ok(op)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn coeff(&self, pauli: &PauliString) -> Complex64 {
        self.terms.get(pauli).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PauliString, &Complex64)> {
        self.terms.iter()
    }

    /// Terms ordered by label, for stable output.
    pub fn sorted_terms(&self) -> Vec<(PauliString, Complex64)> {
        let mut terms: Vec<(PauliString, Complex64)> =
            self.terms.iter().map(|(p, c)| (*p, *c)).collect();
        terms.sort_by_key(|(p, _)| (p.x | p.z, p.z, p.x));
        terms
    }

    pub fn add_term(&mut self, pauli: PauliString, coeff: Complex64) {
        *self.terms.entry(pauli).or_default() += coeff;
    }

    pub fn add(&mut self, other: &SparsePauliOp) {
        for (p, c) in other.iter() {
            self.add_term(*p, *c);
        }
    }

    pub fn scale(&self, factor: Complex64) -> Self {
        SparsePauliOp {
            num_qubits: self.num_qubits,
            terms: self.terms.iter().map(|(p, c)| (*p, c * factor)).collect(),
        }
    }

    /// Operator product self·other.
    pub fn compose(&self, other: &SparsePauliOp) -> Self {
        let mut out = SparsePauliOp::zero(self.num_qubits.max(other.num_qubits));
        for (p1, c1) in &self.terms {
            for (p2, c2) in &other.terms {
                let (k, p) = p1.compose(p2);
                out.add_term(p, c1 * c2 * i_pow(k));
            }
        }
        out
    }

    pub fn adjoint(&self) -> Self {
        SparsePauliOp {
            num_qubits: self.num_qubits,
            terms: self.terms.iter().map(|(p, c)| (*p, c.conj())).collect(),
        }
    }

    /// Drop terms whose coefficient magnitude is at most `threshold`; real and
    /// imaginary parts below it are zeroed.
    pub fn simplify(&mut self, threshold: f64) {
        for c in self.terms.values_mut() {
            if c.re.abs() <= threshold {
                c.re = 0.0;
            }
            if c.im.abs() <= threshold {
                c.im = 0.0;
            }
        }
        self.terms.retain(|_, c| c.norm() > threshold);
    }

    pub fn is_hermitian(&self, tolerance: f64) -> bool {
        self.terms.values().all(|c| c.im.abs() <= tolerance)
    }

    /// Dense 2^n × 2^n matrix, little-endian basis ordering.
    pub fn to_matrix(&self) -> DMatrix<Complex64> {
        let dim = 1usize << self.num_qubits;
        let mut matrix = DMatrix::from_element(dim, dim, Complex64::new(0.0, 0.0));
        for (pauli, coeff) in &self.terms {
            for b in 0..dim {
                let (phase, target) = pauli.apply_to_basis(b as u64);
                matrix[(target as usize, b)] += coeff * phase;
            }
        }
        matrix
    }
}

impl fmt::Display for SparsePauliOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SparsePauliOp on {} qubits, {} terms",
            self.num_qubits,
            self.terms.len()
        )?;
        for (pauli, coeff) in self.sorted_terms() {
            writeln!(
                f,
                "  {} * ({:+.10} {:+.10}i)",
                pauli.to_label(self.num_qubits),
                coeff.re,
                coeff.im
            )?;
        }
        Ok(())
    }
}
