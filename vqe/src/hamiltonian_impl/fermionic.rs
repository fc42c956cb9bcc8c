//! Second-quantized fermionic operators
//!
//! Spin orbitals use block ordering: modes `0..m` are the alpha spin orbitals
//! and modes `m..2m` the beta spin orbitals of the same spatial orbitals.

use super::ElectronicIntegrals;
use std::collections::BTreeMap;
use std::fmt;

const COEFF_CUTOFF: f64 = 1e-12;

/// Single creation (`+_p`) or annihilation (`-_p`) operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ladder {
    Create(usize),
    Annihilate(usize),
}

impl Ladder {
    pub fn mode(&self) -> usize {
        match *self {
            Ladder::Create(p) | Ladder::Annihilate(p) => p,
        }
    }

    pub fn is_creation(&self) -> bool {
        matches!(self, Ladder::Create(_))
    }
}

impl fmt::Display for Ladder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ladder::Create(p) => write!(f, "+_{}", p),
            Ladder::Annihilate(p) => write!(f, "-_{}", p),
        }
    }
}

/// Sum of products of ladder operators with real coefficients.
/// Products are kept in the order written; no normal ordering is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FermionicOp {
    num_modes: usize,
    terms: BTreeMap<Vec<Ladder>, f64>,
}

impl FermionicOp {
    pub fn zero(num_modes: usize) -> Self {
        FermionicOp {
            num_modes,
            terms: BTreeMap::new(),
        }
    }

    pub fn num_modes(&self) -> usize {
        self.num_modes
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&[Ladder], f64)> {
        self.terms.iter().map(|(ops, &c)| (ops.as_slice(), c))
    }

    pub fn coefficient(&self, ops: &[Ladder]) -> f64 {
        self.terms.get(ops).copied().unwrap_or(0.0)
    }

    /// Accumulate `coeff * ops`; the register grows to cover every mode used.
    pub fn add_term(&mut self, ops: Vec<Ladder>, coeff: f64) {
        if let Some(max_mode) = ops.iter().map(Ladder::mode).max() {
            self.num_modes = self.num_modes.max(max_mode + 1);
        }
        *self.terms.entry(ops).or_insert(0.0) += coeff;
    }

    pub fn add(&mut self, other: &FermionicOp) {
        for (ops, coeff) in other.terms() {
            self.add_term(ops.to_vec(), coeff);
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        FermionicOp {
            num_modes: self.num_modes,
            terms: self
                .terms
                .iter()
                .map(|(ops, c)| (ops.clone(), c * factor))
                .collect(),
        }
    }

    /// Drop terms whose coefficient magnitude is below `threshold`.
    pub fn simplify(&mut self, threshold: f64) {
        self.terms.retain(|_, c| c.abs() >= threshold);
    }

    /// N = Σ_p +_p -_p over all modes
    pub fn number_op(num_modes: usize) -> Self {
        let mut op = FermionicOp::zero(num_modes);
        for p in 0..num_modes {
            op.add_term(vec![Ladder::Create(p), Ladder::Annihilate(p)], 1.0);
        }
        op
    }

    pub fn alpha_number_op(num_spatial_orbitals: usize) -> Self {
        let mut op = FermionicOp::zero(2 * num_spatial_orbitals);
        for p in 0..num_spatial_orbitals {
            op.add_term(vec![Ladder::Create(p), Ladder::Annihilate(p)], 1.0);
        }
        op
    }

    pub fn beta_number_op(num_spatial_orbitals: usize) -> Self {
        let mut op = FermionicOp::zero(2 * num_spatial_orbitals);
        for p in num_spatial_orbitals..2 * num_spatial_orbitals {
            op.add_term(vec![Ladder::Create(p), Ladder::Annihilate(p)], 1.0);
        }
        op
    }

    /// H = Σ h_pq a†_pσ a_qσ + ½ Σ (pq|rs) a†_pσ a†_rτ a_sτ a_qσ
    pub fn electronic_hamiltonian(integrals: &ElectronicIntegrals) -> Self {
        let m = integrals.num_orbitals();
        let h = &integrals.one_body;
        let eri = &integrals.two_body;
        let mut op = FermionicOp::zero(2 * m);
        let spins = [0, m];

        for p in 0..m {
            for q in 0..m {
                let coeff = h[(p, q)];
                if coeff.abs() < COEFF_CUTOFF {
                    continue;
                }
                for &sigma in &spins {
                    op.add_term(
                        vec![Ladder::Create(p + sigma), Ladder::Annihilate(q + sigma)],
                        coeff,
                    );
                }
            }
        }

        for p in 0..m {
            for q in 0..m {
                for r in 0..m {
                    for s in 0..m {
                        let coeff = 0.5 * eri.get(p, q, r, s);
                        if coeff.abs() < COEFF_CUTOFF {
                            continue;
                        }
                        for &sigma in &spins {
                            for &tau in &spins {
                                // a†a† or aa on the same spin orbital vanishes
                                if sigma == tau && (p == r || q == s) {
                                    continue;
                                }
                                op.add_term(
                                    vec![
                                        Ladder::Create(p + sigma),
                                        Ladder::Create(r + tau),
                                        Ladder::Annihilate(s + tau),
                                        Ladder::Annihilate(q + sigma),
                                    ],
                                    coeff,
                                );
                            }
                        }
                    }
                }
            }
        }

        op
    }
}

impl fmt::Display for FermionicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fermionic Operator: {} modes, {} terms",
            self.num_modes,
            self.terms.len()
        )?;
        for (ops, coeff) in &self.terms {
            let labels: Vec<String> = ops.iter().map(|l| l.to_string()).collect();
            writeln!(f, "  {:+.8} * ({})", coeff, labels.join(" "))?;
        }
        Ok(())
    }
}

/// Occupation of the closed-shell determinant in block spin ordering.
pub fn hartree_fock_bitstring(
    num_spatial_orbitals: usize,
    num_particles: (usize, usize),
) -> Vec<bool> {
    let (num_alpha, num_beta) = num_particles;
    let mut bits = vec![false; 2 * num_spatial_orbitals];
    for bit in bits.iter_mut().take(num_alpha.min(num_spatial_orbitals)) {
        *bit = true;
    }
    for bit in bits
        .iter_mut()
        .skip(num_spatial_orbitals)
        .take(num_beta.min(num_spatial_orbitals))
    {
        *bit = true;
    }
    bits
}
