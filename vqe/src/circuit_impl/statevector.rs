//! Dense statevector simulator (little-endian: bit q of the index is qubit q)

use super::circuit::{Gate, QuantumCircuit};
use crate::qubit_impl::SparsePauliOp;
use color_eyre::eyre::{eyre, Result};
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::FRAC_1_SQRT_2;

const MAX_SIMULATED_QUBITS: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    pub fn zero_state(num_qubits: usize) -> Result<Self> {
        if num_qubits > MAX_SIMULATED_QUBITS {
            return Err(eyre!(
                "{} qubits exceed the {}-qubit simulator limit",
                num_qubits,
                MAX_SIMULATED_QUBITS
            ));
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Statevector {
            num_qubits,
            amplitudes,
        })
    }

    /// Computational basis state; `bits[q]` is the value of qubit q.
    pub fn from_bitstring(bits: &[bool]) -> Result<Self> {
        let mut state = Self::zero_state(bits.len())?;
        let index = bits
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .fold(0usize, |acc, (q, _)| acc | (1 << q));
        state.amplitudes[0] = Complex64::new(0.0, 0.0);
        state.amplitudes[index] = Complex64::new(1.0, 0.0);
        Ok(state)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub fn norm(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt()
    }

    pub fn inner(&self, other: &Statevector) -> Complex64 {
        self.amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Apply a 2x2 matrix [[m00, m01], [m10, m11]] to one qubit.
    fn apply_single(&mut self, q: usize, m: [[Complex64; 2]; 2]) {
        let bit = 1usize << q;
        for i in 0..self.amplitudes.len() {
            if i & bit == 0 {
                let a0 = self.amplitudes[i];
                let a1 = self.amplitudes[i | bit];
                self.amplitudes[i] = m[0][0] * a0 + m[0][1] * a1;
                self.amplitudes[i | bit] = m[1][0] * a0 + m[1][1] * a1;
            }
        }
    }

    pub fn apply(&mut self, gate: &Gate, params: &[f64]) {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        match *gate {
            Gate::X(q) => self.apply_single(q, [[zero, one], [one, zero]]),
            Gate::H(q) => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                self.apply_single(q, [[h, h], [h, -h]]);
            }
            Gate::Rx(q, angle) => {
                let theta = angle.resolve(params);
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(theta / 2.0).sin());
                self.apply_single(q, [[c, s], [s, c]]);
            }
            Gate::Ry(q, angle) => {
                let theta = angle.resolve(params);
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new((theta / 2.0).sin(), 0.0);
                self.apply_single(q, [[c, -s], [s, c]]);
            }
            Gate::Rz(q, angle) => {
                let theta = angle.resolve(params);
                let minus = Complex64::from_polar(1.0, -theta / 2.0);
                let plus = Complex64::from_polar(1.0, theta / 2.0);
                self.apply_single(q, [[minus, zero], [zero, plus]]);
            }
            Gate::Cx(control, target) => {
                let (c, t) = (1usize << control, 1usize << target);
                for i in 0..self.amplitudes.len() {
                    if i & c != 0 && i & t == 0 {
                        self.amplitudes.swap(i, i | t);
                    }
                }
            }
            Gate::Cz(a, b) => {
                let mask = (1usize << a) | (1usize << b);
                for (i, amp) in self.amplitudes.iter_mut().enumerate() {
                    if i & mask == mask {
                        *amp = -*amp;
                    }
                }
            }
            Gate::Swap(a, b) => {
                let (ba, bb) = (1usize << a, 1usize << b);
                for i in 0..self.amplitudes.len() {
                    if i & ba != 0 && i & bb == 0 {
                        self.amplitudes.swap(i, (i & !ba) | bb);
                    }
                }
            }
        }
    }

    /// Run `circuit` with bound `params` on this state.
    pub fn evolve_from(&self, circuit: &QuantumCircuit, params: &[f64]) -> Result<Self> {
        if circuit.num_qubits() != self.num_qubits {
            return Err(eyre!(
                "Circuit acts on {} qubits but the state has {}",
                circuit.num_qubits(),
                self.num_qubits
            ));
        }
        circuit.check_parameters(params)?;
        let mut state = self.clone();
        for gate in circuit.gates() {
            state.apply(gate, params);
        }
        Ok(state)
    }

    /// Run `circuit` on |0...0>.
    pub fn evolve(circuit: &QuantumCircuit, params: &[f64]) -> Result<Self> {
        Self::zero_state(circuit.num_qubits())?.evolve_from(circuit, params)
    }

    /// Re<ψ|O|ψ>, exact.
    pub fn expectation(&self, op: &SparsePauliOp) -> Result<f64> {
        if op.num_qubits() != self.num_qubits {
            return Err(eyre!(
                "Operator acts on {} qubits but the state has {}",
                op.num_qubits(),
                self.num_qubits
            ));
        }
        let terms: Vec<_> = op.iter().collect();
        let value: Complex64 = terms
            .par_iter()
            .map(|(pauli, coeff)| {
                let mut term = Complex64::new(0.0, 0.0);
                for (b, amp) in self.amplitudes.iter().enumerate() {
                    if amp.norm_sqr() == 0.0 {
                        continue;
                    }
                    let (phase, target) = pauli.apply_to_basis(b as u64);
                    term += self.amplitudes[target as usize].conj() * phase * amp;
                }
                **coeff * term
            })
            .sum();
        Ok(value.re)
    }
}
