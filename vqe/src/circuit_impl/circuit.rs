//! Gate list representation of a quantum circuit

use color_eyre::eyre::{eyre, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Rotation angle, either fixed or read from the parameter vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Angle {
    Fixed(f64),
    Param(usize),
}

impl Angle {
    pub fn resolve(&self, params: &[f64]) -> f64 {
        match *self {
            Angle::Fixed(value) => value,
            Angle::Param(index) => params[index],
        }
    }

    fn shifted(&self, offset: usize) -> Angle {
        match *self {
            Angle::Fixed(value) => Angle::Fixed(value),
            Angle::Param(index) => Angle::Param(index + offset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    X(usize),
    H(usize),
    Rx(usize, Angle),
    Ry(usize, Angle),
    Rz(usize, Angle),
    /// (control, target)
    Cx(usize, usize),
    Cz(usize, usize),
    Swap(usize, usize),
}

impl Gate {
    pub fn name(&self) -> &'static str {
        match self {
            Gate::X(_) => "x",
            Gate::H(_) => "h",
            Gate::Rx(..) => "rx",
            Gate::Ry(..) => "ry",
            Gate::Rz(..) => "rz",
            Gate::Cx(..) => "cx",
            Gate::Cz(..) => "cz",
            Gate::Swap(..) => "swap",
        }
    }

    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Gate::X(q) | Gate::H(q) | Gate::Rx(q, _) | Gate::Ry(q, _) | Gate::Rz(q, _) => vec![q],
            Gate::Cx(a, b) | Gate::Cz(a, b) | Gate::Swap(a, b) => vec![a, b],
        }
    }

    pub fn angle(&self) -> Option<Angle> {
        match *self {
            Gate::Rx(_, a) | Gate::Ry(_, a) | Gate::Rz(_, a) => Some(a),
            _ => None,
        }
    }

    fn with_angle(&self, angle: Angle) -> Gate {
        match *self {
            Gate::Rx(q, _) => Gate::Rx(q, angle),
            Gate::Ry(q, _) => Gate::Ry(q, angle),
            Gate::Rz(q, _) => Gate::Rz(q, angle),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantumCircuit {
    num_qubits: usize,
    num_parameters: usize,
    gates: Vec<Gate>,
}

impl QuantumCircuit {
    pub fn new(num_qubits: usize) -> Self {
        QuantumCircuit {
            num_qubits,
            num_parameters: 0,
            gates: Vec::new(),
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_parameters(&self) -> usize {
        self.num_parameters
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn add(&mut self, gate: Gate) -> Result<&mut Self> {
        let qubits = gate.qubits();
        if let Some(&q) = qubits.iter().find(|&&q| q >= self.num_qubits) {
            return Err(eyre!(
                "Gate {} on qubit {} outside a {}-qubit circuit",
                gate.name(),
                q,
                self.num_qubits
            ));
        }
        if qubits.len() == 2 && qubits[0] == qubits[1] {
            return Err(eyre!("Gate {} needs two distinct qubits", gate.name()));
        }
        if let Some(Angle::Param(index)) = gate.angle() {
            self.num_parameters = self.num_parameters.max(index + 1);
        }
        self.gates.push(gate);
        Ok(self)
    }

    pub fn x(&mut self, q: usize) -> Result<&mut Self> {
        self.add(Gate::X(q))
    }

    pub fn h(&mut self, q: usize) -> Result<&mut Self> {
        self.add(Gate::H(q))
    }

    pub fn rx(&mut self, q: usize, angle: Angle) -> Result<&mut Self> {
        self.add(Gate::Rx(q, angle))
    }

    pub fn ry(&mut self, q: usize, angle: Angle) -> Result<&mut Self> {
        self.add(Gate::Ry(q, angle))
    }

    pub fn rz(&mut self, q: usize, angle: Angle) -> Result<&mut Self> {
        self.add(Gate::Rz(q, angle))
    }

    pub fn cx(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.add(Gate::Cx(control, target))
    }

    pub fn cz(&mut self, a: usize, b: usize) -> Result<&mut Self> {
        self.add(Gate::Cz(a, b))
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<&mut Self> {
        self.add(Gate::Swap(a, b))
    }

    /// Append `other`; its parameters are numbered after ours.
    pub fn compose(&self, other: &QuantumCircuit) -> Result<QuantumCircuit> {
        if other.num_qubits != self.num_qubits {
            return Err(eyre!(
                "Cannot compose a {}-qubit circuit onto {} qubits",
                other.num_qubits,
                self.num_qubits
            ));
        }
        let offset = self.num_parameters;
        let mut out = self.clone();
        for gate in &other.gates {
            let gate = match gate.angle() {
                Some(angle) => gate.with_angle(angle.shifted(offset)),
                None => *gate,
            };
            out.add(gate)?;
        }
        out.num_parameters = offset + other.num_parameters;
        Ok(out)
    }

    pub fn check_parameters(&self, params: &[f64]) -> Result<()> {
        if params.len() != self.num_parameters {
            return Err(eyre!(
                "Circuit expects {} parameters, got {}",
                self.num_parameters,
                params.len()
            ));
        }
        Ok(())
    }

    /// How many gates read each parameter.
    pub fn parameter_occurrences(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_parameters];
        for gate in &self.gates {
            if let Some(Angle::Param(index)) = gate.angle() {
                counts[index] += 1;
            }
        }
        counts
    }

    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits];
        for gate in &self.gates {
            let qubits = gate.qubits();
            let next = qubits.iter().map(|&q| layer[q]).max().unwrap_or(0) + 1;
            for q in qubits {
                layer[q] = next;
            }
        }
        layer.into_iter().max().unwrap_or(0)
    }

    pub fn count_ops(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for gate in &self.gates {
            *counts.entry(gate.name()).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for QuantumCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "QuantumCircuit: {} qubits, {} parameters, depth {}",
            self.num_qubits,
            self.num_parameters,
            self.depth()
        )?;
        for gate in &self.gates {
            let qubits: Vec<String> = gate.qubits().iter().map(|q| format!("q{}", q)).collect();
            match gate.angle() {
                Some(Angle::Param(i)) => writeln!(f, "  {}(θ[{}]) {}", gate.name(), i, qubits.join(","))?,
                Some(Angle::Fixed(v)) => writeln!(f, "  {}({:.6}) {}", gate.name(), v, qubits.join(","))?,
                None => writeln!(f, "  {} {}", gate.name(), qubits.join(","))?,
            }
        }
        Ok(())
    }
}
