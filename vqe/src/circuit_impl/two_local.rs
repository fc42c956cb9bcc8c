//! Two-local variational form and reference-state preparation

use super::circuit::{Angle, QuantumCircuit};
use color_eyre::eyre::{eyre, Result};
use itertools::Itertools;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationBlock {
    Rx,
    Ry,
    Rz,
    H,
    X,
}

impl RotationBlock {
    pub fn is_parameterized(&self) -> bool {
        matches!(self, RotationBlock::Rx | RotationBlock::Ry | RotationBlock::Rz)
    }
}

impl FromStr for RotationBlock {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rx" => Ok(Self::Rx),
            "ry" => Ok(Self::Ry),
            "rz" => Ok(Self::Rz),
            "h" => Ok(Self::H),
            "x" => Ok(Self::X),
            _ => Err(eyre!("Unknown rotation gate: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntanglementBlock {
    Cx,
    Cz,
    Swap,
}

impl FromStr for EntanglementBlock {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cx" | "cnot" => Ok(Self::Cx),
            "cz" => Ok(Self::Cz),
            "swap" => Ok(Self::Swap),
            _ => Err(eyre!("Unknown entanglement gate: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entanglement {
    Linear,
    ReverseLinear,
    Circular,
    Full,
}

impl Entanglement {
    /// Qubit pairs of one entangling layer, in application order.
    pub fn pairs(&self, num_qubits: usize) -> Vec<(usize, usize)> {
        let linear: Vec<(usize, usize)> = (1..num_qubits).map(|i| (i - 1, i)).collect();
        match self {
            Entanglement::Linear => linear,
            Entanglement::ReverseLinear => linear.into_iter().rev().collect(),
            Entanglement::Circular => {
                if num_qubits > 2 {
                    std::iter::once((num_qubits - 1, 0)).chain(linear).collect()
                } else {
                    linear
                }
            }
            Entanglement::Full => (0..num_qubits).tuple_combinations().collect(),
        }
    }
}

impl FromStr for Entanglement {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "linear" => Ok(Self::Linear),
            "reverse_linear" => Ok(Self::ReverseLinear),
            "circular" => Ok(Self::Circular),
            "full" => Ok(Self::Full),
            _ => Err(eyre!("Unknown entanglement: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialStateKind {
    HartreeFock,
    Zero,
}

impl FromStr for InitialStateKind {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "hartree_fock" | "hf" => Ok(Self::HartreeFock),
            "zero" | "none" => Ok(Self::Zero),
            _ => Err(eyre!("Unknown initial state: {}", s)),
        }
    }
}

/// X gates on every qubit set in `bits` (index = qubit).
pub fn hartree_fock_state(bits: &[bool]) -> Result<QuantumCircuit> {
    let mut circuit = QuantumCircuit::new(bits.len());
    for (qubit, &set) in bits.iter().enumerate() {
        if set {
            circuit.x(qubit)?;
        }
    }
    Ok(circuit)
}

/// Alternating rotation and entanglement layers:
/// `reps` times [rotations, entanglers], then a final rotation layer.
#[derive(Debug, Clone)]
pub struct TwoLocal {
    pub num_qubits: usize,
    pub rotation_blocks: Vec<RotationBlock>,
    pub entanglement_blocks: Vec<EntanglementBlock>,
    pub entanglement: Entanglement,
    pub reps: usize,
    pub skip_final_rotation_layer: bool,
    pub initial_state: Option<QuantumCircuit>,
}

impl TwoLocal {
    pub fn new(
        num_qubits: usize,
        rotation_blocks: Vec<RotationBlock>,
        entanglement_blocks: Vec<EntanglementBlock>,
        entanglement: Entanglement,
        reps: usize,
    ) -> Self {
        TwoLocal {
            num_qubits,
            rotation_blocks,
            entanglement_blocks,
            entanglement,
            reps,
            skip_final_rotation_layer: false,
            initial_state: None,
        }
    }

    pub fn with_initial_state(mut self, initial_state: QuantumCircuit) -> Self {
        self.initial_state = Some(initial_state);
        self
    }

    pub fn with_skip_final_rotation_layer(mut self, skip: bool) -> Self {
        self.skip_final_rotation_layer = skip;
        self
    }

    fn num_rotation_layers(&self) -> usize {
        if self.skip_final_rotation_layer {
            self.reps
        } else {
            self.reps + 1
        }
    }

    pub fn num_parameters(&self) -> usize {
        let per_layer = self
            .rotation_blocks
            .iter()
            .filter(|b| b.is_parameterized())
            .count()
            * self.num_qubits;
        per_layer * self.num_rotation_layers()
    }

    fn rotation_layer(&self, circuit: &mut QuantumCircuit, next_param: &mut usize) -> Result<()> {
        for block in &self.rotation_blocks {
            for q in 0..self.num_qubits {
                match block {
                    RotationBlock::H => {
                        circuit.h(q)?;
                    }
                    RotationBlock::X => {
                        circuit.x(q)?;
                    }
                    parameterized => {
                        let angle = Angle::Param(*next_param);
                        *next_param += 1;
                        match parameterized {
                            RotationBlock::Rx => circuit.rx(q, angle)?,
                            RotationBlock::Ry => circuit.ry(q, angle)?,
                            _ => circuit.rz(q, angle)?,
                        };
                    }
                }
            }
        }
        Ok(())
    }

    fn entanglement_layer(&self, circuit: &mut QuantumCircuit) -> Result<()> {
        for block in &self.entanglement_blocks {
            for (a, b) in self.entanglement.pairs(self.num_qubits) {
                match block {
                    EntanglementBlock::Cx => circuit.cx(a, b)?,
                    EntanglementBlock::Cz => circuit.cz(a, b)?,
                    EntanglementBlock::Swap => circuit.swap(a, b)?,
                };
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Result<QuantumCircuit> {
        if self.num_qubits == 0 {
            return Err(eyre!("A two-local circuit needs at least one qubit"));
        }
        if self.rotation_blocks.is_empty() {
            return Err(eyre!("A two-local circuit needs at least one rotation gate"));
        }

        let mut ansatz = QuantumCircuit::new(self.num_qubits);
        let mut next_param = 0;
        for _ in 0..self.reps {
            self.rotation_layer(&mut ansatz, &mut next_param)?;
            self.entanglement_layer(&mut ansatz)?;
        }
        if !self.skip_final_rotation_layer {
            self.rotation_layer(&mut ansatz, &mut next_param)?;
        }

        match &self.initial_state {
            Some(initial) => initial.compose(&ansatz),
            None => Ok(ansatz),
        }
    }
}
