//! Energy and gradient of a parameterized circuit

use crate::circuit_impl::{QuantumCircuit, Statevector};
use crate::optim_impl::Objective;
use crate::qubit_impl::SparsePauliOp;
use color_eyre::eyre::{eyre, Result};
use nalgebra::DVector;
use rayon::prelude::*;
use std::f64::consts::FRAC_PI_2;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::warn;

const FINITE_DIFFERENCE_STEP: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientMethod {
    /// Exact for rotation gates: ∂E/∂θ = [E(θ + π/2) - E(θ - π/2)] / 2
    ParameterShift,
    /// Central differences with the given step
    FiniteDifference(f64),
}

impl FromStr for GradientMethod {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "parameter_shift" | "param_shift" => Ok(Self::ParameterShift),
            "finite_difference" | "fd" => Ok(Self::FiniteDifference(FINITE_DIFFERENCE_STEP)),
            _ => Err(eyre!("Unknown gradient method: {}", s)),
        }
    }
}

/// `E(θ) = <ψ(θ)|H|ψ(θ)>` as an optimizer objective.
///
/// Every call to `value` is recorded in the cost history; the shifted
/// evaluations behind a gradient are not.
pub struct EnergyEstimator<'a> {
    hamiltonian: &'a SparsePauliOp,
    ansatz: &'a QuantumCircuit,
    gradient: GradientMethod,
    history: Mutex<Vec<f64>>,
}

impl<'a> EnergyEstimator<'a> {
    pub fn new(
        hamiltonian: &'a SparsePauliOp,
        ansatz: &'a QuantumCircuit,
        gradient: GradientMethod,
    ) -> Result<Self> {
        if hamiltonian.num_qubits() != ansatz.num_qubits() {
            return Err(eyre!(
                "Hamiltonian acts on {} qubits but the ansatz has {}",
                hamiltonian.num_qubits(),
                ansatz.num_qubits()
            ));
        }

        // the shift rule needs every parameter to feed exactly one rotation
        let gradient = match gradient {
            GradientMethod::ParameterShift
                if ansatz.parameter_occurrences().iter().any(|&n| n != 1) =>
            {
                warn!("Parameters are shared between gates; using finite differences");
                GradientMethod::FiniteDifference(FINITE_DIFFERENCE_STEP)
            }
            other => other,
        };

        Ok(EnergyEstimator {
            hamiltonian,
            ansatz,
            gradient,
            history: Mutex::new(Vec::new()),
        })
    }

    pub fn gradient_method(&self) -> GradientMethod {
        self.gradient
    }

    pub fn energy(&self, params: &[f64]) -> Result<f64> {
        let state = Statevector::evolve(self.ansatz, params)?;
        state.expectation(self.hamiltonian)
    }

    fn shifted_difference(&self, params: &[f64], index: usize, shift: f64) -> Result<f64> {
        let mut plus = params.to_vec();
        let mut minus = params.to_vec();
        plus[index] += shift;
        minus[index] -= shift;
        Ok(self.energy(&plus)? - self.energy(&minus)?)
    }

    /// Energies passed to `value` so far, in call order.
    pub fn take_history(&self) -> Vec<f64> {
        match self.history.lock() {
            Ok(mut history) => std::mem::take(&mut *history),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Objective for EnergyEstimator<'_> {
    fn dimension(&self) -> usize {
        self.ansatz.num_parameters()
    }

    fn value(&self, x: &DVector<f64>) -> Result<f64> {
        let energy = self.energy(x.as_slice())?;
        if let Ok(mut history) = self.history.lock() {
            history.push(energy);
        }
        Ok(energy)
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        let params = x.as_slice();
        let components: Vec<f64> = (0..params.len())
            .into_par_iter()
            .map(|i| match self.gradient {
                GradientMethod::ParameterShift => {
                    Ok(0.5 * self.shifted_difference(params, i, FRAC_PI_2)?)
                }
                GradientMethod::FiniteDifference(h) => {
                    Ok(self.shifted_difference(params, i, h)? / (2.0 * h))
                }
            })
            .collect::<Result<_>>()?;
        Ok(DVector::from_vec(components))
    }
}
