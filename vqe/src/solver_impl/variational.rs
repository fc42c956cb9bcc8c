//! Variational quantum eigensolver

use super::estimator::{EnergyEstimator, GradientMethod};
use crate::circuit_impl::QuantumCircuit;
use crate::optim_impl::{Optimizer, OptimizerResult};
use crate::qubit_impl::SparsePauliOp;
use color_eyre::eyre::{eyre, Result};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum InitialPoint {
    Zero,
    /// Uniform in [-2π, 2π]
    Random,
    Given(Vec<f64>),
}

impl FromStr for InitialPoint {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero" | "zeros" => Ok(Self::Zero),
            "random" => Ok(Self::Random),
            _ => Err(eyre!("Unknown initial point: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VqeResult {
    pub eigenvalue: f64,
    pub optimal_point: DVector<f64>,
    pub optimizer_result: OptimizerResult,
    /// Every energy the optimizer asked for during the winning run
    pub cost_history: Vec<f64>,
    /// Energy evaluations across all restarts
    pub cost_function_evals: usize,
}

pub struct Vqe {
    ansatz: QuantumCircuit,
    optimizer: Box<dyn Optimizer>,
    initial_point: InitialPoint,
    gradient: GradientMethod,
    restarts: usize,
    seed: u64,
}

impl Vqe {
    pub fn new(ansatz: QuantumCircuit, optimizer: Box<dyn Optimizer>) -> Self {
        Vqe {
            ansatz,
            optimizer,
            initial_point: InitialPoint::Random,
            gradient: GradientMethod::ParameterShift,
            restarts: 1,
            seed: 42,
        }
    }

    pub fn with_initial_point(mut self, initial_point: InitialPoint) -> Self {
        self.initial_point = initial_point;
        self
    }

    pub fn with_gradient(mut self, gradient: GradientMethod) -> Self {
        self.gradient = gradient;
        self
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn ansatz(&self) -> &QuantumCircuit {
        &self.ansatz
    }

    /// Starting point of run `restart`; later restarts are always random.
    fn starting_point(&self, restart: usize) -> Result<DVector<f64>> {
        let n = self.ansatz.num_parameters();
        match &self.initial_point {
            InitialPoint::Given(values) if restart == 0 => {
                if values.len() != n {
                    return Err(eyre!(
                        "Initial point has {} entries, the ansatz has {} parameters",
                        values.len(),
                        n
                    ));
                }
                Ok(DVector::from_column_slice(values))
            }
            InitialPoint::Zero if restart == 0 => Ok(DVector::zeros(n)),
            _ => {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(restart as u64));
                Ok(DVector::from_fn(n, |_, _| rng.gen_range(-2.0 * PI..=2.0 * PI)))
            }
        }
    }

    pub fn compute_minimum_eigenvalue(&mut self, hamiltonian: &SparsePauliOp) -> Result<VqeResult> {
        let estimator = EnergyEstimator::new(hamiltonian, &self.ansatz, self.gradient)?;
        info!(
            "VQE: {} qubits, {} parameters, optimizer {}, gradient {:?}",
            self.ansatz.num_qubits(),
            self.ansatz.num_parameters(),
            self.optimizer.name(),
            estimator.gradient_method()
        );

        let mut best: Option<(OptimizerResult, Vec<f64>)> = None;
        let mut total_evals = 0;
        for restart in 0..self.restarts {
            let x0 = self.starting_point(restart)?;
            let result = self.optimizer.minimize(&estimator, &x0)?;
            let history = estimator.take_history();
            total_evals += history.len();
            info!(
                "  run {}: E = {:.12} Ha after {} iterations ({} evaluations)",
                restart + 1,
                result.fun,
                result.nit,
                history.len()
            );

            let improves = best
                .as_ref()
                .map_or(true, |(current, _)| result.fun < current.fun);
            if improves {
                best = Some((result, history));
            }
        }

        let (optimizer_result, cost_history) =
            best.ok_or_else(|| eyre!("VQE performed no optimization run"))?;
        Ok(VqeResult {
            eigenvalue: optimizer_result.fun,
            optimal_point: optimizer_result.x.clone(),
            optimizer_result,
            cost_history,
            cost_function_evals: total_evals,
        })
    }
}
