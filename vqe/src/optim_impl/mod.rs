//! Classical optimizers for variational parameters
//!
//! This module contains the optimizers driving the variational loop: a
//! sequential quadratic programming method (SLSQP-like, bounds only), SPSA
//! and steepest descent with backtracking.

mod slsqp;
mod spsa;
mod steepest_descent;
#[cfg(test)]
mod tests;

pub use slsqp::SlsqpOptimizer;
pub use spsa::SpsaOptimizer;
pub use steepest_descent::SteepestDescentOptimizer;

use color_eyre::eyre::{eyre, Result};
use nalgebra::DVector;
use std::str::FromStr;

/// A scalar function of the parameter vector with its gradient.
pub trait Objective {
    fn dimension(&self) -> usize;
    fn value(&self, x: &DVector<f64>) -> Result<f64>;
    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>>;
}

#[derive(Debug, Clone)]
pub struct OptimizerResult {
    pub x: DVector<f64>,
    pub fun: f64,
    /// Function evaluations
    pub nfev: usize,
    /// Gradient evaluations
    pub njev: usize,
    pub nit: usize,
    pub converged: bool,
    /// Objective value after each iteration
    pub history: Vec<f64>,
}

/// Trait for minimizers of an `Objective`
pub trait Optimizer {
    fn name(&self) -> &'static str;

    fn minimize(&mut self, objective: &dyn Objective, x0: &DVector<f64>)
        -> Result<OptimizerResult>;
}

/// Settings shared by every optimizer; each one reads what it needs.
#[derive(Debug, Clone)]
pub struct OptimizerSettings {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub learning_rate: Option<f64>,
    pub perturbation: f64,
    pub seed: u64,
    /// Box bounds per parameter
    pub bounds: Option<Vec<(f64, f64)>>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            max_iterations: 3000,
            tolerance: 1e-6,
            learning_rate: None,
            perturbation: 0.2,
            seed: 42,
            bounds: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerKind {
    Slsqp,
    Spsa,
    SteepestDescent,
}

impl FromStr for OptimizerKind {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slsqp" => Ok(Self::Slsqp),
            "spsa" => Ok(Self::Spsa),
            "sd" | "steepest_descent" => Ok(Self::SteepestDescent),
            _ => Err(eyre!("Unknown optimizer: {}", s)),
        }
    }
}

/// Create an optimizer based on algorithm choice
pub fn create_optimizer(
    algorithm: &str,
    settings: &OptimizerSettings,
) -> Result<Box<dyn Optimizer>> {
    let optimizer: Box<dyn Optimizer> = match algorithm.parse::<OptimizerKind>()? {
        OptimizerKind::Slsqp => Box::new(
            SlsqpOptimizer::new(settings.max_iterations, settings.tolerance)
                .with_bounds(settings.bounds.clone()),
        ),
        OptimizerKind::Spsa => {
            let mut spsa = SpsaOptimizer::new(settings.max_iterations, settings.seed);
            spsa.learning_rate = settings.learning_rate;
            spsa.perturbation = settings.perturbation;
            spsa.tolerance = settings.tolerance;
            Box::new(spsa)
        }
        OptimizerKind::SteepestDescent => {
            let mut sd = SteepestDescentOptimizer::new(settings.max_iterations, settings.tolerance);
            if let Some(step) = settings.learning_rate {
                sd.set_step_size(step);
            }
            Box::new(sd.with_bounds(settings.bounds.clone()))
        }
    };
    Ok(optimizer)
}

/// Clamp `x` into the box, if any.
pub(crate) fn project(x: &DVector<f64>, bounds: Option<&[(f64, f64)]>) -> DVector<f64> {
    match bounds {
        Some(b) => DVector::from_fn(x.len(), |i, _| x[i].clamp(b[i].0, b[i].1)),
        None => x.clone(),
    }
}

/// Coordinates sitting on a bound with the gradient pushing outward.
pub(crate) fn active_set(
    x: &DVector<f64>,
    g: &DVector<f64>,
    bounds: Option<&[(f64, f64)]>,
) -> Vec<bool> {
    match bounds {
        Some(b) => (0..x.len())
            .map(|i| (x[i] <= b[i].0 && g[i] > 0.0) || (x[i] >= b[i].1 && g[i] < 0.0))
            .collect(),
        None => vec![false; x.len()],
    }
}

/// Gradient with the active components zeroed.
pub(crate) fn projected_gradient(
    x: &DVector<f64>,
    g: &DVector<f64>,
    bounds: Option<&[(f64, f64)]>,
) -> DVector<f64> {
    let active = active_set(x, g, bounds);
    DVector::from_fn(x.len(), |i, _| if active[i] { 0.0 } else { g[i] })
}

pub(crate) fn check_bounds(bounds: Option<&[(f64, f64)]>, dimension: usize) -> Result<()> {
    if let Some(b) = bounds {
        if b.len() != dimension {
            return Err(eyre!(
                "{} bounds given for {} parameters",
                b.len(),
                dimension
            ));
        }
        if let Some((i, _)) = b.iter().enumerate().find(|(_, (lo, hi))| lo > hi) {
            return Err(eyre!("Empty bound interval for parameter {}", i));
        }
    }
    Ok(())
}
