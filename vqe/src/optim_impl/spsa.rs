//! Simultaneous perturbation stochastic approximation

use super::{Objective, Optimizer, OptimizerResult};
use color_eyre::eyre::{eyre, Result};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use tracing::info;

const CALIBRATION_STEPS: usize = 25;

/// SPSA with the usual power-law gain sequences
/// `a_k = a / (k + 1 + A)^alpha` and `c_k = c / (k + 1)^gamma`.
///
/// When no learning rate is given, `a` is calibrated so the first update
/// moves each parameter by about 2π/10.
pub struct SpsaOptimizer {
    pub max_iterations: usize,
    pub learning_rate: Option<f64>,
    pub perturbation: f64,
    pub alpha: f64,
    pub gamma: f64,
    pub stability_constant: f64,
    /// Stop once an update moves the parameters less than this
    pub tolerance: f64,
    seed: u64,
}

impl SpsaOptimizer {
    pub fn new(max_iterations: usize, seed: u64) -> Self {
        SpsaOptimizer {
            max_iterations,
            learning_rate: None,
            perturbation: 0.2,
            alpha: 0.602,
            gamma: 0.101,
            stability_constant: 0.0,
            tolerance: 0.0,
            seed,
        }
    }

    fn random_direction(rng: &mut StdRng, n: usize) -> DVector<f64> {
        DVector::from_fn(n, |_, _| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
    }

    fn calibrate(
        &self,
        objective: &dyn Objective,
        x: &DVector<f64>,
        rng: &mut StdRng,
        nfev: &mut usize,
    ) -> Result<f64> {
        let c = self.perturbation;
        let mut magnitude = 0.0;
        for _ in 0..CALIBRATION_STEPS {
            let delta = Self::random_direction(rng, x.len());
            let plus = objective.value(&(x + &delta * c))?;
            let minus = objective.value(&(x - &delta * c))?;
            *nfev += 2;
            magnitude += (plus - minus).abs() / (2.0 * c);
        }
        magnitude /= CALIBRATION_STEPS as f64;

        let target = 2.0 * PI / 10.0;
        let a = if magnitude < 1e-12 {
            target
        } else {
            target * (self.stability_constant + 1.0).powf(self.alpha) / magnitude
        };
        info!("SPSA calibrated learning rate a = {:.6}", a);
        Ok(a)
    }
}

impl Optimizer for SpsaOptimizer {
    fn name(&self) -> &'static str {
        "SPSA"
    }

    fn minimize(
        &mut self,
        objective: &dyn Objective,
        x0: &DVector<f64>,
    ) -> Result<OptimizerResult> {
        let n = objective.dimension();
        if x0.len() != n {
            return Err(eyre!("Initial point has {} entries, expected {}", x0.len(), n));
        }
        if self.perturbation <= 0.0 {
            return Err(eyre!("SPSA perturbation must be positive"));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut nfev = 0;
        let a = match self.learning_rate {
            Some(a) => a,
            None => self.calibrate(objective, x0, &mut rng, &mut nfev)?,
        };

        let mut x = x0.clone();
        let mut history = Vec::with_capacity(self.max_iterations);
        let mut converged = false;
        let mut nit = 0;

        for k in 0..self.max_iterations {
            nit = k + 1;
            let ak = a / (k as f64 + 1.0 + self.stability_constant).powf(self.alpha);
            let ck = self.perturbation / (k as f64 + 1.0).powf(self.gamma);

            let delta = Self::random_direction(&mut rng, n);
            let plus = objective.value(&(&x + &delta * ck))?;
            let minus = objective.value(&(&x - &delta * ck))?;
            nfev += 2;

            // 1/Δ_i = Δ_i for ±1 perturbations
            let gradient = &delta * ((plus - minus) / (2.0 * ck));
            let update = gradient * ak;
            x -= &update;
            history.push(0.5 * (plus + minus));

            if update.norm() < self.tolerance {
                converged = true;
                break;
            }
        }

        let fun = objective.value(&x)?;
        nfev += 1;
        info!("SPSA finished after {} iterations, f = {:.12}", nit, fun);

        Ok(OptimizerResult {
            x,
            fun,
            nfev,
            njev: 0,
            nit,
            converged,
            history,
        })
    }
}
