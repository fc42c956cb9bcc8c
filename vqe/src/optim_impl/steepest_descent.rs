//! Steepest descent with backtracking line search

use super::{check_bounds, project, projected_gradient, Objective, Optimizer, OptimizerResult};
use color_eyre::eyre::{eyre, Result};
use nalgebra::DVector;
use tracing::{info, warn};

/// Steepest descent optimizer
pub struct SteepestDescentOptimizer {
    max_iterations: usize,
    convergence_threshold: f64,
    step_size: f64,
    bounds: Option<Vec<(f64, f64)>>,
}

impl SteepestDescentOptimizer {
    pub fn new(max_iterations: usize, convergence_threshold: f64) -> Self {
        SteepestDescentOptimizer {
            max_iterations,
            convergence_threshold,
            step_size: 1.0,
            bounds: None,
        }
    }

    pub fn set_step_size(&mut self, step_size: f64) {
        self.step_size = step_size;
    }

    pub fn with_bounds(mut self, bounds: Option<Vec<(f64, f64)>>) -> Self {
        self.bounds = bounds;
        self
    }
}

impl Optimizer for SteepestDescentOptimizer {
    fn name(&self) -> &'static str {
        "steepest descent"
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
        if self.step_size <= 0.0 {
            return Err(eyre!("Step size must be positive"));
        }
        let bounds = self.bounds.as_deref();
        check_bounds(bounds, n)?;

        let mut x = project(x0, bounds);
        let mut f = objective.value(&x)?;
        let mut nfev = 1;
        let mut njev = 0;
        let mut history = vec![f];
        let mut step = self.step_size;
        let mut converged = false;
        let mut nit = 0;

        while nit < self.max_iterations {
            let g = objective.gradient(&x)?;
            njev += 1;
            let pg = projected_gradient(&x, &g, bounds);
            if pg.norm() < self.convergence_threshold {
                converged = true;
                break;
            }
            nit += 1;

            let mut accepted = None;
            while step > 1e-14 {
                let trial = project(&(&x - &pg * step), bounds);
                let f_trial = objective.value(&trial)?;
                nfev += 1;
                if f_trial <= f - 1e-4 * pg.dot(&(&x - &trial)).abs() {
                    accepted = Some((trial, f_trial));
                    break;
                }
                step *= 0.5;
            }

            let Some((x_new, f_new)) = accepted else {
                warn!("Steepest descent line search failed at iteration {}", nit);
                break;
            };

            let df = (f - f_new).abs();
            x = x_new;
            f = f_new;
            history.push(f);
            // let the step grow back after a successful move
            step = (2.0 * step).min(self.step_size.max(1.0) * 10.0);

            if df < self.convergence_threshold * 1e-3 {
                converged = true;
                break;
            }
        }

        if converged {
            info!("Steepest descent converged after {} iterations, f = {:.12}", nit, f);
        } else {
            warn!(
                "Steepest descent reached {} iterations without converging",
                nit
            );
        }

        Ok(OptimizerResult {
            x,
            fun: f,
            nfev,
            njev,
            nit,
            converged,
            history,
        })
    }
}
