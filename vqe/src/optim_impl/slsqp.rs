//! Sequential quadratic programming with box bounds

use super::{
    active_set, check_bounds, project, projected_gradient, Objective, Optimizer, OptimizerResult,
};
use color_eyre::eyre::{eyre, Result};
use nalgebra::{DMatrix, DVector};
use tracing::{info, warn};

const ARMIJO: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 30;

/// Quasi-Newton SQP minimizer.
///
/// Each iteration solves the quadratic model `min gᵀd + ½dᵀBd` for the step,
/// with coordinates pinned at an active bound removed from the model. `B` is
/// a BFGS approximation of the Hessian, damped (Powell) so it stays positive
/// definite. The step length comes from Armijo backtracking with quadratic
/// interpolation.
pub struct SlsqpOptimizer {
    max_iterations: usize,
    ftol: f64,
    bounds: Option<Vec<(f64, f64)>>,
}

impl SlsqpOptimizer {
    pub fn new(max_iterations: usize, ftol: f64) -> Self {
        SlsqpOptimizer {
            max_iterations,
            ftol,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Option<Vec<(f64, f64)>>) -> Self {
        self.bounds = bounds;
        self
    }

    fn bounds(&self) -> Option<&[(f64, f64)]> {
        self.bounds.as_deref()
    }

    /// Newton step on the free coordinates; pinned coordinates do not move.
    fn qp_step(&self, hessian: &DMatrix<f64>, x: &DVector<f64>, g: &DVector<f64>) -> DVector<f64> {
        let active = active_set(x, g, self.bounds());
        let free: Vec<usize> = (0..x.len()).filter(|&i| !active[i]).collect();

        let mut step = DVector::zeros(x.len());
        if free.is_empty() {
            return step;
        }
        let reduced = hessian.select_rows(&free).select_columns(&free);
        let rhs = DVector::from_fn(free.len(), |k, _| -g[free[k]]);
        let solved = match reduced.cholesky() {
            Some(chol) => chol.solve(&rhs),
            None => rhs,
        };
        for (k, &i) in free.iter().enumerate() {
            step[i] = solved[k];
        }
        step
    }

    /// Damped BFGS update of `b` with step `s` and gradient change `y`.
    fn update_hessian(b: &mut DMatrix<f64>, s: &DVector<f64>, y: &DVector<f64>) {
        let bs = &*b * s;
        let sbs = s.dot(&bs);
        if sbs <= f64::EPSILON {
            return;
        }
        let sy = s.dot(y);
        let theta = if sy >= 0.2 * sbs {
            1.0
        } else {
            0.8 * sbs / (sbs - sy)
        };
        let r = y * theta + &bs * (1.0 - theta);
        let sr = s.dot(&r);
        if sr <= f64::EPSILON {
            return;
        }
        *b += &r * r.transpose() / sr - &bs * bs.transpose() / sbs;
    }
}

impl Optimizer for SlsqpOptimizer {
    fn name(&self) -> &'static str {
        "SLSQP"
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
        check_bounds(self.bounds(), n)?;

        let mut x = project(x0, self.bounds());
        let mut f = objective.value(&x)?;
        let mut g = objective.gradient(&x)?;
        let mut nfev = 1;
        let mut njev = 1;
        let mut hessian = DMatrix::identity(n, n);
        let mut history = vec![f];
        let mut converged = false;
        let mut nit = 0;

        let gtol = self.ftol.sqrt();

        while nit < self.max_iterations {
            if projected_gradient(&x, &g, self.bounds()).amax() < self.ftol {
                converged = true;
                break;
            }
            nit += 1;

            let mut direction = self.qp_step(&hessian, &x, &g);
            let mut slope = g.dot(&direction);
            if slope >= 0.0 {
                // model lost curvature
                hessian = DMatrix::identity(n, n);
                direction = -projected_gradient(&x, &g, self.bounds());
                slope = g.dot(&direction);
            }

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let trial = project(&(&x + &direction * alpha), self.bounds());
                let f_trial = objective.value(&trial)?;
                nfev += 1;
                let decrease = g.dot(&(&trial - &x));
                if f_trial <= f + ARMIJO * decrease {
                    accepted = Some((trial, f_trial));
                    break;
                }
                let denom = 2.0 * (f_trial - f - slope * alpha);
                let interpolated = if denom > 0.0 {
                    -slope * alpha * alpha / denom
                } else {
                    0.5 * alpha
                };
                alpha = interpolated.clamp(0.1 * alpha, 0.5 * alpha);
            }

            let Some((x_new, f_new)) = accepted else {
                let pg = projected_gradient(&x, &g, self.bounds()).norm();
                converged = pg < gtol;
                if !converged {
                    warn!("SLSQP line search failed (|pg| = {:.3e})", pg);
                }
                break;
            };

            let g_new = objective.gradient(&x_new)?;
            njev += 1;

            let s = &x_new - &x;
            let y = &g_new - &g;
            Self::update_hessian(&mut hessian, &s, &y);

            let df = (f - f_new).abs();
            x = x_new;
            f = f_new;
            g = g_new;
            history.push(f);

            if df < self.ftol && projected_gradient(&x, &g, self.bounds()).norm() < gtol {
                converged = true;
                break;
            }
        }

        if converged {
            info!("SLSQP converged after {} iterations, f = {:.12}", nit, f);
        } else {
            warn!("SLSQP stopped after {} iterations without converging", nit);
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
