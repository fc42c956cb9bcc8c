//! Tests for the classical optimizers

use super::*;
use nalgebra::DVector;
use std::cell::Cell;

struct Rosenbrock;

impl Objective for Rosenbrock {
    fn dimension(&self) -> usize {
        2
    }

    fn value(&self, x: &DVector<f64>) -> Result<f64> {
        Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2))
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        Ok(DVector::from_vec(vec![
            -2.0 * (1.0 - x[0]) - 400.0 * x[0] * (x[1] - x[0] * x[0]),
            200.0 * (x[1] - x[0] * x[0]),
        ]))
    }
}

/// Σ w_i (x_i - c_i)², counting evaluations
struct Quadratic {
    center: Vec<f64>,
    weights: Vec<f64>,
    evaluations: Cell<usize>,
}

impl Quadratic {
    fn new(center: &[f64], weights: &[f64]) -> Self {
        Quadratic {
            center: center.to_vec(),
            weights: weights.to_vec(),
            evaluations: Cell::new(0),
        }
    }
}

impl Objective for Quadratic {
    fn dimension(&self) -> usize {
        self.center.len()
    }

    fn value(&self, x: &DVector<f64>) -> Result<f64> {
        self.evaluations.set(self.evaluations.get() + 1);
        Ok((0..x.len())
            .map(|i| self.weights[i] * (x[i] - self.center[i]).powi(2))
            .sum())
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        Ok(DVector::from_fn(x.len(), |i, _| {
            2.0 * self.weights[i] * (x[i] - self.center[i])
        }))
    }
}

#[test]
fn test_optimizer_names() {
    let settings = OptimizerSettings::default();
    assert_eq!(create_optimizer("SLSQP", &settings).unwrap().name(), "SLSQP");
    assert_eq!(create_optimizer("spsa", &settings).unwrap().name(), "SPSA");
    assert_eq!(
        create_optimizer("sd", &settings).unwrap().name(),
        "steepest descent"
    );
    assert!(create_optimizer("cobyla", &settings).is_err());
}

#[test]
fn test_slsqp_rosenbrock() {
    let mut optimizer = SlsqpOptimizer::new(3000, 1e-10);
    let result = optimizer
        .minimize(&Rosenbrock, &DVector::from_vec(vec![-1.2, 1.0]))
        .unwrap();
    assert!(result.converged);
    assert!((result.x[0] - 1.0).abs() < 1e-3, "x = {}", result.x);
    assert!((result.x[1] - 1.0).abs() < 2e-3, "x = {}", result.x);
    assert!(result.fun < 1e-8);
    assert!(result.nit < 3000);
    assert!(result.history.len() <= result.nit + 1);
}

#[test]
fn test_slsqp_quadratic_is_fast() {
    let objective = Quadratic::new(&[1.0, -2.0, 0.5], &[1.0, 4.0, 0.25]);
    let mut optimizer = SlsqpOptimizer::new(100, 1e-10);
    let result = optimizer
        .minimize(&objective, &DVector::zeros(3))
        .unwrap();
    assert!(result.converged);
    assert!(result.fun < 1e-12);
    assert!(result.nit < 30);
    assert_eq!(result.nfev, objective.evaluations.get());
}

#[test]
fn test_slsqp_respects_bounds() {
    let objective = Quadratic::new(&[3.0, -1.0, 0.5], &[1.0, 1.0, 1.0]);
    let mut optimizer =
        SlsqpOptimizer::new(200, 1e-10).with_bounds(Some(vec![(0.0, 2.0); 3]));
    let result = optimizer
        .minimize(&objective, &DVector::from_vec(vec![1.0, 1.0, 1.0]))
        .unwrap();
    assert!(result.converged);
    assert!((result.x[0] - 2.0).abs() < 1e-8);
    assert!(result.x[1].abs() < 1e-8);
    assert!((result.x[2] - 0.5).abs() < 1e-5);
    assert!((result.fun - 2.0).abs() < 1e-8);
}

#[test]
fn test_bad_inputs_are_rejected() {
    let objective = Quadratic::new(&[0.0, 0.0], &[1.0, 1.0]);
    let mut optimizer = SlsqpOptimizer::new(10, 1e-6);
    assert!(optimizer.minimize(&objective, &DVector::zeros(3)).is_err());

    let mut inverted = SlsqpOptimizer::new(10, 1e-6).with_bounds(Some(vec![(1.0, 0.0); 2]));
    assert!(inverted.minimize(&objective, &DVector::zeros(2)).is_err());

    let mut short = SteepestDescentOptimizer::new(10, 1e-6).with_bounds(Some(vec![(0.0, 1.0)]));
    assert!(short.minimize(&objective, &DVector::zeros(2)).is_err());
}

#[test]
fn test_steepest_descent_quadratic() {
    let objective = Quadratic::new(&[1.0, -0.5], &[1.0, 3.0]);
    let mut optimizer = SteepestDescentOptimizer::new(2000, 1e-8);
    optimizer.set_step_size(0.1);
    let result = optimizer.minimize(&objective, &DVector::zeros(2)).unwrap();
    assert!(result.converged);
    assert!((result.x[0] - 1.0).abs() < 1e-4);
    assert!((result.x[1] + 0.5).abs() < 1e-4);
    assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn test_spsa_is_seeded_and_converges() {
    let objective = Quadratic::new(&[1.0, -0.5], &[1.0, 1.0]);
    let run = |seed| {
        let mut spsa = SpsaOptimizer::new(500, seed);
        spsa.minimize(&objective, &DVector::zeros(2)).unwrap()
    };

    let first = run(7);
    let second = run(7);
    assert_eq!(first.x, second.x);
    assert_eq!(first.nit, 500);
    assert_eq!(first.njev, 0);
    // 25 calibration pairs, two evaluations per step, one final value
    assert_eq!(first.nfev, 50 + 1000 + 1);
    assert!((first.x[0] - 1.0).abs() < 1e-2, "x = {}", first.x);
    assert!((first.x[1] + 0.5).abs() < 1e-2, "x = {}", first.x);
}

#[test]
fn test_spsa_fixed_learning_rate_skips_calibration() {
    let objective = Quadratic::new(&[0.3], &[1.0]);
    let settings = OptimizerSettings {
        max_iterations: 200,
        learning_rate: Some(0.2),
        perturbation: 0.1,
        tolerance: 0.0,
        ..OptimizerSettings::default()
    };
    let mut spsa = create_optimizer("spsa", &settings).unwrap();
    let result = spsa.minimize(&objective, &DVector::zeros(1)).unwrap();
    assert_eq!(result.nfev, 2 * 200 + 1);
    assert!((result.x[0] - 0.3).abs() < 1e-3);
}
