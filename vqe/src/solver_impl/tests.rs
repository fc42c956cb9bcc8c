//! Tests for the eigensolvers

use super::*;
use crate::circuit_impl::{
    hartree_fock_state, Angle, Entanglement, EntanglementBlock, QuantumCircuit, RotationBlock,
    TwoLocal,
};
use crate::optim_impl::{create_optimizer, Objective, OptimizerSettings};
use crate::qubit_impl::SparsePauliOp;
use nalgebra::DVector;
use num_complex::Complex64;

const H2_EXACT_ELECTRONIC: f64 = -1.857275030;

fn real(value: f64) -> Complex64 {
    Complex64::new(value, 0.0)
}

/// Parity-mapped, two-qubit-reduced H2 at 0.735 Å (STO-3G)
fn h2_hamiltonian() -> SparsePauliOp {
    SparsePauliOp::from_list(&[
        ("II", real(-1.052373245772859)),
        ("IZ", real(0.39793742484318045)),
        ("ZI", real(-0.39793742484318045)),
        ("ZZ", real(-0.01128010425623538)),
        ("XX", real(0.18093119978423156)),
    ])
    .unwrap()
}

fn h2_ansatz() -> QuantumCircuit {
    TwoLocal::new(
        2,
        vec![RotationBlock::Ry],
        vec![EntanglementBlock::Cz],
        Entanglement::Linear,
        1,
    )
    .with_initial_state(hartree_fock_state(&[true, false]).unwrap())
    .build()
    .unwrap()
}

#[test]
fn test_gradient_method_names() {
    assert_eq!(
        "parameter_shift".parse::<GradientMethod>().unwrap(),
        GradientMethod::ParameterShift
    );
    assert!(matches!(
        "finite-difference".parse::<GradientMethod>().unwrap(),
        GradientMethod::FiniteDifference(_)
    ));
    assert!("adjoint".parse::<GradientMethod>().is_err());
    assert_eq!("zero".parse::<InitialPoint>().unwrap(), InitialPoint::Zero);
    assert!("ones".parse::<InitialPoint>().is_err());
}

#[test]
fn test_hartree_fock_energy_at_zero_angles() {
    let hamiltonian = h2_hamiltonian();
    let ansatz = h2_ansatz();
    let estimator =
        EnergyEstimator::new(&hamiltonian, &ansatz, GradientMethod::ParameterShift).unwrap();
    let hf = -1.052373245772859 - 2.0 * 0.39793742484318045 + 0.01128010425623538;
    assert!((estimator.energy(&[0.0; 4]).unwrap() - hf).abs() < 1e-12);
}

#[test]
fn test_parameter_shift_matches_finite_difference() {
    let hamiltonian = h2_hamiltonian();
    let ansatz = h2_ansatz();
    let shift = EnergyEstimator::new(&hamiltonian, &ansatz, GradientMethod::ParameterShift).unwrap();
    let fd = EnergyEstimator::new(&hamiltonian, &ansatz, GradientMethod::FiniteDifference(1e-5))
        .unwrap();

    let x = DVector::from_vec(vec![0.3, -1.2, 2.5, 0.7]);
    let exact = shift.gradient(&x).unwrap();
    let approx = fd.gradient(&x).unwrap();
    assert!((exact - approx).amax() < 1e-7);

    // gradients never enter the cost history
    assert!(shift.take_history().is_empty());
    shift.value(&x).unwrap();
    assert_eq!(shift.take_history().len(), 1);
}

#[test]
fn test_shared_parameters_fall_back_to_finite_difference() {
    let hamiltonian = SparsePauliOp::from_list(&[("Z", real(1.0))]).unwrap();
    let mut circuit = QuantumCircuit::new(1);
    circuit
        .ry(0, Angle::Param(0))
        .unwrap()
        .ry(0, Angle::Param(0))
        .unwrap();
    let estimator =
        EnergyEstimator::new(&hamiltonian, &circuit, GradientMethod::ParameterShift).unwrap();
    assert!(matches!(
        estimator.gradient_method(),
        GradientMethod::FiniteDifference(_)
    ));

    // E = cos(2θ), dE/dθ = -2 sin(2θ)
    let g = estimator.gradient(&DVector::from_vec(vec![0.4])).unwrap();
    assert!((g[0] + 2.0 * (0.8f64).sin()).abs() < 1e-6);
}

#[test]
fn test_estimator_rejects_mismatched_sizes() {
    let hamiltonian = SparsePauliOp::identity(3);
    let ansatz = h2_ansatz();
    assert!(EnergyEstimator::new(&hamiltonian, &ansatz, GradientMethod::ParameterShift).is_err());
}

#[test]
fn test_exact_h2_ground_state() {
    let result = ExactEigensolver::new()
        .compute_minimum_eigenvalue(&h2_hamiltonian())
        .unwrap();
    assert!((result.eigenvalue - H2_EXACT_ELECTRONIC).abs() < 1e-6);
    assert_eq!(result.level, 0);
    assert!((result.eigenstate.norm() - 1.0).abs() < 1e-10);
}

#[test]
fn test_exact_filter_skips_other_sectors() {
    let z = SparsePauliOp::from_list(&[("Z", real(1.0))]).unwrap();
    let occupation =
        SparsePauliOp::from_list(&[("I", real(0.5)), ("Z", real(-0.5))]).unwrap();

    let unfiltered = ExactEigensolver::new().compute_minimum_eigenvalue(&z).unwrap();
    assert!((unfiltered.eigenvalue + 1.0).abs() < 1e-12);

    let empty = ExactEigensolver::new()
        .with_filter(occupation.clone(), 0.0)
        .compute_minimum_eigenvalue(&z)
        .unwrap();
    assert!((empty.eigenvalue - 1.0).abs() < 1e-12);
    assert_eq!(empty.level, 1);

    let impossible = ExactEigensolver::new().with_filter(occupation, 0.5);
    assert!(impossible.compute_minimum_eigenvalue(&z).is_err());
}

#[test]
fn test_exact_filter_resolves_degenerate_levels() {
    // every state is degenerate; the filter picks qubit 0 occupied
    let flat = SparsePauliOp::identity(2);
    let occupation =
        SparsePauliOp::from_list(&[("II", real(0.5)), ("IZ", real(-0.5))]).unwrap();
    let result = ExactEigensolver::new()
        .with_filter(occupation, 1.0)
        .compute_minimum_eigenvalue(&flat)
        .unwrap();
    assert!((result.eigenvalue - 1.0).abs() < 1e-12);
    let weight_on_qubit0: f64 = [1, 3].iter().map(|&b| result.eigenstate[b].norm_sqr()).sum();
    assert!((weight_on_qubit0 - 1.0).abs() < 1e-8);
}

#[test]
fn test_vqe_reaches_exact_h2_energy() {
    let hamiltonian = h2_hamiltonian();
    let settings = OptimizerSettings::default();
    let mut vqe = Vqe::new(h2_ansatz(), create_optimizer("slsqp", &settings).unwrap())
        .with_restarts(3)
        .with_seed(42);
    let result = vqe.compute_minimum_eigenvalue(&hamiltonian).unwrap();

    assert!(result.eigenvalue >= H2_EXACT_ELECTRONIC - 1e-8);
    assert!(
        (result.eigenvalue - H2_EXACT_ELECTRONIC).abs() < 1e-4,
        "VQE energy {}",
        result.eigenvalue
    );
    assert_eq!(result.optimal_point.len(), 4);
    assert_eq!(result.cost_history.len(), result.optimizer_result.nfev);
    assert!(result.cost_function_evals >= result.cost_history.len());

    let estimator =
        EnergyEstimator::new(&hamiltonian, vqe.ansatz(), GradientMethod::ParameterShift).unwrap();
    let recomputed = estimator.energy(result.optimal_point.as_slice()).unwrap();
    assert!((recomputed - result.eigenvalue).abs() < 1e-12);
}

#[test]
fn test_vqe_given_point_is_checked() {
    let mut vqe = Vqe::new(
        h2_ansatz(),
        create_optimizer("sd", &OptimizerSettings::default()).unwrap(),
    )
    .with_initial_point(InitialPoint::Given(vec![0.0; 3]));
    assert!(vqe.compute_minimum_eigenvalue(&h2_hamiltonian()).is_err());
}
