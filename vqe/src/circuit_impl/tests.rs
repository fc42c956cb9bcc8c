//! Tests for circuits, the two-local ansatz and the simulator

use super::*;
use crate::qubit_impl::SparsePauliOp;
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

fn ry_cz_linear(num_qubits: usize, reps: usize) -> TwoLocal {
    TwoLocal::new(
        num_qubits,
        vec![RotationBlock::Ry],
        vec![EntanglementBlock::Cz],
        Entanglement::Linear,
        reps,
    )
}

#[test]
fn test_two_local_layout() {
    let ansatz = ry_cz_linear(4, 1);
    assert_eq!(ansatz.num_parameters(), 8);

    let circuit = ansatz.build().unwrap();
    assert_eq!(circuit.num_qubits(), 4);
    assert_eq!(circuit.num_parameters(), 8);
    assert_eq!(circuit.gates().len(), 11);
    assert_eq!(circuit.depth(), 5);
    assert_eq!(circuit.gates()[0], Gate::Ry(0, Angle::Param(0)));
    assert_eq!(circuit.gates()[4], Gate::Cz(0, 1));
    assert_eq!(circuit.gates()[10], Gate::Ry(3, Angle::Param(7)));
    assert!(circuit.parameter_occurrences().iter().all(|&n| n == 1));
}

#[test]
fn test_two_local_variants() {
    assert_eq!(
        ry_cz_linear(4, 1)
            .with_skip_final_rotation_layer(true)
            .num_parameters(),
        4
    );
    assert_eq!(ry_cz_linear(3, 3).num_parameters(), 12);

    let mut two_blocks = ry_cz_linear(2, 2);
    two_blocks.rotation_blocks = vec![RotationBlock::Ry, RotationBlock::Rz, RotationBlock::H];
    assert_eq!(two_blocks.num_parameters(), 2 * 2 * 3);
    assert_eq!(two_blocks.build().unwrap().num_parameters(), 12);

    let mut empty = ry_cz_linear(2, 1);
    empty.rotation_blocks.clear();
    assert!(empty.build().is_err());
}

#[test]
fn test_entanglement_maps() {
    assert_eq!(Entanglement::Linear.pairs(4), vec![(0, 1), (1, 2), (2, 3)]);
    assert_eq!(
        Entanglement::ReverseLinear.pairs(4),
        vec![(2, 3), (1, 2), (0, 1)]
    );
    assert_eq!(
        Entanglement::Circular.pairs(4),
        vec![(3, 0), (0, 1), (1, 2), (2, 3)]
    );
    assert_eq!(Entanglement::Circular.pairs(2), vec![(0, 1)]);
    assert_eq!(Entanglement::Full.pairs(4).len(), 6);
    assert!(Entanglement::Linear.pairs(1).is_empty());
}

#[test]
fn test_block_names() {
    assert_eq!("RY".parse::<RotationBlock>().unwrap(), RotationBlock::Ry);
    assert_eq!("cz".parse::<EntanglementBlock>().unwrap(), EntanglementBlock::Cz);
    assert_eq!("cnot".parse::<EntanglementBlock>().unwrap(), EntanglementBlock::Cx);
    assert_eq!(
        "reverse-linear".parse::<Entanglement>().unwrap(),
        Entanglement::ReverseLinear
    );
    assert_eq!(
        "hartree_fock".parse::<InitialStateKind>().unwrap(),
        InitialStateKind::HartreeFock
    );
    assert!("u3".parse::<RotationBlock>().is_err());
    assert!("ring".parse::<Entanglement>().is_err());
    assert!("vacuum".parse::<InitialStateKind>().is_err());
}

#[test]
fn test_initial_state_is_prepended() {
    let hf = hartree_fock_state(&[true, true, false, false]).unwrap();
    assert_eq!(hf.gates(), &[Gate::X(0), Gate::X(1)]);

    let circuit = ry_cz_linear(4, 1).with_initial_state(hf).build().unwrap();
    assert_eq!(circuit.num_parameters(), 8);
    assert_eq!(circuit.depth(), 6);
    let ops = circuit.count_ops();
    assert_eq!(ops["x"], 2);
    assert_eq!(ops["ry"], 8);
    assert_eq!(ops["cz"], 3);

    // zero angles leave the reference determinant untouched
    let state = Statevector::evolve(&circuit, &[0.0; 8]).unwrap();
    assert!((state.probabilities()[0b0011] - 1.0).abs() < 1e-14);

    let mismatched = ry_cz_linear(3, 1).with_initial_state(hartree_fock_state(&[true; 4]).unwrap());
    assert!(mismatched.build().is_err());
}

#[test]
fn test_circuit_validation() {
    let mut circuit = QuantumCircuit::new(2);
    assert!(circuit.cx(0, 2).is_err());
    assert!(circuit.cz(1, 1).is_err());
    circuit.ry(0, Angle::Param(1)).unwrap();
    assert_eq!(circuit.num_parameters(), 2);
    assert!(circuit.check_parameters(&[0.1]).is_err());
    assert!(circuit.check_parameters(&[0.1, 0.2]).is_ok());
    assert!(Statevector::evolve(&circuit, &[0.3]).is_err());

    let mut other = QuantumCircuit::new(2);
    other.rz(1, Angle::Param(0)).unwrap().cx(1, 0).unwrap();
    let composed = circuit.compose(&other).unwrap();
    assert_eq!(composed.num_parameters(), 3);
    assert_eq!(composed.gates()[1], Gate::Rz(1, Angle::Param(2)));
    assert!(circuit.compose(&QuantumCircuit::new(3)).is_err());
}

#[test]
fn test_single_qubit_gates() {
    let mut circuit = QuantumCircuit::new(1);
    circuit.ry(0, Angle::Fixed(PI)).unwrap();
    let state = Statevector::evolve(&circuit, &[]).unwrap();
    assert!((state.amplitudes()[1] - Complex64::new(1.0, 0.0)).norm() < 1e-14);

    let mut circuit = QuantumCircuit::new(1);
    circuit.rx(0, Angle::Param(0)).unwrap();
    let state = Statevector::evolve(&circuit, &[PI]).unwrap();
    assert!((state.amplitudes()[1] - Complex64::new(0.0, -1.0)).norm() < 1e-14);

    let mut circuit = QuantumCircuit::new(1);
    circuit.h(0).unwrap().rz(0, Angle::Fixed(PI / 2.0)).unwrap();
    let state = Statevector::evolve(&circuit, &[]).unwrap();
    let ratio = state.amplitudes()[1] / state.amplitudes()[0];
    assert!((ratio - Complex64::new(0.0, 1.0)).norm() < 1e-14);
}

#[test]
fn test_two_qubit_gates() {
    let mut bell = QuantumCircuit::new(2);
    bell.h(0).unwrap().cx(0, 1).unwrap();
    let state = Statevector::evolve(&bell, &[]).unwrap();
    let probs = state.probabilities();
    assert!((probs[0] - 0.5).abs() < 1e-14 && (probs[3] - 0.5).abs() < 1e-14);
    assert!((state.inner(&state) - Complex64::new(1.0, 0.0)).norm() < 1e-14);
    let zero = Statevector::zero_state(2).unwrap();
    assert!((state.inner(&zero).re - FRAC_1_SQRT_2).abs() < 1e-14);

    let zz = SparsePauliOp::from_list(&[("ZZ", Complex64::new(1.0, 0.0))]).unwrap();
    assert!((state.expectation(&zz).unwrap() - 1.0).abs() < 1e-14);

    let mut swap = QuantumCircuit::new(2);
    swap.swap(0, 1).unwrap();
    let moved = Statevector::from_bitstring(&[true, false])
        .unwrap()
        .evolve_from(&swap, &[])
        .unwrap();
    assert!((moved.probabilities()[0b10] - 1.0).abs() < 1e-14);

    let mut cz = QuantumCircuit::new(2);
    cz.cz(0, 1).unwrap();
    let flipped = Statevector::from_bitstring(&[true, true])
        .unwrap()
        .evolve_from(&cz, &[])
        .unwrap();
    assert!((flipped.amplitudes()[3] + Complex64::new(1.0, 0.0)).norm() < 1e-14);
}

#[test]
fn test_expectation_matches_dense_matrix() {
    let circuit = ry_cz_linear(3, 2).build().unwrap();
    let params: Vec<f64> = (0..circuit.num_parameters())
        .map(|i| 0.37 * i as f64 - 1.1)
        .collect();
    let state = Statevector::evolve(&circuit, &params).unwrap();
    assert!((state.norm() - 1.0).abs() < 1e-12);

    let op = SparsePauliOp::from_list(&[
        ("XZI", Complex64::new(0.4, 0.0)),
        ("YYZ", Complex64::new(-0.25, 0.0)),
        ("IIZ", Complex64::new(1.5, 0.0)),
        ("III", Complex64::new(-0.3, 0.0)),
    ])
    .unwrap();

    let psi = nalgebra::DVector::from_column_slice(state.amplitudes());
    let dense = (psi.adjoint() * op.to_matrix() * &psi)[(0, 0)];
    assert!((state.expectation(&op).unwrap() - dense.re).abs() < 1e-12);

    let wrong_size = SparsePauliOp::identity(2);
    assert!(state.expectation(&wrong_size).is_err());
}
