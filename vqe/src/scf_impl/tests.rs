//! Tests for SCF implementations

#![allow(non_snake_case)]

use super::{ScfOutcome, SimpleSCF, DIIS, SCF};
use crate::app::BasisMap;
use basis::basis::{AOBasis, Basis};
use basis::cgto::AtomicBasis;
use basis::library::sto3g;
use nalgebra::{DMatrix, Vector3};
use periodic_table_on_an_enum::Element;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

const ANGSTROM: f64 = 1.8897261254578281;

fn sto3g_map(symbols: &[&'static str]) -> BasisMap<AtomicBasis> {
    let mut basis_map = HashMap::new();
    for &symbol in symbols {
        let basis = AtomicBasis::parse_nwchem(sto3g(symbol).unwrap()).unwrap();
        basis_map.insert(symbol, Arc::new(basis));
    }
    basis_map
}

fn run_sto3g(
    elems: Vec<Element>,
    coords: Vec<Vector3<f64>>,
    charge: i32,
) -> (SimpleSCF<AtomicBasis>, ScfOutcome) {
    let symbols: Vec<&'static str> = elems.iter().map(|e| e.get_symbol()).collect();
    let basis_map = sto3g_map(&symbols);

    let mut scf = SimpleSCF::<AtomicBasis>::new();
    scf.set_charge(charge);
    scf.enable_diis(8);
    scf.init_basis(&elems, &basis_map).unwrap();
    scf.init_geometry(&coords, &elems);
    scf.init_density_matrix();
    scf.init_fock_matrix();
    let outcome = scf.scf_cycle().unwrap();
    (scf, outcome)
}

// Mock implementations for testing
#[derive(Clone)]
struct MockAOBasis {
    center: Vector3<f64>,
}

impl AOBasis for MockAOBasis {
    type BasisType = MockBasis;

    fn set_center(&mut self, center: Vector3<f64>) {
        self.center = center;
    }

    fn get_center(&self) -> Option<Vector3<f64>> {
        Some(self.center)
    }

    fn basis_size(&self) -> usize {
        1
    }

    fn get_basis(&self) -> Vec<Arc<Self::BasisType>> {
        vec![Arc::new(MockBasis {
            center: self.center,
        })]
    }
}

#[derive(Clone)]
struct MockBasis {
    center: Vector3<f64>,
}

impl Basis for MockBasis {
    fn evaluate(&self, _: &Vector3<f64>) -> f64 {
        0.0
    }

    fn Sab(a: &Self, b: &Self) -> f64 {
        if a.center == b.center {
            1.0
        } else {
            0.0
        }
    }

    fn Tab(a: &Self, b: &Self) -> f64 {
        if a.center == b.center {
            0.5
        } else {
            -0.1
        }
    }

    fn Vab(a: &Self, b: &Self, _: Vector3<f64>, charge: u32) -> f64 {
        if a.center == b.center {
            -0.5 * charge as f64
        } else {
            -0.05 * charge as f64
        }
    }

    fn JKabcd(_: &Self, _: &Self, _: &Self, _: &Self) -> f64 {
        0.01
    }
}

fn mock_map() -> BasisMap<MockAOBasis> {
    let mut basis_map = HashMap::new();
    basis_map.insert(
        "H",
        Arc::new(MockAOBasis {
            center: Vector3::zeros(),
        }),
    );
    basis_map
}

/// An atomic basis that is not `Sync`; only its functions cross threads.
#[derive(Clone)]
struct LocalAOBasis {
    center: Vector3<f64>,
    moves: Cell<usize>,
}

impl AOBasis for LocalAOBasis {
    type BasisType = MockBasis;

    fn set_center(&mut self, center: Vector3<f64>) {
        self.moves.set(self.moves.get() + 1);
        self.center = center;
    }

    fn get_center(&self) -> Option<Vector3<f64>> {
        Some(self.center)
    }

    fn basis_size(&self) -> usize {
        1
    }

    fn get_basis(&self) -> Vec<Arc<Self::BasisType>> {
        vec![Arc::new(MockBasis {
            center: self.center,
        })]
    }
}

// === Initialization ===

#[test]
fn test_init_basis_counts_electrons() {
    let elems = vec![Element::Hydrogen, Element::Hydrogen];
    let mut scf = SimpleSCF::<MockAOBasis>::new();
    scf.init_basis(&elems, &mock_map()).unwrap();
    assert_eq!(scf.num_atoms, 2);
    assert_eq!(scf.num_electrons(), 2);
    assert_eq!(scf.num_occupied(), 1);
}

#[test]
fn test_init_basis_rejects_open_shell() {
    let elems = vec![Element::Hydrogen, Element::Hydrogen];
    let mut scf = SimpleSCF::<MockAOBasis>::new();
    scf.set_charge(1);
    assert!(scf.init_basis(&elems, &mock_map()).is_err());

    scf.set_charge(3);
    assert!(scf.init_basis(&elems, &mock_map()).is_err());
}

#[test]
fn test_init_basis_requires_every_element() {
    let elems = vec![Element::Lithium, Element::Hydrogen];
    let mut scf = SimpleSCF::<MockAOBasis>::new();
    assert!(scf.init_basis(&elems, &mock_map()).is_err());
}

#[test]
fn test_init_geometry_and_density() {
    let elems = vec![Element::Hydrogen, Element::Hydrogen];
    let coords = vec![Vector3::zeros(), Vector3::new(0.0, 0.0, 1.4)];
    let mut scf = SimpleSCF::<MockAOBasis>::new();
    scf.init_basis(&elems, &mock_map()).unwrap();
    scf.init_geometry(&coords, &elems);
    assert_eq!(scf.num_basis, 2);
    assert_eq!(scf.get_basis_functions().len(), 2);
    assert_eq!(scf.get_basis_functions()[1].center, coords[1]);

    scf.init_density_matrix();
    assert_eq!(scf.overlap_matrix, DMatrix::identity(2, 2));
    assert!((scf.density_matrix.trace() - 2.0).abs() < 1e-12);
    assert!((scf.eri().get(0, 1, 1, 0) - 0.01).abs() < 1e-15);
}

#[test]
fn test_integrals_with_thread_local_atomic_basis() {
    let elems = vec![Element::Hydrogen, Element::Hydrogen];
    let coords = vec![Vector3::zeros(), Vector3::new(0.0, 0.0, 1.4)];
    let mut basis_map = HashMap::new();
    basis_map.insert(
        "H",
        Arc::new(LocalAOBasis {
            center: Vector3::zeros(),
            moves: Cell::new(0),
        }),
    );

    let mut scf = SimpleSCF::<LocalAOBasis>::new();
    scf.init_basis(&elems, &basis_map).unwrap();
    scf.init_geometry(&coords, &elems);
    scf.init_density_matrix();

    assert_eq!(scf.overlap_matrix, DMatrix::identity(2, 2));
    assert!((scf.h_core[(0, 1)] - (-0.1 - 2.0 * 0.05)).abs() < 1e-12);
    assert!((scf.eri().get(1, 0, 0, 1) - 0.01).abs() < 1e-15);
}

#[test]
fn test_scf_cycle_before_init_fails() {
    let mut scf = SimpleSCF::<MockAOBasis>::new();
    assert!(scf.scf_cycle().is_err());
}

// === Reference energies ===

#[test]
fn test_h2_sto3g_energy() {
    let (scf, outcome) = run_sto3g(
        vec![Element::Hydrogen, Element::Hydrogen],
        vec![Vector3::new(0.0, 0.0, -0.7), Vector3::new(0.0, 0.0, 0.7)],
        0,
    );

    let expected_energy = -1.1167143502770278;
    assert!(outcome.converged);
    assert!(
        (outcome.energy - expected_energy).abs() < 1e-6,
        "H2 STO-3G energy mismatch: got {}, expected {}",
        outcome.energy,
        expected_energy
    );
    assert!((scf.calculate_total_energy() - outcome.energy).abs() < 1e-12);
}

#[test]
fn test_h2_equilibrium_reference() {
    let (scf, outcome) = run_sto3g(
        vec![Element::Hydrogen, Element::Hydrogen],
        vec![Vector3::zeros(), Vector3::new(0.0, 0.0, 0.735 * ANGSTROM)],
        0,
    );

    assert!((scf.nuclear_repulsion() - 0.719968994449).abs() < 1e-9);
    assert!((outcome.energy - -1.116998996).abs() < 1e-5);
    // bonding and antibonding sigma orbitals
    assert!(scf.e_level[0] < 0.0 && scf.e_level[1] > 0.0);
}

#[test]
fn test_lih_sto3g_energy() {
    let (scf, outcome) = run_sto3g(
        vec![Element::Lithium, Element::Hydrogen],
        vec![Vector3::zeros(), Vector3::new(0.0, 0.0, 1.6 * ANGSTROM)],
        0,
    );

    assert!(outcome.converged);
    assert_eq!(scf.num_basis, 6);
    assert!((outcome.energy - -7.862).abs() < 2e-3, "got {}", outcome.energy);

    // Tr(PS) counts the electrons
    let electrons = (&scf.density_matrix * &scf.overlap_matrix).trace();
    assert!((electrons - 4.0).abs() < 1e-8);

    // orbitals are S-orthonormal
    let metric = scf.coeffs.transpose() * &scf.overlap_matrix * &scf.coeffs;
    assert!((metric - DMatrix::identity(6, 6)).amax() < 1e-8);

    // pi orbitals are degenerate
    assert!((scf.e_level[3] - scf.e_level[4]).abs() < 1e-8);
}

#[test]
fn test_charged_closed_shell() {
    let (scf, outcome) = run_sto3g(
        vec![Element::Helium, Element::Hydrogen],
        vec![Vector3::zeros(), Vector3::new(0.0, 0.0, 1.4632)],
        1,
    );
    assert!(outcome.converged);
    assert_eq!(scf.num_electrons(), 2);
    let electrons = (&scf.density_matrix * &scf.overlap_matrix).trace();
    assert!((electrons - 2.0).abs() < 1e-8);
}

#[test]
fn test_density_mixing_reaches_same_energy() {
    let elems = vec![Element::Lithium, Element::Hydrogen];
    let coords = vec![Vector3::zeros(), Vector3::new(0.0, 0.0, 3.0)];
    let basis_map = sto3g_map(&["Li", "H"]);

    let mut scf = SimpleSCF::<AtomicBasis>::new();
    scf.density_mixing = 0.5;
    scf.max_cycle = 300;
    scf.set_convergence_threshold(1e-9);
    scf.init_basis(&elems, &basis_map).unwrap();
    scf.init_geometry(&coords, &elems);
    scf.init_density_matrix();
    scf.init_fock_matrix();
    let damped = scf.scf_cycle().unwrap();

    let (_, diis) = run_sto3g(elems, coords, 0);
    assert!(damped.converged);
    assert!((damped.energy - diis.energy).abs() < 1e-6);
}

// === DIIS ===

#[test]
fn test_diis_error_vanishes_for_commuting_matrices() {
    let diis = DIIS::new(4);
    let fock = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![-1.0, 0.5]));
    let density = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![2.0, 0.0]));
    let overlap = DMatrix::identity(2, 2);
    let error = diis.calculate_error_matrix(&fock, &density, &overlap);
    assert!(error.amax() < 1e-15);
}

#[test]
fn test_diis_single_entry_extrapolates_to_itself() {
    let mut diis = DIIS::new(4);
    let fock = DMatrix::from_row_slice(2, 2, &[-1.0, 0.2, 0.2, 0.5]);
    let density = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 0.0]);
    diis.update(fock.clone(), &density, &DMatrix::identity(2, 2));
    let extrapolated = diis.extrapolate().unwrap();
    assert!((extrapolated - fock).amax() < 1e-12);
}

#[test]
fn test_diis_subspace_is_bounded() {
    let mut diis = DIIS::new(3);
    let density = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 0.0]);
    for k in 0..6 {
        let fock = DMatrix::from_row_slice(2, 2, &[-1.0, 0.1 * k as f64, 0.1 * k as f64, 0.5]);
        diis.update(fock, &density, &DMatrix::identity(2, 2));
    }
    assert_eq!(diis.size(), 3);
    diis.reset();
    assert_eq!(diis.size(), 0);
    assert!(diis.extrapolate().is_none());
}
