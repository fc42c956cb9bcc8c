//! Tests for the application layer

use super::*;
use crate::config::{Args, Config, ANGSTROM_TO_BOHR};
use ::basis::cgto::AtomicBasis;
use color_eyre::eyre::Result;
use periodic_table_on_an_enum::Element;
use std::cell::Cell;

const H2_YAML: &str = r#"
geometry:
  - element: H
    coords: [0.0, 0.0, 0.0]
  - element: H
    coords: [0.0, 0.0, 0.735]
basis_sets:
  H: sto-3g
"#;

struct CountingLoader {
    calls: Cell<usize>,
}

impl BasisLoader<AtomicBasis> for CountingLoader {
    fn load(&self, element: &Element, requested: Option<&str>) -> Result<AtomicBasis> {
        self.calls.set(self.calls.get() + 1);
        NwchemLoader::default().load(element, requested)
    }
}

#[test]
fn test_geometry_is_converted_to_bohr() {
    let config = Config::from_yaml(H2_YAML).unwrap();
    let geometry = build_geometry(&config, None).unwrap();
    assert_eq!(geometry.elements, vec![Element::Hydrogen, Element::Hydrogen]);
    assert!((geometry.coords[1].z - 0.735 * ANGSTROM_TO_BOHR).abs() < 1e-12);

    let bohr = Config::from_yaml(&format!("{}units: bohr\n", H2_YAML)).unwrap();
    let geometry = build_geometry(&bohr, None).unwrap();
    assert!((geometry.coords[1].z - 0.735).abs() < 1e-12);
}

#[test]
fn test_bond_length_moves_last_atom() {
    let yaml = r#"
geometry:
  - element: Li
    coords: [0.0, 0.0, 0.0]
  - element: H
    coords: [0.0, 0.0, 0.0]
"#;
    let config = Config::from_yaml(yaml).unwrap();
    let geometry = build_geometry(&config, Some(1.6)).unwrap();
    assert!((geometry.coords[1].z - 1.6 * ANGSTROM_TO_BOHR).abs() < 1e-12);
    assert!(geometry.coords[1].x.abs() < 1e-15);

    let h2 = Config::from_yaml(H2_YAML).unwrap();
    let stretched = build_geometry(&h2, Some(2.0)).unwrap();
    assert!((stretched.coords[1].z - 2.0 * ANGSTROM_TO_BOHR).abs() < 1e-12);
    assert!(build_geometry(&h2, Some(-1.0)).is_err());
}

#[test]
fn test_invalid_geometry() {
    let yaml = r#"
geometry:
  - element: Xx
    coords: [0.0, 0.0, 0.0]
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert!(build_geometry(&config, None).is_err());

    let single = Config::from_yaml(
        "geometry:\n  - element: He\n    coords: [0.0, 0.0, 0.0]\n",
    )
    .unwrap();
    assert!(build_geometry(&single, Some(1.0)).is_err());
}

#[test]
fn test_registry_caches_per_element() {
    let config = Config::from_yaml(H2_YAML).unwrap();
    let loader = CountingLoader {
        calls: Cell::new(0),
    };
    let mut registry = BasisRegistry::new(loader);
    let elements = vec![Element::Hydrogen, Element::Hydrogen, Element::Lithium];
    let map = registry.load_for_elements(&config, &elements).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(registry.num_cached(), 2);

    let again = registry.load_for_elements(&config, &elements[..1]).unwrap();
    assert_eq!(again.len(), 1);
    assert_eq!(registry.num_cached(), 2);
}

#[test]
fn test_workspace_formula_and_bond_length() {
    let config = Config::from_yaml(H2_YAML).unwrap();
    let geometry = build_geometry(&config, None).unwrap();
    let workspace = CalculationWorkspace::<AtomicBasis>::new(
        geometry.elements,
        geometry.coords,
        BasisMap::new(),
    );
    assert_eq!(workspace.formula(), "H2");
    let r = workspace.bond_length().unwrap();
    assert!((r - 0.735 * ANGSTROM_TO_BOHR).abs() < 1e-12);
}

#[test]
fn test_open_shell_is_rejected() {
    let config =
        Config::from_yaml(&format!("{}multiplicity: 3\n", H2_YAML)).unwrap();
    let app = VqeApplication::new(Args::with_config_file("unused.yaml"), config);
    assert!(app.execute().is_err());
}

#[test]
fn test_h2_pipeline() {
    let config = Config::from_yaml(H2_YAML).unwrap();
    let app = VqeApplication::new(Args::with_config_file("unused.yaml"), config);
    let reports = app.execute().unwrap();
    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    assert_eq!(report.molecule, "H2");
    assert!((report.bond_length.unwrap() - 0.735).abs() < 1e-12);
    assert!((report.scf.hf_energy - -1.116998996).abs() < 1e-5);
    assert_eq!(report.active_space.active_orbitals, vec![0, 1]);
    assert_eq!(report.active_space.frozen_core_energy, 0.0);
    assert_eq!(report.qubits.num_qubits, 2);
    assert_eq!(report.qubits.num_pauli_terms, 5);
    assert_eq!(report.qubits.hf_bitstring, "01");
    assert_eq!(report.ansatz.num_parameters, 4);

    let exact = report.exact.as_ref().unwrap();
    assert!((exact.total_energy - -1.13730604).abs() < 1e-5);
    assert!(report.vqe.total_energy >= exact.total_energy - 1e-8);
    assert!(report.error().unwrap().abs() < 1e-4);
    assert!(
        (report.error_kcal_mol().unwrap() - report.error().unwrap() * HARTREE_TO_KCAL_MOL).abs()
            < 1e-12
    );
}
