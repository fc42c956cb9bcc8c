//! End-to-end runs of the example configurations

use std::fs;
use std::path::PathBuf;
use vqe::config::{Args, Config};
use vqe::VqeApplication;

fn example_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("example")
        .join(filename)
}

fn load_example(filename: &str) -> Config {
    let text = fs::read_to_string(example_path(filename)).unwrap();
    Config::from_yaml(&text).unwrap()
}

#[test]
fn test_example_configs_parse() {
    for name in ["lih_vqe.yaml", "h2_vqe.yaml", "lih_scan.yaml"] {
        let config = load_example(name);
        assert!(config.geometry.len() >= 2, "{}", name);
    }
    let scan = load_example("lih_scan.yaml");
    assert_eq!(scan.scan_bond_lengths().unwrap().len(), 9);
}

#[test]
fn test_h2_vqe_example() {
    let app = VqeApplication::new(
        Args::with_config_file("h2_vqe.yaml"),
        load_example("h2_vqe.yaml"),
    );
    let reports = app.execute().unwrap();
    let report = &reports[0];

    assert_eq!(report.qubits.num_qubits, 2);
    let exact = report.exact.as_ref().unwrap();
    assert!((exact.total_energy - -1.13730604).abs() < 1e-5);
    assert!((report.vqe.total_energy - exact.total_energy).abs() < 1e-4);
}

#[test]
fn test_lih_vqe_example() {
    let config = load_example("lih_vqe.yaml");
    assert_eq!(config.vqe.restarts, Some(3));
    let app = VqeApplication::new(Args::with_config_file("lih_vqe.yaml"), config);
    let reports = app.execute().unwrap();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];

    assert_eq!(report.molecule, "LiH");
    assert!((report.scf.hf_energy - -7.862).abs() < 2e-3);
    assert_eq!(report.active_space.active_orbitals, vec![1, 2, 5]);
    assert_eq!(report.active_space.num_alpha, 1);
    assert_eq!(report.active_space.num_beta, 1);
    assert!(report.active_space.frozen_core_energy < 0.0);

    assert_eq!(report.qubits.mapper, "parity");
    assert!(report.qubits.two_qubit_reduction);
    assert_eq!(report.qubits.num_qubits, 4);
    assert_eq!(report.qubits.hf_bitstring, "0011");
    assert_eq!(report.ansatz.num_parameters, 8);

    let exact = report.exact.as_ref().unwrap();
    assert!((exact.total_energy - -7.88107204).abs() < 1e-6);

    // variational bound, and correlation on top of HF
    assert!(report.vqe.total_energy >= exact.total_energy - 1e-8);
    assert!(
        report.vqe.total_energy < report.scf.hf_energy - 1e-3,
        "VQE {} stayed at HF {}",
        report.vqe.total_energy,
        report.scf.hf_energy
    );
    // one RY layer around linear CZ cannot reach the exact state here
    let error = report.error().unwrap();
    assert!(error <= 1.71e-2 + 1e-4, "error {}", error);
}

#[test]
fn test_bond_length_override() {
    let mut args = Args::with_config_file("h2_vqe.yaml");
    args.bond_length = Some(1.0);
    args.no_exact = true;
    args.optimizer = Some("sd".to_string());
    args.max_iterations = Some(300);
    let app = VqeApplication::new(args, load_example("h2_vqe.yaml"));
    let reports = app.execute().unwrap();
    let report = &reports[0];

    assert!((report.bond_length.unwrap() - 1.0).abs() < 1e-12);
    assert!(report.exact.is_none());
    assert!(report.error().is_none());
    assert_eq!(report.vqe.optimizer, "sd");
}
