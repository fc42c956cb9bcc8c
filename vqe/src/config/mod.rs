//! Configuration management for VQE calculations
//!
//! This module handles configuration structures, defaults, and validation
//! for the reference SCF, the qubit Hamiltonian and the variational solver.

mod args;

pub use args::Args;

use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub const ANGSTROM_TO_BOHR: f64 = 1.8897261254578281;

/// Main configuration structure for VQE calculations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub geometry: Vec<Atom>,
    #[serde(default)]
    pub basis_sets: HashMap<String, String>,
    pub units: Option<String>,
    pub charge: Option<i32>,
    pub multiplicity: Option<usize>,
    #[serde(default)]
    pub scf_params: ScfParams,
    #[serde(default)]
    pub active_space: ActiveSpaceParams,
    #[serde(default)]
    pub mapping: MappingParams,
    #[serde(default)]
    pub ansatz: AnsatzParams,
    #[serde(default)]
    pub optimizer: OptimizerParams,
    #[serde(default)]
    pub vqe: VqeParams,
    #[serde(default)]
    pub exact: ExactParams,
    pub scan: Option<ScanParams>,
}

/// Atomic position configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
}

/// Length unit of the geometry block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Angstrom,
    Bohr,
}

impl LengthUnit {
    /// Factor converting this unit to bohr.
    pub fn to_bohr(self) -> f64 {
        match self {
            LengthUnit::Angstrom => ANGSTROM_TO_BOHR,
            LengthUnit::Bohr => 1.0,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "angstrom" | "ang" | "a" => Ok(LengthUnit::Angstrom),
            "bohr" | "au" => Ok(LengthUnit::Bohr),
            _ => Err(eyre!("Unknown length unit: {} (use angstrom or bohr)", s)),
        }
    }
}

/// SCF-specific parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScfParams {
    pub density_mixing: Option<f64>,
    pub max_cycle: Option<usize>,
    pub diis_subspace_size: Option<usize>,
    pub convergence_threshold: Option<f64>,
}

impl Default for ScfParams {
    fn default() -> Self {
        ScfParams {
            density_mixing: Some(1.0),
            max_cycle: Some(100),
            diis_subspace_size: Some(8),
            convergence_threshold: Some(1e-10),
        }
    }
}

impl ScfParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.density_mixing.is_none() {
            self.density_mixing = defaults.density_mixing;
        }
        if self.max_cycle.is_none() {
            self.max_cycle = defaults.max_cycle;
        }
        if self.diis_subspace_size.is_none() {
            self.diis_subspace_size = defaults.diis_subspace_size;
        }
        if self.convergence_threshold.is_none() {
            self.convergence_threshold = defaults.convergence_threshold;
        }
        self
    }
}

/// Frozen-core and orbital-removal settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActiveSpaceParams {
    pub freeze_core: Option<bool>,
    /// Indices into the full MO list, counted from zero.
    pub remove_orbitals: Option<Vec<usize>>,
}

impl Default for ActiveSpaceParams {
    fn default() -> Self {
        ActiveSpaceParams {
            freeze_core: Some(true),
            remove_orbitals: Some(Vec::new()),
        }
    }
}

impl ActiveSpaceParams {
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.freeze_core.is_none() {
            self.freeze_core = defaults.freeze_core;
        }
        if self.remove_orbitals.is_none() {
            self.remove_orbitals = defaults.remove_orbitals;
        }
        self
    }
}

/// Fermion-to-qubit mapping parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingParams {
    /// "parity" or "jordan_wigner"
    pub mapper: Option<String>,
    pub two_qubit_reduction: Option<bool>,
    /// Pauli terms with smaller coefficients are dropped
    pub threshold: Option<f64>,
}

impl Default for MappingParams {
    fn default() -> Self {
        MappingParams {
            mapper: Some("parity".to_string()),
            two_qubit_reduction: Some(true),
            threshold: Some(1e-8),
        }
    }
}

impl MappingParams {
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.mapper.is_none() {
            self.mapper = defaults.mapper;
        }
        if self.two_qubit_reduction.is_none() {
            self.two_qubit_reduction = defaults.two_qubit_reduction;
        }
        if self.threshold.is_none() {
            self.threshold = defaults.threshold;
        }
        self
    }
}

/// Two-local ansatz parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnsatzParams {
    pub rotation_blocks: Option<Vec<String>>,
    pub entanglement_blocks: Option<Vec<String>>,
    /// "linear", "reverse_linear", "circular" or "full"
    pub entanglement: Option<String>,
    pub reps: Option<usize>,
    /// "hartree_fock" or "zero"
    pub initial_state: Option<String>,
    pub skip_final_rotation_layer: Option<bool>,
}

impl Default for AnsatzParams {
    fn default() -> Self {
        AnsatzParams {
            rotation_blocks: Some(vec!["ry".to_string()]),
            entanglement_blocks: Some(vec!["cz".to_string()]),
            entanglement: Some("linear".to_string()),
            reps: Some(1),
            initial_state: Some("hartree_fock".to_string()),
            skip_final_rotation_layer: Some(false),
        }
    }
}

impl AnsatzParams {
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.rotation_blocks.is_none() {
            self.rotation_blocks = defaults.rotation_blocks;
        }
        if self.entanglement_blocks.is_none() {
            self.entanglement_blocks = defaults.entanglement_blocks;
        }
        if self.entanglement.is_none() {
            self.entanglement = defaults.entanglement;
        }
        if self.reps.is_none() {
            self.reps = defaults.reps;
        }
        if self.initial_state.is_none() {
            self.initial_state = defaults.initial_state;
        }
        if self.skip_final_rotation_layer.is_none() {
            self.skip_final_rotation_layer = defaults.skip_final_rotation_layer;
        }
        self
    }
}

/// Classical optimizer parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptimizerParams {
    /// "slsqp", "spsa" or "sd"
    pub algorithm: Option<String>,
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
    /// "parameter_shift" or "finite_difference"
    pub gradient: Option<String>,
    /// Initial step for steepest descent, gain `a` for SPSA (calibrated when absent)
    pub learning_rate: Option<f64>,
    /// SPSA perturbation size `c`
    pub perturbation: Option<f64>,
}

impl Default for OptimizerParams {
    fn default() -> Self {
        OptimizerParams {
            algorithm: Some("slsqp".to_string()),
            max_iterations: Some(3000),
            tolerance: Some(1e-6),
            gradient: Some("parameter_shift".to_string()),
            learning_rate: None,
            perturbation: Some(0.2),
        }
    }
}

impl OptimizerParams {
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.algorithm.is_none() {
            self.algorithm = defaults.algorithm;
        }
        if self.max_iterations.is_none() {
            self.max_iterations = defaults.max_iterations;
        }
        if self.tolerance.is_none() {
            self.tolerance = defaults.tolerance;
        }
        if self.gradient.is_none() {
            self.gradient = defaults.gradient;
        }
        if self.perturbation.is_none() {
            self.perturbation = defaults.perturbation;
        }
        self
    }
}

/// Variational run parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VqeParams {
    /// "random" or "zero"
    pub initial_point: Option<String>,
    pub seed: Option<u64>,
    pub restarts: Option<usize>,
}

impl Default for VqeParams {
    fn default() -> Self {
        VqeParams {
            initial_point: Some("random".to_string()),
            seed: Some(42),
            restarts: Some(1),
        }
    }
}

impl VqeParams {
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.initial_point.is_none() {
            self.initial_point = defaults.initial_point;
        }
        if self.seed.is_none() {
            self.seed = defaults.seed;
        }
        if self.restarts.is_none() {
            self.restarts = defaults.restarts;
        }
        self
    }
}

/// Exact diagonalization parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExactParams {
    pub enabled: Option<bool>,
    pub filter_particle_number: Option<bool>,
}

impl Default for ExactParams {
    fn default() -> Self {
        ExactParams {
            enabled: Some(true),
            filter_particle_number: Some(true),
        }
    }
}

impl ExactParams {
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.filter_particle_number.is_none() {
            self.filter_particle_number = defaults.filter_particle_number;
        }
        self
    }
}

/// Bond-length scan: the last atom is moved along the bond axis
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanParams {
    pub bond_lengths: Vec<f64>,
}

impl Config {
    /// Parse a YAML document and fill in defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config = serde_yml::from_str::<Config>(text)
            .wrap_err("Failed to parse configuration file")?
            .with_defaults();
        Ok(config)
    }

    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        if self.units.is_none() {
            self.units = Some("angstrom".to_string());
        }
        if self.charge.is_none() {
            self.charge = Some(0);
        }
        if self.multiplicity.is_none() {
            self.multiplicity = Some(1);
        }
        self.scf_params = self.scf_params.with_defaults();
        self.active_space = self.active_space.with_defaults();
        self.mapping = self.mapping.with_defaults();
        self.ansatz = self.ansatz.with_defaults();
        self.optimizer = self.optimizer.with_defaults();
        self.vqe = self.vqe.with_defaults();
        self.exact = self.exact.with_defaults();
        self
    }

    pub fn length_unit(&self) -> Result<LengthUnit> {
        self.units.as_deref().unwrap_or("angstrom").parse()
    }

    /// Check if DIIS acceleration is enabled
    pub fn is_diis_enabled(&self) -> bool {
        self.scf_params.diis_subspace_size.unwrap_or(0) > 0
    }

    /// Get the DIIS subspace size
    pub fn diis_subspace_size(&self) -> usize {
        self.scf_params.diis_subspace_size.unwrap_or(8)
    }

    pub fn is_exact_enabled(&self) -> bool {
        self.exact.enabled.unwrap_or(true)
    }

    pub fn remove_orbitals(&self) -> Vec<usize> {
        self.active_space.remove_orbitals.clone().unwrap_or_default()
    }

    pub fn scan_bond_lengths(&self) -> Option<&[f64]> {
        self.scan
            .as_ref()
            .map(|s| s.bond_lengths.as_slice())
            .filter(|b| !b.is_empty())
    }
}
