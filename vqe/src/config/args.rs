//! Command-line argument parsing for VQE calculations

use clap::Parser;

/// Ground-state energy of a small molecule with a variational quantum eigensolver
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write a JSON report of the results to this file
    #[arg(long)]
    pub report: Option<String>,

    /// Place the last atom at this distance from the first (geometry units)
    #[arg(long)]
    pub bond_length: Option<f64>,

    /// Override maximum optimizer iterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Optimizer (slsqp, spsa or sd)
    #[arg(long)]
    pub optimizer: Option<String>,

    /// Fermion-to-qubit mapper (parity or jordan_wigner)
    #[arg(long)]
    pub mapper: Option<String>,

    /// Number of ansatz repetitions
    #[arg(long)]
    pub reps: Option<usize>,

    /// Seed for the initial point and stochastic optimizers
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the exact diagonalization reference
    #[arg(long)]
    pub no_exact: bool,
}

impl Args {
    /// Arguments that leave every configuration value untouched.
    pub fn with_config_file(config_file: &str) -> Self {
        Args {
            config_file: config_file.to_string(),
            output: None,
            report: None,
            bond_length: None,
            max_iterations: None,
            optimizer: None,
            mapper: None,
            reps: None,
            seed: None,
            no_exact: false,
        }
    }
}
