//! VQE Calculation Command-Line Interface
//!
//! This is the main entry point for running VQE calculations with YAML configuration.

use color_eyre::eyre::Result;
use vqe::VqeApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    VqeApplication::from_cli()?.run()
}
