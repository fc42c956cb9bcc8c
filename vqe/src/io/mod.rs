//! Input/Output operations for VQE calculations
//!
//! This module handles logging setup, basis set loading and the JSON report.

mod basis_loader;
mod output;

pub use basis_loader::fetch_basis;
pub use output::{setup_output, write_report};
