mod basis;
mod geometry;
mod report;
mod runner;
#[cfg(test)]
mod tests;
mod workspace;

pub use basis::{BasisLoader, BasisMap, BasisRegistry, NwchemLoader, DEFAULT_BASIS};
pub use geometry::{build_geometry, Geometry};
pub use report::{
    ActiveSpaceSummary, AnsatzSummary, ExactSummary, QubitSummary, RunReport, ScfSummary,
    VqeSummary, HARTREE_TO_KCAL_MOL,
};
pub use runner::{
    build_ansatz, build_converter, build_problem, initialize_and_run_scf, run_exact, run_pipeline,
    run_restricted, run_vqe,
};
pub use workspace::CalculationWorkspace;

use self::report::{report_scan, report_vqe_summary};
use crate::config::{Args, Config};
use crate::io::{setup_output, write_report};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use tracing::info;

pub struct VqeApplication {
    args: Args,
    config: Config,
}

impl VqeApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn new(args: Args, config: Config) -> Self {
        Self { args, config }
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref())?;

        let reports = self.execute()?;

        if let Some(path) = &self.args.report {
            match reports.as_slice() {
                [single] => write_report(path, single)?,
                all => write_report(path, &all)?,
            }
        }
        Ok(())
    }

    /// Run every requested geometry and return one report per geometry.
    pub fn execute(&self) -> Result<Vec<RunReport>> {
        let geometry = build_geometry(&self.config, self.args.bond_length)?;
        let mut basis_registry = BasisRegistry::new(NwchemLoader::default());
        let basis_map = basis_registry.load_for_elements(&self.config, &geometry.elements)?;
        let workspace = CalculationWorkspace::new(geometry.elements, geometry.coords, basis_map);

        let scan = match self.args.bond_length {
            Some(_) => None,
            None => self.config.scan_bond_lengths(),
        };

        let Some(bond_lengths) = scan else {
            let report = run_pipeline(&workspace, &self.args, &self.config)?;
            report_vqe_summary(&report);
            return Ok(vec![report]);
        };

        info!("Scanning {} bond lengths", bond_lengths.len());
        let mut reports = Vec::with_capacity(bond_lengths.len());
        for &length in bond_lengths {
            let geometry = build_geometry(&self.config, Some(length))?;
            let point = workspace.with_coords(geometry.coords);
            let report = run_pipeline(&point, &self.args, &self.config)
                .wrap_err_with(|| format!("Scan point at bond length {} failed", length))?;
            report_vqe_summary(&report);
            reports.push(report);
        }
        report_scan(&reports);
        Ok(reports)
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    Config::from_yaml(&config_content)
}
