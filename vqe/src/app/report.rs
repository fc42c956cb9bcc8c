use crate::scf_impl::{ScfOutcome, SimpleSCF, SCF};
use ::basis::cgto::AtomicBasis;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

pub const HARTREE_TO_KCAL_MOL: f64 = 627.509474;

#[derive(Debug, Clone, Serialize)]
pub struct ScfSummary {
    pub converged: bool,
    pub cycles: usize,
    pub hf_energy: f64,
    pub nuclear_repulsion: f64,
    pub orbital_energies: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveSpaceSummary {
    pub active_orbitals: Vec<usize>,
    pub num_spatial_orbitals: usize,
    pub num_alpha: usize,
    pub num_beta: usize,
    /// Inactive (frozen-core) energy added back to every eigenvalue
    pub frozen_core_energy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QubitSummary {
    pub mapper: String,
    pub two_qubit_reduction: bool,
    pub num_qubits: usize,
    pub num_pauli_terms: usize,
    /// Reference state, qubit 0 rightmost
    pub hf_bitstring: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnsatzSummary {
    pub num_parameters: usize,
    pub depth: usize,
    pub gate_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VqeSummary {
    pub optimizer: String,
    pub electronic_energy: f64,
    pub total_energy: f64,
    pub nfev: usize,
    pub njev: usize,
    pub nit: usize,
    pub converged: bool,
    pub optimal_point: Vec<f64>,
    pub cost_history: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExactSummary {
    pub electronic_energy: f64,
    pub total_energy: f64,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub molecule: String,
    /// First-to-last atom distance in the configured units
    pub bond_length: Option<f64>,
    pub units: String,
    pub scf: ScfSummary,
    pub active_space: ActiveSpaceSummary,
    pub qubits: QubitSummary,
    pub ansatz: AnsatzSummary,
    pub vqe: VqeSummary,
    pub exact: Option<ExactSummary>,
}

impl RunReport {
    /// VQE minus exact, in hartree.
    pub fn error(&self) -> Option<f64> {
        self.exact
            .as_ref()
            .map(|exact| self.vqe.total_energy - exact.total_energy)
    }

    pub fn error_kcal_mol(&self) -> Option<f64> {
        self.error().map(|e| e * HARTREE_TO_KCAL_MOL)
    }

    /// Correlation energy recovered by VQE, in hartree.
    pub fn correlation_energy(&self) -> f64 {
        self.vqe.total_energy - self.scf.hf_energy
    }
}

pub fn report_restricted_summary(scf: &SimpleSCF<AtomicBasis>, outcome: &ScfOutcome) {
    info!("\nSCF calculation finished.");
    if outcome.converged {
        info!("  Converged in {} cycles", outcome.cycles);
    } else {
        info!("  Not converged after {} cycles", outcome.cycles);
    }

    info!("\nFinal Energy Levels:");
    for (i, energy) in scf.e_level.iter().enumerate() {
        let occupation = if i < scf.num_occupied() { 2 } else { 0 };
        info!("  Level {}: {:.8} au (occ {})", i + 1, energy, occupation);
    }

    info!("\nNuclear repulsion energy:  {:.10} au", scf.nuclear_repulsion());
    info!("Hartree-Fock Total Energy: {:.10} au", scf.calculate_total_energy());
}

pub fn report_vqe_summary(report: &RunReport) {
    info!("\n===========================================");
    info!("        VQE Results Summary ({})", report.molecule);
    info!("===========================================");
    if let Some(length) = report.bond_length {
        info!("Bond length:               {:.4} {}", length, report.units);
    }
    info!(
        "Qubits / parameters:       {} / {}",
        report.qubits.num_qubits, report.ansatz.num_parameters
    );
    info!("Hartree-Fock energy:       {:.10} au", report.scf.hf_energy);
    info!(
        "VQE electronic energy:     {:.10} au",
        report.vqe.electronic_energy
    );
    info!(
        "Frozen-core energy:        {:.10} au",
        report.active_space.frozen_core_energy
    );
    info!(
        "Nuclear repulsion:         {:.10} au",
        report.scf.nuclear_repulsion
    );
    info!("VQE total energy:          {:.10} au", report.vqe.total_energy);
    info!(
        "Correlation energy:        {:.10} au",
        report.correlation_energy()
    );
    if let Some(exact) = &report.exact {
        info!("Exact total energy:        {:.10} au", exact.total_energy);
    }
    if let (Some(error), Some(kcal)) = (report.error(), report.error_kcal_mol()) {
        info!(
            "VQE - exact:               {:.3e} au ({:.6} kcal/mol)",
            error, kcal
        );
    }
    info!(
        "Optimizer {}: {} iterations, {} evaluations, converged = {}",
        report.vqe.optimizer, report.vqe.nit, report.vqe.nfev, report.vqe.converged
    );
    info!("===========================================\n");
}

pub fn report_scan(reports: &[RunReport]) {
    info!("\n===========================================");
    info!("        Bond Length Scan");
    info!("===========================================");
    info!(
        "{:>10} {:>16} {:>16} {:>16} {:>12}",
        "R", "HF", "VQE", "Exact", "Error"
    );
    for report in reports {
        let exact = report
            .exact
            .as_ref()
            .map_or("-".to_string(), |e| format!("{:.10}", e.total_energy));
        let error = report
            .error()
            .map_or("-".to_string(), |e| format!("{:.3e}", e));
        info!(
            "{:>10.4} {:>16.10} {:>16.10} {:>16} {:>12}",
            report.bond_length.unwrap_or(0.0),
            report.scf.hf_energy,
            report.vqe.total_energy,
            exact,
            error
        );
    }

    if let Some(best) = reports
        .iter()
        .min_by(|a, b| a.vqe.total_energy.total_cmp(&b.vqe.total_energy))
    {
        info!(
            "Lowest VQE energy {:.10} au at R = {:.4} {}",
            best.vqe.total_energy,
            best.bond_length.unwrap_or(0.0),
            best.units
        );
    }
}
