//! Frozen-core approximation and orbital removal

extern crate nalgebra as na;

use super::ElectronicStructureProblem;
use color_eyre::eyre::{eyre, Result};
use na::{DMatrix, DVector};
use periodic_table_on_an_enum::Element;
use tracing::info;

/// Number of core spatial orbitals: closed noble-gas shells below the valence.
pub fn count_core_orbitals(elems: &[Element]) -> usize {
    elems
        .iter()
        .map(|e| {
            let z = e.get_atomic_number() as usize;
            let mut count = 0;
            if z > 2 {
                count += 1;
            }
            if z > 10 {
                count += 4;
            }
            if z > 18 {
                count += 4;
            }
            if z > 36 {
                count += 9;
            }
            if z > 54 {
                count += 9;
            }
            if z > 86 {
                count += 16;
            }
            count
        })
        .sum()
}

#[derive(Debug, Clone, Default)]
pub struct ActiveSpaceTransformer {
    pub freeze_core: bool,
    /// Orbitals to drop, as indices into the full MO list
    pub remove_orbitals: Vec<usize>,
}

impl ActiveSpaceTransformer {
    pub fn new(freeze_core: bool, remove_orbitals: Vec<usize>) -> Self {
        ActiveSpaceTransformer {
            freeze_core,
            remove_orbitals,
        }
    }

    pub fn transform(
        &self,
        problem: &ElectronicStructureProblem,
        elems: &[Element],
    ) -> Result<ElectronicStructureProblem> {
        let num_core = if self.freeze_core {
            count_core_orbitals(elems)
        } else {
            0
        };
        let num_occupied = problem.num_alpha.min(problem.num_beta);
        if num_core > num_occupied {
            return Err(eyre!(
                "Cannot freeze {} core orbitals with only {} occupied",
                num_core,
                num_occupied
            ));
        }

        let mut removed = Vec::new();
        for &orbital in &self.remove_orbitals {
            let position = problem
                .active_orbitals
                .iter()
                .position(|&o| o == orbital)
                .ok_or_else(|| {
                    eyre!(
                        "Orbital {} is out of range (available: {:?})",
                        orbital,
                        problem.active_orbitals
                    )
                })?;
            if position < num_core {
                return Err(eyre!("Orbital {} is a frozen core orbital", orbital));
            }
            if position < problem.num_alpha.max(problem.num_beta) {
                return Err(eyre!("Cannot remove occupied orbital {}", orbital));
            }
            if !removed.contains(&position) {
                removed.push(position);
            }
        }

        let core: Vec<usize> = (0..num_core).collect();
        let active: Vec<usize> = (num_core..problem.num_spatial_orbitals)
            .filter(|p| !removed.contains(p))
            .collect();
        if active.is_empty() {
            return Err(eyre!("The active space is empty"));
        }

        let h = &problem.integrals.one_body;
        let eri = &problem.integrals.two_body;

        // E_core = Σ_c 2h_cc + Σ_cd [2(cc|dd) - (cd|dc)]
        let mut inactive_energy = 0.0;
        for &c in &core {
            inactive_energy += 2.0 * h[(c, c)];
            for &d in &core {
                inactive_energy += 2.0 * eri.get(c, c, d, d) - eri.get(c, d, d, c);
            }
        }

        let mut integrals = problem.integrals.subset(&active);
        let m = active.len();
        let mut fock_core = DMatrix::zeros(m, m);
        for (a, &p) in active.iter().enumerate() {
            for (b, &q) in active.iter().enumerate() {
                let mut value = 0.0;
                for &c in &core {
                    value += 2.0 * eri.get(p, q, c, c) - eri.get(p, c, c, q);
                }
                fock_core[(a, b)] = value;
            }
        }
        integrals.one_body += fock_core;

        info!(
            "Active space: {} frozen, {} removed, {} active spatial orbitals",
            num_core,
            removed.len(),
            m
        );
        info!("  Inactive (frozen-core) energy: {:.10} au", inactive_energy);

        Ok(ElectronicStructureProblem {
            integrals,
            num_spatial_orbitals: m,
            num_alpha: problem.num_alpha - num_core,
            num_beta: problem.num_beta - num_core,
            nuclear_repulsion: problem.nuclear_repulsion,
            reference_energy: problem.reference_energy,
            constant: problem.constant + inactive_energy,
            orbital_energies: DVector::from_fn(m, |i, _| problem.orbital_energies[active[i]]),
            active_orbitals: active.iter().map(|&p| problem.active_orbitals[p]).collect(),
        })
    }
}
