//! Molecular Hamiltonian data and the Hartree-Fock reference it came from

extern crate nalgebra as na;

use super::{hartree_fock_bitstring, ElectronicIntegrals, FermionicOp};
use crate::scf_impl::{SimpleSCF, SCF};
use basis::basis::AOBasis;
use na::DVector;

#[derive(Debug, Clone)]
pub struct ElectronicStructureProblem {
    pub integrals: ElectronicIntegrals,
    pub num_spatial_orbitals: usize,
    pub num_alpha: usize,
    pub num_beta: usize,
    pub nuclear_repulsion: f64,
    /// RHF total energy, nuclear repulsion included
    pub reference_energy: f64,
    /// Energy of the electrons outside the active space (frozen core)
    pub constant: f64,
    pub orbital_energies: DVector<f64>,
    /// Index of every active orbital in the full MO list
    pub active_orbitals: Vec<usize>,
}

impl ElectronicStructureProblem {
    /// Full-space problem built from a converged RHF calculation.
    pub fn from_scf<B: AOBasis + Clone>(scf: &SimpleSCF<B>) -> Self
    where
        B::BasisType: Send + Sync,
    {
        let integrals = ElectronicIntegrals::from_ao(&scf.h_core, scf.eri(), &scf.coeffs);
        let num_spatial_orbitals = integrals.num_orbitals();
        ElectronicStructureProblem {
            integrals,
            num_spatial_orbitals,
            num_alpha: scf.num_occupied(),
            num_beta: scf.num_occupied(),
            nuclear_repulsion: scf.nuclear_repulsion(),
            reference_energy: scf.calculate_total_energy(),
            constant: 0.0,
            orbital_energies: scf.e_level.clone(),
            active_orbitals: (0..num_spatial_orbitals).collect(),
        }
    }

    pub fn num_particles(&self) -> (usize, usize) {
        (self.num_alpha, self.num_beta)
    }

    pub fn num_spin_orbitals(&self) -> usize {
        2 * self.num_spatial_orbitals
    }

    pub fn hamiltonian(&self) -> FermionicOp {
        FermionicOp::electronic_hamiltonian(&self.integrals)
    }

    pub fn hartree_fock_bitstring(&self) -> Vec<bool> {
        hartree_fock_bitstring(self.num_spatial_orbitals, self.num_particles())
    }

    /// Eigenvalue of the active-space Hamiltonian plus the inactive and nuclear parts.
    pub fn total_energy(&self, electronic: f64) -> f64 {
        electronic + self.constant + self.nuclear_repulsion
    }

    /// <HF|H|HF> of the active-space Hamiltonian for the closed-shell determinant.
    pub fn hartree_fock_electronic_energy(&self) -> f64 {
        let h = &self.integrals.one_body;
        let eri = &self.integrals.two_body;
        let n_occ = self.num_alpha.min(self.num_beta);

        let mut energy = 0.0;
        for i in 0..n_occ {
            energy += 2.0 * h[(i, i)];
            for j in 0..n_occ {
                energy += 2.0 * eri.get(i, i, j, j) - eri.get(i, j, j, i);
            }
        }
        energy
    }
}
