//! Simple implementation of the SCF trait (Restricted Hartree-Fock)

extern crate nalgebra as na;

use super::{solve_roothaan, ScfOutcome, DIIS, SCF};
use crate::app::BasisMap;
use crate::hamiltonian_impl::Eri4;
use basis::basis::{AOBasis, Basis};
use color_eyre::eyre::{eyre, Result};
use na::{DMatrix, DVector, Vector3};
use periodic_table_on_an_enum::Element;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct SimpleSCF<B: AOBasis> {
    pub num_atoms: usize,
    pub num_basis: usize,
    ao_basis: Vec<B>,
    basis_functions: Vec<Arc<B::BasisType>>,
    pub coords: Vec<Vector3<f64>>,
    pub elems: Vec<Element>,
    pub charge: i32,
    pub coeffs: DMatrix<f64>,
    pub density_mixing: f64,
    pub density_matrix: DMatrix<f64>,
    pub fock_matrix: DMatrix<f64>,
    pub h_core: DMatrix<f64>,
    pub overlap_matrix: DMatrix<f64>,
    pub e_level: DVector<f64>,
    pub max_cycle: usize,
    pub convergence_threshold: f64,
    pub diis: Option<DIIS>,
    n_occ: usize,
    eri: Eri4,
    orthogonalizer: DMatrix<f64>,
}

impl<B: AOBasis + Clone> SimpleSCF<B>
where
    B::BasisType: Send + Sync,
{
    pub fn new() -> SimpleSCF<B> {
        SimpleSCF {
            num_atoms: 0,
            num_basis: 0,
            ao_basis: Vec::new(),
            basis_functions: Vec::new(),
            coords: Vec::new(),
            elems: Vec::new(),
            charge: 0,
            coeffs: DMatrix::zeros(0, 0),
            density_mixing: 1.0,
            density_matrix: DMatrix::zeros(0, 0),
            fock_matrix: DMatrix::zeros(0, 0),
            h_core: DMatrix::zeros(0, 0),
            overlap_matrix: DMatrix::zeros(0, 0),
            e_level: DVector::zeros(0),
            max_cycle: 100,
            convergence_threshold: 1e-10,
            diis: None,
            n_occ: 0,
            eri: Eri4::zeros(0),
            orthogonalizer: DMatrix::zeros(0, 0),
        }
    }

    pub fn set_charge(&mut self, charge: i32) {
        self.charge = charge;
        info!("Molecular charge set to {}", charge);
    }

    pub fn set_convergence_threshold(&mut self, threshold: f64) {
        self.convergence_threshold = threshold;
        info!("Convergence threshold set to {}", threshold);
    }

    pub fn enable_diis(&mut self, subspace_size: usize) {
        self.diis = Some(DIIS::new(subspace_size));
        info!("DIIS enabled with subspace size {}", subspace_size);
    }

    pub fn get_basis_functions(&self) -> &[Arc<B::BasisType>] {
        &self.basis_functions
    }

    /// AO two-electron integrals (μν|λσ), chemist notation.
    pub fn eri(&self) -> &Eri4 {
        &self.eri
    }

    pub fn num_electrons(&self) -> usize {
        self.n_occ * 2
    }

    pub fn num_occupied(&self) -> usize {
        self.n_occ
    }

    /// Total electron count after charge; must be even and non-negative.
    fn count_electrons(elems: &[Element], charge: i32) -> Result<usize> {
        let nuclear: i64 = elems.iter().map(|e| e.get_atomic_number() as i64).sum();
        let electrons = nuclear - charge as i64;
        if electrons < 0 {
            return Err(eyre!(
                "Charge {} leaves a negative number of electrons",
                charge
            ));
        }
        if electrons % 2 != 0 {
            return Err(eyre!(
                "Restricted Hartree-Fock needs an even number of electrons, got {}",
                electrons
            ));
        }
        Ok(electrons as usize)
    }

    pub fn nuclear_repulsion(&self) -> f64 {
        let mut energy = 0.0;
        for i in 0..self.num_atoms {
            for j in (i + 1)..self.num_atoms {
                let r = (self.coords[i] - self.coords[j]).norm();
                let zi = self.elems[i].get_atomic_number() as f64;
                let zj = self.elems[j].get_atomic_number() as f64;
                energy += zi * zj / r;
            }
        }
        energy
    }

    pub fn orthogonalizer(&self) -> DMatrix<f64> {
        // symmetric orthogonalisation S^{-1/2}
        let eig = self.overlap_matrix.clone().symmetric_eigen();

        let threshold = 1e-10;
        let mut inv_sqrt_vals = DVector::from_element(eig.eigenvalues.len(), 0.0);
        for i in 0..eig.eigenvalues.len() {
            let val = eig.eigenvalues[i];
            // near-linear dependencies are projected out
            if val > threshold {
                inv_sqrt_vals[i] = 1.0 / val.sqrt();
            }
        }

        let inv_sqrt_d = DMatrix::from_diagonal(&inv_sqrt_vals);
        &eig.eigenvectors * inv_sqrt_d * eig.eigenvectors.transpose()
    }

    fn build_eri(&self) -> Eri4 {
        let n = self.num_basis;

        // unique quartets under the 8-fold permutational symmetry
        let mut quartets = Vec::new();
        for i in 0..n {
            for j in 0..=i {
                let ij = i * (i + 1) / 2 + j;
                for k in 0..n {
                    for l in 0..=k {
                        let kl = k * (k + 1) / 2 + l;
                        if kl <= ij {
                            quartets.push((i, j, k, l));
                        }
                    }
                }
            }
        }

        let funcs = &self.basis_functions;
        let values: Vec<f64> = quartets
            .par_iter()
            .map(|&(i, j, k, l)| B::BasisType::JKabcd(&funcs[i], &funcs[j], &funcs[k], &funcs[l]))
            .collect();

        let mut eri = Eri4::zeros(n);
        for (&(i, j, k, l), &value) in quartets.iter().zip(values.iter()) {
            eri.set_symmetric(i, j, k, l, value);
        }
        eri
    }

    /// G_ij = Σ_kl P_kl [(ij|kl) - ½ (ik|jl)]
    fn two_electron_matrix(&self, p: &DMatrix<f64>) -> DMatrix<f64> {
        let n = self.num_basis;
        let ij_pairs: Vec<(usize, usize)> =
            (0..n).flat_map(|i| (0..n).map(move |j| (i, j))).collect();

        let eri = &self.eri;
        let g_values: Vec<f64> = ij_pairs
            .par_iter()
            .map(|&(i, j)| {
                let mut g_ij = 0.0;
                for k in 0..n {
                    for l in 0..n {
                        let coulomb = eri.get(i, j, k, l);
                        let exchange = eri.get(i, k, j, l);
                        g_ij += p[(k, l)] * (coulomb - 0.5 * exchange);
                    }
                }
                g_ij
            })
            .collect();

        DMatrix::from_fn(n, n, |i, j| g_values[i * n + j])
    }

    pub fn update_fock_matrix(&mut self) {
        self.fock_matrix = &self.h_core + self.two_electron_matrix(&self.density_matrix);
    }

    fn occupied_density(&self) -> DMatrix<f64> {
        let occupied_coeffs = self.coeffs.columns(0, self.n_occ);
        2.0 * &occupied_coeffs * occupied_coeffs.transpose()
    }

    /// Canonical orbitals of the final density, without DIIS or mixing.
    fn finalize_orbitals(&mut self) {
        self.update_fock_matrix();
        let (energies, coeffs) = solve_roothaan(&self.fock_matrix, &self.orthogonalizer);
        self.e_level = energies;
        self.coeffs = coeffs;
        self.density_matrix = self.occupied_density();
    }
}

impl<B: AOBasis + Clone> Default for SimpleSCF<B>
where
    B::BasisType: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B: AOBasis + Clone> SCF for SimpleSCF<B>
where
    B::BasisType: Send + Sync,
{
    type BasisType = B;

    fn init_basis(&mut self, elems: &[Element], basis: &BasisMap<B>) -> Result<()> {
        let electrons = Self::count_electrons(elems, self.charge)?;
        self.n_occ = electrons / 2;
        self.elems = elems.to_vec();
        self.num_atoms = elems.len();
        self.ao_basis.clear();
        for elem in elems {
            let b = basis
                .get(elem.get_symbol())
                .ok_or_else(|| eyre!("No basis set loaded for {}", elem.get_symbol()))?;
            self.ao_basis.push(b.as_ref().clone());
        }
        info!(
            "{} atoms, {} electrons, {} doubly occupied orbitals",
            self.num_atoms, electrons, self.n_occ
        );
        Ok(())
    }

    fn init_geometry(&mut self, coords: &[Vector3<f64>], elems: &[Element]) {
        self.coords = coords.to_vec();
        self.elems = elems.to_vec();
        for (ao, center) in self.ao_basis.iter_mut().zip(coords.iter()) {
            ao.set_center(*center);
        }

        self.basis_functions.clear();
        self.num_basis = 0;
        for ao in &self.ao_basis {
            self.basis_functions.extend(ao.get_basis());
            self.num_basis += ao.basis_size();
        }

        self.density_matrix = DMatrix::zeros(self.num_basis, self.num_basis);
        self.fock_matrix = DMatrix::zeros(self.num_basis, self.num_basis);
        self.h_core = DMatrix::zeros(self.num_basis, self.num_basis);
        self.coeffs = DMatrix::zeros(self.num_basis, self.num_basis);
        self.e_level = DVector::zeros(self.num_basis);
        self.overlap_matrix = DMatrix::zeros(self.num_basis, self.num_basis);
        info!("Basis size: {} contracted functions", self.num_basis);
    }

    fn init_density_matrix(&mut self) {
        let n = self.num_basis;
        let ij_pairs: Vec<(usize, usize)> =
            (0..n).flat_map(|i| (0..n).map(move |j| (i, j))).collect();

        let funcs = &self.basis_functions;
        let nuclei: Vec<(Vector3<f64>, u32)> = self
            .coords
            .iter()
            .zip(self.elems.iter())
            .map(|(&r, e)| (r, e.get_atomic_number() as u32))
            .collect();

        let overlap_values: Vec<f64> = ij_pairs
            .par_iter()
            .map(|&(i, j)| B::BasisType::Sab(&funcs[i], &funcs[j]))
            .collect();

        let kinetic_values: Vec<f64> = ij_pairs
            .par_iter()
            .map(|&(i, j)| B::BasisType::Tab(&funcs[i], &funcs[j]))
            .collect();

        let nuclear_values: Vec<f64> = ij_pairs
            .par_iter()
            .map(|&(i, j)| {
                nuclei
                    .iter()
                    .map(|&(r, z)| B::BasisType::Vab(&funcs[i], &funcs[j], r, z))
                    .sum::<f64>()
            })
            .collect();

        for (idx, &(i, j)) in ij_pairs.iter().enumerate() {
            self.overlap_matrix[(i, j)] = overlap_values[idx];
            self.h_core[(i, j)] = kinetic_values[idx] + nuclear_values[idx];
        }

        info!("Computing two-electron integrals...");
        self.eri = self.build_eri();
        self.orthogonalizer = self.orthogonalizer();

        // core-Hamiltonian guess
        self.fock_matrix = self.h_core.clone();
        let (energies, coeffs) = solve_roothaan(&self.fock_matrix, &self.orthogonalizer);
        self.e_level = energies;
        self.coeffs = coeffs;

        self.density_matrix = DMatrix::zeros(n, n);
        self.update_density_matrix();
    }

    fn update_density_matrix(&mut self) {
        let new_density = self.occupied_density();

        if self.density_matrix.iter().all(|&x| x == 0.0) {
            self.density_matrix = new_density;
        } else {
            self.density_matrix = self.density_mixing * new_density
                + (1.0 - self.density_mixing) * &self.density_matrix;
        }
    }

    fn init_fock_matrix(&mut self) {
        self.update_fock_matrix();
    }

    fn scf_cycle(&mut self) -> Result<ScfOutcome> {
        if self.num_basis == 0 {
            return Err(eyre!("SCF cycle started before the basis was initialized"));
        }
        if self.n_occ > self.num_basis {
            return Err(eyre!(
                "{} occupied orbitals do not fit in {} basis functions",
                self.n_occ,
                self.num_basis
            ));
        }
        if let Some(diis) = self.diis.as_mut() {
            diis.reset();
        }

        let mut old_energy = self.calculate_total_energy();
        let mut outcome = ScfOutcome {
            converged: false,
            cycles: 0,
            energy: old_energy,
        };
        let density_threshold = self.convergence_threshold.sqrt();

        for cycle in 0..self.max_cycle {
            self.update_fock_matrix();

            if let Some(diis) = self.diis.as_mut() {
                let error =
                    diis.update(self.fock_matrix.clone(), &self.density_matrix, &self.overlap_matrix);
                if let Some(extrapolated) = diis.extrapolate() {
                    self.fock_matrix = extrapolated;
                }
                info!("  DIIS error: {:.3e} (subspace {})", error, diis.size());
            }

            let (energies, coeffs) = solve_roothaan(&self.fock_matrix, &self.orthogonalizer);
            self.e_level = energies;
            self.coeffs = coeffs;

            let old_density = self.density_matrix.clone();
            self.update_density_matrix();

            let total_energy = self.calculate_total_energy();
            let energy_change = total_energy - old_energy;
            let density_rms =
                (&self.density_matrix - &old_density).norm() / self.num_basis as f64;

            info!(
                "Cycle {}: E = {:.12} au, dE = {:.3e} au, rms(dP) = {:.3e}",
                cycle, total_energy, energy_change, density_rms
            );

            outcome.cycles = cycle + 1;
            outcome.energy = total_energy;
            if energy_change.abs() < self.convergence_threshold && density_rms < density_threshold
            {
                outcome.converged = true;
                info!("SCF converged in {} cycles.", cycle + 1);
                break;
            }
            old_energy = total_energy;
        }

        if !outcome.converged {
            warn!(
                "SCF did not converge in {} cycles; continuing with the last density",
                self.max_cycle
            );
        }

        self.finalize_orbitals();
        outcome.energy = self.calculate_total_energy();
        Ok(outcome)
    }

    /// E = Σ P_ij H_ij + ½ Σ P_ij G_ij + E_nuc
    fn calculate_total_energy(&self) -> f64 {
        if self.num_basis == 0 {
            return self.nuclear_repulsion();
        }
        let g = self.two_electron_matrix(&self.density_matrix);
        let one_electron = self.density_matrix.component_mul(&self.h_core).sum();
        let two_electron = 0.5 * self.density_matrix.component_mul(&g).sum();
        one_electron + two_electron + self.nuclear_repulsion()
    }
}
