#![allow(non_snake_case)]

use nalgebra::Vector3;
use std::sync::Arc;

/// Integral interface shared by primitive and contracted Gaussians.
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;
    /// overlap <a|b>
    fn Sab(a: &Self, b: &Self) -> f64;
    /// kinetic energy <a|-1/2 ∇²|b>
    fn Tab(a: &Self, b: &Self) -> f64;
    /// attraction to a nucleus of charge `Z` located at `R`
    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64;
    /// electron repulsion (ab|cd) in chemist notation
    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64;
}

/// An atom-centred collection of basis functions.
pub trait AOBasis {
    type BasisType: Basis;

    fn set_center(&mut self, center: Vector3<f64>);
    fn get_center(&self) -> Option<Vector3<f64>>;
    fn basis_size(&self) -> usize;
    fn get_basis(&self) -> Vec<Arc<Self::BasisType>>;
}
