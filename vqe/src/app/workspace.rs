use crate::app::basis::BasisMap;
use ::basis::basis::AOBasis;
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;

/// Everything needed to start an SCF calculation for one geometry.
#[derive(Clone)]
pub struct CalculationWorkspace<B: AOBasis> {
    pub elements: Vec<Element>,
    pub coords: Vec<Vector3<f64>>,
    pub basis: BasisMap<B>,
}

impl<B: AOBasis> CalculationWorkspace<B> {
    pub fn new(elements: Vec<Element>, coords: Vec<Vector3<f64>>, basis: BasisMap<B>) -> Self {
        Self {
            elements,
            coords,
            basis,
        }
    }

    pub fn basis_map(&self) -> &BasisMap<B> {
        &self.basis
    }

    /// Distance between the first and the last atom, in bohr.
    pub fn bond_length(&self) -> Option<f64> {
        match (self.coords.first(), self.coords.last()) {
            (Some(a), Some(b)) if self.coords.len() > 1 => Some((b - a).norm()),
            _ => None,
        }
    }

    /// Same atoms and basis at new positions.
    pub fn with_coords(&self, coords: Vec<Vector3<f64>>) -> Self {
        Self {
            elements: self.elements.clone(),
            coords,
            basis: self.basis.clone(),
        }
    }

    /// Formula in order of first appearance, e.g. "LiH" or "H2".
    pub fn formula(&self) -> String {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for e in &self.elements {
            let symbol = e.get_symbol();
            match counts.iter_mut().find(|(s, _)| *s == symbol) {
                Some((_, n)) => *n += 1,
                None => counts.push((symbol, 1)),
            }
        }
        counts
            .into_iter()
            .map(|(symbol, n)| {
                if n == 1 {
                    symbol.to_string()
                } else {
                    format!("{}{}", symbol, n)
                }
            })
            .collect()
    }
}
