/* Contracted gaussian type orbitals (CGTO) built on the primitives in gto.rs,
   and per-atom basis sets read from NWChem-formatted text.
*/
#![allow(non_snake_case)]

use crate::basis::{AOBasis, Basis};
use crate::gto::GTO;
use color_eyre::eyre::{eyre, Result, WrapErr};
use itertools::iproduct;
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractedGTO {
    pub primitives: Vec<GTO>,
    pub coefficients: Vec<f64>,
    // shell_type: 1s, 2s, 2px, 2py, 2pz, ...
    pub shell_type: String,
    pub n: i32,
    pub l: i32,
    pub m: i32,
}

impl ContractedGTO {
    fn empty(shell_type: String, n: i32, l: i32, m: i32) -> Self {
        ContractedGTO {
            primitives: Vec::new(),
            coefficients: Vec::new(),
            shell_type,
            n,
            l,
            m,
        }
    }

    pub fn center(&self) -> Option<Vector3<f64>> {
        self.primitives.first().map(|p| p.center)
    }

    pub fn set_center(&mut self, center: Vector3<f64>) {
        for primitive in self.primitives.iter_mut() {
            *primitive = primitive.recentered(center);
        }
    }

    /// Rescale the contraction so that <φ|φ> = 1.
    pub fn normalize(&mut self) {
        let overlap = ContractedGTO::Sab(self, self);
        if overlap > 0.0 {
            let scale = 1.0 / overlap.sqrt();
            for c in self.coefficients.iter_mut() {
                *c *= scale;
            }
        }
    }
}

impl Basis for ContractedGTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.primitives
            .iter()
            .zip(self.coefficients.iter())
            .map(|(p, c)| c * p.evaluate(r))
            .sum()
    }

    fn Sab(a: &Self, b: &Self) -> f64 {
        iproduct!(0..a.primitives.len(), 0..b.primitives.len())
            .map(|(i, j)| {
                a.coefficients[i] * b.coefficients[j] * GTO::Sab(&a.primitives[i], &b.primitives[j])
            })
            .sum()
    }

    fn Tab(a: &Self, b: &Self) -> f64 {
        iproduct!(0..a.primitives.len(), 0..b.primitives.len())
            .map(|(i, j)| {
                a.coefficients[i] * b.coefficients[j] * GTO::Tab(&a.primitives[i], &b.primitives[j])
            })
            .sum()
    }

    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64 {
        iproduct!(0..a.primitives.len(), 0..b.primitives.len())
            .map(|(i, j)| {
                a.coefficients[i]
                    * b.coefficients[j]
                    * GTO::Vab(&a.primitives[i], &b.primitives[j], R, Z)
            })
            .sum()
    }

    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64 {
        iproduct!(
            0..a.primitives.len(),
            0..b.primitives.len(),
            0..c.primitives.len(),
            0..d.primitives.len()
        )
        .map(|(i, j, k, l)| {
            a.coefficients[i]
                * b.coefficients[j]
                * c.coefficients[k]
                * d.coefficients[l]
                * GTO::JKabcd(
                    &a.primitives[i],
                    &b.primitives[j],
                    &c.primitives[k],
                    &d.primitives[l],
                )
        })
        .sum()
    }
}

/// All contracted functions of one atom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicBasis {
    /// element symbol
    pub name: String,
    pub atomic_number: u32,
    pub basis_set: Vec<ContractedGTO>,
    center: Option<Vector3<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellKind {
    S,
    P,
    SP,
}

impl ShellKind {
    fn parse(token: &str) -> Option<Result<Self>> {
        match token.to_uppercase().as_str() {
            "S" => Some(Ok(ShellKind::S)),
            "P" => Some(Ok(ShellKind::P)),
            "SP" | "L" => Some(Ok(ShellKind::SP)),
            "D" | "F" | "G" => Some(Err(eyre!(
                "Shell type {} is not supported (only S, P and SP shells)",
                token
            ))),
            _ => None,
        }
    }
}

// Fortran exponents such as 0.1172280000D+05
fn parse_number(token: &str) -> Result<f64> {
    token
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .wrap_err_with(|| format!("Malformed number in basis set: {}", token))
}

impl AtomicBasis {
    // Example of nwchem format:
    // BASIS "ao basis" SPHERICAL PRINT
    // #BASIS SET: (6s,3p) -> [2s,1p]
    // Li    S
    //      16.1195750              0.15432897
    //       2.9362007              0.53532814
    //       0.7946505              0.44463454
    // Li    SP
    //       0.6362897             -0.09996723             0.15591627
    //       0.1478601              0.39951283             0.60768372
    //       0.0480887              0.70011547             0.39195739
    // END

    fn build_shells(
        lines: &[&str],
        kind: ShellKind,
        center: Vector3<f64>,
        s_count: &mut i32,
        p_count: &mut i32,
    ) -> Result<Vec<ContractedGTO>> {
        let mut res: Vec<ContractedGTO> = Vec::new();

        if matches!(kind, ShellKind::S | ShellKind::SP) {
            *s_count += 1;
            res.push(ContractedGTO::empty(format!("{}s", s_count), *s_count, 0, 0));
        }
        if matches!(kind, ShellKind::P | ShellKind::SP) {
            *p_count += 1;
            let n = *p_count + 1;
            for (label, m) in [("px", -1), ("py", 1), ("pz", 0)] {
                res.push(ContractedGTO::empty(format!("{}{}", n, label), n, 1, m));
            }
        }

        let p_offset = if kind == ShellKind::SP { 1 } else { 0 };
        let expected_columns = if kind == ShellKind::SP { 3 } else { 2 };

        for line in lines {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < expected_columns {
                return Err(eyre!(
                    "Expected {} columns in basis line '{}'",
                    expected_columns,
                    line
                ));
            }

            let alpha = parse_number(tokens[0])?;
            if alpha <= 0.0 {
                return Err(eyre!("Gaussian exponent must be positive, got {}", alpha));
            }

            if kind != ShellKind::P {
                let s_coeff = parse_number(tokens[1])?;
                res[0]
                    .primitives
                    .push(GTO::new(alpha, Vector3::new(0, 0, 0), center));
                res[0].coefficients.push(s_coeff);
            }

            if kind != ShellKind::S {
                let p_coeff = parse_number(tokens[1 + p_offset])?;
                let directions = [
                    Vector3::new(1, 0, 0),
                    Vector3::new(0, 1, 0),
                    Vector3::new(0, 0, 1),
                ];
                for (k, l_xyz) in directions.into_iter().enumerate() {
                    res[p_offset + k]
                        .primitives
                        .push(GTO::new(alpha, l_xyz, center));
                    res[p_offset + k].coefficients.push(p_coeff);
                }
            }
        }

        for shell in res.iter_mut() {
            shell.normalize();
        }
        Ok(res)
    }

    /// Parses a string in NWChem format.
    pub fn parse_nwchem(input: &str) -> Result<Self> {
        let mut symbol: Option<String> = None;
        let mut atomic_number = 0;
        let mut basis_set = Vec::new();
        let center = Vector3::zeros();

        let mut current_block: Vec<&str> = Vec::new();
        let mut current_kind: Option<ShellKind> = None;
        let mut s_count = 0;
        let mut p_count = 0;

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let upper = line.to_uppercase();
            if upper.starts_with("BASIS") || upper == "END" {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let header = tokens.len() >= 2 && tokens[0].chars().all(char::is_alphabetic);
            if header {
                let kind = match ShellKind::parse(tokens[1]) {
                    Some(kind) => kind?,
                    None => return Err(eyre!("Unknown shell type '{}'", tokens[1])),
                };

                match &symbol {
                    None => {
                        let element = Element::from_symbol(tokens[0])
                            .ok_or_else(|| eyre!("Invalid element symbol: {}", tokens[0]))?;
                        atomic_number = element.get_atomic_number() as u32;
                        symbol = Some(element.get_symbol().to_string());
                    }
                    Some(existing) if existing != tokens[0] => {
                        return Err(eyre!(
                            "Atomic name is not consistent: {} vs {}",
                            existing,
                            tokens[0]
                        ));
                    }
                    Some(_) => {}
                }

                if let Some(kind) = current_kind {
                    basis_set.extend(Self::build_shells(
                        &current_block,
                        kind,
                        center,
                        &mut s_count,
                        &mut p_count,
                    )?);
                }
                current_block.clear();
                current_kind = Some(kind);
            } else if current_kind.is_some() {
                current_block.push(line);
            } else {
                return Err(eyre!("Primitive line before any shell header: '{}'", line));
            }
        }

        if let Some(kind) = current_kind {
            basis_set.extend(Self::build_shells(
                &current_block,
                kind,
                center,
                &mut s_count,
                &mut p_count,
            )?);
        }

        let name = symbol.ok_or_else(|| eyre!("No shells found in basis set text"))?;
        Ok(AtomicBasis {
            name,
            atomic_number,
            basis_set,
            center: None,
        })
    }
}

impl AOBasis for AtomicBasis {
    type BasisType = ContractedGTO;

    fn set_center(&mut self, center: Vector3<f64>) {
        for shell in self.basis_set.iter_mut() {
            shell.set_center(center);
        }
        self.center = Some(center);
    }

    fn get_center(&self) -> Option<Vector3<f64>> {
        self.center
    }

    fn basis_size(&self) -> usize {
        self.basis_set.len()
    }

    fn get_basis(&self) -> Vec<Arc<ContractedGTO>> {
        self.basis_set.iter().cloned().map(Arc::new).collect()
    }
}
