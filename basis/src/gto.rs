#![allow(non_snake_case)]
extern crate nalgebra as na;

use crate::basis::Basis;
use crate::helper::boys_function;
use itertools::iproduct;
use na::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Normalized one-dimensional Cartesian Gaussian x^l exp(-alpha x^2).
#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO1d {
    pub alpha: f64,
    pub l: i32,
    pub center: f64,
    pub norm: f64,
}

fn double_factorial(n: i32) -> f64 {
    (1..=n).rev().step_by(2).map(|k| k as f64).product()
}

/// Gaussian product of two 1D primitives, the data every McMurchie-Davidson
/// coefficient depends on.
#[derive(Debug, Clone, Copy)]
struct GaussianPair {
    a: f64,
    b: f64,
    p: f64,
    mu: f64,
    ab: f64,
}

impl GaussianPair {
    fn new(a: f64, b: f64, ab: f64) -> Self {
        let p = a + b;
        GaussianPair {
            a,
            b,
            p,
            mu: a * b / p,
            ab,
        }
    }

    /// Hermite expansion coefficient E^{ij}_t.
    fn coefficient(&self, i: i32, j: i32, t: i32) -> f64 {
        if i < 0 || j < 0 || t < 0 || t > i + j {
            return 0.0;
        }
        if i == 0 && j == 0 {
            return (-self.mu * self.ab * self.ab).exp();
        }
        // recur on i while j is zero, otherwise on j
        let (di, dj, shift) = if j == 0 {
            (1, 0, -self.mu * self.ab / self.a)
        } else {
            (0, 1, self.mu * self.ab / self.b)
        };
        let (i, j) = (i - di, j - dj);
        self.coefficient(i, j, t - 1) / (2.0 * self.p)
            + shift * self.coefficient(i, j, t)
            + (t + 1) as f64 * self.coefficient(i, j, t + 1)
    }
}

impl GTO1d {
    pub fn new(alpha: f64, l: i32, center: f64) -> Self {
        // N^2 = (4 alpha)^l sqrt(2 alpha / pi) / (2l - 1)!!
        let norm_sq =
            (4.0 * alpha).powi(l) * (2.0 * alpha / PI).sqrt() / double_factorial(2 * l - 1);
        GTO1d {
            alpha,
            l,
            center,
            norm: norm_sq.sqrt(),
        }
    }

    fn pair(a: &GTO1d, b: &GTO1d) -> GaussianPair {
        GaussianPair::new(a.alpha, b.alpha, a.center - b.center)
    }

    pub(crate) fn evaluate(&self, x: f64) -> f64 {
        let dx = x - self.center;
        self.norm * dx.powi(self.l) * (-self.alpha * dx * dx).exp()
    }

    /// Second derivative, used to check the kinetic integral numerically.
    pub fn laplacian(&self, x: f64) -> f64 {
        let dx = x - self.center;
        let l = self.l as f64;
        let lowered = if self.l > 1 {
            l * (l - 1.0) * dx.powi(self.l - 2)
        } else {
            0.0
        };
        let polynomial = lowered - 2.0 * self.alpha * (2.0 * l + 1.0) * dx.powi(self.l)
            + 4.0 * self.alpha * self.alpha * dx.powi(self.l + 2);
        self.norm * polynomial * (-self.alpha * dx * dx).exp()
    }

    /// E^{ij}_t for t = 0..=i+j.
    fn hermite_row(a: &GTO1d, b: &GTO1d) -> Vec<f64> {
        let pair = GTO1d::pair(a, b);
        (0..=a.l + b.l).map(|t| pair.coefficient(a.l, b.l, t)).collect()
    }

    pub(crate) fn Sab(a: &GTO1d, b: &GTO1d) -> f64 {
        let pair = GTO1d::pair(a, b);
        a.norm * b.norm * (PI / pair.p).sqrt() * pair.coefficient(a.l, b.l, 0)
    }

    /// -1/2 <a| d^2/dx^2 |b>, expanded through the derivative of the ket.
    pub(crate) fn Tab(a: &GTO1d, b: &GTO1d) -> f64 {
        let pair = GTO1d::pair(a, b);
        let lb = b.l as f64;
        let overlap = |j: i32| pair.coefficient(a.l, j, 0);

        let d2 = lb * (lb - 1.0) * overlap(b.l - 2)
            - 2.0 * b.alpha * (2.0 * lb + 1.0) * overlap(b.l)
            + 4.0 * b.alpha * b.alpha * overlap(b.l + 2);
        -0.5 * a.norm * b.norm * (PI / pair.p).sqrt() * d2
    }
}

/// Auxiliary Hermite Coulomb integrals R^0_{tuv} for one product exponent
/// and one separation vector, tabulated for every t, u, v up to `max`.
struct CoulombTable {
    dims: [usize; 3],
    values: Vec<f64>,
}

impl CoulombTable {
    fn index(dims: &[usize; 3], t: usize, u: usize, v: usize) -> usize {
        (t * dims[1] + u) * dims[2] + v
    }

    fn new(p: f64, pc: Vector3<f64>, max: Vector3<i32>) -> Self {
        let dims = [max.x as usize + 1, max.y as usize + 1, max.z as usize + 1];
        let size = dims[0] * dims[1] * dims[2];
        let order = (max.x + max.y + max.z) as usize;
        let arg = p * pc.norm_squared();

        // R^n is needed for t + u + v <= order - n; fill from the highest n down
        let mut upper = vec![0.0; size];
        let mut current = vec![0.0; size];
        for n in (0..=order).rev() {
            let reach = order - n;
            for (t, u, v) in iproduct!(0..dims[0], 0..dims[1], 0..dims[2]) {
                if t + u + v > reach {
                    continue;
                }
                let value = if t > 0 {
                    let mut r = pc.x * upper[Self::index(&dims, t - 1, u, v)];
                    if t > 1 {
                        r += (t - 1) as f64 * upper[Self::index(&dims, t - 2, u, v)];
                    }
                    r
                } else if u > 0 {
                    let mut r = pc.y * upper[Self::index(&dims, t, u - 1, v)];
                    if u > 1 {
                        r += (u - 1) as f64 * upper[Self::index(&dims, t, u - 2, v)];
                    }
                    r
                } else if v > 0 {
                    let mut r = pc.z * upper[Self::index(&dims, t, u, v - 1)];
                    if v > 1 {
                        r += (v - 1) as f64 * upper[Self::index(&dims, t, u, v - 2)];
                    }
                    r
                } else {
                    (-2.0 * p).powi(n as i32) * boys_function(n as i32, arg)
                };
                current[Self::index(&dims, t, u, v)] = value;
            }
            std::mem::swap(&mut upper, &mut current);
        }

        CoulombTable {
            dims,
            values: upper,
        }
    }

    fn get(&self, t: i32, u: i32, v: i32) -> f64 {
        self.values[Self::index(&self.dims, t as usize, u as usize, v as usize)]
    }
}

/// Normalized Cartesian Gaussian primitive, a product of three [`GTO1d`].
#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO {
    pub alpha: f64,
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
    pub norm: f64,
    pub gto1d: [GTO1d; 3],
}

impl GTO {
    pub fn new(alpha: f64, l_xyz: Vector3<i32>, center: Vector3<f64>) -> Self {
        let gto1d = [0, 1, 2].map(|k| GTO1d::new(alpha, l_xyz[k], center[k]));
        GTO {
            alpha,
            l_xyz,
            center,
            norm: gto1d.iter().map(|g| g.norm).product(),
            gto1d,
        }
    }

    /// Same exponent and angular part, moved to a new centre.
    pub fn recentered(&self, center: Vector3<f64>) -> Self {
        GTO::new(self.alpha, self.l_xyz, center)
    }

    pub fn laplacian(&self, r: &Vector3<f64>) -> f64 {
        let values = [0, 1, 2].map(|k| self.gto1d[k].evaluate(r[k]));
        (0..3)
            .map(|k| {
                let mut term = self.gto1d[k].laplacian(r[k]);
                for other in (0..3).filter(|&o| o != k) {
                    term *= values[other];
                }
                term
            })
            .sum()
    }

    /// Exponent, centre and total angular momentum of the product a * b.
    fn product(a: &GTO, b: &GTO) -> (f64, Vector3<f64>, Vector3<i32>) {
        let p = a.alpha + b.alpha;
        let center = (a.center * a.alpha + b.center * b.alpha) / p;
        (p, center, a.l_xyz + b.l_xyz)
    }

    fn hermite_rows(a: &GTO, b: &GTO) -> [Vec<f64>; 3] {
        [0, 1, 2].map(|k| GTO1d::hermite_row(&a.gto1d[k], &b.gto1d[k]))
    }

    fn axis_overlaps(a: &GTO, b: &GTO) -> [f64; 3] {
        [0, 1, 2].map(|k| GTO1d::Sab(&a.gto1d[k], &b.gto1d[k]))
    }
}

impl Basis for GTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        (0..3).map(|k| self.gto1d[k].evaluate(r[k])).product()
    }

    fn Sab(a: &GTO, b: &GTO) -> f64 {
        GTO::axis_overlaps(a, b).iter().product()
    }

    fn Tab(a: &GTO, b: &GTO) -> f64 {
        let s = GTO::axis_overlaps(a, b);
        (0..3)
            .map(|k| {
                let t = GTO1d::Tab(&a.gto1d[k], &b.gto1d[k]);
                t * s[(k + 1) % 3] * s[(k + 2) % 3]
            })
            .sum()
    }

    fn Vab(a: &GTO, b: &GTO, R: Vector3<f64>, Z: u32) -> f64 {
        let (p, center, l) = GTO::product(a, b);
        let [ex, ey, ez] = GTO::hermite_rows(a, b);
        let table = CoulombTable::new(p, center - R, l);

        let sum: f64 = iproduct!(0..=l.x, 0..=l.y, 0..=l.z)
            .map(|(t, u, v)| ex[t as usize] * ey[u as usize] * ez[v as usize] * table.get(t, u, v))
            .sum();

        -(Z as f64) * 2.0 * PI / p * a.norm * b.norm * sum
    }

    fn JKabcd(a: &GTO, b: &GTO, c: &GTO, d: &GTO) -> f64 {
        let (p, bra_center, l_bra) = GTO::product(a, b);
        let (q, ket_center, l_ket) = GTO::product(c, d);
        let reduced = p * q / (p + q);
        let bra = GTO::hermite_rows(a, b);
        let ket = GTO::hermite_rows(c, d);
        let table = CoulombTable::new(reduced, bra_center - ket_center, l_bra + l_ket);

        let ket_terms: Vec<(i32, i32, i32, f64)> =
            iproduct!(0..=l_ket.x, 0..=l_ket.y, 0..=l_ket.z)
                .map(|(x, y, z)| {
                    let parity = if (x + y + z) % 2 == 0 { 1.0 } else { -1.0 };
                    let weight = parity * ket[0][x as usize] * ket[1][y as usize] * ket[2][z as usize];
                    (x, y, z, weight)
                })
                .collect();

        let sum: f64 = iproduct!(0..=l_bra.x, 0..=l_bra.y, 0..=l_bra.z)
            .map(|(t, u, v)| {
                let weight = bra[0][t as usize] * bra[1][u as usize] * bra[2][v as usize];
                weight
                    * ket_terms
                        .iter()
                        .map(|&(x, y, z, w)| w * table.get(t + x, u + y, v + z))
                        .sum::<f64>()
            })
            .sum();

        2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt()) * a.norm * b.norm * c.norm * d.norm * sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hermite_coefficients_low_order() {
        let pair = GaussianPair::new(0.8, 1.3, 0.45);
        let e00 = (-pair.mu * 0.45 * 0.45).exp();
        assert!((pair.coefficient(0, 0, 0) - e00).abs() < 1e-15);
        // X_PA = -b X_AB / p
        let x_pa = -1.3 * 0.45 / pair.p;
        assert!((pair.coefficient(1, 0, 0) - x_pa * e00).abs() < 1e-15);
        assert!((pair.coefficient(1, 0, 1) - e00 / (2.0 * pair.p)).abs() < 1e-15);
        assert_eq!(pair.coefficient(1, 0, 2), 0.0);
    }

    #[test]
    fn test_coulomb_table_against_boys_closed_forms() {
        let p: f64 = 1.7;
        let pc = Vector3::new(0.6, -0.2, 0.3);
        let arg = p * pc.norm_squared();
        let f = |n: i32| (-2.0 * p).powi(n) * boys_function(n, arg);
        let table = CoulombTable::new(p, pc, Vector3::new(2, 1, 1));

        assert!((table.get(0, 0, 0) - f(0)).abs() < 1e-12);
        assert!((table.get(1, 0, 0) - pc.x * f(1)).abs() < 1e-12);
        assert!((table.get(0, 1, 0) - pc.y * f(1)).abs() < 1e-12);
        assert!((table.get(2, 0, 0) - (f(1) + pc.x * pc.x * f(2))).abs() < 1e-12);
        assert!((table.get(1, 1, 1) - pc.x * pc.y * pc.z * f(3)).abs() < 1e-12);
    }
}
