//! Dense one- and two-electron integral containers

extern crate nalgebra as na;

use na::DMatrix;

/// Rank-4 tensor of two-electron integrals (pq|rs), chemist notation.
#[derive(Debug, Clone, PartialEq)]
pub struct Eri4 {
    n: usize,
    data: Vec<f64>,
}

impl Eri4 {
    pub fn zeros(n: usize) -> Self {
        Eri4 {
            n,
            data: vec![0.0; n * n * n * n],
        }
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    #[inline]
    fn index(&self, p: usize, q: usize, r: usize, s: usize) -> usize {
        ((p * self.n + q) * self.n + r) * self.n + s
    }

    #[inline]
    pub fn get(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.data[self.index(p, q, r, s)]
    }

    pub fn set(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        let idx = self.index(p, q, r, s);
        self.data[idx] = value;
    }

    /// Store a value under all eight permutations of real orbitals.
    pub fn set_symmetric(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        for (a, b, c, d) in [
            (p, q, r, s),
            (q, p, r, s),
            (p, q, s, r),
            (q, p, s, r),
            (r, s, p, q),
            (s, r, p, q),
            (r, s, q, p),
            (s, r, q, p),
        ] {
            self.set(a, b, c, d, value);
        }
    }

    /// (pq|rs) = Σ C_μp C_νq C_λr C_σs (μν|λσ), one index at a time.
    /// `c` has one row per basis function and one column per orbital.
    pub fn transform(&self, c: &DMatrix<f64>) -> Eri4 {
        let n = self.n;
        let m = c.ncols();
        let n2 = n * n;
        let n3 = n2 * n;

        // (pν|λσ)
        let mut t1 = vec![0.0; m * n3];
        for p in 0..m {
            for mu in 0..n {
                let coeff = c[(mu, p)];
                if coeff == 0.0 {
                    continue;
                }
                let src = &self.data[mu * n3..(mu + 1) * n3];
                let dst = &mut t1[p * n3..(p + 1) * n3];
                for (d, s) in dst.iter_mut().zip(src.iter()) {
                    *d += coeff * s;
                }
            }
        }

        // (pq|λσ)
        let mut t2 = vec![0.0; m * m * n2];
        for p in 0..m {
            for q in 0..m {
                let dst_start = (p * m + q) * n2;
                for nu in 0..n {
                    let coeff = c[(nu, q)];
                    let src_start = (p * n + nu) * n2;
                    for rest in 0..n2 {
                        t2[dst_start + rest] += coeff * t1[src_start + rest];
                    }
                }
            }
        }

        // (pq|rσ)
        let mut t3 = vec![0.0; m * m * m * n];
        for pq in 0..m * m {
            for r in 0..m {
                let dst_start = (pq * m + r) * n;
                for la in 0..n {
                    let coeff = c[(la, r)];
                    let src_start = (pq * n + la) * n;
                    for s in 0..n {
                        t3[dst_start + s] += coeff * t2[src_start + s];
                    }
                }
            }
        }

        // (pq|rs)
        let mut t4 = vec![0.0; m * m * m * m];
        for pqr in 0..m * m * m {
            for s in 0..m {
                let mut value = 0.0;
                for sg in 0..n {
                    value += c[(sg, s)] * t3[pqr * n + sg];
                }
                t4[pqr * m + s] = value;
            }
        }

        Eri4 { n: m, data: t4 }
    }

    /// Restrict every index to `orbitals`, in the given order.
    pub fn subset(&self, orbitals: &[usize]) -> Eri4 {
        let m = orbitals.len();
        let mut out = Eri4::zeros(m);
        for (a, &p) in orbitals.iter().enumerate() {
            for (b, &q) in orbitals.iter().enumerate() {
                for (c, &r) in orbitals.iter().enumerate() {
                    for (d, &s) in orbitals.iter().enumerate() {
                        out.set(a, b, c, d, self.get(p, q, r, s));
                    }
                }
            }
        }
        out
    }
}

/// Spatial-orbital integrals h_pq and (pq|rs).
#[derive(Debug, Clone)]
pub struct ElectronicIntegrals {
    pub one_body: DMatrix<f64>,
    pub two_body: Eri4,
}

impl ElectronicIntegrals {
    /// Transform AO integrals with MO coefficients (columns are orbitals).
    pub fn from_ao(h_core: &DMatrix<f64>, eri: &Eri4, coeffs: &DMatrix<f64>) -> Self {
        ElectronicIntegrals {
            one_body: coeffs.transpose() * h_core * coeffs,
            two_body: eri.transform(coeffs),
        }
    }

    pub fn num_orbitals(&self) -> usize {
        self.one_body.nrows()
    }

    pub fn subset(&self, orbitals: &[usize]) -> Self {
        let m = orbitals.len();
        ElectronicIntegrals {
            one_body: DMatrix::from_fn(m, m, |i, j| self.one_body[(orbitals[i], orbitals[j])]),
            two_body: self.two_body.subset(orbitals),
        }
    }
}
