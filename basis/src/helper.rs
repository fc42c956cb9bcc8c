use libm::erf;
use std::f64::consts::PI;

// Simpson's rule integration
pub fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}

const BOYS_SERIES_LIMIT: f64 = 30.0;
const BOYS_MAX_ORDER: i32 = 32;

/// Boys function F_n(x) = ∫₀¹ t^{2n} exp(-x t²) dt.
///
/// Small arguments use the positive-term series
/// F_n(x) = e^{-x} Σ_k (2x)^k / ((2n+1)(2n+3)...(2n+2k+1));
/// large arguments start from the closed form of F_0 and recur upward,
/// which is stable once x is well above n.
pub fn boys_function(n: i32, x: f64) -> f64 {
    assert!(
        (0..=BOYS_MAX_ORDER).contains(&n),
        "n must be between 0 and {}",
        BOYS_MAX_ORDER
    );
    assert!(x >= 0.0, "x must be nonnegative");

    if x < BOYS_SERIES_LIMIT {
        let mut denom = 2.0 * n as f64 + 1.0;
        let mut term = 1.0 / denom;
        let mut sum = term;
        for _ in 0..500 {
            denom += 2.0;
            term *= 2.0 * x / denom;
            sum += term;
            if term < sum * 1e-17 {
                break;
            }
        }
        return (-x).exp() * sum;
    }

    let sqrt_x = x.sqrt();
    let mut value = 0.5 * (PI / x).sqrt() * erf(sqrt_x);
    let exp_x = (-x).exp();
    for k in 0..n {
        value = ((2 * k + 1) as f64 * value - exp_x) / (2.0 * x);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boys_function_at_zero() {
        for n in 0..8 {
            let expected = 1.0 / (2.0 * n as f64 + 1.0);
            assert!((boys_function(n, 0.0) - expected).abs() < 1e-14);
        }
    }

    #[test]
    fn test_boys_function_against_quadrature() {
        for &x in &[0.01, 0.5, 2.0, 7.5, 18.0, 29.9, 30.1, 45.0] {
            for n in 0..6 {
                let numeric = simpson_integration(
                    |t| t.powi(2 * n) * (-x * t * t).exp(),
                    0.0,
                    1.0,
                    20_000,
                );
                let analytic = boys_function(n, x);
                assert!(
                    (numeric - analytic).abs() < 1e-10,
                    "F_{}({}) = {} but quadrature gives {}",
                    n,
                    x,
                    analytic,
                    numeric
                );
            }
        }
    }

    #[test]
    fn test_boys_function_continuity_at_switch() {
        let x = BOYS_SERIES_LIMIT;
        for n in 0..5 {
            let exact =
                simpson_integration(|t| t.powi(2 * n) * (-x * t * t).exp(), 0.0, 1.0, 20_000);
            // one ulp below the switch takes the series branch
            let series = boys_function(n, f64::from_bits(x.to_bits() - 1));
            let recurrence = boys_function(n, x);
            assert!(((series - exact) / exact).abs() < 1e-10, "n = {}", n);
            assert!(((recurrence - exact) / exact).abs() < 1e-10, "n = {}", n);
        }
    }

    #[test]
    #[should_panic]
    fn test_boys_function_rejects_negative_argument() {
        boys_function(0, -1.0);
    }
}
