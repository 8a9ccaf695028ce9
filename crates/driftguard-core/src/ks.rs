//! Two-sample Kolmogorov–Smirnov test.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Outcome of a two-sample KS test.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KsTest {
    /// Largest absolute gap between the two empirical CDFs, in `[0, 1]`.
    pub statistic: f64,
    /// Probability of a gap at least this large under the null hypothesis.
    pub p_value: f64,
}

/// Run the two-sample KS test on `a` and `b`.
///
/// The statistic is evaluated at every distinct value of the pooled sample,
/// so ties between (or within) the samples are handled exactly. The p-value
/// uses the asymptotic Kolmogorov distribution with the Stephens
/// small-sample correction. Empty input yields `statistic = 0, p_value = 1`.
pub fn ks_2samp(a: &[f64], b: &[f64]) -> KsTest {
    if a.is_empty() || b.is_empty() {
        return KsTest {
            statistic: 0.0,
            p_value: 1.0,
        };
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let statistic = ks_statistic_sorted(&a, &b);
    let n = a.len() as f64;
    let m = b.len() as f64;
    let en = (n * m / (n + m)).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * statistic;

    KsTest {
        statistic,
        p_value: kolmogorov_survival(lambda),
    }
}

/// `sup |F_a(x) - F_b(x)|` for two sorted samples.
fn ks_statistic_sorted(a: &[f64], b: &[f64]) -> f64 {
    let (n, m) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d_max = 0.0f64;

    while i < a.len() && j < b.len() {
        let x = match a[i].total_cmp(&b[j]) {
            Ordering::Greater => b[j],
            _ => a[i],
        };
        while i < a.len() && a[i].total_cmp(&x) != Ordering::Greater {
            i += 1;
        }
        while j < b.len() && b[j].total_cmp(&x) != Ordering::Greater {
            j += 1;
        }
        d_max = d_max.max((i as f64 / n - j as f64 / m).abs());
    }

    d_max
}

/// Survival function of the Kolmogorov distribution,
/// `Q(λ) = 2 Σ_{k≥1} (-1)^{k-1} exp(-2 k² λ²)`.
///
/// The alternating series converges quickly for λ above ~0.3; for smaller λ
/// it does not settle and the p-value is 1 to machine precision.
pub fn kolmogorov_survival(lambda: f64) -> f64 {
    if !(lambda > 0.0) {
        return 1.0;
    }

    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut prev_term = 0.0;

    for k in 1..=100 {
        let k = f64::from(k);
        let term = sign * (a2 * k * k).exp();
        sum += term;
        if term.abs() <= 0.001 * prev_term || term.abs() <= 1.0e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        prev_term = term.abs();
    }

    1.0
}
