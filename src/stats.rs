//! Descriptive statistics over sample batches.
//!
//! Used to summarize the output of `sample` calls and to check that a
//! sampler reproduces its target distribution.
//!
//! # Algorithms
//!
//! - **Sum / Mean**: Neumaier compensated summation for O(ε) error
//!   independent of n.
//! - **Variance**: Welford's online algorithm.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).
//! - **Goodness of fit**: Pearson's chi-squared test against a known
//!   categorical distribution.

use crate::special::chi_squared_cdf;

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// An improved variant of Kahan summation that also handles the case where
/// the addend is larger in magnitude than the running sum.
///
/// Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
/// zur Summation endlicher Summen", *ZAMM* 54(1), pp. 39–51.
///
/// # Examples
/// ```
/// use u_discrete::stats::kahan_sum;
/// let v = [1e16, 1.0, -1e16];
/// assert_eq!(kahan_sum(&v), 1.0);
/// ```
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

/// Arithmetic mean using compensated summation.
///
/// # Returns
/// - `None` if `data` is empty or contains any NaN/Inf.
///
/// # Examples
/// ```
/// use u_discrete::stats::mean;
/// assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap() - 3.0).abs() < 1e-15);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Sample (unbiased, `n − 1` denominator) variance via Welford's method.
///
/// # Returns
/// - `None` if `data.len() < 2` or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_discrete::stats::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let mut running_mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in data.iter().enumerate() {
        let delta = x - running_mean;
        running_mean += delta / (i + 1) as f64;
        m2 += delta * (x - running_mean);
    }
    Some(m2 / (data.len() - 1) as f64)
}

/// Counts how often each of `categories` occurs in `samples`.
///
/// Values are compared exactly; samples matching no category are ignored.
///
/// # Examples
/// ```
/// use u_discrete::stats::tally;
/// let counts = tally(&[1.0, 2.0, 2.0, 7.0], &[1.0, 2.0, 3.0]);
/// assert_eq!(counts, vec![1, 2, 0]);
/// ```
pub fn tally(samples: &[f64], categories: &[f64]) -> Vec<u64> {
    let mut counts = vec![0_u64; categories.len()];
    for &s in samples {
        if let Some(i) = categories.iter().position(|&c| c == s) {
            counts[i] += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Chi-squared goodness of fit
// ---------------------------------------------------------------------------

/// Outcome of a Pearson chi-squared goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquaredResult {
    /// Σ (observed − expected)² / expected.
    pub statistic: f64,
    /// Number of categories minus one.
    pub degrees_of_freedom: usize,
    /// P(X ≥ statistic) under the null hypothesis.
    pub p_value: f64,
}

impl ChiSquaredResult {
    /// `true` if the null hypothesis is not rejected at level `alpha`.
    pub fn passes(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// Tests observed category counts against expected probabilities.
///
/// `expected_probs` need not be normalized; it is rescaled to the number of
/// observations.
///
/// # Returns
/// - `None` if the slices differ in length, there are fewer than two
///   categories, there are no observations, or any expected probability is
///   not strictly positive and finite.
///
/// # Examples
/// ```
/// use u_discrete::stats::chi_squared_from_counts;
/// let result = chi_squared_from_counts(&[250, 250, 500], &[0.25, 0.25, 0.5]).unwrap();
/// assert_eq!(result.statistic, 0.0);
/// assert_eq!(result.degrees_of_freedom, 2);
/// assert!(result.passes(0.01));
/// ```
pub fn chi_squared_from_counts(observed: &[u64], expected_probs: &[f64]) -> Option<ChiSquaredResult> {
    if observed.len() != expected_probs.len() || observed.len() < 2 {
        return None;
    }
    if !expected_probs.iter().all(|&p| p.is_finite() && p > 0.0) {
        return None;
    }
    let total: u64 = observed.iter().sum();
    if total == 0 {
        return None;
    }

    let prob_total = kahan_sum(expected_probs);
    let n = total as f64;
    let statistic = observed
        .iter()
        .zip(expected_probs)
        .map(|(&o, &p)| {
            let expected = n * p / prob_total;
            let diff = o as f64 - expected;
            diff * diff / expected
        })
        .sum::<f64>();

    let degrees_of_freedom = observed.len() - 1;
    let p_value = (1.0 - chi_squared_cdf(statistic, degrees_of_freedom as f64)).clamp(0.0, 1.0);
    Some(ChiSquaredResult {
        statistic,
        degrees_of_freedom,
        p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- kahan_sum ---

    #[test]
    fn test_kahan_sum_cancellation() {
        assert_eq!(kahan_sum(&[1e16, 1.0, -1e16]), 1.0);
    }

    #[test]
    fn test_kahan_sum_many_small() {
        let v = vec![0.1; 1_000_000];
        assert!((kahan_sum(&v) - 100_000.0).abs() < 1e-8);
    }

    #[test]
    fn test_kahan_sum_empty() {
        assert_eq!(kahan_sum(&[]), 0.0);
    }

    // --- mean ---

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_nan() {
        assert_eq!(mean(&[1.0, f64::NAN, 3.0]), None);
    }

    // --- variance ---

    #[test]
    fn test_variance_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
    }

    #[test]
    fn test_variance_constant() {
        assert!(variance(&[5.0; 100]).unwrap().abs() < 1e-15);
    }

    #[test]
    fn test_variance_single() {
        assert_eq!(variance(&[1.0]), None);
    }

    #[test]
    fn test_variance_offset() {
        // Catastrophic cancellation guard: large offset, small spread.
        let v: Vec<f64> = (0..5).map(|i| 1e9 + i as f64).collect();
        let var = variance(&v).unwrap();
        assert!((var - 2.5).abs() < 1e-6, "got {var}");
    }

    // --- tally ---

    #[test]
    fn test_tally_ignores_unknown() {
        assert_eq!(tally(&[9.0, 9.0], &[1.0]), vec![0]);
    }

    // --- chi_squared_from_counts ---

    #[test]
    fn test_chi2_exact_fit() {
        let r = chi_squared_from_counts(&[100, 300], &[1.0, 3.0]).unwrap();
        assert!(r.statistic.abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_chi2_rejects_gross_mismatch() {
        let r = chi_squared_from_counts(&[900, 100], &[0.5, 0.5]).unwrap();
        assert!(r.statistic > 600.0);
        assert!(!r.passes(0.001));
    }

    #[test]
    fn test_chi2_invalid_inputs() {
        assert!(chi_squared_from_counts(&[1], &[1.0]).is_none());
        assert!(chi_squared_from_counts(&[1, 2], &[1.0]).is_none());
        assert!(chi_squared_from_counts(&[0, 0], &[0.5, 0.5]).is_none());
        assert!(chi_squared_from_counts(&[1, 2], &[0.0, 1.0]).is_none());
    }
}
