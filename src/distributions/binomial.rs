use rand::Rng;
use rand_distr::Distribution;

use super::{
    as_count, check_center, count_median, powu, DiscreteDistribution, DistributionError,
    FiniteDiscrete, Support,
};
use crate::config::MAX_TABULATED_SUPPORT;
use crate::special;
use crate::stats::kahan_sum;

/// Number of successes in `n` independent trials with success probability `p`.
///
/// # Mathematical Definition
/// - PMF: P(X = k) = C(n, k) pᵏ (1−p)ⁿ⁻ᵏ, k ∈ {0, …, n}
/// - CDF: P(X ≤ k) = I_{1−p}(n − k, k + 1)
/// - Mean: np
/// - Variance: np(1−p)
/// - Mode: ⌊(n+1)p⌋ (capped at n)
///
/// Moments and entropy are exact sums over the support, evaluated with a
/// log-space PMF recurrence so that no term underflows prematurely.
///
/// # Examples
/// ```
/// use u_discrete::distributions::{Binomial, DiscreteDistribution};
/// let b = Binomial::new(10, 0.3).unwrap();
/// assert!((b.mean() - 3.0).abs() < 1e-12);
/// assert!((b.variance() - 2.1).abs() < 1e-12);
/// assert_eq!(b.mode(), 3.0);
/// assert_eq!(b.median(), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct Binomial {
    n: u64,
    p: f64,
    sampler: rand_distr::Binomial,
}

impl Binomial {
    /// # Errors
    /// `InvalidInput` if `p` is not in `[0, 1]`.
    pub fn new(n: u64, p: f64) -> Result<Self, DistributionError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(DistributionError::InvalidInput(format!(
                "p must be in [0, 1], got {p}"
            )));
        }
        let sampler = rand_distr::Binomial::new(n, p)
            .map_err(|e| DistributionError::InvalidInput(format!("binomial({n}, {p}): {e}")))?;
        Ok(Self { n, p, sampler })
    }

    /// Number of trials.
    pub fn trials(&self) -> u64 {
        self.n
    }

    /// Success probability.
    pub fn probability(&self) -> f64 {
        self.p
    }

    /// Tabulates the PMF into a [`FiniteDiscrete`] over `{0, …, n}`.
    ///
    /// Values whose probability underflows to zero are left out.
    ///
    /// # Errors
    /// `UnsupportedOperation` if the support has more than
    /// [`MAX_TABULATED_SUPPORT`] points.
    pub fn to_finite_discrete(&self) -> Result<FiniteDiscrete, DistributionError> {
        self.check_tabulated("tabulate")?;
        let pairs: Vec<(f64, f64)> = self.masses().map(|(k, p)| (k as f64, p)).collect();
        log::debug!("tabulating binomial({}, {}) over {} points", self.n, self.p, pairs.len());
        FiniteDiscrete::from_weights(pairs)
    }

    /// The single support value when the outcome is certain.
    fn degenerate(&self) -> Option<u64> {
        if self.n == 0 || self.p == 0.0 {
            Some(0)
        } else if self.p == 1.0 {
            Some(self.n)
        } else {
            None
        }
    }

    fn check_tabulated(&self, what: &str) -> Result<(), DistributionError> {
        if self.n >= MAX_TABULATED_SUPPORT {
            return Err(DistributionError::UnsupportedOperation(format!(
                "cannot {what} binomial with {} trials (limit {})",
                self.n,
                MAX_TABULATED_SUPPORT - 1
            )));
        }
        Ok(())
    }

    /// `(k, P(X = k))` for every `k` in the support.
    ///
    /// # Algorithm
    /// ```text
    /// ln P(0)     = n ln(1−p)
    /// ln P(k + 1) = ln P(k) + ln((n − k) / (k + 1)) + ln(p / (1−p))
    /// ```
    fn masses(&self) -> Box<dyn Iterator<Item = (u64, f64)> + '_> {
        if let Some(k) = self.degenerate() {
            return Box::new(std::iter::once((k, 1.0)));
        }
        let log_odds = (self.p / (1.0 - self.p)).ln();
        let mut ln_p = self.n as f64 * (-self.p).ln_1p();
        Box::new((0..=self.n).map(move |k| {
            let mass = ln_p.exp();
            if k < self.n {
                ln_p += ((self.n - k) as f64 / (k + 1) as f64).ln() + log_odds;
            }
            (k, mass)
        }))
    }

    fn ln_pmf(&self, k: u64) -> f64 {
        let (n, p) = (self.n, self.p);
        if k > n {
            return f64::NEG_INFINITY;
        }
        if let Some(only) = self.degenerate() {
            return if k == only { 0.0 } else { f64::NEG_INFINITY };
        }
        special::ln_choose(n, k) + k as f64 * p.ln() + (n - k) as f64 * (-p).ln_1p()
    }

    fn cdf_count(&self, k: u64) -> f64 {
        if k >= self.n {
            return 1.0;
        }
        match self.degenerate() {
            Some(only) => {
                if k >= only {
                    1.0
                } else {
                    0.0
                }
            }
            None => special::regularized_incomplete_beta(
                1.0 - self.p,
                (self.n - k) as f64,
                k as f64 + 1.0,
            ),
        }
    }
}

impl DiscreteDistribution for Binomial {
    fn mean(&self) -> f64 {
        self.n as f64 * self.p
    }

    fn variance(&self) -> f64 {
        self.n as f64 * self.p * (1.0 - self.p)
    }

    fn median(&self) -> f64 {
        if let Some(k) = self.degenerate() {
            return k as f64;
        }
        let guess = self.mean().floor() as u64;
        count_median(guess, self.n, |k| self.cdf_count(k)) as f64
    }

    fn mode(&self) -> f64 {
        let m = ((self.n as f64 + 1.0) * self.p).floor();
        m.min(self.n as f64)
    }

    /// Exact sum over the support.
    ///
    /// # Errors
    /// `UnsupportedOperation` for `n ≥` [`MAX_TABULATED_SUPPORT`].
    fn moment(&self, order: u32, center: f64) -> Result<f64, DistributionError> {
        check_center(center)?;
        if let Some(k) = self.degenerate() {
            return Ok(powu(k as f64 - center, order));
        }
        self.check_tabulated("sum moments of")?;
        let terms: Vec<f64> = self
            .masses()
            .filter(|&(_, p)| p > 0.0)
            .map(|(k, p)| p * powu(k as f64 - center, order))
            .collect();
        Ok(kahan_sum(&terms))
    }

    /// Exact sum `−Σ p ln p` for `n <` [`MAX_TABULATED_SUPPORT`]; above that,
    /// the normal approximation `½ ln(2πe·np(1−p))`.
    fn entropy(&self) -> Option<f64> {
        if self.degenerate().is_some() {
            return Some(0.0);
        }
        if self.n >= MAX_TABULATED_SUPPORT {
            let two_pi_e = 2.0 * std::f64::consts::PI * std::f64::consts::E;
            return Some(0.5 * (two_pi_e * self.variance()).ln());
        }
        let terms: Vec<f64> = self
            .masses()
            .filter(|&(_, p)| p > 0.0)
            .map(|(_, p)| -p * p.ln())
            .collect();
        Some(kahan_sum(&terms))
    }

    fn pmf(&self, x: f64) -> f64 {
        as_count(x).map_or(0.0, |k| self.ln_pmf(k).exp())
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x < 0.0 {
            return 0.0;
        }
        if x >= self.n as f64 {
            return 1.0;
        }
        self.cdf_count(x.floor() as u64)
    }

    fn support(&self) -> Support {
        Support::Range {
            min: 0,
            max: self.n,
        }
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.sampler.sample(rng) as f64).collect()
    }
}
