use rand::Rng;
use rand_distr::Distribution;

use super::{
    as_count, check_center, count_median, powu, DiscreteDistribution, DistributionError, Support,
};
use crate::config::MAX_MOMENT_ORDER;
use crate::domain::NumberSet;
use crate::special;

/// Number of events in a fixed interval at constant rate `λ`.
///
/// # Mathematical Definition
/// - PMF: P(X = k) = λᵏ e^{−λ} / k!, k ∈ ℕ
/// - CDF: P(X ≤ k) = Q(k + 1, λ) = 1 − P(k + 1, λ)
/// - Mean: λ
/// - Variance: λ
/// - Mode: ⌊λ⌋
///
/// Raw moments are Touchard polynomials in λ,
/// `E[Xʲ] = Σᵢ S(j, i) λⁱ` with `S` the Stirling numbers of the second kind.
/// The entropy has no closed form and is reported as `None`.
///
/// # Examples
/// ```
/// use u_discrete::distributions::{DiscreteDistribution, Poisson};
/// let p = Poisson::new(3.0).unwrap();
/// assert_eq!(p.mean(), 3.0);
/// assert_eq!(p.mode(), 3.0);
/// assert!((p.moment(2, 0.0).unwrap() - 12.0).abs() < 1e-12);
/// assert_eq!(p.entropy(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Poisson {
    lambda: f64,
    sampler: rand_distr::Poisson<f64>,
}

impl Poisson {
    /// # Errors
    /// `InvalidInput` if `lambda` is not finite and strictly positive, or is
    /// too large to sample from.
    pub fn new(lambda: f64) -> Result<Self, DistributionError> {
        if !(lambda.is_finite() && lambda > 0.0) {
            return Err(DistributionError::InvalidInput(format!(
                "lambda must be finite and > 0, got {lambda}"
            )));
        }
        let sampler = rand_distr::Poisson::new(lambda)
            .map_err(|e| DistributionError::InvalidInput(format!("poisson({lambda}): {e}")))?;
        Ok(Self { lambda, sampler })
    }

    /// The rate parameter λ.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    fn cdf_count(&self, k: u64) -> f64 {
        1.0 - special::regularized_lower_gamma(k as f64 + 1.0, self.lambda)
    }

    /// `E[Xʲ]` for `j = 0..=order`.
    fn raw_moments(&self, order: u32) -> Vec<f64> {
        let order = order as usize;
        let lambda_powers: Vec<f64> = (0..=order).map(|i| powu(self.lambda, i as u32)).collect();
        // Row j of the Stirling triangle: S(j, i) = i·S(j−1, i) + S(j−1, i−1).
        let mut stirling = vec![0.0_f64; order + 1];
        stirling[0] = 1.0;
        let mut moments = Vec::with_capacity(order + 1);
        moments.push(1.0);
        for j in 1..=order {
            for i in (1..=j).rev() {
                stirling[i] = i as f64 * stirling[i] + stirling[i - 1];
            }
            stirling[0] = 0.0;
            let m: f64 = (1..=j).map(|i| stirling[i] * lambda_powers[i]).sum();
            moments.push(m);
        }
        moments
    }
}

impl DiscreteDistribution for Poisson {
    fn mean(&self) -> f64 {
        self.lambda
    }

    fn variance(&self) -> f64 {
        self.lambda
    }

    fn median(&self) -> f64 {
        // Choi (1994): the median lies within one of λ + 1/3 − 0.02/λ.
        let guess = (self.lambda + 1.0 / 3.0 - 0.02 / self.lambda).floor().max(0.0) as u64;
        count_median(guess, u64::MAX, |k| self.cdf_count(k)) as f64
    }

    fn mode(&self) -> f64 {
        self.lambda.floor()
    }

    /// `E[(X − c)^r] = Σⱼ C(r, j) E[Xʲ] (−c)^{r−j}`.
    ///
    /// # Errors
    /// `UnsupportedOperation` for `order >` [`MAX_MOMENT_ORDER`].
    fn moment(&self, order: u32, center: f64) -> Result<f64, DistributionError> {
        check_center(center)?;
        if order > MAX_MOMENT_ORDER {
            return Err(DistributionError::UnsupportedOperation(format!(
                "poisson moments are available up to order {MAX_MOMENT_ORDER}, got {order}"
            )));
        }
        let raw = self.raw_moments(order);
        if center == 0.0 {
            return Ok(raw[order as usize]);
        }
        let mut binom = 1.0_f64;
        let mut total = 0.0;
        for (j, m) in raw.iter().enumerate() {
            let j = j as u32;
            total += binom * m * powu(-center, order - j);
            binom = binom * f64::from(order - j) / f64::from(j + 1);
        }
        Ok(total)
    }

    fn entropy(&self) -> Option<f64> {
        None
    }

    fn pmf(&self, x: f64) -> f64 {
        match as_count(x) {
            Some(k) => {
                (k as f64 * self.lambda.ln() - self.lambda - special::ln_factorial(k)).exp()
            }
            None => 0.0,
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x < 0.0 {
            return 0.0;
        }
        if x >= u64::MAX as f64 {
            return 1.0;
        }
        self.cdf_count(x.floor() as u64)
    }

    fn support(&self) -> Support {
        Support::Set(NumberSet::naturals())
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n)
            .map(|_| Distribution::<f64>::sample(&self.sampler, rng))
            .collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn second_central_moment_is_lambda(lambda in 0.01_f64..50.0) {
            let p = Poisson::new(lambda).unwrap();
            let var = p.moment(2, lambda).unwrap();
            prop_assert!((var - lambda).abs() < 1e-8 * (1.0 + lambda * lambda));
        }

        #[test]
        fn cdf_in_unit_interval(lambda in 0.01_f64..100.0, x in 0.0_f64..300.0) {
            let c = Poisson::new(lambda).unwrap().cdf(x);
            prop_assert!((-1e-12..=1.0 + 1e-12).contains(&c));
        }
    }
}
