use rand::Rng;

use super::{check_center, powu, DiscreteDistribution, DistributionError, Support};

/// Point mass at a single value.
///
/// # Mathematical Definition
/// - PMF: P(X = v) = 1
/// - Mean, median, mode: v
/// - Variance: 0
///
/// # Examples
/// ```
/// use u_discrete::distributions::{DiscreteDistribution, Deterministic};
/// let d = Deterministic::new(4.0).unwrap();
/// assert_eq!(d.mean(), 4.0);
/// assert_eq!(d.variance(), 0.0);
/// assert_eq!(d.entropy(), Some(0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deterministic {
    value: f64,
}

impl Deterministic {
    /// # Errors
    /// `InvalidInput` if `value` is not finite.
    pub fn new(value: f64) -> Result<Self, DistributionError> {
        if !value.is_finite() {
            return Err(DistributionError::InvalidInput(format!(
                "value must be finite, got {value}"
            )));
        }
        Ok(Self { value })
    }

    /// The single support value.
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl DiscreteDistribution for Deterministic {
    fn mean(&self) -> f64 {
        self.value
    }

    fn variance(&self) -> f64 {
        0.0
    }

    fn median(&self) -> f64 {
        self.value
    }

    fn mode(&self) -> f64 {
        self.value
    }

    fn moment(&self, order: u32, center: f64) -> Result<f64, DistributionError> {
        check_center(center)?;
        Ok(powu(self.value - center, order))
    }

    fn entropy(&self) -> Option<f64> {
        Some(0.0)
    }

    fn pmf(&self, x: f64) -> f64 {
        if x == self.value {
            1.0
        } else {
            0.0
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x >= self.value {
            1.0
        } else {
            0.0
        }
    }

    fn support(&self) -> Support {
        Support::Points(vec![self.value])
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, _rng: &mut R) -> Vec<f64> {
        vec![self.value; n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_statistics() {
        let d = Deterministic::new(-2.5).unwrap();
        assert_eq!(d.mean(), -2.5);
        assert_eq!(d.median(), -2.5);
        assert_eq!(d.mode(), -2.5);
        assert_eq!(d.std_dev(), 0.0);
    }

    #[test]
    fn test_moment() {
        let d = Deterministic::new(3.0).unwrap();
        assert_eq!(d.moment(2, 1.0).unwrap(), 4.0);
        assert_eq!(d.moment(3, 0.0).unwrap(), 27.0);
        assert_eq!(d.moment(0, 100.0).unwrap(), 1.0);
        assert!(d.moment(2, f64::NAN).is_err());
    }

    #[test]
    fn test_pmf_cdf() {
        let d = Deterministic::new(1.0).unwrap();
        assert_eq!(d.pmf(1.0), 1.0);
        assert_eq!(d.pmf(1.5), 0.0);
        assert_eq!(d.cdf(0.999), 0.0);
        assert_eq!(d.cdf(1.0), 1.0);
        assert!(d.support().contains(1.0));
    }

    #[test]
    fn test_sample() {
        let d = Deterministic::new(9.0).unwrap();
        let mut rng = create_rng(0);
        assert_eq!(d.sample(4, &mut rng), vec![9.0; 4]);
        assert!(d.sample(0, &mut rng).is_empty());
    }

    #[test]
    fn test_invalid() {
        assert!(Deterministic::new(f64::NAN).is_err());
        assert!(Deterministic::new(f64::NEG_INFINITY).is_err());
    }
}
