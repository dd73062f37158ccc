use std::collections::HashSet;

use rand::Rng;

use super::{check_center, powu, DiscreteDistribution, DistributionError, Support};
use crate::collections::WeightedSampleTree;
use crate::config::UNIFORM_WEIGHT;
use crate::stats::kahan_sum;

/// Distribution over an explicit finite set of values.
///
/// Built from `(value, weight)` pairs; probabilities are the weights
/// normalized by their total. Values with zero weight are dropped from the
/// support. Sampling goes through a [`WeightedSampleTree`] built once at
/// construction, so a batch of `n` draws costs O(n + depth).
///
/// # Examples
/// ```
/// use u_discrete::distributions::{DiscreteDistribution, FiniteDiscrete};
/// use u_discrete::random::create_rng;
///
/// let d = FiniteDiscrete::from_weights([(1.0, 10.0), (2.0, 50.0), (3.0, 25.0), (4.0, 15.0)]).unwrap();
/// assert!((d.mean() - 2.45).abs() < 1e-12);
/// assert_eq!(d.mode(), 2.0);
/// assert_eq!(d.median(), 2.0);
///
/// let mut rng = create_rng(42);
/// assert_eq!(d.sample(100, &mut rng).len(), 100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FiniteDiscrete {
    values: Vec<f64>,
    probabilities: Vec<f64>,
    tree: WeightedSampleTree,
}

impl FiniteDiscrete {
    /// Builds the distribution from `(value, weight)` pairs, keeping the
    /// given order.
    ///
    /// # Errors
    /// `InvalidInput` if the input is empty, a value is not finite or
    /// repeated, a weight is negative or not finite, or every weight is
    /// zero.
    pub fn from_weights<I>(pairs: I) -> Result<Self, DistributionError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let pairs: Vec<(f64, f64)> = pairs.into_iter().collect();
        if pairs.is_empty() {
            return Err(DistributionError::InvalidInput(
                "support must not be empty".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(pairs.len());
        for &(value, weight) in &pairs {
            if !value.is_finite() {
                return Err(DistributionError::InvalidInput(format!(
                    "support values must be finite, got {value}"
                )));
            }
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(DistributionError::InvalidInput(format!(
                    "weight for {value} must be finite and >= 0, got {weight}"
                )));
            }
            // 0.0 and -0.0 are the same support point.
            let key = if value == 0.0 { 0 } else { value.to_bits() };
            if !seen.insert(key) {
                return Err(DistributionError::InvalidInput(format!(
                    "duplicate support value {value}"
                )));
            }
        }

        let kept: Vec<(f64, f64)> = pairs.into_iter().filter(|&(_, w)| w > 0.0).collect();
        if kept.is_empty() {
            return Err(DistributionError::InvalidInput(
                "at least one weight must be positive".into(),
            ));
        }

        let weights: Vec<f64> = kept.iter().map(|&(_, w)| w).collect();
        let total = kahan_sum(&weights);
        let tree = WeightedSampleTree::new(kept.iter().copied())?;
        let values = kept.iter().map(|&(v, _)| v).collect();
        let probabilities = weights.iter().map(|w| w / total).collect();

        log::debug!(
            "finite discrete distribution over {} values, total weight {total}",
            tree.len()
        );
        Ok(Self {
            values,
            probabilities,
            tree,
        })
    }

    /// Uniform distribution over `values`.
    ///
    /// # Errors
    /// Same conditions as [`FiniteDiscrete::from_weights`].
    pub fn from_values<I>(values: I) -> Result<Self, DistributionError>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::from_weights(values.into_iter().map(|v| (v, UNIFORM_WEIGHT)))
    }

    /// Support values in insertion order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Probability of each entry of [`values`](Self::values).
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Number of support values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; construction rejects an empty support.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The sampling tree over the support.
    pub fn tree(&self) -> &WeightedSampleTree {
        &self.tree
    }

    fn expectation(&self, f: impl Fn(f64) -> f64) -> f64 {
        let terms: Vec<f64> = self
            .values
            .iter()
            .zip(&self.probabilities)
            .map(|(&v, &p)| p * f(v))
            .collect();
        kahan_sum(&terms)
    }

    /// `Σ p·f(p)` over the support.
    fn expectation_of_probabilities(&self, f: impl Fn(f64) -> f64) -> f64 {
        let terms: Vec<f64> = self.probabilities.iter().map(|&p| p * f(p)).collect();
        kahan_sum(&terms)
    }
}

impl DiscreteDistribution for FiniteDiscrete {
    fn mean(&self) -> f64 {
        self.expectation(|v| v)
    }

    fn variance(&self) -> f64 {
        let mu = self.mean();
        self.expectation(|v| (v - mu) * (v - mu))
    }

    fn median(&self) -> f64 {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        let mut cumulative = 0.0;
        for &i in &order {
            cumulative += self.probabilities[i];
            if cumulative >= 0.5 {
                return self.values[i];
            }
        }
        // Rounding can leave the running sum just under 1/2 at the end.
        order.last().map_or(f64::NAN, |&i| self.values[i])
    }

    fn mode(&self) -> f64 {
        let mut best = 0;
        for (i, &p) in self.probabilities.iter().enumerate() {
            if p > self.probabilities[best] {
                best = i;
            }
        }
        self.values[best]
    }

    fn moment(&self, order: u32, center: f64) -> Result<f64, DistributionError> {
        check_center(center)?;
        Ok(self.expectation(|v| powu(v - center, order)))
    }

    fn entropy(&self) -> Option<f64> {
        Some(-self.expectation_of_probabilities(|p| p.ln()))
    }

    fn pmf(&self, x: f64) -> f64 {
        self.values
            .iter()
            .position(|&v| v == x)
            .map_or(0.0, |i| self.probabilities[i])
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let terms: Vec<f64> = self
            .values
            .iter()
            .zip(&self.probabilities)
            .filter(|&(&v, _)| v <= x)
            .map(|(_, &p)| p)
            .collect();
        kahan_sum(&terms).min(1.0)
    }

    fn support(&self) -> Support {
        Support::Points(self.values.clone())
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        self.tree
            .root()
            .map_or_else(Vec::new, |root| root.sample(n, rng))
    }
}
