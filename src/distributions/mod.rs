//! Discrete probability distributions.
//!
//! Domain-agnostic distribution types with closed-form summary statistics,
//! PMF/CDF evaluation, and batch sampling.
//!
//! # Supported Distributions
//!
//! | Distribution | Parameters | Mean | Variance |
//! |---|---|---|---|
//! | [`Deterministic`] | v | v | 0 |
//! | [`Binomial`] | n, p | np | np(1−p) |
//! | [`Poisson`] | λ | λ | λ |
//! | [`FiniteDiscrete`] | (value, weight) pairs | Σ pᵢvᵢ | Σ pᵢ(vᵢ−μ)² |
//!
//! # Design Notes
//!
//! Every type validates its parameters at construction and is immutable
//! afterwards. [`FiniteDiscrete`] samples through a
//! [`WeightedSampleTree`](crate::collections::WeightedSampleTree); the
//! parametric families draw directly from `rand_distr`.

mod binomial;
mod deterministic;
mod finite;
mod poisson;

pub use binomial::Binomial;
pub use deterministic::Deterministic;
pub use finite::FiniteDiscrete;
pub use poisson::Poisson;

use rand::Rng;

use crate::domain::NumberSet;

/// Error type for invalid distribution input and unavailable operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// Parameters or arguments violate the distribution's constraints.
    InvalidInput(String),
    /// The operation has no implementation for these arguments.
    UnsupportedOperation(String),
}

impl std::fmt::Display for DistributionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistributionError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            DistributionError::UnsupportedOperation(msg) => {
                write!(f, "unsupported operation: {msg}")
            }
        }
    }
}

impl std::error::Error for DistributionError {}

// ============================================================================
// Support
// ============================================================================

/// The set of values a distribution takes with non-zero probability.
#[derive(Debug, Clone, PartialEq)]
pub enum Support {
    /// An explicit finite list.
    Points(Vec<f64>),
    /// The integers `min..=max`.
    Range {
        /// Smallest value.
        min: u64,
        /// Largest value.
        max: u64,
    },
    /// A possibly infinite set.
    Set(NumberSet),
}

impl Support {
    /// Membership test.
    pub fn contains(&self, x: f64) -> bool {
        match self {
            Support::Points(points) => points.contains(&x),
            Support::Range { min, max } => {
                as_count(x).is_some_and(|k| (*min..=*max).contains(&k))
            }
            Support::Set(set) => set.contains(x),
        }
    }

    /// `true` unless the support is an infinite set.
    pub fn is_finite(&self) -> bool {
        !matches!(self, Support::Set(_))
    }
}

// ============================================================================
// DiscreteDistribution
// ============================================================================

/// Common interface of the discrete distributions in this module.
pub trait DiscreteDistribution {
    /// Expected value.
    fn mean(&self) -> f64;

    /// Variance.
    fn variance(&self) -> f64;

    /// Standard deviation.
    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Smallest support value `m` with `P(X ≤ m) ≥ 1/2`.
    fn median(&self) -> f64;

    /// A most probable value.
    fn mode(&self) -> f64;

    /// `E[(X − center)^order]`.
    ///
    /// # Errors
    /// - `InvalidInput` if `center` is not finite.
    /// - `UnsupportedOperation` if the order is beyond what the
    ///   distribution evaluates.
    fn moment(&self, order: u32, center: f64) -> Result<f64, DistributionError>;

    /// Shannon entropy in nats, `None` when no closed form is available.
    fn entropy(&self) -> Option<f64>;

    /// Probability mass at `x`.
    fn pmf(&self, x: f64) -> f64;

    /// `P(X ≤ x)`.
    fn cdf(&self, x: f64) -> f64;

    /// Values with non-zero probability.
    fn support(&self) -> Support;

    /// Draws `n` independent values.
    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64>;
}

// ============================================================================
// Shared helpers
// ============================================================================

/// `x` as a non-negative integer count, if it is one.
pub(crate) fn as_count(x: f64) -> Option<u64> {
    if x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x < u64::MAX as f64 {
        Some(x as u64)
    } else {
        None
    }
}

/// `x^order` for any unsigned order.
pub(crate) fn powu(x: f64, order: u32) -> f64 {
    match i32::try_from(order) {
        Ok(o) => x.powi(o),
        Err(_) => x.powf(f64::from(order)),
    }
}

pub(crate) fn check_center(center: f64) -> Result<(), DistributionError> {
    if center.is_finite() {
        Ok(())
    } else {
        Err(DistributionError::InvalidInput(format!(
            "moment center must be finite, got {center}"
        )))
    }
}

/// Smallest `k ≤ max` with `cdf(k) ≥ 1/2`, searching outward from `guess`.
pub(crate) fn count_median(guess: u64, max: u64, cdf: impl Fn(u64) -> f64) -> u64 {
    let mut k = guess.min(max);
    while k > 0 && cdf(k - 1) >= 0.5 {
        k -= 1;
    }
    while k < max && cdf(k) < 0.5 {
        k += 1;
    }
    k
}
