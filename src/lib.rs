//! # u-discrete
//!
//! Discrete probability distributions with batch weighted sampling.
//!
//! The central structure is the [`WeightedSampleTree`]: a binary tree over
//! `(value, weight)` pairs that draws `n` weighted samples in a single pass,
//! splitting the batch at each internal node with one binomial draw.
//! [`FiniteDiscrete`] samples through it; the parametric families
//! ([`Binomial`], [`Poisson`], [`Deterministic`]) share the same
//! [`DiscreteDistribution`] interface.
//!
//! ## Modules
//!
//! - [`collections`] — the weighted sampling tree
//! - [`distributions`] — distribution types, their error type and support
//! - [`domain`] — possibly infinite number sets used as supports
//! - [`special`] — log-gamma, incomplete beta and gamma functions
//! - [`stats`] — compensated sums, sample moments, chi-squared fit
//! - [`random`] — seeded RNG, shuffle, binomial split
//! - [`config`] — compile-time limits
//!
//! ## Design Philosophy
//!
//! - **Explicit randomness**: every sampling call takes the generator, so a
//!   fixed seed reproduces the draw
//! - **Validate at the boundary**: constructors either succeed fully or
//!   return a [`DistributionError`]
//! - **Property-based testing**: tree invariants and distribution identities
//!   verified via proptest
//!
//! ## Example
//!
//! ```
//! use u_discrete::{DiscreteDistribution, FiniteDiscrete};
//! use u_discrete::random::create_rng;
//!
//! let dist = FiniteDiscrete::from_weights([(1.0, 10.0), (2.0, 50.0), (3.0, 25.0), (4.0, 15.0)]).unwrap();
//! let mut rng = create_rng(7);
//! let draws = dist.sample(10_000, &mut rng);
//! let twos = draws.iter().filter(|&&x| x == 2.0).count();
//! assert!((4_500..5_500).contains(&twos));
//! ```

pub mod collections;
pub mod config;
pub mod distributions;
pub mod domain;
pub mod random;
pub mod special;
pub mod stats;

pub use collections::{SampleNode, WeightedSampleTree};
pub use distributions::{
    Binomial, Deterministic, DiscreteDistribution, DistributionError, FiniteDiscrete, Poisson,
    Support,
};
pub use domain::{BaseSet, NumberSet};
