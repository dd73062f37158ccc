//! Random number generation, shuffling, and weighted selection.
//!
//! Provides seeded RNG construction, Fisher-Yates shuffle, a linear-scan
//! weighted choice, and the binomial split used by batch samplers.
//!
//! # Reproducibility
//!
//! For reproducible experiments, use [`create_rng`] with a fixed seed.
//! The underlying algorithm (SmallRng) is deterministic for a given seed
//! on the same platform.

use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Creates a fast, seeded random number generator.
///
/// Uses `SmallRng` (Xoshiro256++) for high performance.
/// The sequence is deterministic for a given seed on the same platform.
///
/// # Examples
/// ```
/// use u_discrete::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Fisher-Yates (Durstenfeld) in-place shuffle.
///
/// # Algorithm
/// Iterates backwards, swapping each element with a uniformly chosen
/// earlier (or same) position.
///
/// Reference: Knuth (1997), *TAOCP* Vol. 2, §3.4.2, Algorithm P.
///
/// # Examples
/// ```
/// use u_discrete::random::{create_rng, shuffle};
/// let mut v = vec![1, 2, 3, 4, 5];
/// let mut rng = create_rng(42);
/// shuffle(&mut v, &mut rng);
/// v.sort();
/// assert_eq!(v, vec![1, 2, 3, 4, 5]);
/// ```
pub fn shuffle<T, R: Rng + ?Sized>(slice: &mut [T], rng: &mut R) {
    let n = slice.len();
    if n <= 1 {
        return;
    }
    for i in (1..n).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// Selects a random index weighted by the given weights.
///
/// Scans the cumulative weights linearly, so every draw costs O(n).
/// Drawing a batch this way costs O(n · batch); a
/// [`WeightedSampleTree`](crate::collections::WeightedSampleTree) draws the
/// whole batch in one pass.
///
/// Non-positive weights are never selected.
///
/// # Returns
/// - `None` if `weights` is empty or no weight is positive.
///
/// # Examples
/// ```
/// use u_discrete::random::{create_rng, weighted_choose};
/// let mut rng = create_rng(42);
/// let weights = [1.0, 2.0, 3.0];
/// let idx = weighted_choose(&weights, &mut rng).unwrap();
/// assert!(idx < 3);
/// ```
pub fn weighted_choose<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            cumulative += w;
            last_positive = Some(i);
            if cumulative > threshold {
                return Some(i);
            }
        }
    }

    // Rounding can leave the threshold just above the final cumulative sum.
    last_positive
}

/// Splits `n` trials into a left share drawn from `Binomial(n, p)`.
///
/// Returns the number of trials that go left; the remaining `n - result`
/// go right. `p` outside `[0, 1]` is clamped, and a NaN `p` sends every
/// trial right.
///
/// # Examples
/// ```
/// use u_discrete::random::{binomial_split, create_rng};
/// let mut rng = create_rng(7);
/// assert_eq!(binomial_split(10, 1.0, &mut rng), 10);
/// assert_eq!(binomial_split(10, 0.0, &mut rng), 0);
/// assert!(binomial_split(10, 0.5, &mut rng) <= 10);
/// ```
pub fn binomial_split<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> usize {
    if n == 0 || p.is_nan() || p <= 0.0 {
        return 0;
    }
    if p >= 1.0 {
        return n;
    }
    match Binomial::new(n as u64, p) {
        Ok(dist) => {
            let left = dist.sample(rng);
            usize::try_from(left).map_or(n, |k| k.min(n))
        }
        Err(_) => 0,
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn shuffle_is_permutation(
            seed in 0_u64..10000,
            data in proptest::collection::vec(0_i32..1000, 0..50),
        ) {
            let mut shuffled = data.clone();
            let mut rng = create_rng(seed);
            shuffle(&mut shuffled, &mut rng);
            let mut sorted_orig = data.clone();
            let mut sorted_shuf = shuffled;
            sorted_orig.sort();
            sorted_shuf.sort();
            prop_assert_eq!(sorted_orig, sorted_shuf);
        }

        #[test]
        fn weighted_choose_picks_positive_weight(
            seed in 0_u64..10000,
            weights in proptest::collection::vec(0.0_f64..10.0, 1..20),
        ) {
            let mut rng = create_rng(seed);
            match weighted_choose(&weights, &mut rng) {
                Some(idx) => prop_assert!(weights[idx] > 0.0),
                None => prop_assert!(weights.iter().all(|&w| w <= 0.0)),
            }
        }

        #[test]
        fn binomial_split_within_trials(
            seed in 0_u64..10000,
            n in 0_usize..5000,
            p in 0.0_f64..=1.0,
        ) {
            let mut rng = create_rng(seed);
            prop_assert!(binomial_split(n, p, &mut rng) <= n);
        }
    }
}
