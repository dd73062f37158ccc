//! Weighted sampling tree for batch draws.
//!
//! A binary tree over `(value, weight)` pairs, grown one item at a time.
//! Every internal node stores the total weight of its subtree and keeps its
//! heavier child on the left. Drawing `n` samples walks the tree once,
//! splitting the batch at each internal node with a single binomial draw.
//!
//! # Algorithm
//!
//! **Insertion** compares the new weight against the node it reaches:
//!
//! - a leaf is replaced by an internal node joining the old leaf and the
//!   new one, heavier on the left (ties keep the old leaf on the left);
//! - an internal node whose heavier child is lighter than the new weight is
//!   joined with the new leaf the same way;
//! - otherwise the weight is added to the node's total and insertion
//!   continues into the right child, first swapping the children when the
//!   right side would overtake the left.
//!
//! **Sampling** sends `n_left ~ Binomial(n, w_left / w)` draws left and the
//! rest right, so every leaf receives its exact multinomial share.
//!
//! # Complexity
//!
//! - Insert: O(depth)
//! - Sample `n` values: O(n) output plus one binomial draw per internal node
//!   that receives at least one draw
//!
//! The shape heuristic does not bound depth: inserting strictly increasing
//! weights produces a chain of depth `m - 1` for `m` items.

use rand::Rng;

use crate::distributions::DistributionError;
use crate::random::binomial_split;

/// Node of a [`WeightedSampleTree`].
///
/// Internal nodes own both children and cache their combined weight.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleNode {
    /// A single support value with its positive weight.
    Leaf {
        /// The value returned when this leaf is drawn.
        value: f64,
        /// Unnormalized probability mass.
        weight: f64,
    },
    /// Aggregate of two subtrees, `left.weight() >= right.weight()`.
    Internal {
        /// `left.weight() + right.weight()`.
        weight: f64,
        left: Box<SampleNode>,
        right: Box<SampleNode>,
    },
}

impl SampleNode {
    /// Creates a leaf after validating the pair.
    ///
    /// # Errors
    /// `InvalidInput` if `value` is not finite or `weight` is not finite
    /// and strictly positive.
    pub fn leaf(value: f64, weight: f64) -> Result<Self, DistributionError> {
        validate_item(value, weight)?;
        Ok(SampleNode::Leaf { value, weight })
    }

    /// Total weight of this subtree.
    pub fn weight(&self) -> f64 {
        match self {
            SampleNode::Leaf { weight, .. } | SampleNode::Internal { weight, .. } => *weight,
        }
    }

    /// Returns `true` for a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, SampleNode::Leaf { .. })
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0_usize)];
        while let Some((node, d)) = stack.pop() {
            match node {
                SampleNode::Leaf { .. } => deepest = deepest.max(d),
                SampleNode::Internal { left, right, .. } => {
                    stack.push((left.as_ref(), d + 1));
                    stack.push((right.as_ref(), d + 1));
                }
            }
        }
        deepest
    }

    /// Iterates over the `(value, weight)` pairs stored in the leaves,
    /// left to right.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Adds `(value, weight)` below this node, keeping the heavier child on
    /// the left at every internal node along the insertion path.
    ///
    /// # Errors
    /// `InvalidInput` if the pair is invalid or the subtree total would
    /// overflow to infinity. The node is left untouched on error.
    pub fn insert(&mut self, value: f64, weight: f64) -> Result<(), DistributionError> {
        validate_item(value, weight)?;
        if !(self.weight() + weight).is_finite() {
            return Err(DistributionError::InvalidInput(format!(
                "total weight overflows when adding weight {weight}"
            )));
        }

        let mut node = self;
        loop {
            // Decide on a shared borrow so the join path holds no child borrows.
            let descend = matches!(
                &*node,
                SampleNode::Internal { left, .. } if weight <= left.weight()
            );
            if !descend {
                let new_leaf = SampleNode::Leaf { value, weight };
                let old = std::mem::replace(node, new_leaf.clone());
                *node = SampleNode::join(old, new_leaf);
                return Ok(());
            }
            if let SampleNode::Internal {
                weight: total,
                left,
                right,
            } = node
            {
                *total += weight;
                if weight + right.weight() > left.weight() {
                    std::mem::swap(left, right);
                    node = &mut **left;
                } else {
                    node = &mut **right;
                }
            }
        }
    }

    /// Draws `n` values, each leaf chosen with probability proportional to
    /// its weight.
    ///
    /// Output is grouped by leaf; the order carries no statistical meaning.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        let mut out = Vec::with_capacity(n);
        if n == 0 {
            return out;
        }
        let mut stack = vec![(self, n)];
        while let Some((node, count)) = stack.pop() {
            match node {
                SampleNode::Leaf { value, .. } => out.resize(out.len() + count, *value),
                SampleNode::Internal {
                    weight,
                    left,
                    right,
                } => {
                    let n_left = binomial_split(count, left.weight() / weight, rng);
                    let n_right = count - n_left;
                    if n_right > 0 {
                        stack.push((right.as_ref(), n_right));
                    }
                    if n_left > 0 {
                        stack.push((left.as_ref(), n_left));
                    }
                }
            }
        }
        out
    }

    /// Joins two subtrees under a new internal node, heavier on the left.
    /// Ties keep `existing` on the left.
    fn join(existing: SampleNode, added: SampleNode) -> SampleNode {
        let weight = existing.weight() + added.weight();
        let (left, right) = if added.weight() > existing.weight() {
            (added, existing)
        } else {
            (existing, added)
        };
        SampleNode::Internal {
            weight,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

fn validate_item(value: f64, weight: f64) -> Result<(), DistributionError> {
    if !value.is_finite() {
        return Err(DistributionError::InvalidInput(format!(
            "value must be finite, got {value}"
        )));
    }
    if !(weight.is_finite() && weight > 0.0) {
        return Err(DistributionError::InvalidInput(format!(
            "weight must be finite and > 0, got {weight} for value {value}"
        )));
    }
    Ok(())
}

/// Iterator over the leaves of a [`SampleNode`], see [`SampleNode::leaves`].
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    stack: Vec<&'a SampleNode>,
}

impl Iterator for Leaves<'_> {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                SampleNode::Leaf { value, weight } => return Some((*value, *weight)),
                SampleNode::Internal { left, right, .. } => {
                    self.stack.push(right.as_ref());
                    self.stack.push(left.as_ref());
                }
            }
        }
        None
    }
}

// ============================================================================
// WeightedSampleTree
// ============================================================================

/// Batch weighted sampler over a finite set of `(value, weight)` pairs.
///
/// # Examples
/// ```
/// use u_discrete::collections::WeightedSampleTree;
/// use u_discrete::random::create_rng;
///
/// let tree = WeightedSampleTree::new([(1.0, 10.0), (2.0, 50.0), (3.0, 25.0), (4.0, 15.0)]).unwrap();
/// assert_eq!(tree.len(), 4);
/// assert_eq!(tree.total_weight(), 100.0);
///
/// let mut rng = create_rng(42);
/// let draws = tree.sample(1000, &mut rng).unwrap();
/// assert_eq!(draws.len(), 1000);
/// assert!(draws.iter().all(|v| [1.0, 2.0, 3.0, 4.0].contains(v)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedSampleTree {
    root: Option<SampleNode>,
    len: usize,
}

impl WeightedSampleTree {
    /// Builds a tree by inserting `items` in order.
    ///
    /// All items are validated before any node is created.
    ///
    /// # Errors
    /// `InvalidInput` if `items` is empty, any value is not finite, any
    /// weight is not finite and strictly positive, or the total weight
    /// overflows.
    pub fn new<I>(items: I) -> Result<Self, DistributionError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let items: Vec<(f64, f64)> = items.into_iter().collect();
        if items.is_empty() {
            return Err(DistributionError::InvalidInput(
                "cannot build a sample tree from an empty item list".into(),
            ));
        }
        let mut total = 0.0_f64;
        for &(value, weight) in &items {
            validate_item(value, weight)?;
            total += weight;
        }
        if !total.is_finite() {
            return Err(DistributionError::InvalidInput(
                "total weight overflows".into(),
            ));
        }

        let mut tree = Self::empty();
        for (value, weight) in items {
            tree.insert(value, weight)?;
        }
        log::debug!(
            "built sample tree: {} items, total weight {}, depth {}",
            tree.len,
            tree.total_weight(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Creates a tree with no items.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds one `(value, weight)` pair.
    ///
    /// # Errors
    /// Same conditions as [`WeightedSampleTree::new`]; the tree is
    /// unchanged on error.
    pub fn insert(&mut self, value: f64, weight: f64) -> Result<(), DistributionError> {
        match &mut self.root {
            Some(root) => root.insert(value, weight)?,
            None => self.root = Some(SampleNode::leaf(value, weight)?),
        }
        self.len += 1;
        Ok(())
    }

    /// Draws `n` values with probability proportional to weight.
    ///
    /// # Errors
    /// `InvalidInput` if `n > 0` and the tree is empty.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>, DistributionError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let root = self.root.as_ref().ok_or_else(|| {
            DistributionError::InvalidInput("cannot sample from an empty tree".into())
        })?;
        log::trace!("sampling {n} values from {} leaves", self.len);
        Ok(root.sample(n, rng))
    }

    /// Sum of all inserted weights; `0.0` when empty.
    pub fn total_weight(&self) -> f64 {
        self.root.as_ref().map_or(0.0, SampleNode::weight)
    }

    /// Number of inserted items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Longest root-to-leaf path; `0` for an empty or single-item tree.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, SampleNode::depth)
    }

    /// Iterates over the stored `(value, weight)` pairs.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            stack: self.root.iter().collect(),
        }
    }

    /// The root node, if any.
    pub fn root(&self) -> Option<&SampleNode> {
        self.root.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
fn check_invariants(node: &SampleNode) -> Result<(), String> {
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if let SampleNode::Internal {
            weight,
            left,
            right,
        } = n
        {
            if left.weight() < right.weight() {
                return Err(format!(
                    "left {} lighter than right {}",
                    left.weight(),
                    right.weight()
                ));
            }
            let sum = left.weight() + right.weight();
            if (weight - sum).abs() > 1e-9 * sum.max(1.0) {
                return Err(format!("stored {weight} != children sum {sum}"));
            }
            stack.push(left.as_ref());
            stack.push(right.as_ref());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{create_rng, shuffle};
    use crate::stats::{chi_squared_from_counts, tally};

    fn scenario() -> Vec<(f64, f64)> {
        vec![(1.0, 10.0), (2.0, 50.0), (3.0, 25.0), (4.0, 15.0)]
    }

    #[test]
    fn test_leaf_insert_heavier_goes_left() {
        let mut node = SampleNode::leaf(1.0, 2.0).unwrap();
        node.insert(2.0, 5.0).unwrap();
        match &node {
            SampleNode::Internal {
                weight,
                left,
                right,
            } => {
                assert_eq!(*weight, 7.0);
                assert_eq!(**left, SampleNode::Leaf { value: 2.0, weight: 5.0 });
                assert_eq!(**right, SampleNode::Leaf { value: 1.0, weight: 2.0 });
            }
            SampleNode::Leaf { .. } => panic!("expected internal node"),
        }
    }

    #[test]
    fn test_leaf_insert_tie_keeps_existing_left() {
        let mut node = SampleNode::leaf(1.0, 3.0).unwrap();
        node.insert(2.0, 3.0).unwrap();
        let leaves: Vec<_> = node.leaves().collect();
        assert_eq!(leaves, vec![(1.0, 3.0), (2.0, 3.0)]);
    }

    #[test]
    fn test_insert_heavier_than_subtree_becomes_left() {
        let mut node = SampleNode::leaf(1.0, 2.0).unwrap();
        node.insert(2.0, 1.0).unwrap();
        node.insert(3.0, 10.0).unwrap();
        let SampleNode::Internal { left, right, .. } = &node else {
            panic!("expected internal node");
        };
        assert_eq!(**left, SampleNode::Leaf { value: 3.0, weight: 10.0 });
        assert_eq!(right.weight(), 3.0);
    }

    #[test]
    fn test_insert_sibling_of_existing_subtree() {
        // 2.5 > left (2) but not > total (3): becomes right sibling of old node.
        let mut node = SampleNode::leaf(1.0, 2.0).unwrap();
        node.insert(2.0, 1.0).unwrap();
        node.insert(3.0, 2.5).unwrap();
        let SampleNode::Internal { left, right, .. } = &node else {
            panic!("expected internal node");
        };
        assert_eq!(left.weight(), 3.0);
        assert!(!left.is_leaf());
        assert_eq!(**right, SampleNode::Leaf { value: 3.0, weight: 2.5 });
    }

    #[test]
    fn test_insert_promotes_right_child() {
        // left 4, right 3; adding 2 makes the right side 5 > 4, so swap.
        let mut node = SampleNode::leaf(1.0, 4.0).unwrap();
        node.insert(2.0, 3.0).unwrap();
        node.insert(3.0, 2.0).unwrap();
        let SampleNode::Internal {
            weight,
            left,
            right,
        } = &node
        else {
            panic!("expected internal node");
        };
        assert_eq!(*weight, 9.0);
        assert_eq!(left.weight(), 5.0);
        assert_eq!(**right, SampleNode::Leaf { value: 1.0, weight: 4.0 });
        check_invariants(&node).unwrap();
    }

    #[test]
    fn test_insert_descends_right() {
        // left 10, right 1; adding 2 leaves right at 3 <= 10.
        let mut node = SampleNode::leaf(1.0, 10.0).unwrap();
        node.insert(2.0, 1.0).unwrap();
        node.insert(3.0, 2.0).unwrap();
        let SampleNode::Internal { left, right, .. } = &node else {
            panic!("expected internal node");
        };
        assert_eq!(**left, SampleNode::Leaf { value: 1.0, weight: 10.0 });
        assert_eq!(right.weight(), 3.0);
        check_invariants(&node).unwrap();
    }

    #[test]
    fn test_scenario_totals() {
        let tree = WeightedSampleTree::new(scenario()).unwrap();
        assert_eq!(tree.total_weight(), 100.0);
        assert_eq!(tree.len(), 4);
        check_invariants(tree.root().unwrap()).unwrap();
    }

    #[test]
    fn test_scenario_frequencies() {
        let tree = WeightedSampleTree::new(scenario()).unwrap();
        let mut rng = create_rng(42);
        let n = 100_000;
        let draws = tree.sample(n, &mut rng).unwrap();
        assert_eq!(draws.len(), n);

        let counts = tally(&draws, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(counts.iter().sum::<u64>(), n as u64);
        for (count, expected) in counts.iter().zip([0.10, 0.50, 0.25, 0.15]) {
            let freq = *count as f64 / n as f64;
            assert!((freq - expected).abs() < 0.01, "freq {freq} vs {expected}");
        }
    }

    #[test]
    fn test_scenario_chi_squared() {
        let tree = WeightedSampleTree::new(scenario()).unwrap();
        let mut rng = create_rng(7);
        let draws = tree.sample(50_000, &mut rng).unwrap();
        let counts = tally(&draws, &[1.0, 2.0, 3.0, 4.0]);
        let result = chi_squared_from_counts(&counts, &[10.0, 50.0, 25.0, 15.0]).unwrap();
        assert!(result.passes(0.001), "p = {}", result.p_value);
    }

    #[test]
    fn test_single_item() {
        let tree = WeightedSampleTree::new([(7.5, 3.0)]).unwrap();
        let mut rng = create_rng(1);
        let draws = tree.sample(500, &mut rng).unwrap();
        assert_eq!(draws, vec![7.5; 500]);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_sample_zero() {
        let tree = WeightedSampleTree::new(scenario()).unwrap();
        let mut rng = create_rng(1);
        assert!(tree.sample(0, &mut rng).unwrap().is_empty());
        assert!(WeightedSampleTree::empty().sample(0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_sample_empty_tree_rejected() {
        let mut rng = create_rng(1);
        let err = WeightedSampleTree::empty().sample(3, &mut rng).unwrap_err();
        assert!(matches!(err, DistributionError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let empty: [(f64, f64); 0] = [];
        assert!(matches!(
            WeightedSampleTree::new(empty),
            Err(DistributionError::InvalidInput(_))
        ));
        assert!(matches!(
            WeightedSampleTree::new([(5.0, 0.0)]),
            Err(DistributionError::InvalidInput(_))
        ));
        assert!(WeightedSampleTree::new([(1.0, 1.0), (2.0, -1.0)]).is_err());
        assert!(WeightedSampleTree::new([(1.0, f64::NAN)]).is_err());
        assert!(WeightedSampleTree::new([(f64::INFINITY, 1.0)]).is_err());
        assert!(WeightedSampleTree::new([(1.0, f64::MAX), (2.0, f64::MAX)]).is_err());
    }

    #[test]
    fn test_failed_insert_leaves_tree_unchanged() {
        let mut tree = WeightedSampleTree::new(scenario()).unwrap();
        let before = tree.clone();
        assert!(tree.insert(9.0, 0.0).is_err());
        assert_eq!(tree, before);
        assert!(tree.insert(f64::NAN, 1.0).is_err());
        assert_eq!(tree, before);

        assert!(tree.insert(9.0, f64::MAX).is_ok());
        let before_overflow = tree.clone();
        assert!(tree.insert(9.0, f64::MAX).is_err());
        assert_eq!(tree, before_overflow);
        assert_eq!(tree.len(), before.len() + 1);
    }

    /// Recursive statement of the insertion rules, used as an oracle.
    fn insert_recursive(node: SampleNode, value: f64, weight: f64) -> SampleNode {
        match node {
            SampleNode::Internal {
                weight: total,
                left,
                right,
            } if weight <= left.weight() => {
                let (left, right) = if weight + right.weight() > left.weight() {
                    (insert_recursive(*right, value, weight), *left)
                } else {
                    (*left, insert_recursive(*right, value, weight))
                };
                SampleNode::Internal {
                    weight: total + weight,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            other => SampleNode::join(other, SampleNode::Leaf { value, weight }),
        }
    }

    #[test]
    fn test_iterative_insert_matches_recursive_rules() {
        let mut rng = create_rng(2024);
        for _ in 0..500 {
            let m = rng.random_range(1..40);
            // Small integer weights produce many ties.
            let items: Vec<(f64, f64)> = (0..m)
                .map(|i| (f64::from(i), f64::from(rng.random_range(1u32..6))))
                .collect();

            let mut node = SampleNode::leaf(items[0].0, items[0].1).unwrap();
            let mut expected = node.clone();
            for &(v, w) in &items[1..] {
                node.insert(v, w).unwrap();
                expected = insert_recursive(expected, v, w);
                assert_eq!(node, expected);
            }
            check_invariants(&node).unwrap();
        }
    }

    #[test]
    fn test_incremental_matches_batch() {
        let mut tree = WeightedSampleTree::empty();
        assert!(tree.is_empty());
        for (v, w) in scenario() {
            tree.insert(v, w).unwrap();
        }
        assert_eq!(tree, WeightedSampleTree::new(scenario()).unwrap());
    }

    #[test]
    fn test_increasing_weights_give_chain() {
        let items: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, 2f64.powi(i))).collect();
        let tree = WeightedSampleTree::new(items).unwrap();
        assert_eq!(tree.depth(), 49);
        check_invariants(tree.root().unwrap()).unwrap();
    }

    #[test]
    fn test_order_independence() {
        let items: Vec<(f64, f64)> = (1..=20).map(|i| (i as f64, (i % 7 + 1) as f64)).collect();
        let mut shuffled = items.clone();
        shuffle(&mut shuffled, &mut create_rng(3));

        let a = WeightedSampleTree::new(items.clone()).unwrap();
        let b = WeightedSampleTree::new(shuffled).unwrap();
        assert_eq!(a.total_weight(), b.total_weight());
        assert_eq!(a.len(), b.len());

        let categories: Vec<f64> = items.iter().map(|&(v, _)| v).collect();
        let weights: Vec<f64> = items.iter().map(|&(_, w)| w).collect();
        for (seed, tree) in [(11, &a), (12, &b)] {
            let draws = tree.sample(40_000, &mut create_rng(seed)).unwrap();
            let counts = tally(&draws, &categories);
            let result = chi_squared_from_counts(&counts, &weights).unwrap();
            assert!(result.passes(0.001), "p = {}", result.p_value);
        }
    }

    #[test]
    fn test_seeded_reproducibility() {
        let tree = WeightedSampleTree::new(scenario()).unwrap();
        let a = tree.sample(1000, &mut create_rng(5)).unwrap();
        let b = tree.sample(1000, &mut create_rng(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_values_are_separate_leaves() {
        let tree = WeightedSampleTree::new([(1.0, 1.0), (1.0, 2.0)]).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.total_weight(), 3.0);
        let draws = tree.sample(100, &mut create_rng(0)).unwrap();
        assert!(draws.iter().all(|&v| v == 1.0));
    }
}
