//! Data structures backing the samplers.

pub mod sample_tree;

pub use sample_tree::{Leaves, SampleNode, WeightedSampleTree};
