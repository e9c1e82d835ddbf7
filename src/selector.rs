//! Weighted random choice among the transforms of a scene.
//!
//! Rather than walk the cumulative probabilities on every iteration,
//! we build a fixed table of transform indexes in proportion to their
//! probabilities once, and then pick a random slot from it.  Building
//! is linear in the table size plus the transform count; choosing is a
//! single uniform draw and an index.

use crate::transform::Transform;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Slots in the lookup table.  Probabilities are honored to within one
/// slot, 1/1024.
pub const TABLE_SIZE: usize = 1024;

/// A fixed list of transforms and the inverse-CDF table that picks
/// among them.  Once built, the selector is only ever read, so it can
/// be shared by every worker without a lock.
#[derive(Clone, Debug)]
pub struct WeightedSelector {
    transforms: Vec<Transform>,
    table: Vec<usize>,
    slot: Uniform<usize>,
}

impl WeightedSelector {
    /// Takes ownership of the transforms and builds the table.  If any
    /// transform has a probability of exactly zero, every transform is
    /// given equal probability first.  Otherwise the probabilities are
    /// used as given and must already sum to one.
    pub fn new(transforms: Vec<Transform>) -> Self {
        assert!(
            !transforms.is_empty(),
            "a selector needs at least one transform"
        );
        let mut selector = WeightedSelector {
            transforms,
            table: vec![0; TABLE_SIZE],
            slot: Uniform::new(0, TABLE_SIZE),
        };
        if selector.transforms.iter().any(|t| t.probability() == 0.0) {
            warn!(
                "a transform has zero probability; using 1/{} for all of them",
                selector.transforms.len()
            );
            selector.set_equal_probability();
        }
        selector.build_table();
        selector
    }

    /// Give every transform probability 1/N.
    pub fn set_equal_probability(&mut self) {
        let probability = 1.0 / self.transforms.len() as f64;
        for t in &mut self.transforms {
            t.set_probability(probability);
        }
    }

    /// Convert the individual probabilities into the table of indexes.
    pub fn build_table(&mut self) {
        let last = self.transforms.len() - 1;
        let mut index = 0;
        let mut cumulative = self.transforms[0].probability();
        for (i, slot) in self.table.iter_mut().enumerate() {
            let threshold = i as f64 / TABLE_SIZE as f64;
            while cumulative <= threshold && index < last {
                index += 1;
                cumulative += self.transforms[index].probability();
            }
            *slot = index;
        }
    }

    /// Pick a transform at random from the caller's stream.
    #[inline]
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &Transform {
        &self.transforms[self.table[self.slot.sample(rng)]]
    }

    /// The transforms, in the order given.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// The lookup table, slot to transform index.
    pub fn table(&self) -> &[usize] {
        &self.table
    }

    /// How many table slots point at transform `index`.
    pub fn slots(&self, index: usize) -> usize {
        self.table.iter().filter(|&&i| i == index).count()
    }
}
