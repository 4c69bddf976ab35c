use ark_bls12_381::Fr;

use crate::CircuitShape;

/// Aggregate verification key: the Merkle root over every registered key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Avk {
    pub root: Fr,
    /// Registered keys, before zero padding.
    pub leaf_count: usize,
    pub tree_depth: u32,
}

impl Avk {
    /// Number of leaves after padding to a power of two.
    pub fn capacity(&self) -> u64 {
        1u64 << self.tree_depth
    }

    pub fn shape(&self, slot_count: usize) -> CircuitShape {
        CircuitShape::new(slot_count, self.tree_depth)
    }
}
