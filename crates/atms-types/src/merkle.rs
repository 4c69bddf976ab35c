use ark_bls12_381::Fr;
use ark_std::vec::Vec;

/// Hard ceiling on tree depth; leaf indices must fit a `u64` and the
/// in-circuit ordering check decomposes them into `depth` bits.
pub const MAX_TREE_DEPTH: u32 = 32;

pub const DEFAULT_MAX_TREE_DEPTH: u32 = 20;

/// Sibling hashes from a leaf up to the root.
///
/// `indices[i]` is true when the running node at level `i` is a right child,
/// so the bits read LSB-first spell out `leaf_index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    pub siblings: Vec<Fr>,
    pub indices: Vec<bool>,
    pub leaf_index: u64,
}

impl MerklePath {
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// True when the direction bits agree with `leaf_index`.
    pub fn is_consistent(&self) -> bool {
        if self.siblings.len() != self.indices.len() || self.indices.len() > 64 {
            return false;
        }
        let from_bits = self
            .indices
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, bit)| acc | ((*bit as u64) << i));
        let in_range = self.indices.len() == 64 || self.leaf_index >> self.indices.len() == 0;
        in_range && from_bits == self.leaf_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::vec;

    #[test]
    fn test_path_consistency() {
        let path = MerklePath {
            siblings: vec![Fr::from(1u64); 3],
            indices: vec![true, false, true],
            leaf_index: 5,
        };
        assert!(path.is_consistent());
        assert_eq!(path.depth(), 3);

        let wrong = MerklePath { leaf_index: 4, ..path.clone() };
        assert!(!wrong.is_consistent());

        let overflow = MerklePath { leaf_index: 13, ..path };
        assert!(!overflow.is_consistent());
    }
}
