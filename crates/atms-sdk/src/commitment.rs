// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Merkle commitment over an ordered set of public keys.
//!
//! Leaves are `Poseidon(LEAF_DOMAIN, pk.x, pk.y)` in registration order,
//! padded with the zero leaf up to the next power of two. The root, the key
//! count and the depth together form the [`Avk`].
//!
//! # Example
//!
//! ```rust
//! use atms_sdk::commitment::{verify_membership, KeyCommitment};
//! # use atms_types::SecretKey;
//! # let mut rng = ark_std::test_rng();
//! # let keys: Vec<_> = (0..5).map(|_| SecretKey::random(&mut rng).public_key()).collect();
//!
//! let commitment = KeyCommitment::new(&keys, 20)?;
//! assert_eq!(commitment.avk().tree_depth, 3);
//!
//! let path = commitment.path_for(&keys[2])?;
//! assert!(verify_membership(commitment.avk(), &keys[2], &path));
//! # Ok::<(), atms_sdk::error::AtmsError>(())
//! ```

use std::collections::HashMap;

use ark_bls12_381::Fr;
use atms_hash::{hash_leaf, hash_node, zero_hashes};
use atms_types::{
    Avk, MerklePath, PublicKey, DEFAULT_MAX_TREE_DEPTH, MAX_TREE_DEPTH, PUBLIC_KEY_BYTES,
};
use tracing::debug;

use crate::error::{AtmsError, AtmsResult};

/// Registered key set together with every tree layer, so paths are served
/// without rehashing.
#[derive(Clone, Debug)]
pub struct KeyCommitment {
    avk: Avk,
    keys: Vec<PublicKey>,
    /// `layers[0]` holds the unpadded leaves, `layers[depth]` the root.
    layers: Vec<Vec<Fr>>,
    zeros: Vec<Fr>,
    positions: HashMap<[u8; PUBLIC_KEY_BYTES], usize>,
}

/// Commit with the default depth ceiling.
pub fn commit(keys: &[PublicKey]) -> AtmsResult<KeyCommitment> {
    KeyCommitment::new(keys, DEFAULT_MAX_TREE_DEPTH)
}

/// Depth of the smallest power-of-two tree holding `count` leaves.
pub fn tree_depth(count: usize) -> u32 {
    count.max(1).next_power_of_two().trailing_zeros()
}

/// Root of a tree with no registered keys at `depth`.
pub fn empty_root(depth: u32) -> Fr {
    zero_hashes(depth as usize)[depth as usize]
}

impl KeyCommitment {
    pub fn new(keys: &[PublicKey], max_tree_depth: u32) -> AtmsResult<Self> {
        if keys.is_empty() {
            return Err(AtmsError::EmptyKeySet);
        }
        let max_depth = max_tree_depth.min(MAX_TREE_DEPTH);
        let depth = tree_depth(keys.len());
        if depth > max_depth {
            return Err(AtmsError::TooManyKeys {
                count: keys.len(),
                max: 1u64 << max_depth,
            });
        }

        let mut positions = HashMap::with_capacity(keys.len());
        for (index, key) in keys.iter().enumerate() {
            if !key.is_valid() {
                return Err(AtmsError::InvalidKey { index });
            }
            if positions.insert(key.to_bytes(), index).is_some() {
                return Err(AtmsError::DuplicateKey { index });
            }
        }

        let zeros = zero_hashes(depth as usize);
        let mut layers = Vec::with_capacity(depth as usize + 1);
        layers.push(keys.iter().map(hash_leaf).collect::<Vec<Fr>>());
        for level in 0..depth as usize {
            let next = layers[level]
                .chunks(2)
                .map(|pair| hash_node(pair[0], pair.get(1).copied().unwrap_or(zeros[level])))
                .collect();
            layers.push(next);
        }
        let root = layers[depth as usize][0];
        debug!(keys = keys.len(), depth, "key set committed");

        Ok(Self {
            avk: Avk {
                root,
                leaf_count: keys.len(),
                tree_depth: depth,
            },
            keys: keys.to_vec(),
            layers,
            zeros,
            positions,
        })
    }

    pub fn avk(&self) -> &Avk {
        &self.avk
    }

    pub fn root(&self) -> Fr {
        self.avk.root
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in registration order.
    pub fn keys(&self) -> &[PublicKey] {
        &self.keys
    }

    pub fn index_of(&self, key: &PublicKey) -> Option<usize> {
        self.positions.get(&key.to_bytes()).copied()
    }

    /// Authentication path for a registered key.
    pub fn path_for(&self, key: &PublicKey) -> AtmsResult<MerklePath> {
        let leaf = self.index_of(key).ok_or(AtmsError::NotAMember)?;
        let depth = self.avk.tree_depth as usize;
        let mut siblings = Vec::with_capacity(depth);
        let mut indices = Vec::with_capacity(depth);
        let mut idx = leaf;
        for level in 0..depth {
            siblings.push(
                self.layers[level]
                    .get(idx ^ 1)
                    .copied()
                    .unwrap_or(self.zeros[level]),
            );
            indices.push(idx & 1 == 1);
            idx >>= 1;
        }
        Ok(MerklePath {
            siblings,
            indices,
            leaf_index: leaf as u64,
        })
    }
}

/// Recompute the root from `key` and `path` and compare with the AVK.
/// Paths of the wrong length, with direction bits that disagree with the
/// leaf index, or pointing into the padding are rejected.
pub fn verify_membership(avk: &Avk, key: &PublicKey, path: &MerklePath) -> bool {
    if path.depth() != avk.tree_depth as usize
        || !path.is_consistent()
        || path.leaf_index >= avk.leaf_count as u64
    {
        return false;
    }
    let node = path
        .siblings
        .iter()
        .zip(&path.indices)
        .fold(hash_leaf(key), |node, (sibling, is_right)| {
            if *is_right {
                hash_node(*sibling, node)
            } else {
                hash_node(node, *sibling)
            }
        });
    node == avk.root
}
