// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Byte encodings for values that cross process boundaries.
//!
//! - **Fr**: 32 bytes, canonical little-endian.
//! - **AVK**: `root (32, compressed LE) ‖ leaf_count (u64 LE) ‖
//!   tree_depth (u32 LE)`, [`AVK_BYTES`] in total.

use ark_bls12_381::Fr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use atms_types::{Avk, MAX_TREE_DEPTH};

use crate::error::{AtmsError, AtmsResult};

pub const FR_BYTES: usize = 32;
pub const AVK_BYTES: usize = FR_BYTES + 8 + 4;

pub(crate) fn fr_to_bytes(fr: &Fr) -> AtmsResult<[u8; FR_BYTES]> {
    let mut out = [0u8; FR_BYTES];
    fr.serialize_compressed(&mut out[..])
        .map_err(|e| anyhow::anyhow!("serialize field element: {e}"))?;
    Ok(out)
}

/// Canonical little-endian decoding; non-canonical encodings fail.
pub(crate) fn fr_from_bytes(bytes: &[u8]) -> Result<Fr, ark_serialize::SerializationError> {
    Fr::deserialize_compressed(bytes)
}

pub fn avk_to_bytes(avk: &Avk) -> AtmsResult<[u8; AVK_BYTES]> {
    let mut out = [0u8; AVK_BYTES];
    out[..FR_BYTES].copy_from_slice(&fr_to_bytes(&avk.root)?);
    out[FR_BYTES..FR_BYTES + 8].copy_from_slice(&(avk.leaf_count as u64).to_le_bytes());
    out[FR_BYTES + 8..].copy_from_slice(&avk.tree_depth.to_le_bytes());
    Ok(out)
}

pub fn avk_from_bytes(bytes: &[u8]) -> AtmsResult<Avk> {
    if bytes.len() != AVK_BYTES {
        return Err(AtmsError::InvalidInput(format!(
            "avk must be {AVK_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    let root = fr_from_bytes(&bytes[..FR_BYTES])
        .map_err(|e| AtmsError::InvalidInput(format!("avk root: {e}")))?;
    let mut count = [0u8; 8];
    count.copy_from_slice(&bytes[FR_BYTES..FR_BYTES + 8]);
    let mut depth = [0u8; 4];
    depth.copy_from_slice(&bytes[FR_BYTES + 8..]);
    let leaf_count = u64::from_le_bytes(count);
    let tree_depth = u32::from_le_bytes(depth);

    if tree_depth > MAX_TREE_DEPTH || leaf_count == 0 || leaf_count > 1u64 << tree_depth {
        return Err(AtmsError::InvalidInput(format!(
            "avk describes {leaf_count} keys at depth {tree_depth}"
        )));
    }
    let leaf_count = usize::try_from(leaf_count)
        .map_err(|_| AtmsError::InvalidInput("avk leaf count overflows usize".into()))?;
    Ok(Avk {
        root,
        leaf_count,
        tree_depth,
    })
}
