// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Self-describing ATMS proof encoding.
//!
//! ```text
//! version (1) ‖ slot_count (u32 LE) ‖ tree_depth (u32 LE)
//!   ‖ root (32) ‖ digest (32) ‖ groth16 proof (192, compressed)
//! ```
//!
//! The size is independent of the number of signers.

use ark_bls12_381::Fr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use atms_circuit::{Groth16Proof, PublicInputs};
use atms_types::{CircuitShape, MAX_TREE_DEPTH};

use crate::error::{AtmsError, AtmsResult};
use crate::serialize::{fr_from_bytes, fr_to_bytes, FR_BYTES};

pub const PROOF_VERSION: u8 = 1;
/// Compressed G1 ‖ G2 ‖ G1 on BLS12-381.
pub const GROTH16_PROOF_BYTES: usize = 48 + 96 + 48;
const HEADER_BYTES: usize = 1 + 4 + 4;
pub const ATMS_PROOF_BYTES: usize = HEADER_BYTES + 2 * FR_BYTES + GROTH16_PROOF_BYTES;

#[derive(Clone, Debug, PartialEq)]
pub struct AtmsProof {
    /// Root, message digest and slot count the proof was generated for.
    pub public: PublicInputs,
    pub tree_depth: u32,
    pub proof: Groth16Proof,
}

impl AtmsProof {
    /// Number of distinct signatures attested.
    pub fn slot_count(&self) -> usize {
        self.public.slot_count
    }

    pub fn root(&self) -> Fr {
        self.public.root
    }

    pub fn digest(&self) -> Fr {
        self.public.digest
    }

    pub fn shape(&self) -> CircuitShape {
        CircuitShape::new(self.public.slot_count, self.tree_depth)
    }

    pub fn to_bytes(&self) -> AtmsResult<Vec<u8>> {
        let slots = u32::try_from(self.public.slot_count)
            .map_err(|_| AtmsError::InvalidInput("slot count exceeds u32".into()))?;
        let mut out = Vec::with_capacity(ATMS_PROOF_BYTES);
        out.push(PROOF_VERSION);
        out.extend_from_slice(&slots.to_le_bytes());
        out.extend_from_slice(&self.tree_depth.to_le_bytes());
        out.extend_from_slice(&fr_to_bytes(&self.public.root)?);
        out.extend_from_slice(&fr_to_bytes(&self.public.digest)?);
        self.proof
            .serialize_compressed(&mut out)
            .map_err(|e| anyhow::anyhow!("serialize groth16 proof: {e}"))?;
        debug_assert_eq!(out.len(), ATMS_PROOF_BYTES);
        Ok(out)
    }

    /// Decode and validate. Points are checked to be on-curve and in the
    /// prime-order subgroup; field elements must be canonical.
    pub fn from_bytes(bytes: &[u8]) -> AtmsResult<Self> {
        if bytes.len() != ATMS_PROOF_BYTES {
            return Err(malformed(format!(
                "expected {ATMS_PROOF_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0] != PROOF_VERSION {
            return Err(malformed(format!("unknown version {}", bytes[0])));
        }

        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[1..5]);
        let slot_count = u32::from_le_bytes(word) as usize;
        word.copy_from_slice(&bytes[5..9]);
        let tree_depth = u32::from_le_bytes(word);
        if slot_count == 0 {
            return Err(malformed("zero slot count".into()));
        }
        if tree_depth > MAX_TREE_DEPTH {
            return Err(malformed(format!("tree depth {tree_depth} out of range")));
        }

        let mut offset = HEADER_BYTES;
        let root = fr_from_bytes(&bytes[offset..offset + FR_BYTES])
            .map_err(|e| malformed(format!("root: {e}")))?;
        offset += FR_BYTES;
        let digest = fr_from_bytes(&bytes[offset..offset + FR_BYTES])
            .map_err(|e| malformed(format!("digest: {e}")))?;
        offset += FR_BYTES;
        let proof = Groth16Proof::deserialize_compressed(&bytes[offset..])
            .map_err(|e| malformed(format!("groth16: {e}")))?;

        Ok(Self {
            public: PublicInputs {
                root,
                digest,
                slot_count,
            },
            tree_depth,
            proof,
        })
    }

    pub fn to_hex(&self) -> AtmsResult<String> {
        Ok(hex::encode(self.to_bytes()?))
    }

    pub fn from_hex(s: &str) -> AtmsResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| malformed(format!("invalid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

fn malformed(msg: String) -> AtmsError {
    AtmsError::MalformedProof(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{G1Affine, G2Affine};
    use ark_ec::AffineRepr;

    fn sample() -> AtmsProof {
        AtmsProof {
            public: PublicInputs {
                root: Fr::from(11u64),
                digest: Fr::from(22u64),
                slot_count: 3,
            },
            tree_depth: 3,
            proof: Groth16Proof {
                a: G1Affine::generator(),
                b: G2Affine::generator(),
                c: G1Affine::generator(),
            },
        }
    }

    #[test]
    fn test_encoding_layout() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(bytes.len(), ATMS_PROOF_BYTES);
        assert_eq!(bytes[0], PROOF_VERSION);
        assert_eq!(&bytes[1..5], &3u32.to_le_bytes());
        assert_eq!(AtmsProof::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_hex_roundtrip() {
        let hex = sample().to_hex().unwrap();
        assert_eq!(AtmsProof::from_hex(&hex).unwrap(), sample());
        assert_eq!(AtmsProof::from_hex(&format!("0x{hex}")).unwrap(), sample());
    }

    #[test]
    fn test_rejects_wrong_length() {
        let bytes = sample().to_bytes().unwrap();
        assert!(matches!(
            AtmsProof::from_bytes(&bytes[..bytes.len() - 1]),
            Err(AtmsError::MalformedProof(_))
        ));
        assert!(AtmsProof::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = 2;
        assert!(AtmsProof::from_bytes(&bytes).is_err());

        let mut zero_slots = sample().to_bytes().unwrap();
        zero_slots[1..5].copy_from_slice(&0u32.to_le_bytes());
        assert!(AtmsProof::from_bytes(&zero_slots).is_err());

        let mut deep = sample().to_bytes().unwrap();
        deep[5..9].copy_from_slice(&(MAX_TREE_DEPTH + 1).to_le_bytes());
        assert!(AtmsProof::from_bytes(&deep).is_err());
    }

    #[test]
    fn test_rejects_non_canonical_root() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[HEADER_BYTES..HEADER_BYTES + FR_BYTES].fill(0xff);
        assert!(matches!(
            AtmsProof::from_bytes(&bytes),
            Err(AtmsError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_rejects_garbage_points() {
        let mut bytes = sample().to_bytes().unwrap();
        let start = HEADER_BYTES + 2 * FR_BYTES;
        bytes[start..].fill(0x5a);
        assert!(AtmsProof::from_bytes(&bytes).is_err());
    }
}
