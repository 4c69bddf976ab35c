#![cfg_attr(not(feature = "std"), no_std)]

pub mod avk;
pub mod keys;
pub mod merkle;
pub mod shape;
pub mod signer;

pub use avk::Avk;
pub use keys::{PublicKey, SecretKey, Signature, PUBLIC_KEY_BYTES, SIGNATURE_BYTES};
pub use merkle::{MerklePath, DEFAULT_MAX_TREE_DEPTH, MAX_TREE_DEPTH};
pub use shape::CircuitShape;
pub use signer::SignerRecord;

/// Upper bound on signer slots accepted by a single proving request.
pub const DEFAULT_MAX_SIGNERS: usize = 1024;
