// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! # atms-sdk
//!
//! Ad-hoc threshold multi-signatures backed by a Groth16 proof.
//!
//! A committee registers its Schnorr public keys once; the Merkle root over
//! them is the aggregate verification key ([`Avk`]). Any `n` members who
//! signed the same message can then be condensed into a single proof of
//! fixed size, checked against the AVK, the message and a threshold without
//! revealing who signed.
//!
//! ## Crate layout
//!
//! | Module | Purpose |
//! |---|---|
//! | *crate root* | Re-exports of the key, signature and AVK types |
//! | [`commitment`] | Key-set commitment, membership paths |
//! | [`atms`] | `prove` / `verify` orchestration |
//! | [`proof`] | Versioned proof encoding |
//! | [`config`] | File and environment configuration |
//! | [`keystore`] | Saving and loading exported circuit keys |
//! | [`serialize`] | Byte encodings for `Fr` and the AVK |
//! | [`error`] | [`AtmsError`] |
//!
//! ## Typical flow
//!
//! ```rust,no_run
//! use atms_sdk::{crypto_rng, keygen, sign, Atms, AtmsConfig};
//!
//! # fn example() -> atms_sdk::AtmsResult<()> {
//! let mut rng = crypto_rng();
//! let members: Vec<_> = (0..5).map(|_| keygen(&mut rng)).collect();
//! let keys: Vec<_> = members.iter().map(|(_, pk)| *pk).collect();
//!
//! let config = AtmsConfig::default();
//! let engine = config.engine()?;
//! let atms = Atms::new(&engine, config);
//! let commitment = atms.commit(&keys)?;
//!
//! let signers = [&members[0], &members[2], &members[4]];
//! let pks: Vec<_> = signers.iter().map(|(_, pk)| *pk).collect();
//! let sigs: Vec<_> = signers.iter().map(|(sk, _)| sign(sk, b"hello", &mut rng)).collect();
//!
//! let proof = atms.prove(&commitment, &pks, &sigs, 3, b"hello", &mut rng)?;
//! assert!(atms.verify(&proof.to_bytes()?, commitment.avk(), b"hello", 2));
//! # Ok(())
//! # }
//! ```

pub mod atms;
pub mod commitment;
pub mod config;
pub mod error;
pub mod keystore;
pub mod proof;
pub mod serialize;

use ark_std::rand::{rngs::StdRng, SeedableRng};
use rand_core::{OsRng, RngCore};

pub use atms::Atms;
pub use atms_circuit::{ProofEngine, SetupParams};
pub use atms_schnorr::{keygen, sign, verify as verify_signature};
pub use atms_types::{Avk, CircuitShape, MerklePath, PublicKey, SecretKey, Signature};
pub use commitment::{commit, verify_membership, KeyCommitment};
pub use config::AtmsConfig;
pub use error::{AtmsError, AtmsResult};
pub use proof::{AtmsProof, ATMS_PROOF_BYTES};

/// RNG for signing and proving, seeded from the operating system.
pub fn crypto_rng() -> StdRng {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    StdRng::from_seed(seed)
}
