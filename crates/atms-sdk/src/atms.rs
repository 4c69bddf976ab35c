// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Threshold proving and verification on top of a [`ProofEngine`].
//!
//! `prove` turns `n` signatures on one message into a single constant-size
//! proof that `n` distinct registered keys signed it. `verify` checks such a
//! proof against an AVK, the message and a threshold, and never learns which
//! keys took part.
//!
//! # Example
//!
//! ```rust,no_run
//! use atms_sdk::{Atms, AtmsConfig};
//! use atms_sdk::crypto_rng;
//! # use atms_types::{PublicKey, Signature};
//!
//! # fn example(keys: &[PublicKey], signers: &[PublicKey], sigs: &[Signature])
//! #     -> atms_sdk::AtmsResult<()> {
//! let config = AtmsConfig::default();
//! let engine = config.engine()?;
//! let atms = Atms::new(&engine, config);
//!
//! let commitment = atms.commit(keys)?;
//! let proof = atms.prove(&commitment, signers, sigs, signers.len(), b"hello", &mut crypto_rng())?;
//! let bytes = proof.to_bytes()?;
//! assert!(atms.verify(&bytes, commitment.avk(), b"hello", 2));
//! # Ok(())
//! # }
//! ```

use std::time::Instant;

use ark_std::rand::{CryptoRng, RngCore};
use atms_circuit::{ProofEngine, PublicInputs};
use atms_hash::message_digest;
use atms_types::{Avk, PublicKey, Signature, SignerRecord};
use tracing::debug;

use crate::commitment::KeyCommitment;
use crate::config::AtmsConfig;
use crate::error::{AtmsError, AtmsResult};
use crate::proof::AtmsProof;

pub struct Atms<'e> {
    engine: &'e ProofEngine,
    config: AtmsConfig,
}

impl<'e> Atms<'e> {
    pub fn new(engine: &'e ProofEngine, config: AtmsConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &AtmsConfig {
        &self.config
    }

    pub fn engine(&self) -> &ProofEngine {
        self.engine
    }

    /// Commit to `keys` under the configured depth ceiling.
    pub fn commit(&self, keys: &[PublicKey]) -> AtmsResult<KeyCommitment> {
        KeyCommitment::new(keys, self.config.max_tree_depth)
    }

    /// Prove that the `n` given keys are distinct members of `commitment`
    /// and that each signature verifies on `message`.
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        commitment: &KeyCommitment,
        public_keys: &[PublicKey],
        signatures: &[Signature],
        n: usize,
        message: &[u8],
        rng: &mut R,
    ) -> AtmsResult<AtmsProof> {
        if n == 0 {
            return Err(AtmsError::InvalidInput("at least one signature is required".into()));
        }
        if n > self.config.max_signers {
            return Err(AtmsError::InvalidInput(format!(
                "{n} signatures exceed the limit of {}",
                self.config.max_signers
            )));
        }
        if public_keys.len() != n || signatures.len() != n {
            return Err(AtmsError::InvalidInput(format!(
                "expected {n} keys and signatures, got {} and {}",
                public_keys.len(),
                signatures.len()
            )));
        }

        let avk = commitment.avk();
        let paths = public_keys
            .iter()
            .map(|pk| commitment.path_for(pk))
            .collect::<AtmsResult<Vec<_>>>()?;

        let digest = message_digest(message);
        let mut records: Vec<SignerRecord> = public_keys
            .iter()
            .zip(signatures)
            .zip(paths)
            .map(|((pk, sig), path)| SignerRecord {
                public_key: *pk,
                signature: *sig,
                path,
            })
            .collect();
        records.sort_by_key(|r| r.path.leaf_index);

        if let Some(pair) = records
            .windows(2)
            .find(|w| w[0].path.leaf_index == w[1].path.leaf_index)
        {
            debug!(leaf = pair[0].path.leaf_index, "signer appears more than once");
            return Err(AtmsError::ProofGeneration);
        }
        if let Some(bad) = records
            .iter()
            .find(|r| !atms_schnorr::verify_digest(&r.public_key, digest, &r.signature))
        {
            debug!(leaf = bad.path.leaf_index, "signature does not verify");
            return Err(AtmsError::ProofGeneration);
        }

        let shape = avk.shape(n);
        let keys = self.engine.derive_keys(shape)?;
        let public = PublicInputs {
            root: avk.root,
            digest,
            slot_count: n,
        };

        let start = Instant::now();
        let proof = self.engine.prove(&keys, &public, records, rng)?;
        debug!(%shape, elapsed = ?start.elapsed(), "atms proof generated");

        Ok(AtmsProof {
            public,
            tree_depth: avk.tree_depth,
            proof,
        })
    }

    /// Accept `proof_bytes` iff it attests at least `threshold` distinct
    /// signers of `message` under `avk`. Anything else, malformed input
    /// included, is `false`.
    pub fn verify(&self, proof_bytes: &[u8], avk: &Avk, message: &[u8], threshold: usize) -> bool {
        match self.try_verify(proof_bytes, avk, message, threshold) {
            Ok(accepted) => accepted,
            Err(e) => {
                debug!(error = %e, "proof rejected");
                false
            }
        }
    }

    /// Like [`Atms::verify`], but decoding failures and a missing verifying
    /// key are reported instead of folded into `false`. Never runs a setup.
    pub fn try_verify(
        &self,
        proof_bytes: &[u8],
        avk: &Avk,
        message: &[u8],
        threshold: usize,
    ) -> AtmsResult<bool> {
        let proof = AtmsProof::from_bytes(proof_bytes)?;
        self.check(&proof, avk, message, threshold)
    }

    pub fn verify_proof(
        &self,
        proof: &AtmsProof,
        avk: &Avk,
        message: &[u8],
        threshold: usize,
    ) -> bool {
        self.check(proof, avk, message, threshold).unwrap_or_else(|e| {
            debug!(error = %e, "proof rejected");
            false
        })
    }

    fn check(
        &self,
        proof: &AtmsProof,
        avk: &Avk,
        message: &[u8],
        threshold: usize,
    ) -> AtmsResult<bool> {
        if proof.root() != avk.root || proof.tree_depth != avk.tree_depth {
            debug!("proof bound to a different key set");
            return Ok(false);
        }
        if proof.digest() != message_digest(message) {
            debug!("proof bound to a different message");
            return Ok(false);
        }
        if proof.slot_count() < threshold {
            debug!(slots = proof.slot_count(), threshold, "below threshold");
            return Ok(false);
        }
        let shape = proof.shape();
        let keys = self
            .engine
            .cached_keys(shape)
            .ok_or_else(|| AtmsError::SetupMissing(format!("no verifying key for {shape}")))?;
        let accepted = self.engine.verify(&keys, &proof.public, &proof.proof);
        if !accepted {
            debug!(shape = %proof.shape(), "groth16 verification failed");
        }
        Ok(accepted)
    }
}
