// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed errors for commitment, proving and verification.

use atms_circuit::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum AtmsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("empty key set")]
    EmptyKeySet,

    #[error("too many keys: {count} exceeds capacity {max}")]
    TooManyKeys { count: usize, max: u64 },

    #[error("key at index {index} is already registered")]
    DuplicateKey { index: usize },

    #[error("key at index {index} is not a valid subgroup point")]
    InvalidKey { index: usize },

    #[error("public key is not a member of the committed set")]
    NotAMember,

    /// Bad signature, repeated signer, or any other unsatisfied constraint.
    /// Intentionally opaque.
    #[error("proof generation failed")]
    ProofGeneration,

    #[error("setup missing: {0}")]
    SetupMissing(String),

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("config: {0}")]
    Config(String),

    #[error("key store: {0}")]
    KeyStore(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<EngineError> for AtmsError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::ProofGeneration => AtmsError::ProofGeneration,
            EngineError::Setup(msg) => AtmsError::SetupMissing(msg),
        }
    }
}

pub type AtmsResult<T> = Result<T, AtmsError>;
