/// Failures of the proof engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The witness does not satisfy the circuit. Deliberately carries no
    /// detail about which constraint failed.
    #[error("proof generation failed")]
    ProofGeneration,

    #[error("setup: {0}")]
    Setup(String),
}
