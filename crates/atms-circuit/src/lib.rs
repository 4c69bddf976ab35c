pub mod circuit;
pub mod engine;
pub mod error;
pub mod merkle_gadget;
pub mod order_gadget;
pub mod poseidon_gadget;
pub mod schnorr_gadget;

use ark_bls12_381::{Bls12_381, Fr};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use atms_types::CircuitShape;

pub use circuit::{AtmsCircuit, PublicInputs};
pub use engine::{CircuitKeys, ProofEngine, SetupParams};
pub use error::EngineError;

pub type Groth16Proof = ark_groth16::Proof<Bls12_381>;

/// Count constraints in the ATMS circuit for a shape
pub fn constraint_count(shape: CircuitShape) -> Result<usize, EngineError> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_optimization_goal(ark_relations::r1cs::OptimizationGoal::Constraints);
    cs.set_mode(ark_relations::r1cs::SynthesisMode::Setup);
    AtmsCircuit::empty(shape)
        .generate_constraints(cs.clone())
        .map_err(|e| EngineError::Setup(e.to_string()))?;
    Ok(cs.num_constraints())
}
