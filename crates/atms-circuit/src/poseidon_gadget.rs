use ark_bls12_381::Fr;
use ark_crypto_primitives::sponge::{
    constraints::CryptographicSpongeVar,
    poseidon::constraints::PoseidonSpongeVar,
};
use ark_ed_on_bls12_381::constraints::EdwardsVar;
use ark_r1cs_std::fields::{fp::FpVar, FieldVar};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use atms_hash::{poseidon_config, CHALLENGE_DOMAIN, LEAF_DOMAIN, NODE_DOMAIN};

pub fn poseidon_hash_var(
    cs: ConstraintSystemRef<Fr>,
    inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, poseidon_config());
    sponge.absorb(&inputs)?;
    let out = sponge.squeeze_field_elements(1)?;
    out.into_iter().next().ok_or(SynthesisError::Unsatisfiable)
}

/// In-circuit twin of `atms_hash::hash_leaf`.
pub fn hash_leaf_var(
    cs: ConstraintSystemRef<Fr>,
    pk: &EdwardsVar,
) -> Result<FpVar<Fr>, SynthesisError> {
    poseidon_hash_var(
        cs,
        &[FpVar::constant(Fr::from(LEAF_DOMAIN)), pk.x.clone(), pk.y.clone()],
    )
}

pub fn hash_node_var(
    cs: ConstraintSystemRef<Fr>,
    left: &FpVar<Fr>,
    right: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    poseidon_hash_var(
        cs,
        &[FpVar::constant(Fr::from(NODE_DOMAIN)), left.clone(), right.clone()],
    )
}

pub fn challenge_var(
    cs: ConstraintSystemRef<Fr>,
    announcement: &EdwardsVar,
    pk: &EdwardsVar,
    digest: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    poseidon_hash_var(
        cs,
        &[
            FpVar::constant(Fr::from(CHALLENGE_DOMAIN)),
            announcement.x.clone(),
            pk.x.clone(),
            digest.clone(),
        ],
    )
}
