use ark_bls12_381::Fr;
use ark_ff::{AdditiveGroup, Field};
use ark_r1cs_std::{
    boolean::Boolean,
    fields::{fp::FpVar, FieldVar},
    prelude::EqGadget,
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::poseidon_gadget::hash_node_var;

/// Verify a Merkle path in-circuit and return the leaf index it encodes.
/// `path` is a slice of (sibling, index_bit) where index_bit=true means the
/// running node is the right child.
pub fn verify_merkle_path(
    cs: ConstraintSystemRef<Fr>,
    leaf: &FpVar<Fr>,
    path: &[(FpVar<Fr>, Boolean<Fr>)],
    root: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut current = leaf.clone();
    let mut index = FpVar::zero();
    let mut weight = Fr::ONE;

    for (sibling, is_right) in path {
        // if is_right: hash(sibling, current), else: hash(current, sibling)
        let left = is_right.select(sibling, &current)?;
        let right = is_right.select(&current, sibling)?;
        current = hash_node_var(cs.clone(), &left, &right)?;

        index += FpVar::from(is_right.clone()) * weight;
        weight.double_in_place();
    }

    current.enforce_equal(root)?;
    Ok(index)
}
