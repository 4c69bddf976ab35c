use ark_bls12_381::Fr;
use ark_r1cs_std::{
    alloc::AllocVar,
    boolean::Boolean,
    eq::EqGadget,
    fields::{fp::FpVar, FieldVar},
};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use atms_types::{CircuitShape, SignerRecord};

use crate::merkle_gadget::verify_merkle_path;
use crate::order_gadget::enforce_strictly_increasing;
use crate::poseidon_gadget::hash_leaf_var;
use crate::schnorr_gadget::{alloc_point, alloc_signature, verify_signature};

/// Public inputs of an ATMS proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicInputs {
    pub root: Fr,
    pub digest: Fr,
    pub slot_count: usize,
}

impl PublicInputs {
    /// Number of field elements the verifier sees.
    pub const LEN: usize = 3;

    pub fn to_vec(&self) -> Vec<Fr> {
        vec![self.root, self.digest, Fr::from(self.slot_count as u64)]
    }
}

/// "Each of `slot_count` distinct committed keys signed `digest`."
///
/// Records must be sorted by leaf index; the circuit enforces strictly
/// increasing indices, which is how repeated signers are excluded.
#[derive(Clone)]
pub struct AtmsCircuit {
    pub shape: CircuitShape,
    pub root: Option<Fr>,
    pub digest: Option<Fr>,
    pub records: Option<Vec<SignerRecord>>,
}

impl AtmsCircuit {
    /// Create a circuit with None witnesses (for setup)
    pub fn empty(shape: CircuitShape) -> Self {
        Self {
            shape,
            root: None,
            digest: None,
            records: None,
        }
    }

    pub fn new(shape: CircuitShape, public: &PublicInputs, records: Vec<SignerRecord>) -> Self {
        Self {
            shape,
            root: Some(public.root),
            digest: Some(public.digest),
            records: Some(records),
        }
    }

    fn witness_fits_shape(&self) -> bool {
        let depth = self.shape.tree_depth as usize;
        match &self.records {
            None => true,
            Some(records) => {
                records.len() == self.shape.slot_count
                    && records
                        .iter()
                        .all(|r| r.path.siblings.len() == depth && r.path.indices.len() == depth)
            }
        }
    }
}

impl ConstraintSynthesizer<Fr> for AtmsCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        if !self.witness_fits_shape() {
            return Err(SynthesisError::Unsatisfiable);
        }
        let depth = self.shape.tree_depth as usize;
        let slot_count = Fr::from(self.shape.slot_count as u64);

        // === Public inputs (3 Fr elements) ===
        // Order: root, digest, slot_count
        let root_pub = FpVar::new_input(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let digest_pub = FpVar::new_input(cs.clone(), || {
            self.digest.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let slot_count_pub = FpVar::new_input(cs.clone(), || Ok(slot_count))?;
        slot_count_pub.enforce_equal(&FpVar::constant(slot_count))?;

        let records = self.records.as_deref();
        let mut prev_index: Option<FpVar<Fr>> = None;

        for slot in 0..self.shape.slot_count {
            let record = records.map(|r| &r[slot]);

            // === Private witnesses ===
            let pk_var = alloc_point(cs.clone(), record.map(|r| &r.public_key.0))?;
            let sig_var = alloc_signature(cs.clone(), record.map(|r| &r.signature))?;

            let mut path_vars: Vec<(FpVar<Fr>, Boolean<Fr>)> = Vec::with_capacity(depth);
            for level in 0..depth {
                let sibling = FpVar::new_witness(cs.clone(), || {
                    let r = record.ok_or(SynthesisError::AssignmentMissing)?;
                    Ok(r.path.siblings[level])
                })?;
                let index_bit = Boolean::new_witness(cs.clone(), || {
                    let r = record.ok_or(SynthesisError::AssignmentMissing)?;
                    Ok(r.path.indices[level])
                })?;
                path_vars.push((sibling, index_bit));
            }

            // === Constraint 1: signature over the digest ===
            verify_signature(cs.clone(), &sig_var, &pk_var, &digest_pub)?;

            // === Constraint 2: key is a committed leaf ===
            let leaf = hash_leaf_var(cs.clone(), &pk_var)?;
            let index = verify_merkle_path(cs.clone(), &leaf, &path_vars, &root_pub)?;

            // === Constraint 3: strictly increasing leaf indices ===
            if let Some(prev) = &prev_index {
                let native =
                    records.map(|r| (r[slot - 1].path.leaf_index, r[slot].path.leaf_index));
                enforce_strictly_increasing(cs.clone(), prev, &index, native, depth)?;
            }
            prev_index = Some(index);
        }

        Ok(())
    }
}
