use ark_bls12_381::Fr;
use ark_ff::{AdditiveGroup, Field};
use ark_r1cs_std::{
    alloc::AllocVar,
    boolean::Boolean,
    eq::EqGadget,
    fields::{fp::FpVar, FieldVar},
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Decompose `val` into `num_bits` Boolean witnesses and constrain the
/// reconstruction, i.e. `0 <= val < 2^num_bits`.
pub fn enforce_range_bits(
    cs: ConstraintSystemRef<Fr>,
    val: &FpVar<Fr>,
    native_val: Option<u64>,
    num_bits: usize,
) -> Result<(), SynthesisError> {
    let mut sum = FpVar::zero();
    let mut coeff = Fr::ONE;
    for i in 0..num_bits {
        let bit = Boolean::new_witness(cs.clone(), || {
            let v = native_val.ok_or(SynthesisError::AssignmentMissing)?;
            Ok((v >> i) & 1 == 1)
        })?;
        sum += FpVar::from(bit) * coeff;
        coeff.double_in_place();
    }

    sum.enforce_equal(val)?;
    Ok(())
}

/// Enforce `prev < next` for leaf indices below `2^num_bits`.
///
/// The gap `next - prev - 1` must fit in `num_bits` bits; a repeated or
/// descending index wraps around the field and cannot be decomposed.
pub fn enforce_strictly_increasing(
    cs: ConstraintSystemRef<Fr>,
    prev: &FpVar<Fr>,
    next: &FpVar<Fr>,
    native: Option<(u64, u64)>,
    num_bits: usize,
) -> Result<(), SynthesisError> {
    let gap = next - prev - Fr::ONE;
    let native_gap = native.map(|(p, n)| {
        n.checked_sub(p)
            .and_then(|d| d.checked_sub(1))
            .unwrap_or(0)
    });
    enforce_range_bits(cs, &gap, native_gap, num_bits)
}
