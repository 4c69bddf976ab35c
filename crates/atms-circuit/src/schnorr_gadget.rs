use ark_bls12_381::Fr;
use ark_ec::{AffineRepr, PrimeGroup};
use ark_ed_on_bls12_381::{
    constraints::EdwardsVar, EdwardsAffine, EdwardsProjective, Fr as JubjubScalar,
};
use ark_ff::{AdditiveGroup, BigInteger, PrimeField};
use ark_r1cs_std::{
    fields::fp::FpVar,
    prelude::{AllocVar, Boolean, CurveVar, EqGadget, ToBitsGadget},
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use atms_types::Signature;
use once_cell::sync::Lazy;

use crate::poseidon_gadget::challenge_var;

/// Bits of a canonical Jubjub scalar.
pub const SCALAR_BITS: usize = JubjubScalar::MODULUS_BIT_SIZE as usize;

/// `G·2^i`, the fixed bases for `s·G`.
static GENERATOR_POWERS: Lazy<Vec<EdwardsProjective>> = Lazy::new(|| {
    let mut base = EdwardsProjective::generator();
    let mut powers = Vec::with_capacity(SCALAR_BITS);
    for _ in 0..SCALAR_BITS {
        powers.push(base);
        base.double_in_place();
    }
    powers
});

/// Allocated signature: the announcement point and the response as bits.
#[derive(Clone)]
pub struct SignatureVar {
    pub r: EdwardsVar,
    pub s_bits: Vec<Boolean<Fr>>,
}

/// Allocate a curve point. Witness allocation of an `EdwardsVar` enforces
/// that the point is on the curve and in the prime-order subgroup.
pub fn alloc_point(
    cs: ConstraintSystemRef<Fr>,
    point: Option<&EdwardsAffine>,
) -> Result<EdwardsVar, SynthesisError> {
    EdwardsVar::new_witness(cs, || {
        point
            .map(|p| p.into_group())
            .ok_or(SynthesisError::AssignmentMissing)
    })
}

pub fn alloc_signature(
    cs: ConstraintSystemRef<Fr>,
    sig: Option<&Signature>,
) -> Result<SignatureVar, SynthesisError> {
    let r = alloc_point(cs.clone(), sig.map(|s| &s.r))?;

    let native_bits = sig.map(|s| s.s.into_bigint().to_bits_le());
    let mut s_bits = Vec::with_capacity(SCALAR_BITS);
    for i in 0..SCALAR_BITS {
        s_bits.push(Boolean::new_witness(cs.clone(), || {
            let bits = native_bits.as_ref().ok_or(SynthesisError::AssignmentMissing)?;
            Ok(bits.get(i).copied().unwrap_or(false))
        })?);
    }

    Ok(SignatureVar { r, s_bits })
}

/// Enforce `s·G == R + c·pk` with `c = H(R.x, pk.x, digest)`.
///
/// `c` is used as a 255-bit integer rather than reduced into the Jubjub
/// scalar field; both agree because `pk` has prime order.
pub fn verify_signature(
    cs: ConstraintSystemRef<Fr>,
    sig: &SignatureVar,
    pk: &EdwardsVar,
    digest: &FpVar<Fr>,
) -> Result<(), SynthesisError> {
    let c = challenge_var(cs, &sig.r, pk, digest)?;
    let c_bits = c.to_bits_le()?;

    let mut lhs = EdwardsVar::zero();
    lhs.precomputed_base_scalar_mul_le(sig.s_bits.iter().zip(GENERATOR_POWERS.iter()))?;

    let rhs = sig.r.clone() + pk.scalar_mul_le(c_bits.iter())?;
    lhs.enforce_equal(&rhs)?;
    Ok(())
}
