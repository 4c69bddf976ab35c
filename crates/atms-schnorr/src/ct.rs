//! Conversions between the arkworks Jubjub types used by the circuit and the
//! constant-time arithmetic of the `jubjub` crate.

use ark_ec::AffineRepr;
use ark_ed_on_bls12_381::{EdwardsAffine, Fq, Fr as JubjubScalar};
use ark_ff::{BigInteger, PrimeField};
use jubjub::{AffinePoint, ExtendedPoint};
use once_cell::sync::Lazy;
use subtle::{Choice, CtOption};

/// Generator shared with the circuit, plus whether it decoded.
pub(crate) static GENERATOR: Lazy<(ExtendedPoint, Choice)> = Lazy::new(|| {
    let g = decode_point(&EdwardsAffine::generator());
    (ExtendedPoint::from(g.unwrap_or(AffinePoint::identity())), g.is_some())
});

fn le_bytes<B: BigInteger>(value: B) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&value.to_bytes_le()[..32]);
    out
}

/// `v` little-endian with the parity of `u` in the top bit, the `jubjub`
/// compressed form. Decoding checks the curve equation but not the subgroup.
pub(crate) fn decode_point(p: &EdwardsAffine) -> CtOption<AffinePoint> {
    let mut bytes = le_bytes(p.y.into_bigint());
    bytes[31] |= (p.x.into_bigint().is_odd() as u8) << 7;
    AffinePoint::from_bytes(bytes)
}

pub(crate) fn encode_point(p: &ExtendedPoint) -> EdwardsAffine {
    let affine = AffinePoint::from(p);
    EdwardsAffine::new_unchecked(
        Fq::from_le_bytes_mod_order(&affine.get_u().to_bytes()),
        Fq::from_le_bytes_mod_order(&affine.get_v().to_bytes()),
    )
}

pub(crate) fn decode_scalar(s: &JubjubScalar) -> CtOption<jubjub::Fr> {
    jubjub::Fr::from_bytes(&le_bytes(s.into_bigint()))
}

pub(crate) fn encode_scalar(s: &jubjub::Fr) -> JubjubScalar {
    JubjubScalar::from_le_bytes_mod_order(&s.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::CurveGroup;
    use ark_ff::UniformRand;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_generator_decodes() {
        assert!(bool::from(GENERATOR.1));
        assert!(bool::from(GENERATOR.0.is_torsion_free()));
        assert_eq!(encode_point(&GENERATOR.0), EdwardsAffine::generator());
    }

    #[test]
    fn test_point_conversion_agrees_with_arkworks() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..8 {
            let k = JubjubScalar::rand(&mut rng);
            let ark = (EdwardsAffine::generator() * k).into_affine();
            let ct = ExtendedPoint::from(decode_point(&ark).unwrap());
            assert_eq!(encode_point(&ct), ark);

            let k_ct = decode_scalar(&k).unwrap();
            assert_eq!(encode_scalar(&k_ct), k);
            assert_eq!(encode_point(&(GENERATOR.0 * k_ct)), ark);
        }
    }
}
