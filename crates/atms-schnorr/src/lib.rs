//! Schnorr signatures over Jubjub.
//!
//! `sign` commits to `R = k·G`, derives `c = H(R.x, pk.x, digest(m))` with
//! the Poseidon challenge hash and answers `s = k + c·sk`; `verify` checks
//! `s·G == R + c·pk`. The same equation is enforced inside the ATMS circuit,
//! so the native check here only serves to reject bad batches early.
//!
//! Scalar multiplication and every validity check run on the constant-time
//! `jubjub` arithmetic; the outcome is folded into a single `Choice`.

mod ct;

use ark_bls12_381::Fr;
use ark_std::rand::Rng;
use atms_hash::{challenge, challenge_scalar, message_digest};
use atms_types::{PublicKey, SecretKey, Signature};
use jubjub::{AffinePoint, ExtendedPoint};
use subtle::ConstantTimeEq;

use crate::ct::{decode_point, decode_scalar, encode_point, encode_scalar, GENERATOR};

fn random_scalar<R: Rng>(rng: &mut R) -> jubjub::Fr {
    let mut wide = [0u8; 64];
    rng.fill_bytes(&mut wide);
    jubjub::Fr::from_bytes_wide(&wide)
}

pub fn keygen<R: Rng>(rng: &mut R) -> (SecretKey, PublicKey) {
    let sk = random_scalar(rng);
    let pk = PublicKey(encode_point(&(GENERATOR.0 * sk)));
    (SecretKey(encode_scalar(&sk)), pk)
}

pub fn sign<R: Rng>(sk: &SecretKey, message: &[u8], rng: &mut R) -> Signature {
    sign_digest(sk, message_digest(message), rng)
}

pub fn sign_digest<R: Rng>(sk: &SecretKey, digest: Fr, rng: &mut R) -> Signature {
    let x = decode_scalar(&sk.0).unwrap_or(jubjub::Fr::zero());
    let pk = PublicKey(encode_point(&(GENERATOR.0 * x)));
    let k = random_scalar(rng);
    let r = encode_point(&(GENERATOR.0 * k));
    let c = decode_scalar(&challenge_scalar(challenge(&r, &pk, digest)))
        .unwrap_or(jubjub::Fr::zero());
    Signature {
        r,
        s: encode_scalar(&(k + c * x)),
    }
}

pub fn verify(pk: &PublicKey, message: &[u8], sig: &Signature) -> bool {
    verify_digest(pk, message_digest(message), sig)
}

/// `pk` and `R` must be prime-order points, `pk` not the identity and `s`
/// canonical. All checks are evaluated; none short-circuits.
pub fn verify_digest(pk: &PublicKey, digest: Fr, sig: &Signature) -> bool {
    let pk_point = decode_point(&pk.0);
    let r_point = decode_point(&sig.r);
    let s = decode_scalar(&sig.s);
    let c = decode_scalar(&challenge_scalar(challenge(&sig.r, pk, digest)));
    let decoded = pk_point.is_some() & r_point.is_some() & s.is_some() & c.is_some();

    let a = ExtendedPoint::from(pk_point.unwrap_or(AffinePoint::identity()));
    let r = ExtendedPoint::from(r_point.unwrap_or(AffinePoint::identity()));
    let s = s.unwrap_or(jubjub::Fr::zero());
    let c = c.unwrap_or(jubjub::Fr::zero());

    let (g, g_ok) = *GENERATOR;
    let lhs = g * s;
    let rhs = r + a * c;
    let accepted = decoded
        & g_ok
        & a.is_torsion_free()
        & r.is_torsion_free()
        & !a.is_identity()
        & lhs.ct_eq(&rhs);
    accepted.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::{AffineRepr, CurveGroup};
    use ark_ed_on_bls12_381::{EdwardsAffine, Fq, Fr as JubjubScalar};
    use ark_ff::{AdditiveGroup, Field, UniformRand};
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    fn test_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_valid_signature() {
        let mut rng = test_rng();
        let (sk, pk) = keygen(&mut rng);
        let sig = sign(&sk, b"Alice has a cat", &mut rng);
        assert!(verify(&pk, b"Alice has a cat", &sig));
    }

    #[test]
    fn test_wrong_message() {
        let mut rng = test_rng();
        let (sk, pk) = keygen(&mut rng);
        let sig = sign(&sk, b"Alice has a cat", &mut rng);
        assert!(!verify(&pk, b"Bob has a cat", &sig));
    }

    #[test]
    fn test_wrong_public_key() {
        let mut rng = test_rng();
        let (sk, _) = keygen(&mut rng);
        let (_, other) = keygen(&mut rng);
        let sig = sign(&sk, b"msg", &mut rng);
        assert!(!verify(&other, b"msg", &sig));
    }

    #[test]
    fn test_bit_flip_in_response() {
        let mut rng = test_rng();
        let (sk, pk) = keygen(&mut rng);
        let sig = sign(&sk, b"msg", &mut rng);
        let mut bytes = sig.to_bytes();
        bytes[40] ^= 0x01;
        // a flipped bit either breaks decoding or the equation
        if let Ok(tampered) = Signature::from_bytes(&bytes) {
            assert!(!verify(&pk, b"msg", &tampered));
        }
    }

    #[test]
    fn test_identity_key_rejected() {
        let mut rng = test_rng();
        let (sk, _) = keygen(&mut rng);
        let sig = sign(&sk, b"msg", &mut rng);
        assert!(!verify(&PublicKey(EdwardsAffine::zero()), b"msg", &sig));
    }

    #[test]
    fn test_small_order_announcement_rejected() {
        let mut rng = test_rng();
        let (sk, pk) = keygen(&mut rng);
        let mut sig = sign(&sk, b"msg", &mut rng);
        // (0, -1) has order two
        sig.r = EdwardsAffine::new_unchecked(Fq::ZERO, -Fq::ONE);
        assert!(!verify(&pk, b"msg", &sig));
    }

    #[test]
    fn test_off_curve_key_rejected() {
        let mut rng = test_rng();
        let (sk, _) = keygen(&mut rng);
        let sig = sign(&sk, b"msg", &mut rng);
        let bogus = PublicKey(EdwardsAffine::new_unchecked(Fq::from(5u64), Fq::from(7u64)));
        assert!(!verify(&bogus, b"msg", &sig));
    }

    #[test]
    fn test_accepts_signature_built_with_arkworks() {
        let mut rng = test_rng();
        let sk = SecretKey::random(&mut rng);
        let pk = sk.public_key();
        let digest = message_digest(b"msg");
        let k = JubjubScalar::rand(&mut rng);
        let r = (EdwardsAffine::generator() * k).into_affine();
        let c = challenge_scalar(challenge(&r, &pk, digest));
        let sig = Signature { r, s: k + c * sk.0 };
        assert!(verify_digest(&pk, digest, &sig));

        let (_, other) = keygen(&mut rng);
        assert!(!verify_digest(&other, digest, &sig));
    }

    #[test]
    fn test_keygen_matches_secret() {
        let mut rng = test_rng();
        let (sk, pk) = keygen(&mut rng);
        assert_eq!(sk.public_key(), pk);
        assert!(pk.is_valid());
    }

    #[test]
    fn test_signatures_are_randomized() {
        let mut rng = test_rng();
        let (sk, pk) = keygen(&mut rng);
        let a = sign(&sk, b"msg", &mut rng);
        let b = sign(&sk, b"msg", &mut rng);
        assert_ne!(a, b);
        assert!(verify(&pk, b"msg", &a) && verify(&pk, b"msg", &b));
    }
}
