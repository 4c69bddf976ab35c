use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bls12_381::{EdwardsAffine, Fr as JubjubScalar};
use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use ark_std::rand::Rng;
use ark_std::vec::Vec;

/// Compressed Jubjub point.
pub const PUBLIC_KEY_BYTES: usize = 32;
/// Compressed announcement point followed by the little-endian response scalar.
pub const SIGNATURE_BYTES: usize = 64;

/// Signing key of one committee member. Owned by the key-management side;
/// the prover never sees it.
#[derive(Clone)]
pub struct SecretKey(pub JubjubScalar);

impl SecretKey {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self(JubjubScalar::rand(rng))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey((EdwardsAffine::generator() * self.0).into_affine())
    }
}

impl core::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Jubjub point in the prime-order subgroup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(pub EdwardsAffine);

impl PublicKey {
    /// Canonical encoding; also the identity used by the leaf index map.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTES] {
        let mut out = [0u8; PUBLIC_KEY_BYTES];
        let mut buf = Vec::with_capacity(PUBLIC_KEY_BYTES);
        // compressed TE points are always 32 bytes
        if self.0.serialize_compressed(&mut buf).is_ok() {
            out.copy_from_slice(&buf);
        }
        out
    }

    /// Decodes and validates (on curve, prime-order subgroup).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        if bytes.len() != PUBLIC_KEY_BYTES {
            return Err(SerializationError::InvalidData);
        }
        let point = EdwardsAffine::deserialize_compressed(bytes)?;
        Ok(Self(point))
    }

    /// Identity and low-order points can never be registered.
    pub fn is_valid(&self) -> bool {
        !self.0.is_zero()
            && self.0.is_on_curve()
            && self.0.is_in_correct_subgroup_assuming_on_curve()
    }
}

/// Schnorr signature `(R, s)` over Jubjub.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: EdwardsAffine,
    pub s: JubjubScalar,
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; SIGNATURE_BYTES] {
        let mut buf = Vec::with_capacity(SIGNATURE_BYTES);
        let mut out = [0u8; SIGNATURE_BYTES];
        if self.r.serialize_compressed(&mut buf).is_ok()
            && self.s.serialize_compressed(&mut buf).is_ok()
        {
            out.copy_from_slice(&buf);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        if bytes.len() != SIGNATURE_BYTES {
            return Err(SerializationError::InvalidData);
        }
        let r = EdwardsAffine::deserialize_compressed(&bytes[..PUBLIC_KEY_BYTES])?;
        let s = JubjubScalar::deserialize_compressed(&bytes[PUBLIC_KEY_BYTES..])?;
        Ok(Self { r, s })
    }
}
