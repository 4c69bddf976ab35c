use ark_bls12_381::Fr;
use ark_crypto_primitives::sponge::{
    poseidon::{PoseidonConfig, PoseidonSponge},
    CryptographicSponge, FieldBasedCryptographicSponge,
};
use ark_ed_on_bls12_381::{EdwardsAffine, Fr as JubjubScalar};
use ark_ff::{AdditiveGroup, BigInteger, PrimeField};
use atms_types::PublicKey;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha512};

const RATE: usize = 2;
const FULL_ROUNDS: usize = 8;
const PARTIAL_ROUNDS: usize = 31;
const ALPHA: u64 = 17;

/// Domain tags, absorbed as the first element of every hash.
pub const LEAF_DOMAIN: u64 = 1;
pub const NODE_DOMAIN: u64 = 2;
pub const CHALLENGE_DOMAIN: u64 = 3;

static POSEIDON_CONFIG: Lazy<PoseidonConfig<Fr>> = Lazy::new(|| {
    let (ark, mds) =
        ark_crypto_primitives::sponge::poseidon::find_poseidon_ark_and_mds::<Fr>(
            Fr::MODULUS_BIT_SIZE as u64,
            RATE,
            FULL_ROUNDS as u64,
            PARTIAL_ROUNDS as u64,
            0,
        );
    PoseidonConfig::new(FULL_ROUNDS, PARTIAL_ROUNDS, ALPHA, mds, ark, RATE, 1)
});

pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    &POSEIDON_CONFIG
}

pub fn poseidon_hash(inputs: &[Fr]) -> Fr {
    let mut sponge = PoseidonSponge::new(poseidon_config());
    sponge.absorb(&inputs);
    sponge.squeeze_native_field_elements(1)[0]
}

/// Leaf of the key commitment tree.
pub fn hash_leaf(pk: &PublicKey) -> Fr {
    poseidon_hash(&[Fr::from(LEAF_DOMAIN), pk.0.x, pk.0.y])
}

/// Inner node of the key commitment tree.
pub fn hash_node(left: Fr, right: Fr) -> Fr {
    poseidon_hash(&[Fr::from(NODE_DOMAIN), left, right])
}

/// Schnorr challenge over the announcement, the signer and the digest.
pub fn challenge(announcement: &EdwardsAffine, pk: &PublicKey, digest: Fr) -> Fr {
    poseidon_hash(&[Fr::from(CHALLENGE_DOMAIN), announcement.x, pk.0.x, digest])
}

/// Reduce a base-field challenge into the Jubjub scalar field. For points of
/// prime order this agrees with multiplying by the unreduced integer, which
/// is what the circuit does.
pub fn challenge_scalar(c: Fr) -> JubjubScalar {
    JubjubScalar::from_le_bytes_mod_order(&c.into_bigint().to_bytes_le())
}

/// SHA-512 of the message, reduced into `Fr`.
pub fn message_digest(message: &[u8]) -> Fr {
    let wide = Sha512::digest(message);
    Fr::from_le_bytes_mod_order(wide.as_slice())
}

/// Root of an all-padding subtree at each height, `zeros[0]` being the
/// padding leaf.
pub fn zero_hashes(depth: usize) -> Vec<Fr> {
    let mut zeros = vec![Fr::ZERO; depth + 1];
    for i in 1..=depth {
        zeros[i] = hash_node(zeros[i - 1], zeros[i - 1]);
    }
    zeros
}
