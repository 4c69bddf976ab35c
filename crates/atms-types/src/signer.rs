use crate::{MerklePath, PublicKey, Signature};

/// Private witness contributed by one participant. Built for a single proving
/// request and moved into the circuit; never stored.
#[derive(Clone, Debug)]
pub struct SignerRecord {
    pub public_key: PublicKey,
    pub signature: Signature,
    pub path: MerklePath,
}
