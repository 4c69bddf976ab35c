//! Proving/verification key registry and the Groth16 prove/verify calls.
//!
//! One [`ProofEngine`] owns the keys for every [`CircuitShape`] it has seen.
//! Keys come from two places: a setup run on this engine with fresh
//! randomness, or bytes exported by the engine that ran the setup. A setup
//! runs at most once per shape: concurrent requests for a missing shape wait
//! on the same in-flight setup instead of repeating it.
//!
//! Verification never runs a setup; it only looks keys up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ark_bls12_381::{Bls12_381, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{rngs::StdRng, CryptoRng, RngCore, SeedableRng};
use atms_types::{
    CircuitShape, SignerRecord, DEFAULT_MAX_SIGNERS, DEFAULT_MAX_TREE_DEPTH, MAX_TREE_DEPTH,
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rand_core::OsRng;
use tracing::{debug, info};

use crate::circuit::{AtmsCircuit, PublicInputs};
use crate::error::EngineError;

const KEYS_VERSION: u8 = 1;
const KIND_VERIFYING: u8 = 0;
const KIND_FULL: u8 = 1;
const KEYS_HEADER: usize = 1 + 1 + 4 + 4;

/// Bounds on the shapes an engine accepts.
#[derive(Clone, Debug)]
pub struct SetupParams {
    pub max_slots: usize,
    pub max_tree_depth: u32,
}

impl Default for SetupParams {
    fn default() -> Self {
        Self {
            max_slots: DEFAULT_MAX_SIGNERS,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

/// Key pair for one circuit shape. Verifier-side engines hold only the
/// verifying half.
pub struct CircuitKeys {
    pub shape: CircuitShape,
    pub pk: Option<ProvingKey<Bls12_381>>,
    pub vk: VerifyingKey<Bls12_381>,
    pub pvk: PreparedVerifyingKey<Bls12_381>,
}

impl CircuitKeys {
    fn verifying(shape: CircuitShape, vk: VerifyingKey<Bls12_381>) -> Self {
        let pvk = PreparedVerifyingKey::from(vk.clone());
        Self {
            shape,
            pk: None,
            vk,
            pvk,
        }
    }

    fn full(shape: CircuitShape, pk: ProvingKey<Bls12_381>) -> Self {
        let vk = pk.vk.clone();
        let pvk = PreparedVerifyingKey::from(vk.clone());
        Self {
            shape,
            pk: Some(pk),
            vk,
            pvk,
        }
    }

    /// `version ‖ kind ‖ slot_count (u32 LE) ‖ tree_depth (u32 LE) ‖ key`,
    /// the key being the compressed verifying key or, with `include_pk`, the
    /// uncompressed proving key.
    pub fn to_bytes(&self, include_pk: bool) -> Result<Vec<u8>, EngineError> {
        let slots = u32::try_from(self.shape.slot_count)
            .map_err(|_| EngineError::Setup("slot count exceeds u32".into()))?;
        let mut out = Vec::with_capacity(KEYS_HEADER);
        out.push(KEYS_VERSION);
        match (&self.pk, include_pk) {
            (Some(pk), true) => {
                out.push(KIND_FULL);
                out.extend_from_slice(&slots.to_le_bytes());
                out.extend_from_slice(&self.shape.tree_depth.to_le_bytes());
                pk.serialize_uncompressed(&mut out)
                    .map_err(|e| EngineError::Setup(e.to_string()))?;
            }
            (None, true) => {
                return Err(EngineError::Setup(format!(
                    "no proving key held for shape {}",
                    self.shape
                )))
            }
            (_, false) => {
                out.push(KIND_VERIFYING);
                out.extend_from_slice(&slots.to_le_bytes());
                out.extend_from_slice(&self.shape.tree_depth.to_le_bytes());
                self.vk
                    .serialize_compressed(&mut out)
                    .map_err(|e| EngineError::Setup(e.to_string()))?;
            }
        }
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.len() < KEYS_HEADER || bytes[0] != KEYS_VERSION {
            return Err(EngineError::Setup("unrecognised key encoding".into()));
        }
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[2..6]);
        let slot_count = u32::from_le_bytes(word) as usize;
        word.copy_from_slice(&bytes[6..10]);
        let shape = CircuitShape::new(slot_count, u32::from_le_bytes(word));

        let body = &bytes[KEYS_HEADER..];
        let keys = match bytes[1] {
            KIND_VERIFYING => {
                let vk = VerifyingKey::<Bls12_381>::deserialize_compressed(body)
                    .map_err(|e| EngineError::Setup(format!("verifying key: {e}")))?;
                Self::verifying(shape, vk)
            }
            KIND_FULL => {
                let pk = ProvingKey::<Bls12_381>::deserialize_uncompressed(body)
                    .map_err(|e| EngineError::Setup(format!("proving key: {e}")))?;
                Self::full(shape, pk)
            }
            kind => return Err(EngineError::Setup(format!("unknown key kind {kind}"))),
        };
        // root, digest and slot count
        if keys.vk.gamma_abc_g1.len() != PublicInputs::LEN + 1 {
            return Err(EngineError::Setup(format!(
                "key for {shape} expects {} public inputs",
                keys.vk.gamma_abc_g1.len().saturating_sub(1)
            )));
        }
        Ok(keys)
    }
}

type KeySlot = Arc<OnceCell<Arc<CircuitKeys>>>;

pub struct ProofEngine {
    params: SetupParams,
    keys: RwLock<HashMap<CircuitShape, KeySlot>>,
    derivations: AtomicUsize,
}

impl ProofEngine {
    pub fn new(params: SetupParams) -> Self {
        Self {
            params,
            keys: RwLock::new(HashMap::new()),
            derivations: AtomicUsize::new(0),
        }
    }

    pub fn params(&self) -> &SetupParams {
        &self.params
    }

    /// Return the keys for `shape`, running a setup seeded from the
    /// operating system on first use.
    pub fn derive_keys(&self, shape: CircuitShape) -> Result<Arc<CircuitKeys>, EngineError> {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        self.setup(shape, &mut StdRng::from_seed(seed))
    }

    /// Return the keys for `shape`, running a setup with `rng` if none are
    /// registered. The setup randomness is discarded afterwards; whoever
    /// controls `rng` can forge proofs for this shape.
    pub fn setup<R: RngCore + CryptoRng>(
        &self,
        shape: CircuitShape,
        rng: &mut R,
    ) -> Result<Arc<CircuitKeys>, EngineError> {
        self.check_shape(shape)?;
        let slot = self.slot(shape);
        if let Some(keys) = slot.get() {
            debug!(%shape, "key cache hit");
            return Ok(keys.clone());
        }
        slot.get_or_try_init(|| self.run_setup(shape, rng)).map(Arc::clone)
    }

    /// Registered keys for `shape`, if any. Never runs a setup.
    pub fn cached_keys(&self, shape: CircuitShape) -> Option<Arc<CircuitKeys>> {
        self.keys.read().get(&shape).and_then(|slot| slot.get().cloned())
    }

    /// Register keys exported by another engine. Re-importing the keys
    /// already held is a no-op; conflicting keys are refused.
    pub fn import_keys(&self, bytes: &[u8]) -> Result<CircuitShape, EngineError> {
        let keys = CircuitKeys::from_bytes(bytes)?;
        let shape = keys.shape;
        self.check_shape(shape)?;

        let vk = keys.vk.clone();
        let slot = self.slot(shape);
        let installed = slot.get_or_init(|| Arc::new(keys));
        if installed.vk != vk {
            return Err(EngineError::Setup(format!(
                "different keys already registered for {shape}"
            )));
        }
        info!(%shape, proving = installed.pk.is_some(), "circuit keys imported");
        Ok(shape)
    }

    /// Export registered keys; see [`CircuitKeys::to_bytes`].
    pub fn export_keys(
        &self,
        shape: CircuitShape,
        include_pk: bool,
    ) -> Result<Vec<u8>, EngineError> {
        self.cached_keys(shape)
            .ok_or_else(|| EngineError::Setup(format!("no keys registered for {shape}")))?
            .to_bytes(include_pk)
    }

    pub fn is_cached(&self, shape: CircuitShape) -> bool {
        self.cached_keys(shape).is_some()
    }

    pub fn cached_shapes(&self) -> Vec<CircuitShape> {
        let mut shapes: Vec<CircuitShape> = self
            .keys
            .read()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(shape, _)| *shape)
            .collect();
        shapes.sort();
        shapes
    }

    /// Number of setups actually run by this engine.
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::Relaxed)
    }

    /// Drop every cached key pair. Keys already handed out stay valid.
    pub fn clear(&self) {
        self.keys.write().clear();
    }

    /// Generate a Groth16 proof. The witness is checked against the circuit
    /// first; Groth16 itself would happily prove an unsatisfied system.
    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        keys: &CircuitKeys,
        public: &PublicInputs,
        records: Vec<SignerRecord>,
        rng: &mut R,
    ) -> Result<Proof<Bls12_381>, EngineError> {
        let pk = keys.pk.as_ref().ok_or_else(|| {
            EngineError::Setup(format!("no proving key held for shape {}", keys.shape))
        })?;
        if public.slot_count != keys.shape.slot_count {
            debug!(
                shape = %keys.shape,
                slots = public.slot_count,
                "slot count does not match keys"
            );
            return Err(EngineError::ProofGeneration);
        }
        let circuit = AtmsCircuit::new(keys.shape, public, records);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let satisfied = circuit
            .clone()
            .generate_constraints(cs.clone())
            .and_then(|_| cs.is_satisfied());
        match satisfied {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    shape = %keys.shape,
                    constraint = ?cs.which_is_unsatisfied().ok().flatten(),
                    "witness does not satisfy circuit"
                );
                return Err(EngineError::ProofGeneration);
            }
            Err(e) => {
                debug!(shape = %keys.shape, error = %e, "witness synthesis failed");
                return Err(EngineError::ProofGeneration);
            }
        }

        let start = Instant::now();
        let proof = Groth16::<Bls12_381>::prove(pk, circuit, rng)
            .map_err(|_| EngineError::ProofGeneration)?;
        debug!(shape = %keys.shape, elapsed = ?start.elapsed(), "proof generated");
        Ok(proof)
    }

    /// Verify a proof against the keys of its shape. Never errors: anything
    /// that does not check out is `false`.
    pub fn verify(
        &self,
        keys: &CircuitKeys,
        public: &PublicInputs,
        proof: &Proof<Bls12_381>,
    ) -> bool {
        if public.slot_count != keys.shape.slot_count {
            return false;
        }
        Groth16::<Bls12_381>::verify_with_processed_vk(&keys.pvk, &public.to_vec(), proof)
            .unwrap_or(false)
    }

    fn check_shape(&self, shape: CircuitShape) -> Result<(), EngineError> {
        if shape.slot_count == 0 || shape.slot_count > self.params.max_slots {
            return Err(EngineError::Setup(format!(
                "slot count {} outside 1..={}",
                shape.slot_count, self.params.max_slots
            )));
        }
        let max_depth = self.params.max_tree_depth.min(MAX_TREE_DEPTH);
        if shape.tree_depth > max_depth {
            return Err(EngineError::Setup(format!(
                "tree depth {} exceeds {max_depth}",
                shape.tree_depth
            )));
        }
        Ok(())
    }

    fn slot(&self, shape: CircuitShape) -> KeySlot {
        if let Some(slot) = self.keys.read().get(&shape) {
            return slot.clone();
        }
        self.keys.write().entry(shape).or_default().clone()
    }

    fn run_setup<R: RngCore + CryptoRng>(
        &self,
        shape: CircuitShape,
        rng: &mut R,
    ) -> Result<Arc<CircuitKeys>, EngineError> {
        info!(%shape, "running circuit setup");
        let start = Instant::now();
        let (pk, _) = Groth16::<Bls12_381>::circuit_specific_setup(AtmsCircuit::empty(shape), rng)
            .map_err(|e| EngineError::Setup(e.to_string()))?;
        self.derivations.fetch_add(1, Ordering::Relaxed);
        info!(%shape, elapsed = ?start.elapsed(), "circuit keys derived");
        Ok(Arc::new(CircuitKeys::full(shape, pk)))
    }
}
