// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! C ABI over `atms-sdk`.
//!
//! Every object crosses the boundary as an opaque heap handle created by
//! this library and released with the matching `free_*` function. The
//! library never frees a handle it did not return, and never keeps one
//! beyond the call it was passed to.
//!
//! | Code | Meaning |
//! |---|---|
//! | `1` | success / proof accepted |
//! | `0` | proving failed / proof rejected |
//! | `-1` | invalid input |
//! | `-2` | circuit keys missing or setup failed |
//! | `-99` | null pointer |

use core::slice;

use atms_sdk::serialize::{avk_from_bytes, avk_to_bytes, AVK_BYTES};
use atms_sdk::{
    Atms, AtmsConfig, AtmsError, AtmsProof, Avk, CircuitShape, KeyCommitment, ProofEngine,
    PublicKey, Signature, ATMS_PROOF_BYTES,
};
use atms_types::{PUBLIC_KEY_BYTES, SIGNATURE_BYTES};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const SUCCESS: i64 = 1;
pub const FAILURE: i64 = 0;
pub const INVALID_INPUT: i64 = -1;
pub const SETUP_ERR: i64 = -2;
pub const NULLPOINTERERR: i64 = -99;

/// Engine handle: the key cache plus the configuration it was built from.
pub struct AtmsEngine {
    engine: ProofEngine,
    config: AtmsConfig,
}

impl AtmsEngine {
    fn new(config: AtmsConfig) -> Option<Self> {
        match config.engine() {
            Ok(engine) => Some(Self { engine, config }),
            Err(e) => {
                debug!(error = %e, "engine configuration rejected");
                None
            }
        }
    }

    fn atms(&self) -> Atms<'_> {
        Atms::new(&self.engine, self.config.clone())
    }
}

type EnginePtr = *mut AtmsEngine;
type PkPtr = *mut PublicKey;
type SigPtr = *mut Signature;
type MtCommitmentPtr = *mut KeyCommitment;
type AvkPtr = *mut Avk;
type ProofPtr = *mut AtmsProof;

fn into_handle<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

/// Borrow `len` bytes; an empty slice may come with a null pointer.
unsafe fn bytes<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(slice::from_raw_parts(ptr, len))
}

/// Copy the values behind an array of `len` handles.
unsafe fn handles<T: Copy>(ptr: *const *mut T, len: usize) -> Option<Vec<T>> {
    if ptr.is_null() {
        return None;
    }
    slice::from_raw_parts(ptr, len)
        .iter()
        .map(|&p| p.as_ref().copied())
        .collect()
}

macro_rules! free_pointer {
    ($name:ident, $pointer_type:ty) => {
        /// Release a handle returned by this library. Returns `0`, or
        /// `-99` for a null handle.
        ///
        /// # Safety
        /// `p` must be null or a live handle of this type not yet freed.
        #[no_mangle]
        pub unsafe extern "C" fn $name(p: $pointer_type) -> i64 {
            if p.is_null() {
                return NULLPOINTERERR;
            }
            drop(Box::from_raw(p));
            0
        }
    };
}

free_pointer!(free_engine, EnginePtr);
free_pointer!(free_pk, PkPtr);
free_pointer!(free_sig, SigPtr);
free_pointer!(free_mt_comm, MtCommitmentPtr);
free_pointer!(free_avk, AvkPtr);
free_pointer!(free_proof, ProofPtr);

/// Install a `tracing` subscriber filtered by `ATMS_LOG` (default `warn`).
/// Returns `0`, or `-1` if a global subscriber is already set.
#[no_mangle]
pub extern "C" fn atms_init_logging() -> i64 {
    let filter = EnvFilter::try_from_env("ATMS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        Ok(()) => 0,
        Err(_) => INVALID_INPUT,
    }
}

/// Engine configured from the `ATMS_*` environment. Null if the
/// environment holds an invalid configuration.
#[no_mangle]
pub extern "C" fn atms_engine_new() -> EnginePtr {
    match AtmsConfig::from_env() {
        Ok(config) => AtmsEngine::new(config).map_or(core::ptr::null_mut(), into_handle),
        Err(e) => {
            debug!(error = %e, "engine configuration rejected");
            core::ptr::null_mut()
        }
    }
}

fn engine_keys(
    engine: &AtmsEngine,
    slot_count: usize,
    tree_depth: u32,
    include_pk: bool,
) -> Result<Vec<u8>, i64> {
    engine
        .engine
        .export_keys(CircuitShape::new(slot_count, tree_depth), include_pk)
        .map_err(|e| {
            debug!(error = %e, "key export failed");
            SETUP_ERR
        })
}

/// Length of the encoding [`atms_engine_export_keys`] would write, or `-2`
/// if the engine holds no such keys.
///
/// # Safety
/// `engine` must be null or a live engine handle.
#[no_mangle]
pub unsafe extern "C" fn atms_engine_keys_len(
    engine: *const AtmsEngine,
    slot_count: usize,
    tree_depth: u32,
    include_pk: bool,
) -> i64 {
    let Some(engine) = engine.as_ref() else {
        return NULLPOINTERERR;
    };
    match engine_keys(engine, slot_count, tree_depth, include_pk) {
        Ok(encoded) => encoded.len() as i64,
        Err(status) => status,
    }
}

/// Export the keys held for a shape. With `include_pk` false only the
/// verifying key is written. Returns the number of bytes written, `-1` if
/// `out_len` is too small, `-2` if no keys are held, or `-99` for null
/// arguments.
///
/// # Safety
/// `engine` must be null or a live engine handle; `out` must point to
/// `out_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_engine_export_keys(
    engine: *const AtmsEngine,
    slot_count: usize,
    tree_depth: u32,
    include_pk: bool,
    out: *mut u8,
    out_len: usize,
) -> i64 {
    let (Some(engine), false) = (engine.as_ref(), out.is_null()) else {
        return NULLPOINTERERR;
    };
    let encoded = match engine_keys(engine, slot_count, tree_depth, include_pk) {
        Ok(encoded) => encoded,
        Err(status) => return status,
    };
    if out_len < encoded.len() {
        return INVALID_INPUT;
    }
    slice::from_raw_parts_mut(out, encoded.len()).copy_from_slice(&encoded);
    encoded.len() as i64
}

/// Register keys exported by another engine. Returns `1`, `-1` for
/// malformed or conflicting keys, or `-99` for null arguments.
///
/// # Safety
/// `engine` must be null or a live engine handle; `bytes` must point to
/// `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_engine_import_keys(
    engine: *const AtmsEngine,
    bytes: *const u8,
    len: usize,
) -> i64 {
    let (Some(engine), Some(encoded)) = (engine.as_ref(), self::bytes(bytes, len)) else {
        return NULLPOINTERERR;
    };
    match engine.engine.import_keys(encoded) {
        Ok(_) => SUCCESS,
        Err(e) => {
            debug!(error = %e, "key import rejected");
            INVALID_INPUT
        }
    }
}

/// Decode a compressed public key. Null on bad length or encoding.
///
/// # Safety
/// `bytes` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_pk_from_bytes(bytes: *const u8, len: usize) -> PkPtr {
    match self::bytes(bytes, len) {
        Some(b) if b.len() == PUBLIC_KEY_BYTES => match PublicKey::from_bytes(b) {
            Ok(pk) if pk.is_valid() => into_handle(pk),
            _ => core::ptr::null_mut(),
        },
        _ => core::ptr::null_mut(),
    }
}

/// Decode a signature. Null on bad length or encoding.
///
/// # Safety
/// `bytes` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_sig_from_bytes(bytes: *const u8, len: usize) -> SigPtr {
    match self::bytes(bytes, len) {
        Some(b) if b.len() == SIGNATURE_BYTES => {
            Signature::from_bytes(b).map_or(core::ptr::null_mut(), into_handle)
        }
        _ => core::ptr::null_mut(),
    }
}

/// Commit to `count` keys in the given order. Null if any handle is null,
/// the set is empty or too large, or a key repeats.
///
/// # Safety
/// `pks` must be null or point to `count` handles from `atms_pk_from_bytes`.
#[no_mangle]
pub unsafe extern "C" fn atms_commit(pks: *const PkPtr, count: usize) -> MtCommitmentPtr {
    let Some(keys) = handles(pks, count) else {
        return core::ptr::null_mut();
    };
    match atms_sdk::commit(&keys) {
        Ok(commitment) => into_handle(commitment),
        Err(e) => {
            debug!(error = %e, "commitment rejected");
            core::ptr::null_mut()
        }
    }
}

/// AVK of a commitment as its own handle. Null for a null commitment.
///
/// # Safety
/// `comm` must be null or a live commitment handle.
#[no_mangle]
pub unsafe extern "C" fn atms_commitment_avk(comm: *const KeyCommitment) -> AvkPtr {
    comm.as_ref()
        .map_or(core::ptr::null_mut(), |c| into_handle(*c.avk()))
}

/// Write an AVK into `out`. Returns the number of bytes written, `-1` if
/// `out_len` is too small, or `-99` for null arguments.
///
/// # Safety
/// `avk` must be null or a live AVK handle; `out` must point to `out_len`
/// writable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_avk_to_bytes(avk: *const Avk, out: *mut u8, out_len: usize) -> i64 {
    let (Some(avk), false) = (avk.as_ref(), out.is_null()) else {
        return NULLPOINTERERR;
    };
    if out_len < AVK_BYTES {
        return INVALID_INPUT;
    }
    match avk_to_bytes(avk) {
        Ok(encoded) => {
            slice::from_raw_parts_mut(out, AVK_BYTES).copy_from_slice(&encoded);
            AVK_BYTES as i64
        }
        Err(_) => INVALID_INPUT,
    }
}

/// Decode an AVK published by the committing party. Null on bad length or
/// an inconsistent encoding.
///
/// # Safety
/// `bytes` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_avk_from_bytes(bytes: *const u8, len: usize) -> AvkPtr {
    let Some(b) = self::bytes(bytes, len) else {
        return core::ptr::null_mut();
    };
    match avk_from_bytes(b) {
        Ok(avk) => into_handle(avk),
        Err(e) => {
            debug!(error = %e, "avk decoding failed");
            core::ptr::null_mut()
        }
    }
}

fn prove_status(e: &AtmsError) -> i64 {
    match e {
        AtmsError::InvalidInput(_) => INVALID_INPUT,
        AtmsError::SetupMissing(_) => SETUP_ERR,
        _ => FAILURE,
    }
}

/// Prove that the `n` keys in `pks` are distinct members of `avk` and
/// signed the message. On success `*out_proof` receives a new handle.
///
/// # Safety
/// Pointer arguments must be null or valid for their documented lengths;
/// `pks` and `sigs` point to `n` handles each.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn atms_prove(
    engine: *const AtmsEngine,
    out_proof: *mut ProofPtr,
    pks: *const PkPtr,
    sigs: *const SigPtr,
    n: usize,
    avk: *const KeyCommitment,
    msg: *const u8,
    msg_len: usize,
) -> i64 {
    let (Some(engine), Some(out), Some(commitment), Some(message)) = (
        engine.as_ref(),
        out_proof.as_mut(),
        avk.as_ref(),
        bytes(msg, msg_len),
    ) else {
        return NULLPOINTERERR;
    };
    let (Some(keys), Some(signatures)) = (handles(pks, n), handles(sigs, n)) else {
        return NULLPOINTERERR;
    };

    let mut rng = atms_sdk::crypto_rng();
    match engine
        .atms()
        .prove(commitment, &keys, &signatures, n, message, &mut rng)
    {
        Ok(proof) => {
            *out = into_handle(proof);
            SUCCESS
        }
        Err(e) => {
            debug!(error = %e, "atms_prove failed");
            prove_status(&e)
        }
    }
}

/// `1` if `proof` attests at least `threshold` signers of the message
/// under `avk`, else `0`. An engine without the verifying key for the
/// proof's shape answers `0`; it never runs a setup.
///
/// # Safety
/// Pointer arguments must be null or valid handles; `msg` must point to
/// `msg_len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_verify(
    engine: *const AtmsEngine,
    proof: *const AtmsProof,
    avk: *const Avk,
    msg: *const u8,
    msg_len: usize,
    threshold: usize,
) -> i64 {
    let (Some(engine), Some(proof), Some(avk), Some(message)) = (
        engine.as_ref(),
        proof.as_ref(),
        avk.as_ref(),
        bytes(msg, msg_len),
    ) else {
        return NULLPOINTERERR;
    };
    if engine
        .atms()
        .verify_proof(proof, avk, message, threshold)
    {
        SUCCESS
    } else {
        FAILURE
    }
}

/// Decode a proof. Null when the bytes are malformed.
///
/// # Safety
/// `bytes` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_proof_from_bytes(bytes: *const u8, len: usize) -> ProofPtr {
    let Some(b) = self::bytes(bytes, len) else {
        return core::ptr::null_mut();
    };
    match AtmsProof::from_bytes(b) {
        Ok(proof) => into_handle(proof),
        Err(e) => {
            debug!(error = %e, "proof decoding failed");
            core::ptr::null_mut()
        }
    }
}

/// Encoded proof length; the same for every proof.
#[no_mangle]
pub extern "C" fn atms_proof_len() -> usize {
    ATMS_PROOF_BYTES
}

/// Encode `proof` into `out`. Returns the number of bytes written, `-1` if
/// `out_len` is too small, or `-99` for null arguments.
///
/// # Safety
/// `out` must point to `out_len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn atms_proof_to_bytes(
    proof: *const AtmsProof,
    out: *mut u8,
    out_len: usize,
) -> i64 {
    let (Some(proof), false) = (proof.as_ref(), out.is_null()) else {
        return NULLPOINTERERR;
    };
    if out_len < ATMS_PROOF_BYTES {
        return INVALID_INPUT;
    }
    match proof.to_bytes() {
        Ok(encoded) => {
            slice::from_raw_parts_mut(out, encoded.len()).copy_from_slice(&encoded);
            encoded.len() as i64
        }
        Err(_) => INVALID_INPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use core::ptr;

    struct Fixture {
        engine: EnginePtr,
        pks: Vec<PkPtr>,
        sigs: Vec<SigPtr>,
        comm: MtCommitmentPtr,
        avk: AvkPtr,
    }

    const MSG: &[u8] = b"hello";

    fn new_engine() -> EnginePtr {
        AtmsEngine::new(AtmsConfig::default()).map_or(ptr::null_mut(), into_handle)
    }

    /// Five registered keys; members 0, 2 and 4 sign `MSG`.
    unsafe fn fixture() -> Fixture {
        let mut rng = StdRng::seed_from_u64(21);
        let members: Vec<_> = (0..5).map(|_| atms_schnorr::keygen(&mut rng)).collect();
        let all: Vec<PkPtr> = members
            .iter()
            .map(|(_, pk)| atms_pk_from_bytes(pk.to_bytes().as_ptr(), PUBLIC_KEY_BYTES))
            .collect();
        let comm = atms_commit(all.as_ptr(), all.len());
        for pk in all {
            free_pk(pk);
        }

        let signers = [0, 2, 4];
        let pks = signers
            .iter()
            .map(|&i| atms_pk_from_bytes(members[i].1.to_bytes().as_ptr(), PUBLIC_KEY_BYTES))
            .collect();
        let sigs = signers
            .iter()
            .map(|&i| {
                let sig = atms_schnorr::sign(&members[i].0, MSG, &mut rng).to_bytes();
                atms_sig_from_bytes(sig.as_ptr(), SIGNATURE_BYTES)
            })
            .collect();

        Fixture {
            engine: new_engine(),
            pks,
            sigs,
            comm,
            avk: atms_commitment_avk(comm),
        }
    }

    unsafe fn prove(f: &Fixture) -> ProofPtr {
        let mut proof: ProofPtr = ptr::null_mut();
        let status = atms_prove(
            f.engine,
            &mut proof,
            f.pks.as_ptr(),
            f.sigs.as_ptr(),
            3,
            f.comm,
            MSG.as_ptr(),
            MSG.len(),
        );
        assert_eq!(status, SUCCESS);
        assert!(!proof.is_null());
        proof
    }

    unsafe fn release(f: Fixture) {
        for pk in f.pks {
            free_pk(pk);
        }
        for sig in f.sigs {
            free_sig(sig);
        }
        free_avk(f.avk);
        free_mt_comm(f.comm);
        free_engine(f.engine);
    }

    #[test]
    fn prove_and_verify_through_handles() {
        unsafe {
            let f = fixture();
            assert!(!f.engine.is_null() && !f.comm.is_null() && !f.avk.is_null());
            let proof = prove(&f);

            let verify = |proof: ProofPtr, msg: &[u8], threshold: usize| {
                atms_verify(f.engine, proof, f.avk, msg.as_ptr(), msg.len(), threshold)
            };
            assert_eq!(verify(proof, MSG, 2), SUCCESS);
            assert_eq!(verify(proof, MSG, 4), FAILURE);
            assert_eq!(verify(proof, b"goodbye", 2), FAILURE);

            let mut buf = vec![0u8; atms_proof_len()];
            assert_eq!(
                atms_proof_to_bytes(proof, buf.as_mut_ptr(), buf.len()),
                ATMS_PROOF_BYTES as i64
            );
            let decoded = atms_proof_from_bytes(buf.as_ptr(), buf.len());
            assert!(!decoded.is_null());
            assert_eq!(verify(decoded, MSG, 3), SUCCESS);

            assert_eq!(free_proof(decoded), 0);
            assert_eq!(free_proof(proof), 0);
            release(f);
        }
    }

    #[test]
    fn verifier_with_published_avk_and_keys() {
        unsafe {
            let f = fixture();
            let proof = prove(&f);
            let shape = (*proof).shape();

            let mut avk_buf = [0u8; AVK_BYTES];
            assert_eq!(
                atms_avk_to_bytes(f.avk, avk_buf.as_mut_ptr(), avk_buf.len()),
                AVK_BYTES as i64
            );
            let avk = atms_avk_from_bytes(avk_buf.as_ptr(), avk_buf.len());
            assert!(!avk.is_null());
            assert_eq!(*avk, *f.avk);

            let verifier = new_engine();
            let verify =
                |engine: EnginePtr| atms_verify(engine, proof, avk, MSG.as_ptr(), MSG.len(), 3);
            // no verifying key yet, and none is made up
            assert_eq!(verify(verifier), FAILURE);
            assert!((*verifier).engine.cached_shapes().is_empty());

            let len = atms_engine_keys_len(f.engine, shape.slot_count, shape.tree_depth, false);
            assert!(len > 0);
            let mut keys = vec![0u8; len as usize];
            assert_eq!(
                atms_engine_export_keys(
                    f.engine,
                    shape.slot_count,
                    shape.tree_depth,
                    false,
                    keys.as_mut_ptr(),
                    keys.len(),
                ),
                len
            );
            assert_eq!(atms_engine_import_keys(verifier, keys.as_ptr(), keys.len()), SUCCESS);
            assert_eq!(verify(verifier), SUCCESS);
            assert_eq!((*verifier).engine.derivations(), 0);

            assert_eq!(free_avk(avk), 0);
            free_engine(verifier);
            free_proof(proof);
            release(f);
        }
    }

    #[test]
    fn key_transfer_errors() {
        unsafe {
            let engine = new_engine();
            let mut buf = [0u8; 16];
            assert_eq!(atms_engine_keys_len(engine, 1, 0, false), SETUP_ERR);
            assert_eq!(
                atms_engine_export_keys(engine, 1, 0, false, buf.as_mut_ptr(), buf.len()),
                SETUP_ERR
            );
            assert_eq!(
                atms_engine_import_keys(engine, buf.as_ptr(), buf.len()),
                INVALID_INPUT
            );
            assert_eq!(
                atms_engine_import_keys(ptr::null(), buf.as_ptr(), buf.len()),
                NULLPOINTERERR
            );
            free_engine(engine);
        }
    }

    #[test]
    fn null_and_malformed_arguments() {
        unsafe {
            let f = fixture();
            let mut proof: ProofPtr = ptr::null_mut();
            assert_eq!(
                atms_prove(
                    ptr::null(),
                    &mut proof,
                    f.pks.as_ptr(),
                    f.sigs.as_ptr(),
                    3,
                    f.comm,
                    MSG.as_ptr(),
                    MSG.len(),
                ),
                NULLPOINTERERR
            );
            assert_eq!(
                atms_prove(
                    f.engine,
                    &mut proof,
                    f.pks.as_ptr(),
                    f.sigs.as_ptr(),
                    0,
                    f.comm,
                    MSG.as_ptr(),
                    MSG.len(),
                ),
                INVALID_INPUT
            );
            assert_eq!(
                atms_verify(f.engine, ptr::null(), f.avk, MSG.as_ptr(), MSG.len(), 1),
                NULLPOINTERERR
            );
            assert!(proof.is_null());

            assert!(atms_proof_from_bytes([0u8; 10].as_ptr(), 10).is_null());
            assert!(atms_pk_from_bytes([0u8; 31].as_ptr(), 31).is_null());
            assert!(atms_sig_from_bytes(ptr::null(), SIGNATURE_BYTES).is_null());
            assert!(atms_commit(ptr::null(), 3).is_null());
            assert!(atms_commitment_avk(ptr::null()).is_null());
            assert_eq!(free_proof(ptr::null_mut()), NULLPOINTERERR);
            assert_eq!(free_avk(ptr::null_mut()), NULLPOINTERERR);

            let mut avk = [0u8; AVK_BYTES];
            assert_eq!(atms_avk_to_bytes(f.avk, avk.as_mut_ptr(), avk.len()), AVK_BYTES as i64);
            assert_eq!(atms_avk_to_bytes(f.avk, avk.as_mut_ptr(), 3), INVALID_INPUT);
            assert!(atms_avk_from_bytes(avk.as_ptr(), AVK_BYTES - 1).is_null());
            avk[..32].fill(0xff);
            assert!(atms_avk_from_bytes(avk.as_ptr(), AVK_BYTES).is_null());
            release(f);
        }
    }

    #[test]
    fn duplicate_signer_fails_to_prove() {
        unsafe {
            let f = fixture();
            let pks = [f.pks[0], f.pks[0], f.pks[1]];
            let sigs = [f.sigs[0], f.sigs[0], f.sigs[1]];
            let mut proof: ProofPtr = ptr::null_mut();
            let status = atms_prove(
                f.engine,
                &mut proof,
                pks.as_ptr(),
                sigs.as_ptr(),
                3,
                f.comm,
                MSG.as_ptr(),
                MSG.len(),
            );
            assert_eq!(status, FAILURE);
            assert!(proof.is_null());
            release(f);
        }
    }
}
