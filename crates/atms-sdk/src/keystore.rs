// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! On-disk circuit keys.
//!
//! Setup randomness never leaves the engine that ran the setup; what gets
//! shared is the output. The party running setup exports keys to a
//! directory with [`save_keys`] and verifiers load that directory with
//! [`load_keys`] (or by pointing `ATMS_KEY_DIR` at it). One file per shape,
//! named `{slot_count}x{tree_depth}.keys`.

use std::fs;
use std::path::{Path, PathBuf};

use atms_circuit::ProofEngine;
use atms_types::CircuitShape;
use tracing::{debug, info};

use crate::error::{AtmsError, AtmsResult};

const KEY_EXTENSION: &str = "keys";

pub fn key_file_name(shape: CircuitShape) -> String {
    format!("{}x{}.{KEY_EXTENSION}", shape.slot_count, shape.tree_depth)
}

/// Write the keys registered for `shape` into `dir`. Verifier-only
/// distributions pass `include_pk = false`.
pub fn save_keys(
    engine: &ProofEngine,
    shape: CircuitShape,
    dir: &Path,
    include_pk: bool,
) -> AtmsResult<PathBuf> {
    let bytes = engine.export_keys(shape, include_pk)?;
    fs::create_dir_all(dir)
        .map_err(|e| AtmsError::KeyStore(format!("{}: {e}", dir.display())))?;
    let path = dir.join(key_file_name(shape));
    fs::write(&path, bytes)
        .map_err(|e| AtmsError::KeyStore(format!("{}: {e}", path.display())))?;
    info!(%shape, path = %path.display(), proving = include_pk, "circuit keys saved");
    Ok(path)
}

/// Import every key file in `dir` into `engine`. Returns the shapes loaded,
/// sorted.
pub fn load_keys(engine: &ProofEngine, dir: &Path) -> AtmsResult<Vec<CircuitShape>> {
    let entries =
        fs::read_dir(dir).map_err(|e| AtmsError::KeyStore(format!("{}: {e}", dir.display())))?;

    let mut shapes = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| AtmsError::KeyStore(format!("{}: {e}", dir.display())))?
            .path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(KEY_EXTENSION) {
            debug!(path = %path.display(), "skipping non-key file");
            continue;
        }
        let bytes = fs::read(&path)
            .map_err(|e| AtmsError::KeyStore(format!("{}: {e}", path.display())))?;
        let shape = engine
            .import_keys(&bytes)
            .map_err(|e| AtmsError::KeyStore(format!("{}: {e}", path.display())))?;
        shapes.push(shape);
    }
    shapes.sort();
    info!(dir = %dir.display(), count = shapes.len(), "circuit keys loaded");
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atms_circuit::SetupParams;

    #[test]
    fn file_name_encodes_shape() {
        assert_eq!(key_file_name(CircuitShape::new(3, 5)), "3x5.keys");
    }

    #[test]
    fn saved_keys_load_into_fresh_engine() {
        let dir = tempfile::tempdir().unwrap();
        let shape = CircuitShape::new(1, 1);
        let source = ProofEngine::new(SetupParams::default());
        let keys = source.derive_keys(shape).unwrap();

        let path = save_keys(&source, shape, dir.path(), false).unwrap();
        assert!(path.ends_with("1x1.keys"));
        fs::write(dir.path().join("README"), "not a key").unwrap();

        let target = ProofEngine::new(SetupParams::default());
        assert_eq!(load_keys(&target, dir.path()).unwrap(), vec![shape]);
        let loaded = target.cached_keys(shape).unwrap();
        assert_eq!(loaded.vk, keys.vk);
        assert!(loaded.pk.is_none());
        assert_eq!(target.derivations(), 0);
    }

    #[test]
    fn save_without_keys_fails() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ProofEngine::new(SetupParams::default());
        assert!(matches!(
            save_keys(&engine, CircuitShape::new(1, 1), dir.path(), false),
            Err(AtmsError::SetupMissing(_))
        ));
    }

    #[test]
    fn corrupt_key_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1x1.keys"), [1u8, 0, 1]).unwrap();
        let engine = ProofEngine::new(SetupParams::default());
        assert!(matches!(
            load_keys(&engine, dir.path()),
            Err(AtmsError::KeyStore(_))
        ));
    }

    #[test]
    fn missing_dir_reported() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ProofEngine::new(SetupParams::default());
        assert!(load_keys(&engine, &dir.path().join("absent")).is_err());
    }
}
