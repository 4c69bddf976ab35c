// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Engine configuration.
//!
//! Loaded from a JSON file or from the environment:
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `ATMS_MAX_SIGNERS` | `max_signers` | 1024 |
//! | `ATMS_MAX_TREE_DEPTH` | `max_tree_depth` | 20 |
//! | `ATMS_KEY_DIR` | `key_dir` | unset |
//!
//! With `key_dir` set, [`AtmsConfig::engine`] loads the circuit keys stored
//! there (see [`crate::keystore`]). Without it the engine starts empty and
//! runs its own setup the first time it proves for a shape.
//!
//! ```rust,no_run
//! use atms_sdk::config::AtmsConfig;
//!
//! # fn example() -> atms_sdk::error::AtmsResult<()> {
//! let config = AtmsConfig::from_env()?;
//! let engine = config.engine()?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use atms_circuit::{ProofEngine, SetupParams};
use atms_types::{DEFAULT_MAX_SIGNERS, DEFAULT_MAX_TREE_DEPTH, MAX_TREE_DEPTH};
use serde::{Deserialize, Serialize};

use crate::error::{AtmsError, AtmsResult};
use crate::keystore;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AtmsConfig {
    /// Largest slot count accepted by `prove`.
    pub max_signers: usize,
    /// Largest commitment tree; bounds the registered key count at
    /// `2^max_tree_depth`.
    pub max_tree_depth: u32,
    /// Directory of exported circuit keys to load at startup.
    pub key_dir: Option<PathBuf>,
}

impl Default for AtmsConfig {
    fn default() -> Self {
        Self {
            max_signers: DEFAULT_MAX_SIGNERS,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            key_dir: None,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> AtmsResult<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AtmsError::Config(format!("{key}: cannot parse {raw:?}"))),
        Err(_) => Ok(default),
    }
}

impl AtmsConfig {
    /// Default limits, loading keys from `dir`.
    pub fn with_key_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            key_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> AtmsResult<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| AtmsError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AtmsError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> AtmsResult<Self> {
        let defaults = Self::default();
        let config = Self {
            max_signers: env_or("ATMS_MAX_SIGNERS", defaults.max_signers)?,
            max_tree_depth: env_or("ATMS_MAX_TREE_DEPTH", defaults.max_tree_depth)?,
            key_dir: std::env::var_os("ATMS_KEY_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AtmsResult<()> {
        if self.max_signers == 0 {
            return Err(AtmsError::Config("max_signers must be positive".into()));
        }
        if self.max_tree_depth > MAX_TREE_DEPTH {
            return Err(AtmsError::Config(format!(
                "max_tree_depth {} exceeds {MAX_TREE_DEPTH}",
                self.max_tree_depth
            )));
        }
        if let Some(dir) = &self.key_dir {
            if !dir.is_dir() {
                return Err(AtmsError::Config(format!(
                    "key_dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn setup_params(&self) -> AtmsResult<SetupParams> {
        self.validate()?;
        Ok(SetupParams {
            max_slots: self.max_signers,
            max_tree_depth: self.max_tree_depth,
        })
    }

    /// Key registry for this configuration, preloaded from `key_dir`.
    pub fn engine(&self) -> AtmsResult<ProofEngine> {
        let engine = ProofEngine::new(self.setup_params()?);
        if let Some(dir) = &self.key_dir {
            keystore::load_keys(&engine, dir)?;
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AtmsConfig::default();
        assert!(config.validate().is_ok());
        let params = config.setup_params().unwrap();
        assert_eq!(params.max_slots, DEFAULT_MAX_SIGNERS);
        assert!(config.key_dir.is_none());
    }

    #[test]
    fn load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_signers": 16 }}"#).unwrap();
        let config = AtmsConfig::load(file.path()).unwrap();
        assert_eq!(config.max_signers, 16);
        assert_eq!(config.max_tree_depth, DEFAULT_MAX_TREE_DEPTH);
    }

    #[test]
    fn load_rejects_missing_key_dir() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("keys");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::json!({ "key_dir": absent })).unwrap();
        assert!(matches!(
            AtmsConfig::load(file.path()),
            Err(AtmsError::Config(_))
        ));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AtmsConfig::load(&dir.path().join("atms.json")),
            Err(AtmsError::Config(_))
        ));
    }

    #[test]
    fn rejects_oversized_depth() {
        let config = AtmsConfig {
            max_tree_depth: MAX_TREE_DEPTH + 1,
            ..AtmsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn engine_loads_key_dir() {
        let dir = tempfile::tempdir().unwrap();
        let shape = atms_types::CircuitShape::new(1, 0);
        let source = ProofEngine::new(SetupParams::default());
        let keys = source.derive_keys(shape).unwrap();
        keystore::save_keys(&source, shape, dir.path(), false).unwrap();

        let engine = AtmsConfig::with_key_dir(dir.path()).engine().unwrap();
        assert_eq!(engine.cached_keys(shape).unwrap().vk, keys.vk);
        assert_eq!(engine.derivations(), 0);
    }

    #[test]
    fn engine_without_key_dir_starts_empty() {
        let engine = AtmsConfig::default().engine().unwrap();
        assert!(engine.cached_shapes().is_empty());
    }
}
