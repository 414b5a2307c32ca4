//! Run configuration for the `slabtrace` binary.
//!
//! Loaded from a TOML file; every field is optional and falls back to
//! [`Config::default`]. Command line flags override file values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scene::SceneKind;

/// File read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "slabtrace.toml";

/// Settings for one verification/benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Scene to build
    pub scene: SceneKind,
    /// Number of random rays to trace
    pub rays: usize,
    /// Seed for scene and ray generation
    pub seed: u64,
    /// Primitive count for the random-mix scene
    pub objects: usize,
    /// Compare every BVH answer with a brute-force query
    pub verify: bool,
    /// Lower bound of the ray parameter window, excludes self-hits
    pub t_min: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scene: SceneKind::BouncingSpheres,
            rays: 100_000,
            seed: 0,
            objects: 1_000,
            verify: true,
            t_min: 0.001,
        }
    }
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given; otherwise load [`DEFAULT_CONFIG_PATH`] if it
    /// exists, else use defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject values no run can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rays == 0 {
            return Err(ConfigError::Invalid {
                field: "rays",
                reason: "must trace at least one ray".to_string(),
            });
        }
        if self.scene == SceneKind::RandomMix && self.objects == 0 {
            return Err(ConfigError::Invalid {
                field: "objects",
                reason: "random-mix needs at least one primitive".to_string(),
            });
        }
        if !self.t_min.is_finite() || self.t_min < 0.0 {
            return Err(ConfigError::Invalid {
                field: "t_min",
                reason: format!("expected a finite non-negative value, got {}", self.t_min),
            });
        }
        Ok(())
    }
}
