//! Run configuration for the scoring core.
//!
//! The configuration is an explicit value handed to each stage; nothing is held
//! in process-wide state. It can be loaded from a TOML file whose keys are all
//! optional:
//!
//! ```toml
//! top_n = 3
//! min_shared = 2
//! ```

use crate::error::ScoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TOP_N: usize = 3;
pub const DEFAULT_MIN_SHARED: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreConfig {
    /// Number of highest evidence scores kept per target-disease pair.
    pub top_n: usize,
    /// Minimum number of shared diseases for a target pair to be reported.
    pub min_shared: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            min_shared: DEFAULT_MIN_SHARED,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ScoreError),
}

impl ScoreConfig {
    /// Reads a TOML config file. Missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of this configuration.
    pub fn with_overrides(self, top_n: Option<usize>, min_shared: Option<usize>) -> Self {
        Self {
            top_n: top_n.unwrap_or(self.top_n),
            min_shared: min_shared.unwrap_or(self.min_shared),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ScoreError::InvalidInput(
                "top_n must be a positive integer".to_string(),
            )
            .into());
        }
        if self.min_shared == 0 {
            return Err(ScoreError::InvalidInput(
                "min_shared must be a positive integer".to_string(),
            )
            .into());
        }
        Ok(())
    }
}
