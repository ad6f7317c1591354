//! Materialization settings, loaded from TOML or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! parallel = true
//! parallel_threshold = 4096
//! chunk_size = 1024
//! num_threads = 4
//! ```

use std::path::Path;

use crate::error::{Result, TensorError};

/// Controls how expressions are evaluated into tensors.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Evaluate large results on rayon workers (needs the `rayon` feature).
    pub parallel: bool,
    /// Results with fewer elements than this are always evaluated serially.
    pub parallel_threshold: usize,
    /// Number of consecutive output elements handed to one worker at a time.
    pub chunk_size: usize,
    /// Size of a dedicated worker pool; `None` uses rayon's global pool.
    ///
    /// The pool lives as long as the materializer built from this config, so
    /// `materialize` starts a fresh one on every call.
    pub num_threads: Option<usize>,
}

impl EvalConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TensorError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: EvalConfig = toml::from_str(toml_str)
            .map_err(|e| TensorError::Config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TensorError::Config(format!("TOML serialise error: {e}")))
    }

    /// Checks the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(TensorError::Config("chunk_size must be at least 1".into()));
        }
        if self.num_threads == Some(0) {
            return Err(TensorError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// A configuration that never leaves the calling thread.
    pub fn serial() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 4096,
            chunk_size: 1024,
            num_threads: None,
        }
    }
}
