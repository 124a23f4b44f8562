//! Verification settings
//!
//! Defaults reproduce the reference behavior: relative tolerance `1e-4` on the
//! dot-product identity, FD/AD deviation reported but never gating.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, VerifyError};
use crate::DEFAULT_REL_TOLERANCE;

/// Settings shared by the `check` and `compare` commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Relative tolerance on `|dot1 - dot2| / |dot1|`
    pub rel_tolerance: f64,
    /// Fail the run when the whole-domain FD/AD max deviation exceeds this
    pub fd_gate: Option<f64>,
    /// Column read by the comparator (0-based)
    pub column: usize,
    /// Directory holding the per-partition result files
    pub data_dir: PathBuf,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            rel_tolerance: DEFAULT_REL_TOLERANCE,
            fd_gate: None,
            column: 0,
            data_dir: PathBuf::from("."),
        }
    }
}

impl VerifyConfig {
    /// Load from a YAML file; missing keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                VerifyError::MissingFile {
                    path: path.to_path_buf(),
                }
            } else {
                VerifyError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Parse from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| VerifyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tolerances that cannot gate anything
    pub fn validate(&self) -> Result<()> {
        if !self.rel_tolerance.is_finite() || self.rel_tolerance <= 0.0 {
            return Err(VerifyError::Config(format!(
                "rel_tolerance must be finite and positive, got {}",
                self.rel_tolerance
            )));
        }
        if let Some(gate) = self.fd_gate {
            if !gate.is_finite() || gate < 0.0 {
                return Err(VerifyError::Config(format!(
                    "fd_gate must be finite and non-negative, got {}",
                    gate
                )));
            }
        }
        Ok(())
    }
}
