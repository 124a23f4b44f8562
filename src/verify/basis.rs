//! Derivative bases and the per-partition file naming scheme

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::VerifyError;

/// Which residual Jacobian a dataset exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Basis {
    /// Residual with respect to the state variables (`dRdW`)
    State,
    /// Residual with respect to the mesh point coordinates (`dRdXv`)
    Point,
}

impl Basis {
    /// File-name prefix the solver uses for this Jacobian
    pub fn prefix(self) -> &'static str {
        match self {
            Basis::State => "dRdW",
            Basis::Point => "dRdXv",
        }
    }

    /// File set of partition `n`, resolved under `dir`
    pub fn partition_files<P: AsRef<Path>>(self, dir: P, n: usize) -> PartitionFiles {
        let dir = dir.as_ref();
        let prefix = self.prefix();
        let file = |product: &str, kind: &str| {
            dir.join(format!("{}{}_{}_{}.txt", prefix, product, n, kind))
        };

        PartitionFiles {
            forward_value: file("Psi", "AD_Values"),
            forward_seed: file("Psi", "AD_Seeds"),
            fd_value: file("Psi", "FD_Values"),
            reverse_value: file("TPsi", "AD_Values"),
            reverse_seed: file("TPsi", "AD_Seeds"),
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::State => write!(f, "state"),
            Basis::Point => write!(f, "point"),
        }
    }
}

impl FromStr for Basis {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "state" => Ok(Basis::State),
            "point" => Ok(Basis::Point),
            other => Err(VerifyError::Config(format!(
                "unknown basis {:?} (expected \"state\" or \"point\")",
                other
            ))),
        }
    }
}

/// Paths of the five result files written for one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionFiles {
    /// Forward-mode product `J * seed`
    pub forward_value: PathBuf,
    /// Forward-mode seed
    pub forward_seed: PathBuf,
    /// Finite-difference product
    pub fd_value: PathBuf,
    /// Reverse-mode product `J^T * seed`
    pub reverse_value: PathBuf,
    /// Reverse-mode seed
    pub reverse_seed: PathBuf,
}

impl PartitionFiles {
    /// All five paths, in loading order
    pub fn all(&self) -> [&Path; 5] {
        [
            &self.forward_value,
            &self.forward_seed,
            &self.fd_value,
            &self.reverse_value,
            &self.reverse_seed,
        ]
    }
}
