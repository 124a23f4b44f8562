//! Tangent/adjoint consistency verification
//!
//! - Basis selection and per-partition file naming
//! - Partitioned dataset assembly
//! - Dot-product consistency check
//! - FD/AD deviation diagnostics

mod assembler;
mod basis;
mod dot_product;
mod fd_diff;

pub use assembler::{
    assemble, assemble_with_progress, AssembledDataset, DotAccumulator, PartitionBundle,
    PartitionSummary,
};
pub use basis::{Basis, PartitionFiles};
pub use dot_product::{relative_error, DotProductCheck, DotProductResult, Verdict};
pub use fd_diff::{fd_ad_diff, DiffReport};

use tracing::{info, warn};

use crate::config::VerifyConfig;
use crate::error::Result;

/// Everything one `check` run produces
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// Basis that was checked
    pub basis: Basis,
    /// Per-partition dimensions and FD/AD deviation
    pub partitions: Vec<PartitionSummary>,
    /// Dot-product comparison
    pub dot_product: DotProductResult,
    /// Whole-domain FD/AD deviation
    pub fd_diff: DiffReport,
    /// FD/AD gate in effect, if any
    pub fd_gate: Option<f64>,
}

impl VerificationReport {
    /// Whether the FD/AD deviation exceeds the configured gate
    pub fn fd_gate_exceeded(&self) -> bool {
        self.fd_gate
            .map_or(false, |gate| self.fd_diff.max_abs_diff > gate)
    }

    /// Final verdict: the dot-product verdict, overridden by the FD gate
    pub fn verdict(&self) -> Verdict {
        if self.dot_product.verdict.passed() && !self.fd_gate_exceeded() {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

/// Runs the dot-product test over a partitioned dataset
pub struct Verifier {
    config: VerifyConfig,
    check: DotProductCheck,
}

impl Verifier {
    /// Create a verifier from validated settings
    pub fn new(config: VerifyConfig) -> Result<Self> {
        config.validate()?;
        let check = DotProductCheck::new(config.rel_tolerance)?;
        Ok(Self { config, check })
    }

    /// Settings in use
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Verify partitions `0..num_partitions` of `basis`
    pub fn run(&self, basis: Basis, num_partitions: usize) -> Result<VerificationReport> {
        self.run_with_progress(basis, num_partitions, |_| {})
    }

    /// Same as [`Verifier::run`], reporting each finished partition
    pub fn run_with_progress<F>(
        &self,
        basis: Basis,
        num_partitions: usize,
        on_partition: F,
    ) -> Result<VerificationReport>
    where
        F: FnMut(&PartitionSummary),
    {
        info!(
            "Checking {} basis ({}) over {} partition(s) in {:?}",
            basis,
            basis.prefix(),
            num_partitions,
            self.config.data_dir
        );
        let dataset =
            assemble_with_progress(basis, &self.config.data_dir, num_partitions, on_partition)?;
        self.evaluate(dataset)
    }

    /// Check an already assembled dataset
    pub fn evaluate(&self, dataset: AssembledDataset) -> Result<VerificationReport> {
        let fd_diff = dataset.fd_diff()?;
        let dot_product = self.check.check(&dataset.dots)?;

        let report = VerificationReport {
            basis: dataset.basis,
            partitions: dataset.partitions,
            dot_product,
            fd_diff,
            fd_gate: self.config.fd_gate,
        };
        if report.fd_gate_exceeded() {
            warn!(
                "FD/AD max deviation {:e} exceeds gate {:e}",
                report.fd_diff.max_abs_diff,
                self.config.fd_gate.unwrap_or_default()
            );
        }
        Ok(report)
    }
}
