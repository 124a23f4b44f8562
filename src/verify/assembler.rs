//! Partitioned dataset assembly
//!
//! Loads the five result files of every partition, checks their dimensions
//! and folds them into the two running dot products. The first failing
//! partition aborts the whole assembly.

use std::path::Path;

use tracing::{debug, info};

use super::basis::{Basis, PartitionFiles};
use super::fd_diff::{fd_ad_diff, DiffReport};
use crate::error::{Result, VerifyError};
use crate::io::{load_series, ScalarSeries};

/// The five series written for one partition
#[derive(Debug, Clone)]
pub struct PartitionBundle {
    /// Partition index
    pub index: usize,
    /// Forward-mode product (primal space)
    pub forward_value: ScalarSeries,
    /// Forward-mode seed (seed space)
    pub forward_seed: ScalarSeries,
    /// Finite-difference product (primal space)
    pub fd_value: ScalarSeries,
    /// Reverse-mode product (seed space)
    pub reverse_value: ScalarSeries,
    /// Reverse-mode seed (primal space)
    pub reverse_seed: ScalarSeries,
}

impl PartitionBundle {
    /// Load and validate the bundle of partition `index`
    pub fn load(files: &PartitionFiles, index: usize) -> Result<Self> {
        for path in files.all() {
            debug!("  partition {} reads {:?}", index, path);
        }
        let bundle = Self {
            index,
            forward_value: load_series(&files.forward_value)?,
            forward_seed: load_series(&files.forward_seed)?,
            fd_value: load_series(&files.fd_value)?,
            reverse_value: load_series(&files.reverse_value)?,
            reverse_seed: load_series(&files.reverse_seed)?,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Check the two dimension invariants
    ///
    /// `forward_value`, `fd_value` and `reverse_seed` share the primal
    /// dimension; `forward_seed` and `reverse_value` share the seed dimension.
    pub fn validate(&self) -> Result<()> {
        let context = format!("partition {}", self.index);
        self.forward_value.ensure_same_len(&self.fd_value, &context)?;
        self.forward_value
            .ensure_same_len(&self.reverse_seed, &context)?;
        self.forward_seed
            .ensure_same_len(&self.reverse_value, &context)?;
        Ok(())
    }

    /// Dimension of the value space
    pub fn primal_dim(&self) -> usize {
        self.forward_value.len()
    }

    /// Dimension of the seed space
    pub fn seed_dim(&self) -> usize {
        self.forward_seed.len()
    }

    /// `fd_value . reverse_seed`
    pub fn dot1(&self) -> Result<f64> {
        self.fd_value.dot(&self.reverse_seed)
    }

    /// `reverse_value . forward_seed`
    pub fn dot2(&self) -> Result<f64> {
        self.reverse_value.dot(&self.forward_seed)
    }
}

/// Running pair of dot products summed over partitions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DotAccumulator {
    /// Sum of `fd_value . reverse_seed`
    pub dot1: f64,
    /// Sum of `reverse_value . forward_seed`
    pub dot2: f64,
    /// Partitions folded in so far
    pub partitions: usize,
}

impl DotAccumulator {
    /// Empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one partition's contribution in
    pub fn add(&mut self, bundle: &PartitionBundle) -> Result<()> {
        let d1 = bundle.dot1()?;
        let d2 = bundle.dot2()?;
        self.dot1 += d1;
        self.dot2 += d2;
        self.partitions += 1;
        Ok(())
    }
}

/// Per-partition summary kept for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSummary {
    /// Partition index
    pub index: usize,
    /// Dimension of the value space
    pub primal_dim: usize,
    /// Dimension of the seed space
    pub seed_dim: usize,
    /// This partition's FD/AD deviation
    pub fd_diff: DiffReport,
}

/// Whole-domain view of a partitioned dataset
#[derive(Debug, Clone)]
pub struct AssembledDataset {
    /// Basis the files were read for
    pub basis: Basis,
    /// Accumulated dot products
    pub dots: DotAccumulator,
    /// Forward-mode values of all partitions, concatenated in partition order
    pub forward_values: Vec<f64>,
    /// FD values of all partitions, concatenated in partition order
    pub fd_values: Vec<f64>,
    /// One entry per partition
    pub partitions: Vec<PartitionSummary>,
}

impl AssembledDataset {
    /// FD/AD deviation over the whole domain
    pub fn fd_diff(&self) -> Result<DiffReport> {
        fd_ad_diff(&self.forward_values, &self.fd_values)
    }
}

/// Load partitions `0..num_partitions` of `basis` from `dir`
pub fn assemble<P: AsRef<Path>>(
    basis: Basis,
    dir: P,
    num_partitions: usize,
) -> Result<AssembledDataset> {
    assemble_with_progress(basis, dir, num_partitions, |_| {})
}

/// Same as [`assemble`], calling `on_partition` after each partition is folded in
pub fn assemble_with_progress<P, F>(
    basis: Basis,
    dir: P,
    num_partitions: usize,
    mut on_partition: F,
) -> Result<AssembledDataset>
where
    P: AsRef<Path>,
    F: FnMut(&PartitionSummary),
{
    if num_partitions == 0 {
        return Err(VerifyError::Config(
            "partition count must be at least 1".to_string(),
        ));
    }

    let dir = dir.as_ref();
    let mut dataset = AssembledDataset {
        basis,
        dots: DotAccumulator::new(),
        forward_values: Vec::new(),
        fd_values: Vec::new(),
        partitions: Vec::with_capacity(num_partitions),
    };

    for n in 0..num_partitions {
        info!("Processing partition {}", n);
        let files = basis.partition_files(dir, n);
        let bundle = PartitionBundle::load(&files, n)?;
        let summary = fold_partition(&mut dataset, &bundle)?;
        on_partition(&summary);
        dataset.partitions.push(summary);
    }

    debug!(
        "Assembled {} partitions: dot1={:e}, dot2={:e}",
        dataset.dots.partitions, dataset.dots.dot1, dataset.dots.dot2
    );
    Ok(dataset)
}

fn fold_partition(
    dataset: &mut AssembledDataset,
    bundle: &PartitionBundle,
) -> Result<PartitionSummary> {
    let fd_diff = fd_ad_diff(bundle.forward_value.values(), bundle.fd_value.values())?;
    info!(
        "  partition {}: max diff {:e}, diff norm {:e}",
        bundle.index, fd_diff.max_abs_diff, fd_diff.norm_of_diff
    );

    dataset.dots.add(bundle)?;
    dataset
        .forward_values
        .extend_from_slice(bundle.forward_value.values());
    dataset.fd_values.extend_from_slice(bundle.fd_value.values());

    Ok(PartitionSummary {
        index: bundle.index,
        primal_dim: bundle.primal_dim(),
        seed_dim: bundle.seed_dim(),
        fd_diff,
    })
}
