//! Generic two-file column comparator

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, VerifyError};
use crate::io::{load_column, ScalarSeries};

/// Elementwise `|val1 - val2|` statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDiffReport {
    /// Largest absolute difference
    pub max_abs_diff: f64,
    /// Index of the largest difference (the last one on ties)
    pub max_index: usize,
    /// First file's value at `max_index`
    pub value_at_max1: f64,
    /// Second file's value at `max_index`
    pub value_at_max2: f64,
    /// Mean absolute difference
    pub mean_abs_diff: f64,
    /// Number of compared rows
    pub len: usize,
}

impl ColumnDiffReport {
    /// Summary string
    pub fn summary(&self) -> String {
        format!(
            "max diff {:e} at index {} ({:e} vs {:e}), mean diff {:e} over {} values",
            self.max_abs_diff,
            self.max_index,
            self.value_at_max1,
            self.value_at_max2,
            self.mean_abs_diff,
            self.len
        )
    }
}

/// Compares a fixed column of two whitespace-delimited files
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnComparator {
    column: usize,
}

impl ColumnComparator {
    /// Compare the given 0-based column
    pub fn new(column: usize) -> Self {
        Self { column }
    }

    /// Column being compared
    pub fn column(&self) -> usize {
        self.column
    }

    /// Load the column from both files and compare
    pub fn compare<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        file1: P,
        file2: Q,
    ) -> Result<ColumnDiffReport> {
        let val1 = load_column(file1.as_ref(), self.column)?;
        let val2 = load_column(file2.as_ref(), self.column)?;
        info!(
            "Comparing column {} of {:?} and {:?}",
            self.column,
            val1.source(),
            val2.source()
        );
        compare_series(&val1, &val2)
    }
}

/// Shorthand for `ColumnComparator::new(column).compare(file1, file2)`
pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(
    file1: P,
    file2: Q,
    column: usize,
) -> Result<ColumnDiffReport> {
    ColumnComparator::new(column).compare(file1, file2)
}

/// Compare two loaded series
///
/// Different lengths are an error rather than a silent truncation.
pub fn compare_series(val1: &ScalarSeries, val2: &ScalarSeries) -> Result<ColumnDiffReport> {
    val1.ensure_same_len(val2, "column comparison")?;
    if val1.is_empty() {
        return Err(VerifyError::MalformedInput {
            path: val1.source().to_path_buf(),
            line: 0,
            content: "no values to compare".to_string(),
        });
    }

    let a = val1.values();
    let b = val2.values();
    let mut max_index = 0;
    let mut max_abs_diff = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        if diff >= max_abs_diff {
            max_abs_diff = diff;
            max_index = i;
        }
        sum += diff;
    }

    let report = ColumnDiffReport {
        max_abs_diff,
        max_index,
        value_at_max1: a[max_index],
        value_at_max2: b[max_index],
        mean_abs_diff: sum / a.len() as f64,
        len: a.len(),
    };
    debug!("{}", report.summary());
    Ok(report)
}
