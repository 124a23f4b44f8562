//! Column-wise comparison of two result tables
//!
//! Reads one designated column from each file and reports where and by how
//! much they differ.

mod comparator;

pub use comparator::{compare_files, compare_series, ColumnComparator, ColumnDiffReport};
