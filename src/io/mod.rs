//! Result file loading
//!
//! Plain-text vectors written by the solver:
//! - one value per line (derivative products and seeds)
//! - whitespace-delimited rows with a designated column (ad-hoc result tables)

mod loader;

pub use loader::{load_column, load_series, ScalarSeries};
