//! Error taxonomy for verification runs
//!
//! Every variant is fatal to the run that raised it. Nothing is retried: the
//! inputs are files left behind by an already finished solver run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, assembling or checking derivative data.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// An expected result file is absent.
    #[error("Result file not found: {}", path.display())]
    MissingFile {
        /// Path that was looked up
        path: PathBuf,
    },

    /// A line could not be read as a number.
    #[error("Malformed input in {} at line {line}: {content:?}", path.display())]
    MalformedInput {
        /// File containing the bad line
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Offending text (or a description of what was missing)
        content: String,
    },

    /// Two series that are paired position-by-position have different lengths.
    #[error("Length mismatch in {what}: expected {expected} values, got {actual}")]
    LengthMismatch {
        /// Which pairing failed, including partition and file names
        what: String,
        /// Length of the reference series
        expected: usize,
        /// Length of the series that disagreed
        actual: usize,
    },

    /// The reference dot product is zero, so the relative error is undefined.
    #[error("Reference dot product is {dot1}; relative error is undefined")]
    DegenerateTolerance {
        /// The reference dot product that was divided by
        dot1: f64,
    },

    /// Any other I/O failure while reading a file.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, VerifyError>;
