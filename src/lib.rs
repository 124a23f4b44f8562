//! # adverify - AD derivative product verification
//!
//! Checks derivative products written by a solver running in forward-mode
//! (tangent), reverse-mode (adjoint) and finite-difference configurations.
//!
//! ## Features
//!
//! - Dot-product test of tangent/adjoint duality over any number of
//!   domain-decomposed partitions
//! - Forward-mode vs finite-difference deviation diagnostics
//! - Column-wise comparison of two result tables
//! - Synthetic datasets with a known Jacobian for exercising the checks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use adverify::{Basis, Verifier, VerifyConfig};
//!
//! let verifier = Verifier::new(VerifyConfig::default())?;
//! let report = verifier.run(Basis::State, 4)?;
//! println!("{}", report.dot_product.summary());
//! ```

#![warn(missing_docs)]

pub mod compare;
pub mod config;
pub mod error;
pub mod io;
pub mod utils;
pub mod verify;

// Re-exports for convenience
pub use compare::{ColumnComparator, ColumnDiffReport};
pub use config::VerifyConfig;
pub use error::{Result, VerifyError};
pub use io::ScalarSeries;
pub use verify::{Basis, DiffReport, VerificationReport, Verdict, Verifier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default relative tolerance of the dot-product test
pub const DEFAULT_REL_TOLERANCE: f64 = 1e-4;
