//! Tangent/adjoint dot-product consistency check
//!
//! `dot1 = fd_value . reverse_seed` and `dot2 = reverse_value . forward_seed`
//! both evaluate the bilinear form `seed_r^T J seed_f`, one through the
//! forward/FD product and one through the reverse product. They must agree
//! to within the relative tolerance.

use std::fmt;

use tracing::debug;

use super::assembler::DotAccumulator;
use crate::error::{Result, VerifyError};
use crate::DEFAULT_REL_TOLERANCE;

/// Outcome of a verification run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Identity holds within tolerance
    Pass,
    /// Tolerance exceeded
    Fail,
}

impl Verdict {
    /// Whether this is a pass
    pub fn passed(self) -> bool {
        self == Verdict::Pass
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Result of comparing the two dot products
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotProductResult {
    /// Reference side, `fd_value . reverse_seed`
    pub dot1: f64,
    /// Adjoint side, `reverse_value . forward_seed`
    pub dot2: f64,
    /// `|dot1 - dot2| / |dot1|`
    pub rel_error: f64,
    /// Tolerance the error was held against
    pub tolerance: f64,
    /// Pass if `rel_error <= tolerance`
    pub verdict: Verdict,
}

impl DotProductResult {
    /// Summary string
    pub fn summary(&self) -> String {
        format!(
            "[{}] dot1={:.10e}, dot2={:.10e}, rel_err={:.3e} (tol {:.1e})",
            self.verdict, self.dot1, self.dot2, self.rel_error, self.tolerance
        )
    }
}

/// Relative error of `dot2` against the reference `dot1`
///
/// Computed as `|dot1 - dot2| / |dot1|`. The denominator takes the magnitude
/// of `dot1` so a negative reference product cannot yield a negative error
/// that always passes. Fails with `DegenerateTolerance` when `dot1` is zero.
pub fn relative_error(dot1: f64, dot2: f64) -> Result<f64> {
    if dot1 == 0.0 {
        return Err(VerifyError::DegenerateTolerance { dot1 });
    }
    Ok((dot1 - dot2).abs() / dot1.abs())
}

/// Dot-product checker with a fixed relative tolerance
#[derive(Debug, Clone, Copy)]
pub struct DotProductCheck {
    tolerance: f64,
}

impl Default for DotProductCheck {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_REL_TOLERANCE,
        }
    }
}

impl DotProductCheck {
    /// Create a checker; the tolerance must be finite and positive
    pub fn new(tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(VerifyError::Config(format!(
                "relative tolerance must be finite and positive, got {}",
                tolerance
            )));
        }
        Ok(Self { tolerance })
    }

    /// Tolerance in use
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Check accumulated dot products
    pub fn check(&self, dots: &DotAccumulator) -> Result<DotProductResult> {
        self.check_values(dots.dot1, dots.dot2)
    }

    /// Check a raw pair of dot products
    pub fn check_values(&self, dot1: f64, dot2: f64) -> Result<DotProductResult> {
        let rel_error = relative_error(dot1, dot2)?;
        let verdict = if rel_error <= self.tolerance {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        debug!("dot-product rel_err={:e} -> {}", rel_error, verdict);

        Ok(DotProductResult {
            dot1,
            dot2,
            rel_error,
            tolerance: self.tolerance,
            verdict,
        })
    }
}
