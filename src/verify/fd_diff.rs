//! Forward-mode AD vs finite-difference deviation
//!
//! Diagnostic only: a large deviation usually means the FD step is coarse
//! relative to the solver's nonlinearity, not that the AD product is wrong.

use crate::error::{Result, VerifyError};

/// Deviation statistics of `forward - fd`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiffReport {
    /// `max |forward_i - fd_i|`
    pub max_abs_diff: f64,
    /// `||forward - fd||_2`
    pub norm_of_diff: f64,
}

/// Compare forward-mode values against the FD reference element by element
pub fn fd_ad_diff(forward: &[f64], fd: &[f64]) -> Result<DiffReport> {
    if forward.len() != fd.len() {
        return Err(VerifyError::LengthMismatch {
            what: "forward-mode vs finite-difference values".to_string(),
            expected: forward.len(),
            actual: fd.len(),
        });
    }

    let (max_abs_diff, sum_sq) = forward
        .iter()
        .zip(fd.iter())
        .map(|(a, b)| a - b)
        .fold((0.0f64, 0.0f64), |(max, sq), d| (max.max(d.abs()), sq + d * d));

    Ok(DiffReport {
        max_abs_diff,
        norm_of_diff: sum_sq.sqrt(),
    })
}
