//! Text vector loading for derivative result files
//!
//! Each file is opened, read to the end and closed before any of its values
//! are used. A parse failure part-way through drops the reader on return.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, VerifyError};

/// Ordered values, one per degree of freedom, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSeries {
    /// File the values were read from
    source: PathBuf,
    /// Values in line order
    values: Vec<f64>,
}

impl ScalarSeries {
    /// Wrap values that did not come from a file (tests, synthetic data)
    pub fn from_values<P: AsRef<Path>>(source: P, values: Vec<f64>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            values,
        }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in file order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// File the values came from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Fail with `LengthMismatch` unless `other` has the same length
    pub fn ensure_same_len(&self, other: &ScalarSeries, context: &str) -> Result<()> {
        if self.len() != other.len() {
            return Err(VerifyError::LengthMismatch {
                what: format!(
                    "{} ({} vs {})",
                    context,
                    self.source.display(),
                    other.source.display()
                ),
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    /// Inner product with a series of the same length
    pub fn dot(&self, other: &ScalarSeries) -> Result<f64> {
        self.ensure_same_len(other, "dot product")?;
        Ok(self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum())
    }
}

/// Load a one-value-per-line file
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<ScalarSeries> {
    read_values(path.as_ref(), |line| Some(line.trim()))
}

/// Load the `column`-th whitespace-delimited field (0-based) of every row
pub fn load_column<P: AsRef<Path>>(path: P, column: usize) -> Result<ScalarSeries> {
    read_values(path.as_ref(), |line| line.split_whitespace().nth(column))
}

fn read_values<F>(path: &Path, mut field: F) -> Result<ScalarSeries>
where
    F: FnMut(&str) -> Option<&str>,
{
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let reader = BufReader::new(file);

    let mut values = Vec::new();
    // blank lines are only tolerated at the end of the file
    let mut first_blank: Option<usize> = None;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| VerifyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            first_blank.get_or_insert(idx + 1);
            continue;
        }
        if let Some(blank) = first_blank {
            return Err(VerifyError::MalformedInput {
                path: path.to_path_buf(),
                line: blank,
                content: "blank line".to_string(),
            });
        }

        let token = field(&line).ok_or_else(|| VerifyError::MalformedInput {
            path: path.to_path_buf(),
            line: idx + 1,
            content: format!("missing column in {:?}", line),
        })?;
        values.push(parse_value(path, idx + 1, token)?);
    }

    debug!("Loaded {} values from {:?}", values.len(), path);
    Ok(ScalarSeries {
        source: path.to_path_buf(),
        values,
    })
}

fn parse_value(path: &Path, line: usize, token: &str) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(VerifyError::MalformedInput {
            path: path.to_path_buf(),
            line,
            content: token.to_string(),
        }),
    }
}

fn open_error(path: &Path, e: std::io::Error) -> VerifyError {
    if e.kind() == ErrorKind::NotFound {
        VerifyError::MissingFile {
            path: path.to_path_buf(),
        }
    } else {
        VerifyError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    }
}
