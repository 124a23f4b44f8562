//! Synthetic derivative datasets for exercising the checks
//!
//! Builds forward, reverse and FD result files from a known Jacobian, in the
//! same per-partition layout the solver writes.

/// Synthetic derivative datasets built from a known Jacobian
///
/// A dense random matrix `J` (rows = value space, cols = seed space) stands in
/// for the solver's residual Jacobian. The forward product is `J * u`, the
/// reverse product `J^T * v`, so the dot-product identity holds up to
/// rounding. Partitioning chunks the global vectors, which leaves both dot
/// products unchanged.
pub mod synthetic {
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tracing::info;

    use crate::error::{Result, VerifyError};
    use crate::verify::Basis;

    /// Generation options
    #[derive(Debug, Clone, Copy)]
    pub struct SyntheticOptions {
        /// RNG seed
        pub seed: u64,
        /// Uniform noise amplitude added to the FD product
        pub fd_noise: f64,
        /// Scale the written forward seed by 1.1 so the identity breaks
        pub corrupt_seed: bool,
    }

    impl Default for SyntheticOptions {
        fn default() -> Self {
            Self {
                seed: 42,
                fd_noise: 0.0,
                corrupt_seed: false,
            }
        }
    }

    impl SyntheticOptions {
        /// Reject noise amplitudes the sampler cannot use
        pub fn validate(&self) -> Result<()> {
            if !self.fd_noise.is_finite() || self.fd_noise < 0.0 {
                return Err(VerifyError::Config(format!(
                    "fd_noise must be finite and non-negative, got {}",
                    self.fd_noise
                )));
            }
            Ok(())
        }
    }

    /// The five vectors of one (whole or partial) dataset
    #[derive(Debug, Clone, PartialEq)]
    pub struct SyntheticDataset {
        /// `J * u`
        pub forward_value: Vec<f64>,
        /// `u`
        pub forward_seed: Vec<f64>,
        /// `J * u` plus FD noise
        pub fd_value: Vec<f64>,
        /// `J^T * v`
        pub reverse_value: Vec<f64>,
        /// `v`
        pub reverse_seed: Vec<f64>,
    }

    impl SyntheticDataset {
        /// Build a dataset from a random `rows x cols` Jacobian
        ///
        /// Fails with `Config` when `fd_noise` is negative or not finite.
        pub fn generate(rows: usize, cols: usize, opts: SyntheticOptions) -> Result<Self> {
            opts.validate()?;
            let mut rng = StdRng::seed_from_u64(opts.seed);
            let jac: Vec<f64> = (0..rows * cols).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let u: Vec<f64> = (0..cols).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let v: Vec<f64> = (0..rows).map(|_| rng.gen_range(-1.0..1.0)).collect();

            let ju: Vec<f64> = (0..rows)
                .map(|i| (0..cols).map(|j| jac[i * cols + j] * u[j]).sum())
                .collect();
            let jtv: Vec<f64> = (0..cols)
                .map(|j| (0..rows).map(|i| jac[i * cols + j] * v[i]).sum())
                .collect();

            let fd_value = ju
                .iter()
                .map(|x| {
                    if opts.fd_noise > 0.0 {
                        x + rng.gen_range(-opts.fd_noise..opts.fd_noise)
                    } else {
                        *x
                    }
                })
                .collect();

            let forward_seed = if opts.corrupt_seed {
                u.iter().map(|x| x * 1.1).collect()
            } else {
                u
            };

            Ok(Self {
                forward_value: ju,
                forward_seed,
                fd_value,
                reverse_value: jtv,
                reverse_seed: v,
            })
        }

        /// Split into `k` partitions by chunking every vector
        ///
        /// Chunk sizes differ by at most one. `k` must not exceed either
        /// dimension.
        pub fn partition(&self, k: usize) -> Result<Vec<SyntheticDataset>> {
            let rows = self.forward_value.len();
            let cols = self.forward_seed.len();
            if k == 0 || k > rows || k > cols {
                return Err(VerifyError::Config(format!(
                    "cannot split {}x{} dataset into {} partitions",
                    rows, cols, k
                )));
            }

            Ok((0..k)
                .map(|n| {
                    let r = chunk_range(rows, k, n);
                    let c = chunk_range(cols, k, n);
                    SyntheticDataset {
                        forward_value: self.forward_value[r.clone()].to_vec(),
                        forward_seed: self.forward_seed[c.clone()].to_vec(),
                        fd_value: self.fd_value[r.clone()].to_vec(),
                        reverse_value: self.reverse_value[c].to_vec(),
                        reverse_seed: self.reverse_seed[r].to_vec(),
                    }
                })
                .collect())
        }

        /// Write this dataset as partition `n` of `basis` under `dir`
        pub fn write<P: AsRef<Path>>(&self, basis: Basis, dir: P, n: usize) -> Result<()> {
            let files = basis.partition_files(dir, n);
            write_vector(&files.forward_value, &self.forward_value)?;
            write_vector(&files.forward_seed, &self.forward_seed)?;
            write_vector(&files.fd_value, &self.fd_value)?;
            write_vector(&files.reverse_value, &self.reverse_value)?;
            write_vector(&files.reverse_seed, &self.reverse_seed)?;
            Ok(())
        }

        /// Split into `k` partitions and write them all
        pub fn write_partitioned<P: AsRef<Path>>(
            &self,
            basis: Basis,
            dir: P,
            k: usize,
        ) -> Result<()> {
            let dir = dir.as_ref();
            for (n, part) in self.partition(k)?.iter().enumerate() {
                part.write(basis, dir, n)?;
            }
            info!("Wrote {} {} partition(s) to {:?}", k, basis, dir);
            Ok(())
        }
    }

    fn chunk_range(len: usize, k: usize, n: usize) -> std::ops::Range<usize> {
        let base = len / k;
        let extra = len % k;
        let start = n * base + n.min(extra);
        let size = base + usize::from(n < extra);
        start..start + size
    }

    /// Write one value per line
    pub fn write_vector(path: &Path, values: &[f64]) -> Result<()> {
        let io_err = |source| VerifyError::Io {
            path: PathBuf::from(path),
            source,
        };
        let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
        for v in values {
            writeln!(out, "{:e}", v).map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use approx::assert_relative_eq;

        fn dot(a: &[f64], b: &[f64]) -> f64 {
            a.iter().zip(b).map(|(x, y)| x * y).sum()
        }

        #[test]
        fn test_identity_holds() {
            let data = SyntheticDataset::generate(12, 7, SyntheticOptions::default()).unwrap();
            let dot1 = dot(&data.fd_value, &data.reverse_seed);
            let dot2 = dot(&data.reverse_value, &data.forward_seed);
            assert_relative_eq!(dot1, dot2, max_relative = 1e-12);
        }

        #[test]
        fn test_generation_is_deterministic() {
            let a = SyntheticDataset::generate(5, 4, SyntheticOptions::default()).unwrap();
            let b = SyntheticDataset::generate(5, 4, SyntheticOptions::default()).unwrap();
            assert_eq!(a, b);
        }

        #[test]
        fn test_invalid_fd_noise_rejected() {
            for fd_noise in [f64::INFINITY, f64::NAN, -1e-3] {
                let opts = SyntheticOptions {
                    fd_noise,
                    ..SyntheticOptions::default()
                };
                let err = SyntheticDataset::generate(3, 2, opts).unwrap_err();
                assert!(matches!(err, VerifyError::Config(_)));
            }
        }

        #[test]
        fn test_partition_sizes() {
            let data = SyntheticDataset::generate(10, 7, SyntheticOptions::default()).unwrap();
            let parts = data.partition(3).unwrap();
            let rows: Vec<usize> = parts.iter().map(|p| p.forward_value.len()).collect();
            let cols: Vec<usize> = parts.iter().map(|p| p.forward_seed.len()).collect();
            assert_eq!(rows, vec![4, 3, 3]);
            assert_eq!(cols, vec![3, 2, 2]);
            assert!(data.partition(8).is_err());
            assert!(data.partition(0).is_err());
        }
    }
}
