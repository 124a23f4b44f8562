//! adverify CLI - dot-product and column-diff checks on AD result files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use adverify::utils::synthetic::{SyntheticDataset, SyntheticOptions};
use adverify::{Basis, ColumnComparator, Verdict, Verifier, VerifyConfig, VERSION};

/// adverify - verify tangent/adjoint AD derivative products
#[derive(Parser, Debug)]
#[command(name = "adverify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dot-product test of forward vs reverse mode over all partitions
    Check {
        /// Number of partitions
        partitions: usize,

        /// Jacobian to check
        #[arg(value_enum)]
        basis: Basis,

        /// Directory holding the result files
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Relative tolerance on the dot products
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Fail when the FD/AD max deviation exceeds this value
        #[arg(long)]
        fd_gate: Option<f64>,
    },

    /// Compare one column of two result files
    Compare {
        /// First file
        file1: PathBuf,

        /// Second file
        file2: PathBuf,

        /// Column to read (0-based)
        #[arg(long)]
        column: Option<usize>,

        /// Exit with status 1 when the max diff exceeds this value
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Write a synthetic partitioned dataset with a known Jacobian
    Synth {
        /// Number of partitions
        partitions: usize,

        /// Basis whose file names to use
        #[arg(value_enum)]
        basis: Basis,

        /// Global value-space dimension
        #[arg(long, default_value = "120")]
        rows: usize,

        /// Global seed-space dimension
        #[arg(long, default_value = "80")]
        cols: usize,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Uniform noise amplitude added to the FD product
        #[arg(long, default_value = "0.0")]
        fd_noise: f64,

        /// Corrupt the forward seed so the dot-product test fails
        #[arg(long)]
        corrupt: bool,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }
}

fn create_progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

fn load_config(path: Option<&PathBuf>) -> Result<VerifyConfig> {
    match path {
        Some(path) => VerifyConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path)),
        None => Ok(VerifyConfig::default()),
    }
}

fn print_banner(verdict: Verdict, detail: &str) {
    println!("\n**********************************************");
    match verdict {
        Verdict::Pass => println!("Test Passed!"),
        Verdict::Fail => println!("Test Failed!!!!!! {}", detail),
    }
    println!("**********************************************");
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Check {
            partitions,
            basis,
            dir,
            tolerance,
            fd_gate,
        } => {
            if let Some(dir) = dir {
                config.data_dir = dir;
            }
            if let Some(tolerance) = tolerance {
                config.rel_tolerance = tolerance;
            }
            if fd_gate.is_some() {
                config.fd_gate = fd_gate;
            }

            let verifier = Verifier::new(config).context("Invalid settings")?;
            let pb = create_progress_bar(partitions)?;
            let report = verifier
                .run_with_progress(basis, partitions, |summary| {
                    pb.set_message(format!("partition {}", summary.index));
                    pb.inc(1);
                })
                .with_context(|| format!("Dot-product test of {} basis aborted", basis))?;
            pb.finish_and_clear();

            for part in &report.partitions {
                println!(
                    "Partition {}: dims {}x{}, max diff {:e}, diff norm {:e}",
                    part.index,
                    part.primal_dim,
                    part.seed_dim,
                    part.fd_diff.max_abs_diff,
                    part.fd_diff.norm_of_diff
                );
            }
            println!("Dot-product 1: {:e}", report.dot_product.dot1);
            println!("Dot-product 2: {:e}", report.dot_product.dot2);
            println!("Relative error: {:e}", report.dot_product.rel_error);
            println!("Max diff in {}*Psi: {:e}", basis.prefix(), report.fd_diff.max_abs_diff);
            println!("Diff norm in {}*Psi: {:e}", basis.prefix(), report.fd_diff.norm_of_diff);

            let verdict = report.verdict();
            let detail = if report.fd_gate_exceeded() {
                format!(
                    "FD/AD max diff > {:e}",
                    report.fd_gate.unwrap_or_default()
                )
            } else {
                format!("Relative error > {}", report.dot_product.tolerance)
            };
            print_banner(verdict, &detail);

            Ok(match verdict {
                Verdict::Pass => ExitCode::SUCCESS,
                Verdict::Fail => ExitCode::from(1),
            })
        }

        Commands::Compare {
            file1,
            file2,
            column,
            threshold,
        } => {
            let comparator = ColumnComparator::new(column.unwrap_or(config.column));
            let report = comparator
                .compare(&file1, &file2)
                .with_context(|| format!("Failed to compare {:?} and {:?}", file1, file2))?;

            println!(
                "Max diff: {:e} at index {} ({:e} vs {:e})",
                report.max_abs_diff, report.max_index, report.value_at_max1, report.value_at_max2
            );
            println!("Mean diff: {:e}", report.mean_abs_diff);

            match threshold {
                Some(t) if report.max_abs_diff > t => {
                    print_banner(Verdict::Fail, &format!("Max diff > {:e}", t));
                    Ok(ExitCode::from(1))
                }
                _ => Ok(ExitCode::SUCCESS),
            }
        }

        Commands::Synth {
            partitions,
            basis,
            rows,
            cols,
            dir,
            seed,
            fd_noise,
            corrupt,
        } => {
            let opts = SyntheticOptions {
                seed,
                fd_noise,
                corrupt_seed: corrupt,
            };
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {:?}", dir))?;
            SyntheticDataset::generate(rows, cols, opts)
                .context("Invalid synthetic dataset options")?
                .write_partitioned(basis, &dir, partitions)
                .context("Failed to write synthetic dataset")?;
            println!("Wrote {} partition(s) of {} basis to {:?}", partitions, basis, dir);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    info!("adverify v{}", VERSION);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
