//! Run configuration: command-line arguments and their validated form.
//!
//! Dimension and thread count are fixed for the whole run. Anything the
//! kernel or the partitioner cannot handle is rejected here with a
//! `ConfigError` instead of reaching the multiply.

use std::path::PathBuf;

use clap::Args;

use crate::error::{config_error, Result};
use crate::simd::LANES;
use crate::{
    DEFAULT_FIXTURE_PATH, DEFAULT_ITERATIONS, DEFAULT_SIZE, DEFAULT_THREADS, DEFAULT_TOLERANCE,
    TILE_ROWS, TILE_VECS,
};

/// Where A and B (and the expected C) come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// A[i] = B[i] = i, no reference to validate against.
    Synthetic,
    /// Fixture file holding [A][B][expected C]; the run is validated.
    Fixture(PathBuf),
}

/// Fully resolved benchmark parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Matrix dimension N.
    pub size: usize,
    /// Worker count T. `1` runs the kernel on the calling thread.
    pub threads: usize,
    /// Reported, timed passes.
    pub iterations: usize,
    /// Unreported passes run before the reported ones.
    pub warmup: usize,
    pub source: InputSource,
    /// Largest accepted |C - expected| per element.
    pub tolerance: f32,
    /// Pin worker `i` to CPU `i`.
    pub pin: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            size: DEFAULT_SIZE,
            threads: DEFAULT_THREADS,
            iterations: DEFAULT_ITERATIONS,
            warmup: 0,
            source: InputSource::Fixture(PathBuf::from(DEFAULT_FIXTURE_PATH)),
            tolerance: DEFAULT_TOLERANCE,
            pin: true,
        }
    }
}

impl BenchConfig {
    /// Columns covered by one kernel tile.
    pub fn tile_width() -> usize {
        TILE_VECS * LANES
    }

    /// Whether the run ends with a comparison against a reference.
    pub fn validates(&self) -> bool {
        matches!(self.source, InputSource::Fixture(_))
    }

    /// Checks every divisibility and range precondition of the kernel and partitioner.
    pub fn validate(&self) -> Result<()> {
        let n = self.size;
        let t = self.threads;

        if n == 0 {
            return Err(config_error("matrix dimension must be positive"));
        }
        if t == 0 {
            return Err(config_error("thread count must be positive"));
        }
        if self.iterations == 0 {
            return Err(config_error("at least one iteration is required"));
        }
        if n % Self::tile_width() != 0 {
            return Err(config_error(format!(
                "matrix dimension {n} must be a multiple of the tile width {} ({TILE_VECS} x {LANES} lanes)",
                Self::tile_width()
            )));
        }
        if n % TILE_ROWS != 0 {
            return Err(config_error(format!(
                "matrix dimension {n} must be a multiple of the tile height {TILE_ROWS}"
            )));
        }
        if n % t != 0 {
            return Err(config_error(format!(
                "matrix dimension {n} must be divisible by the thread count {t}"
            )));
        }
        if (n / t) % TILE_ROWS != 0 {
            return Err(config_error(format!(
                "rows per thread ({}) must be a multiple of the tile height {TILE_ROWS}",
                n / t
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(config_error(format!(
                "tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Arguments of `tilegemm run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Matrix dimension N
    #[arg(short = 'n', long, default_value_t = DEFAULT_SIZE)]
    pub size: usize,

    /// Number of worker threads (1 = no pool)
    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// Timed, reported iterations
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Untimed iterations run before the reported ones
    #[arg(long, default_value_t = 0)]
    pub warmup: usize,

    /// Fill A[i] = B[i] = i instead of loading the fixture (skips validation)
    #[arg(long)]
    pub synthetic: bool,

    /// Fixture file with [A][B][expected C] as little-endian f32
    #[arg(short, long, default_value = DEFAULT_FIXTURE_PATH)]
    pub fixture: PathBuf,

    /// Maximum absolute error per element during validation
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f32,

    /// Do not pin workers to CPUs
    #[arg(long)]
    pub no_pin: bool,
}

impl From<RunArgs> for BenchConfig {
    fn from(args: RunArgs) -> Self {
        BenchConfig {
            size: args.size,
            threads: args.threads,
            iterations: args.iterations,
            warmup: args.warmup,
            source: if args.synthetic {
                InputSource::Synthetic
            } else {
                InputSource::Fixture(args.fixture)
            },
            tolerance: args.tolerance,
            pin: !args.no_pin,
        }
    }
}

/// Arguments of `tilegemm generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Matrix dimension N
    #[arg(short = 'n', long, default_value_t = DEFAULT_SIZE)]
    pub size: usize,

    /// Output path
    #[arg(short, long, default_value = DEFAULT_FIXTURE_PATH)]
    pub fixture: PathBuf,

    /// Seed for the random A and B
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;

    fn with(size: usize, threads: usize) -> BenchConfig {
        BenchConfig {
            size,
            threads,
            ..BenchConfig::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = BenchConfig::default();
        assert_eq!(config.size, 512);
        assert_eq!(config.threads, 1);
        assert_eq!(config.iterations, 10);
        assert!(config.validates());
        config.validate().unwrap();
    }

    #[test]
    fn test_power_of_two_thread_counts() {
        for threads in [1, 2, 4, 8, 16, 32] {
            with(512, threads).validate().unwrap();
        }
    }

    #[test]
    fn test_rejects_non_divisible_dimension() {
        let err = with(BenchConfig::tile_width() * 4 + 4, 1).validate().unwrap_err();
        assert!(matches!(err, BenchError::ConfigError { ref message } if message.contains("tile width")));
    }

    #[test]
    fn test_rejects_thread_count_that_does_not_divide() {
        let err = with(512, 3).validate().unwrap_err();
        assert!(matches!(err, BenchError::ConfigError { ref message } if message.contains("thread count")));
    }

    #[test]
    fn test_rejects_bands_thinner_than_a_tile() {
        // 512 / 256 = 2 rows per worker, less than one tile.
        let err = with(512, 256).validate().unwrap_err();
        assert!(matches!(err, BenchError::ConfigError { ref message } if message.contains("rows per thread")));
    }

    #[test]
    fn test_rejects_zeroes_and_bad_tolerance() {
        assert!(with(0, 1).validate().is_err());
        assert!(with(512, 0).validate().is_err());
        let config = BenchConfig {
            iterations: 0,
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());
        let config = BenchConfig {
            tolerance: f32::NAN,
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
