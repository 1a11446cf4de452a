//! Benchmark and validation harness.
//!
//! [`BenchContext`] owns every buffer of a run. [`run_benchmark`] drives the
//! whole sequence and writes the report lines to any `io::Write`:
//!
//! ```text
//! hello with {T} threads
//! {gflops:.6} GFLOP/S -- {ms:.2} ms      (once per iteration)
//! match                                 (validation mode only)
//! ```

use std::fmt;
use std::io::Write;
use std::time::Duration;

use crate::config::{BenchConfig, InputSource};
use crate::error::{validation_error, Result};
use crate::fixture::FixtureReader;
use crate::matrix::Matrix;
use crate::parallel::run_timed;
use crate::simd::{BACKEND, LANES};
use crate::swizzle::preswizzle;
use crate::{TILE_ROWS, TILE_VECS};

/// Floating-point operations in one `n × n` multiply.
pub fn flops(n: usize) -> f64 {
    2.0 * (n as f64).powi(3)
}

/// Throughput of one timed pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    pub elapsed: Duration,
    pub gflops: f64,
}

impl IterationReport {
    pub fn new(n: usize, elapsed: Duration) -> Self {
        // A pass below the clock resolution still reports a finite rate.
        let seconds = elapsed.as_secs_f64().max(1e-9);
        IterationReport {
            elapsed,
            gflops: flops(n) / seconds * 1e-9,
        }
    }
}

impl fmt::Display for IterationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} GFLOP/S -- {:.2} ms",
            self.gflops,
            self.elapsed.as_secs_f64() * 1e3
        )
    }
}

/// Best and mean throughput over the reported iterations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchSummary {
    pub iterations: Vec<IterationReport>,
}

impl BenchSummary {
    /// Highest GFLOP/s, `None` for an empty run.
    pub fn best(&self) -> Option<f64> {
        self.iterations.iter().map(|r| r.gflops).reduce(f64::max)
    }

    /// Arithmetic mean GFLOP/s, `None` for an empty run.
    pub fn mean(&self) -> Option<f64> {
        if self.iterations.is_empty() {
            return None;
        }
        let total: f64 = self.iterations.iter().map(|r| r.gflops).sum();
        Some(total / self.iterations.len() as f64)
    }
}

/// Compares `c` with `expected` element by element.
///
/// # Errors
///
/// `ValidationError` for the first flat index where `|c - expected| > tolerance`.
/// A NaN on either side counts as a mismatch.
pub fn check_against(c: &[f32], expected: &[f32], tolerance: f32) -> Result<()> {
    match c
        .iter()
        .zip(expected)
        .position(|(&got, &want)| !((got - want).abs() <= tolerance))
    {
        Some(index) => Err(validation_error(index, c[index], expected[index])),
        None => Ok(()),
    }
}

/// All buffers of one benchmark run plus its configuration.
#[derive(Debug)]
pub struct BenchContext {
    config: BenchConfig,
    a: Matrix,
    b: Matrix,
    bf: Matrix,
    c: Matrix,
    expected: Option<Matrix>,
}

impl BenchContext {
    /// Validates `config`, allocates the matrices, fills A and B and builds Bf.
    ///
    /// In fixture mode the file is opened and size-checked before any matrix
    /// is allocated, so a missing fixture fails without touching a buffer.
    pub fn prepare(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        let n = config.size;

        let reader = match &config.source {
            InputSource::Fixture(path) => Some(FixtureReader::open(path, n)?),
            InputSource::Synthetic => None,
        };

        let mut a = Matrix::zeros(n)?;
        let mut b = Matrix::zeros(n)?;
        let expected = match reader {
            Some(reader) => {
                let mut expected = Matrix::zeros(n)?;
                reader.read_into(&mut a, &mut b, &mut expected)?;
                Some(expected)
            }
            None => {
                a.fill_with_index();
                b.fill_with_index();
                None
            }
        };

        let mut context = BenchContext {
            a,
            b,
            bf: Matrix::zeros(n)?,
            c: Matrix::zeros(n)?,
            expected,
            config,
        };
        context.reswizzle();
        Ok(context)
    }

    /// Rebuilds Bf from B. Must follow every change to B.
    pub fn reswizzle(&mut self) {
        preswizzle(&self.b, &mut self.bf, self.config.size, LANES);
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn a(&self) -> &Matrix {
        &self.a
    }

    pub fn b(&self) -> &Matrix {
        &self.b
    }

    /// Mutable B. Call [`reswizzle`](Self::reswizzle) before the next pass.
    pub fn b_mut(&mut self) -> &mut Matrix {
        &mut self.b
    }

    pub fn c(&self) -> &Matrix {
        &self.c
    }

    pub fn expected(&self) -> Option<&Matrix> {
        self.expected.as_ref()
    }

    /// Replaces the reference product, e.g. to validate a hand-modified run.
    pub fn set_expected(&mut self, expected: Option<Matrix>) {
        self.expected = expected;
    }

    /// Zeroes C and runs one timed multiply.
    pub fn run_iteration(&mut self) -> Result<IterationReport> {
        let BenchConfig {
            size, threads, pin, ..
        } = self.config;
        self.c.clear();
        let elapsed = run_timed(&self.a, &self.bf, &mut self.c, size, threads, pin)?;
        Ok(IterationReport::new(size, elapsed))
    }

    /// Runs the warm-up passes, then every reported iteration, printing one line each.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<BenchSummary> {
        for pass in 0..self.config.warmup {
            let report = self.run_iteration()?;
            log::debug!("warm-up pass {pass}: {report}");
        }

        let mut summary = BenchSummary {
            iterations: Vec::with_capacity(self.config.iterations),
        };
        for _ in 0..self.config.iterations {
            let report = self.run_iteration()?;
            writeln!(out, "{report}")?;
            summary.iterations.push(report);
        }

        if let (Some(best), Some(mean)) = (summary.best(), summary.mean()) {
            log::info!("best {best:.6} GFLOP/S, mean {mean:.6} GFLOP/S");
        }
        Ok(summary)
    }

    /// Checks C against the reference and prints `match` on success.
    ///
    /// Without a reference (synthetic mode) this does nothing and prints nothing.
    pub fn validate<W: Write>(&self, out: &mut W) -> Result<()> {
        let Some(expected) = &self.expected else {
            return Ok(());
        };
        check_against(&self.c, expected, self.config.tolerance)?;
        writeln!(out, "match")?;
        Ok(())
    }
}

/// Full run: greeting, preparation, iterations, validation.
pub fn run_benchmark<W: Write>(config: BenchConfig, out: &mut W) -> Result<BenchSummary> {
    writeln!(out, "hello with {} threads", config.threads)?;
    log::info!(
        "backend {BACKEND}: {LANES} lanes, {TILE_ROWS}x{} tiles, N = {}",
        TILE_VECS * LANES,
        config.size
    );

    let mut context = BenchContext::prepare(config)?;
    let summary = context.run(out)?;
    context.validate(out)?;
    Ok(summary)
}
