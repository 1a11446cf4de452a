//! # tilegemm
//!
//! A micro-benchmark for dense square single-precision matrix multiplication
//! `C = A × B` on one CPU socket.
//!
//! The pipeline is:
//!
//! 1. [`swizzle::preswizzle`] rearranges B once so that every vector load in
//!    the inner loop is contiguous;
//! 2. [`kernel::matmul_rows`] computes `TILE_ROWS × (TILE_VECS · LANES)` tiles
//!    of C with register accumulators and fused multiply-add;
//! 3. [`parallel::run_timed`] splits C into contiguous row bands, one per
//!    worker, releases all workers at once and times only the multiply;
//! 4. [`bench`] repeats the timed multiply, prints GFLOP/s per iteration and
//!    validates the final C against a reference product.
//!
//! The vector width is chosen at build time (see `build.rs`): AVX2+FMA
//! (8 lanes), NEON (4 lanes) or a portable scalar fallback (4 lanes).

pub mod bench;
pub mod config;
pub mod error;
pub mod fixture;
pub mod kernel;
pub mod matrix;
pub mod parallel;
pub mod reference;
pub mod simd;
pub mod swizzle;
pub mod utils;

pub use error::{BenchError, Result};
pub use matrix::Matrix;

/// Rows of C computed together by one kernel tile.
pub const TILE_ROWS: usize = 4;
/// Vector registers per row of a kernel tile.
pub const TILE_VECS: usize = 2;

/// Byte alignment of every matrix buffer (one cache line).
pub const MATRIX_ALIGNMENT: usize = 64;

pub const DEFAULT_SIZE: usize = 512;
pub const DEFAULT_THREADS: usize = 1;
pub const DEFAULT_ITERATIONS: usize = 10;
pub const DEFAULT_TOLERANCE: f32 = 1e-3;
pub const DEFAULT_FIXTURE_PATH: &str = "/tmp/matmul";
