//! Error types for tilegemm operations.
//!
//! Every error is terminal for a benchmark run: the harness has no notion of
//! partial success or retry. The binary prints the error and exits non-zero.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring, loading, running or validating a benchmark.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BenchError {
    /// Memory allocation failed.
    #[error(
        "Memory allocation failed: {message} (requested {requested_size} bytes with {requested_alignment} byte alignment)"
    )]
    AllocationError {
        /// The size that was requested to be allocated.
        requested_size: usize,
        /// The alignment that was requested.
        requested_alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Invalid layout parameters were provided.
    #[error("Invalid memory layout: {message} (size: {size}, alignment: {alignment})")]
    LayoutError {
        /// The size parameter that caused the error.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Matrix dimension, thread count or another run parameter is unusable.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable error message.
        message: String,
    },
    /// Validation mode needs a fixture file and none exists at the path.
    #[error("please pregenerate the {} fixture file (try `tilegemm generate`)", path.display())]
    MissingFixture {
        /// Where the fixture was expected.
        path: PathBuf,
    },
    /// The fixture exists but could not be read or written, or has the wrong size.
    #[error("Fixture error at {}: {message}", path.display())]
    FixtureError {
        /// Path of the fixture file.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// The computed product differs from the reference beyond the tolerance.
    #[error("MISMATCH AT {index}, {computed:.6} != {expected:.6}")]
    ValidationError {
        /// Flat row-major index of the first offending element.
        index: usize,
        /// Value found in C.
        computed: f32,
        /// Value found in the reference.
        expected: f32,
    },
    /// The OS refused to start a worker thread.
    #[error("Failed to spawn worker {worker}: {message}")]
    WorkerSpawnError {
        /// Index of the worker that could not be created.
        worker: usize,
        /// Human-readable error message.
        message: String,
    },
    /// The report could not be written.
    #[error("Failed to write report: {message}")]
    OutputError {
        /// Human-readable error message.
        message: String,
    },
    /// A worker could not be pinned to its CPU.
    #[error("Failed to pin thread to cpu {cpu}: {message}")]
    AffinityError {
        /// CPU index the thread asked for.
        cpu: usize,
        /// Human-readable error message.
        message: String,
    },
}

/// Result type alias for tilegemm operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Creates an allocation error.
pub fn allocation_error(size: usize, alignment: usize, message: impl Into<String>) -> BenchError {
    BenchError::AllocationError {
        requested_size: size,
        requested_alignment: alignment,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> BenchError {
    BenchError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates a configuration error.
pub fn config_error(message: impl Into<String>) -> BenchError {
    BenchError::ConfigError {
        message: message.into(),
    }
}

/// Creates a fixture error.
pub fn fixture_error(path: impl Into<PathBuf>, message: impl Into<String>) -> BenchError {
    BenchError::FixtureError {
        path: path.into(),
        message: message.into(),
    }
}

/// Creates a validation error for the first mismatching element.
pub fn validation_error(index: usize, computed: f32, expected: f32) -> BenchError {
    BenchError::ValidationError {
        index,
        computed,
        expected,
    }
}

impl From<std::io::Error> for BenchError {
    fn from(e: std::io::Error) -> Self {
        BenchError::OutputError {
            message: e.to_string(),
        }
    }
}

impl BenchError {
    /// Process exit status for this error.
    ///
    /// The benchmark historically returned `-1` from `main`, which the OS reports as 255.
    pub fn exit_code(&self) -> u8 {
        255
    }
}
