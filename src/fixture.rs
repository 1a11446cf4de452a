//! Binary fixture files: `[A][B][expected C]`, each `N × N` little-endian f32, row-major.
//!
//! A fixture for N = 512 is exactly `3 · 512² · 4` bytes. No header, so the
//! dimension must be known by the reader.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use rand::{rngs::StdRng, SeedableRng};

use crate::error::{fixture_error, BenchError, Result};
use crate::matrix::Matrix;
use crate::reference::par_matmul_reference;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Size in bytes of a fixture for dimension `n`.
pub fn fixture_len(n: usize) -> u64 {
    3 * (n as u64) * (n as u64) * F32_BYTES as u64
}

/// An opened fixture whose length has been checked against `n`.
#[derive(Debug)]
pub struct FixtureReader {
    path: PathBuf,
    n: usize,
    reader: BufReader<File>,
}

impl FixtureReader {
    /// Opens `path` for a dimension-`n` fixture.
    ///
    /// # Errors
    ///
    /// - `MissingFixture` if nothing exists at `path`
    /// - `FixtureError` if it cannot be opened or is not exactly [`fixture_len`] bytes
    pub fn open(path: impl AsRef<Path>, n: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => BenchError::MissingFixture {
                path: path.to_path_buf(),
            },
            _ => fixture_error(path, e.to_string()),
        })?;

        let actual = file
            .metadata()
            .map_err(|e| fixture_error(path, e.to_string()))?
            .len();
        let expected = fixture_len(n);
        if actual != expected {
            return Err(fixture_error(
                path,
                format!("expected {expected} bytes for N = {n}, found {actual}"),
            ));
        }

        Ok(FixtureReader {
            path: path.to_path_buf(),
            n,
            reader: BufReader::new(file),
        })
    }

    /// Reads A, B and the expected product into the given matrices, in file order.
    pub fn read_into(mut self, a: &mut Matrix, b: &mut Matrix, expected: &mut Matrix) -> Result<()> {
        let mut bytes = vec![0u8; self.n * self.n * F32_BYTES];
        for target in [a, b, expected] {
            if target.size() != self.n {
                return Err(fixture_error(
                    &self.path,
                    format!("matrix of size {} cannot hold N = {}", target.size(), self.n),
                ));
            }
            self.reader
                .read_exact(&mut bytes)
                .map_err(|e| fixture_error(&self.path, e.to_string()))?;
            for (dst, src) in target.iter_mut().zip(bytes.chunks_exact(F32_BYTES)) {
                *dst = f32::from_le_bytes([src[0], src[1], src[2], src[3]]);
            }
        }
        Ok(())
    }
}

/// Writes `a`, `b` and `expected` to `path` in fixture order.
pub fn write_fixture(path: impl AsRef<Path>, a: &[f32], b: &[f32], expected: &[f32]) -> Result<()> {
    let path = path.as_ref();
    let io_err = |e: io::Error| fixture_error(path, e.to_string());

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    for matrix in [a, b, expected] {
        for value in matrix {
            writer.write_all(&value.to_le_bytes()).map_err(io_err)?;
        }
    }
    writer.flush().map_err(io_err)
}

/// Creates a random dimension-`n` fixture at `path` with the reference product as expected C.
pub fn generate_fixture(path: impl AsRef<Path>, n: usize, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = Matrix::zeros(n)?;
    let mut b = Matrix::zeros(n)?;
    a.fill_random(&mut rng);
    b.fill_random(&mut rng);

    let expected = par_matmul_reference(&a, &b, n);
    write_fixture(path, &a, &b, &expected)
}
