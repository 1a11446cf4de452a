//! Square, row-major, 64-byte aligned f32 matrices.

use std::ops::{Deref, DerefMut};

use rand::Rng;

use crate::error::{config_error, Result};
use crate::utils::AlignedVec;
use crate::MATRIX_ALIGNMENT;

/// A dense `n × n` f32 matrix stored row-major in an aligned buffer.
///
/// Derefs to the flat `&[f32]` of `n * n` elements, so kernels take it
/// wherever a slice is expected.
#[derive(Debug)]
pub struct Matrix {
    n: usize,
    data: AlignedVec<f32>,
}

impl Matrix {
    /// Allocates a zeroed `n × n` matrix.
    pub fn zeros(n: usize) -> Result<Self> {
        let len = n
            .checked_mul(n)
            .ok_or_else(|| config_error(format!("matrix dimension {n} is too large")))?;
        Ok(Matrix {
            n,
            data: AlignedVec::new_zeroed(len, MATRIX_ALIGNMENT)?,
        })
    }

    /// Allocates an `n × n` matrix holding a copy of `values` (row-major).
    pub fn from_slice(n: usize, values: &[f32]) -> Result<Self> {
        let mut m = Self::zeros(n)?;
        if values.len() != m.len() {
            return Err(config_error(format!(
                "expected {} values for a {n}x{n} matrix, got {}",
                m.len(),
                values.len()
            )));
        }
        m.copy_from_slice(values);
        Ok(m)
    }

    /// Dimension `n` of the square matrix.
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.n + col]
    }

    /// Resets every element to `0.0`.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Sets element `i` (flat, row-major) to `i as f32`.
    pub fn fill_with_index(&mut self) {
        self.data
            .iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = i as f32);
    }

    /// Fills with uniform values in `[-1, 1)`.
    pub fn fill_random<R: Rng>(&mut self, rng: &mut R) {
        self.data
            .iter_mut()
            .for_each(|x| *x = rng.random_range(-1.0..1.0));
    }
}

impl Deref for Matrix {
    type Target = [f32];
    fn deref(&self) -> &[f32] {
        &self.data
    }
}

impl DerefMut for Matrix {
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
