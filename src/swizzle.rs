//! Preswizzle transform for the right-hand operand.
//!
//! The kernel walks the reduction index `k` in its innermost loop and, for each
//! `k`, needs `W` adjacent columns of one row of B. In row-major B those rows
//! are `N` floats apart, so consecutive `k` steps stride through memory. The
//! swizzled copy `Bf` stores B in bands of `W` columns; inside a band the `W`
//! values of row `k` are followed by the `W` values of row `k + 1`:
//!
//! ```text
//! Bf[j * N + k * W + l] = B[k * N + j + l]     j = band start (multiple of W), 0 <= l < W
//! ```
//!
//! so the kernel's loads for one column group are unit-stride over `k`.
//! The permutation moves values only; no arithmetic touches them.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Position of `B[row, col]` inside the swizzled buffer.
///
/// # Example
///
/// ```
/// use tilegemm::swizzle::swizzled_index;
///
/// // 8x8 matrix, bands of 4 columns: B[1, 5] lives in the second band.
/// assert_eq!(swizzled_index(1, 5, 8, 4), 4 * 8 + 1 * 4 + 1);
/// ```
#[inline(always)]
pub fn swizzled_index(row: usize, col: usize, n: usize, lanes: usize) -> usize {
    let band = col - col % lanes;
    band * n + row * lanes + col % lanes
}

fn check_shape(src: &[f32], dst: &[f32], n: usize, lanes: usize) {
    assert!(lanes > 0, "lane width must be non-zero");
    assert_eq!(src.len(), n * n, "source: expected {n}x{n}={} elements", n * n);
    assert_eq!(dst.len(), n * n, "destination: expected {n}x{n}={} elements", n * n);
    assert_eq!(n % lanes, 0, "N ({n}) must be a multiple of the lane width ({lanes})");
}

/// Rebuilds `bf` from `b` in the banded layout described in the module docs.
///
/// Must be called again whenever `b` changes; the kernel reads only `bf`.
/// Each band is an independent contiguous chunk of `bf`, so bands are filled
/// in parallel.
///
/// # Panics
///
/// Panics if either slice is not `n * n` long or `n` is not a multiple of `lanes`.
pub fn preswizzle(b: &[f32], bf: &mut [f32], n: usize, lanes: usize) {
    check_shape(b, bf, n, lanes);
    if n == 0 {
        return;
    }

    bf.par_chunks_mut(n * lanes)
        .enumerate()
        .for_each(|(band_idx, band)| {
            let col = band_idx * lanes;
            for (k, group) in band.chunks_exact_mut(lanes).enumerate() {
                group.copy_from_slice(&b[k * n + col..k * n + col + lanes]);
            }
        });
}

/// Inverse of [`preswizzle`]: restores row-major `b` from `bf`.
///
/// # Panics
///
/// Same conditions as [`preswizzle`].
pub fn unswizzle(bf: &[f32], b: &mut [f32], n: usize, lanes: usize) {
    check_shape(bf, b, n, lanes);

    for col in (0..n).step_by(lanes) {
        for k in 0..n {
            let src = col * n + k * lanes;
            b[k * n + col..k * n + col + lanes].copy_from_slice(&bf[src..src + lanes]);
        }
    }
}
