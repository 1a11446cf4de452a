//! Register-tiled multiply kernel.
//!
//! Computes `C[rows, :] = A[rows, :] × B` reading the right operand from the
//! preswizzled copy `Bf` (see [`crate::swizzle`]). C is covered by tiles of
//! `TILE_ROWS` rows by `TILE_VECS × W` columns. For one tile the kernel keeps
//! `TILE_ROWS × TILE_VECS` accumulator vectors in registers for the whole
//! reduction:
//!
//! ```text
//! for k in 0..N:
//!     for iy in 0..TILE_ROWS:
//!         ta = splat(A[y + iy, k])
//!         for ix in 0..TILE_VECS:
//!             acc[iy][ix] += ta * load(Bf[(x + ix*W)*N + k*W ..])
//! store acc -> C[y.., x..]
//! ```
//!
//! Each accumulator lane sums its products in ascending `k`, so the result of
//! a tile never depends on which row range or thread computed it.

use std::ops::Range;

use crate::simd::{SimdVec, LANES};
use crate::{TILE_ROWS, TILE_VECS};

/// Multiplies rows `rows` of `a` by B (given swizzled as `bf`) into `c_rows`.
///
/// `c_rows` holds only the output rows `rows`, i.e. `rows.len() * n` values,
/// so disjoint row bands of C can be handed to different threads.
///
/// # Panics
///
/// Panics if the slice lengths do not match `n`, if `rows` runs past `n`, if
/// `rows.len()` is not a multiple of [`TILE_ROWS`], or if `n` is not a
/// multiple of [`TILE_VECS`]` × `[`LANES`].
pub fn matmul_rows(a: &[f32], bf: &[f32], c_rows: &mut [f32], n: usize, rows: Range<usize>) {
    check_shape(a, bf, c_rows, n, &rows, LANES);

    #[cfg(avx2)]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            // SAFETY: shape checked above, features confirmed at runtime.
            unsafe { tile_rows_avx2(a, bf, c_rows, n, rows) };
        } else {
            // Same band width as the AVX2 layout, computed lane by lane.
            // SAFETY: shape checked above.
            unsafe { tile_rows::<crate::simd::scalar::Scalar<LANES>>(a, bf, c_rows, n, rows) };
        }
    }

    #[cfg(not(avx2))]
    {
        // SAFETY: shape checked above; NEON is baseline on aarch64 and Scalar needs no features.
        unsafe { tile_rows::<crate::simd::Lane>(a, bf, c_rows, n, rows) };
    }
}

/// Full product `C = A × B` on the calling thread.
pub fn matmul(a: &[f32], bf: &[f32], c: &mut [f32], n: usize) {
    matmul_rows(a, bf, c, n, 0..n);
}

/// Runs the tiled loop with an explicit vector type `V`.
///
/// `bf` must have been swizzled with band width `V::LANES`. Used to compare
/// backends against each other; regular callers want [`matmul_rows`].
///
/// # Panics
///
/// Same conditions as [`matmul_rows`] with `V::LANES` as the lane width.
pub fn matmul_rows_with<V: SimdVec>(
    a: &[f32],
    bf: &[f32],
    c_rows: &mut [f32],
    n: usize,
    rows: Range<usize>,
) {
    check_shape(a, bf, c_rows, n, &rows, V::LANES);
    // SAFETY: shape checked. Callers only name vector types their CPU supports.
    unsafe { tile_rows::<V>(a, bf, c_rows, n, rows) };
}

fn check_shape(a: &[f32], bf: &[f32], c_rows: &[f32], n: usize, rows: &Range<usize>, lanes: usize) {
    assert_eq!(a.len(), n * n, "A: expected {n}x{n}={} elements", n * n);
    assert_eq!(bf.len(), n * n, "Bf: expected {n}x{n}={} elements", n * n);
    assert!(
        rows.start <= rows.end && rows.end <= n,
        "row range {rows:?} outside 0..{n}"
    );
    assert_eq!(
        c_rows.len(),
        rows.len() * n,
        "C rows: expected {}x{n}={} elements",
        rows.len(),
        rows.len() * n
    );
    assert_eq!(
        rows.len() % TILE_ROWS,
        0,
        "row range length {} must be a multiple of {TILE_ROWS}",
        rows.len()
    );
    assert_eq!(
        n % (TILE_VECS * lanes),
        0,
        "N ({n}) must be a multiple of the tile width {}",
        TILE_VECS * lanes
    );
}

#[cfg(avx2)]
#[target_feature(enable = "avx2,fma")]
unsafe fn tile_rows_avx2(a: &[f32], bf: &[f32], c_rows: &mut [f32], n: usize, rows: Range<usize>) {
    tile_rows::<crate::simd::avx2::f32x8::F32x8>(a, bf, c_rows, n, rows)
}

/// # Safety
///
/// Shapes must satisfy [`check_shape`] for `V::LANES`, and the CPU must support `V`.
#[inline(always)]
#[allow(clippy::needless_range_loop)]
unsafe fn tile_rows<V: SimdVec>(
    a: &[f32],
    bf: &[f32],
    c_rows: &mut [f32],
    n: usize,
    rows: Range<usize>,
) {
    let w = V::LANES;
    let a_ptr = a.as_ptr();
    let bf_ptr = bf.as_ptr();
    let c_ptr = c_rows.as_mut_ptr();

    for y in rows.clone().step_by(TILE_ROWS) {
        for x in (0..n).step_by(w * TILE_VECS) {
            let mut acc = [[V::zero(); TILE_VECS]; TILE_ROWS];

            for k in 0..n {
                for iy in 0..TILE_ROWS {
                    let ta = V::splat(*a_ptr.add((y + iy) * n + k));
                    for ix in 0..TILE_VECS {
                        let tb = V::load(bf_ptr.add((x + ix * w) * n + k * w));
                        acc[iy][ix] = acc[iy][ix].fmadd(ta, tb);
                    }
                }
            }

            // c_rows starts at row rows.start
            let local_y = y - rows.start;
            for iy in 0..TILE_ROWS {
                for ix in 0..TILE_VECS {
                    acc[iy][ix].store_at(c_ptr.add((local_y + iy) * n + x + ix * w));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::matmul_reference;
    use crate::simd::scalar::Scalar;
    use crate::swizzle::preswizzle;

    fn inputs(n: usize) -> (Vec<f32>, Vec<f32>) {
        let a = (0..n * n).map(|i| ((i % 17) as f32 - 8.0) / 8.0).collect();
        let b = (0..n * n).map(|i| ((i % 13) as f32 - 6.0) / 6.0).collect();
        (a, b)
    }

    #[test]
    fn test_matches_reference() {
        let n = 64;
        let (a, b) = inputs(n);
        let mut bf = vec![0.0; n * n];
        preswizzle(&b, &mut bf, n, LANES);

        let mut c = vec![0.0; n * n];
        matmul(&a, &bf, &mut c, n);
        let expected = matmul_reference(&a, &b, n);

        for i in 0..n * n {
            assert!(
                (c[i] - expected[i]).abs() < 1e-3,
                "Mismatch at {}: kernel={}, reference={}",
                i,
                c[i],
                expected[i]
            );
        }
    }

    #[test]
    fn test_row_band_only_touches_its_rows() {
        let n = 32;
        let (a, b) = inputs(n);
        let mut bf = vec![0.0; n * n];
        preswizzle(&b, &mut bf, n, LANES);

        let mut full = vec![0.0; n * n];
        matmul(&a, &bf, &mut full, n);

        let rows = 8..16;
        let mut band = vec![f32::NAN; rows.len() * n];
        matmul_rows(&a, &bf, &mut band, n, rows.clone());
        assert_eq!(&band[..], &full[rows.start * n..rows.end * n]);
    }

    #[test]
    fn test_scalar_lanes_agree_with_active_backend() {
        let n = 32;
        let (a, b) = inputs(n);
        let mut bf = vec![0.0; n * n];
        preswizzle(&b, &mut bf, n, LANES);

        let mut native = vec![0.0; n * n];
        matmul(&a, &bf, &mut native, n);

        let mut scalar = vec![0.0; n * n];
        matmul_rows_with::<Scalar<LANES>>(&a, &bf, &mut scalar, n, 0..n);

        assert_eq!(native, scalar);
    }

    #[test]
    fn test_identity_returns_b() {
        let n = 16;
        let mut a = vec![0.0; n * n];
        for i in 0..n {
            a[i * n + i] = 1.0;
        }
        let b: Vec<f32> = (0..n * n).map(|i| i as f32).collect();
        let mut bf = vec![0.0; n * n];
        preswizzle(&b, &mut bf, n, 4);

        let mut c = vec![0.0; n * n];
        matmul_rows_with::<Scalar<4>>(&a, &bf, &mut c, n, 0..n);
        assert_eq!(c, b);
    }

    #[test]
    #[should_panic(expected = "multiple of 4")]
    fn test_rejects_partial_tile_rows() {
        let n = 16;
        let a = vec![0.0; n * n];
        let bf = vec![0.0; n * n];
        let mut c = vec![0.0; 2 * n];
        matmul_rows_with::<Scalar<4>>(&a, &bf, &mut c, n, 0..2);
    }
}
