//! Straightforward triple-loop products used as the correctness baseline.
//!
//! Row-major throughout. These are only used to produce expected results
//! (tests, fixture generation), never for timing.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// `C = A × B` with the i-k-j loop order, accumulating in f32.
pub fn matmul_reference(a: &[f32], b: &[f32], n: usize) -> Vec<f32> {
    assert_eq!(a.len(), n * n, "A: expected {n}x{n}={} elements", n * n);
    assert_eq!(b.len(), n * n, "B: expected {n}x{n}={} elements", n * n);

    let mut c = vec![0.0f32; n * n];
    for i in 0..n {
        for p in 0..n {
            let a_ip = a[i * n + p];
            for j in 0..n {
                c[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
    c
}

/// Same product as [`matmul_reference`], one output row per Rayon task.
///
/// Every row is computed with the same loop order, so the result is
/// identical to the serial version.
pub fn par_matmul_reference(a: &[f32], b: &[f32], n: usize) -> Vec<f32> {
    assert_eq!(a.len(), n * n, "A: expected {n}x{n}={} elements", n * n);
    assert_eq!(b.len(), n * n, "B: expected {n}x{n}={} elements", n * n);

    let mut c = vec![0.0f32; n * n];
    if n == 0 {
        return c;
    }
    c.par_chunks_mut(n).enumerate().for_each(|(i, c_row)| {
        let a_row = &a[i * n..(i + 1) * n];
        for (p, &a_ip) in a_row.iter().enumerate() {
            let b_row = &b[p * n..(p + 1) * n];
            for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ip * b_pj;
            }
        }
    });
    c
}
