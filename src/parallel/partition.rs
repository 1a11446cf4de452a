use std::ops::Range;

/// Splits rows `0..n` into `threads` equal, contiguous, disjoint ranges.
///
/// Worker `i` gets `[(n / threads) * i, (n / threads) * (i + 1))`.
///
/// # Panics
///
/// Panics if `threads` is zero or does not divide `n`.
pub fn row_ranges(n: usize, threads: usize) -> Vec<Range<usize>> {
    assert!(threads > 0, "thread count must be non-zero");
    assert_eq!(n % threads, 0, "N ({n}) must be divisible by the thread count ({threads})");

    let rows = n / threads;
    (0..threads).map(|i| rows * i..rows * (i + 1)).collect()
}
