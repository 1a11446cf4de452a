//! Thread pool results against the single-thread path and the reference.

use rand::{rngs::StdRng, SeedableRng};
use tilegemm::kernel::matmul;
use tilegemm::parallel::run_timed;
use tilegemm::reference::matmul_reference;
use tilegemm::simd::LANES;
use tilegemm::swizzle::preswizzle;
use tilegemm::Matrix;

fn random_inputs(n: usize, seed: u64) -> (Matrix, Matrix, Matrix) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = Matrix::zeros(n).unwrap();
    let mut b = Matrix::zeros(n).unwrap();
    a.fill_random(&mut rng);
    b.fill_random(&mut rng);
    let mut bf = Matrix::zeros(n).unwrap();
    preswizzle(&b, &mut bf, n, LANES);
    (a, b, bf)
}

#[test]
fn test_single_and_multi_thread_are_identical() {
    let n = 256;
    let (a, _, bf) = random_inputs(n, 42);

    let mut single = Matrix::zeros(n).unwrap();
    run_timed(&a, &bf, &mut single, n, 1, true).unwrap();

    for threads in [2, 4, 8, 16] {
        let mut multi = Matrix::zeros(n).unwrap();
        multi.fill(f32::NAN);
        run_timed(&a, &bf, &mut multi, n, threads, true).unwrap();
        assert!(
            single
                .iter()
                .zip(multi.iter())
                .all(|(x, y)| x.to_bits() == y.to_bits()),
            "threads = {threads}"
        );
    }
}

#[test]
fn test_kernel_matches_reference_on_random_input() {
    let n = 192;
    let (a, b, bf) = random_inputs(n, 7);

    let mut c = Matrix::zeros(n).unwrap();
    matmul(&a, &bf, &mut c, n);
    let expected = matmul_reference(&a, &b, n);

    for (i, (got, want)) in c.iter().zip(&expected).enumerate() {
        assert!((got - want).abs() <= 1e-3, "index {i}: {got} vs {want}");
    }
}

#[test]
fn test_repeated_passes_overwrite_c() {
    let n = 64;
    let (a, _, bf) = random_inputs(n, 3);

    let mut first = Matrix::zeros(n).unwrap();
    run_timed(&a, &bf, &mut first, n, 2, false).unwrap();
    let mut again = Matrix::from_slice(n, &first).unwrap();
    run_timed(&a, &bf, &mut again, n, 2, false).unwrap();
    assert_eq!(&first[..], &again[..]);
}
