use std::panic;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{BenchError, Result};
use crate::kernel::matmul_rows;
use crate::parallel::affinity::pin_current_thread;
use crate::parallel::partition::row_ranges;
use crate::parallel::pistol::StartingPistol;

/// Computes `C = A × B` once and returns the time of the multiply itself.
///
/// With `threads == 1` the kernel runs on the calling thread and only that
/// call is timed. Otherwise `threads` scoped workers are spawned, each owning
/// the row band `[(n/threads)·i, (n/threads)·(i+1))` of `c`, optionally pinned
/// to CPU `i`. The clock starts once every worker has arrived at the
/// [`StartingPistol`] and stops when the last one finishes, so thread
/// creation and joining are outside the measurement.
///
/// `c` is fully overwritten.
///
/// # Errors
///
/// `WorkerSpawnError` if the OS refuses to create a worker. Workers already
/// started are released and joined before returning. Pinning failures are
/// logged and the worker runs unpinned.
///
/// # Panics
///
/// Panics on shapes the kernel rejects (see [`matmul_rows`]) or if `threads`
/// does not divide `n`; both are ruled out by a validated
/// [`BenchConfig`](crate::config::BenchConfig). A panicking worker is
/// re-raised on the calling thread.
pub fn run_timed(
    a: &[f32],
    bf: &[f32],
    c: &mut [f32],
    n: usize,
    threads: usize,
    pin: bool,
) -> Result<Duration> {
    if threads == 1 {
        let start = Instant::now();
        matmul_rows(a, bf, c, n, 0..n);
        return Ok(start.elapsed());
    }

    let ranges = row_ranges(n, threads);
    let band_len = (n / threads) * n;
    let pistol = StartingPistol::new(threads);

    thread::scope(|s| {
        let mut handles = Vec::with_capacity(threads);

        for (worker, (rows, c_band)) in ranges.into_iter().zip(c.chunks_mut(band_len)).enumerate()
        {
            let pistol = &pistol;
            let spawned = thread::Builder::new()
                .name(format!("gemm-worker-{worker}"))
                .spawn_scoped(s, move || {
                    if pin {
                        if let Err(e) = pin_current_thread(worker) {
                            log::warn!("{e}; worker {worker} continues unpinned");
                        }
                    }
                    log::debug!("worker {worker} owns rows {rows:?}");

                    pistol.arrive();
                    let _done = pistol.finish_guard();
                    matmul_rows(a, bf, c_band, n, rows);
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Let the workers already parked at the gate run to completion.
                    pistol.fire();
                    return Err(BenchError::WorkerSpawnError {
                        worker,
                        message: e.to_string(),
                    });
                }
            }
        }

        pistol.wait_ready();
        let start = Instant::now();
        pistol.fire();
        pistol.wait_done();
        let elapsed = start.elapsed();

        for handle in handles {
            if let Err(payload) = handle.join() {
                panic::resume_unwind(payload);
            }
        }

        Ok(elapsed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::LANES;
    use crate::swizzle::preswizzle;

    fn swizzled(n: usize) -> (Vec<f32>, Vec<f32>) {
        let a: Vec<f32> = (0..n * n).map(|i| ((i * 7) % 23) as f32 / 23.0).collect();
        let b: Vec<f32> = (0..n * n).map(|i| ((i * 5) % 19) as f32 / 19.0).collect();
        let mut bf = vec![0.0; n * n];
        preswizzle(&b, &mut bf, n, LANES);
        (a, bf)
    }

    #[test]
    fn test_threads_do_not_change_the_result() {
        let n = 128;
        let (a, bf) = swizzled(n);

        let mut single = vec![0.0; n * n];
        run_timed(&a, &bf, &mut single, n, 1, false).unwrap();

        for threads in [2, 4, 8] {
            let mut multi = vec![f32::NAN; n * n];
            run_timed(&a, &bf, &mut multi, n, threads, false).unwrap();
            assert_eq!(single, multi, "threads = {threads}");
        }
    }

    #[test]
    fn test_pinning_failure_is_not_fatal() {
        // More workers than most CI machines have CPUs, with pinning on.
        let n = 256;
        let (a, bf) = swizzled(n);
        let mut c = vec![0.0; n * n];
        let elapsed = run_timed(&a, &bf, &mut c, n, 64, true).unwrap();
        assert!(elapsed > Duration::ZERO);
    }
}
