//! Best-effort CPU pinning for worker threads.
//!
//! Pinning never aborts a run: callers log the error and carry on unpinned.

use crate::error::{BenchError, Result};

/// Restricts the calling thread to CPU `cpu`.
///
/// # Errors
///
/// Returns `AffinityError` if the CPU index is out of range for the
/// platform's CPU set, the kernel rejects the mask (e.g. the CPU is offline
/// or outside the process's cpuset), or the platform has no affinity API.
#[cfg(target_os = "linux")]
pub fn pin_current_thread(cpu: usize) -> Result<()> {
    use libc::{cpu_set_t, sched_setaffinity, CPU_SET, CPU_SETSIZE, CPU_ZERO};

    if cpu >= CPU_SETSIZE as usize {
        return Err(BenchError::AffinityError {
            cpu,
            message: format!("cpu index exceeds CPU_SETSIZE ({CPU_SETSIZE})"),
        });
    }

    // SAFETY: cpu_set_t is plain data; zeroed is the empty set. pid 0 is the calling thread.
    let rc = unsafe {
        let mut cpuset: cpu_set_t = std::mem::zeroed();
        CPU_ZERO(&mut cpuset);
        CPU_SET(cpu, &mut cpuset);
        sched_setaffinity(0, std::mem::size_of::<cpu_set_t>(), &cpuset)
    };

    if rc == 0 {
        Ok(())
    } else {
        Err(BenchError::AffinityError {
            cpu,
            message: std::io::Error::last_os_error().to_string(),
        })
    }
}

#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(cpu: usize) -> Result<()> {
    Err(BenchError::AffinityError {
        cpu,
        message: "thread affinity is not supported on this platform".to_string(),
    })
}
