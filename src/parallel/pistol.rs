//! A one-shot "starting pistol" for a fixed group of workers.
//!
//! Protocol for one timed pass with `parties` workers:
//!
//! 1. every worker calls [`StartingPistol::arrive`], which records it as
//!    ready and blocks until the pistol fires;
//! 2. the controller calls [`StartingPistol::wait_ready`], starts its clock,
//!    then [`StartingPistol::fire`];
//! 3. every worker does its work and calls [`StartingPistol::finish`]
//!    (or drops the [`FinishGuard`] returned by [`StartingPistol::finish_guard`]);
//! 4. the controller calls [`StartingPistol::wait_done`] and stops its clock.
//!
//! All waits block on one condition variable; nobody spins.

use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct PistolState {
    ready: usize,
    done: usize,
    fired: bool,
}

/// Rendezvous that releases a fixed number of workers simultaneously and
/// reports when all of them have finished.
#[derive(Debug)]
pub struct StartingPistol {
    parties: usize,
    state: Mutex<PistolState>,
    changed: Condvar,
}

impl StartingPistol {
    /// A pistol for `parties` workers. Not reusable once fired.
    pub fn new(parties: usize) -> Self {
        StartingPistol {
            parties,
            state: Mutex::new(PistolState::default()),
            changed: Condvar::new(),
        }
    }

    /// Number of workers the pistol waits for.
    pub fn parties(&self) -> usize {
        self.parties
    }

    fn lock(&self) -> MutexGuard<'_, PistolState> {
        // Only counters live behind the lock; a panicking holder cannot leave them torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn wait_while<F>(&self, mut condition: F) -> MutexGuard<'_, PistolState>
    where
        F: FnMut(&mut PistolState) -> bool,
    {
        self.changed
            .wait_while(self.lock(), |state| condition(state))
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Worker side: mark this worker ready, then block until [`fire`](Self::fire).
    pub fn arrive(&self) {
        {
            let mut state = self.lock();
            state.ready += 1;
        }
        self.changed.notify_all();
        drop(self.wait_while(|state| !state.fired));
    }

    /// Worker side: mark this worker finished.
    pub fn finish(&self) {
        {
            let mut state = self.lock();
            state.done += 1;
        }
        self.changed.notify_all();
    }

    /// Worker side: a guard that calls [`finish`](Self::finish) when dropped,
    /// including during unwinding, so a panicking worker cannot stall the controller.
    pub fn finish_guard(&self) -> FinishGuard<'_> {
        FinishGuard { pistol: self }
    }

    /// Controller side: block until all `parties` workers have arrived.
    pub fn wait_ready(&self) {
        let parties = self.parties;
        drop(self.wait_while(|state| state.ready < parties));
    }

    /// Controller side: release every worker blocked in [`arrive`](Self::arrive).
    ///
    /// Workers that arrive after the pistol fired pass straight through.
    pub fn fire(&self) {
        {
            let mut state = self.lock();
            state.fired = true;
        }
        self.changed.notify_all();
    }

    /// Controller side: block until all `parties` workers have finished.
    pub fn wait_done(&self) {
        let parties = self.parties;
        drop(self.wait_while(|state| state.done < parties));
    }

    /// Workers that have arrived so far.
    pub fn ready_count(&self) -> usize {
        self.lock().ready
    }

    /// Workers that have finished so far.
    pub fn done_count(&self) -> usize {
        self.lock().done
    }

    /// Whether [`fire`](Self::fire) has been called.
    pub fn has_fired(&self) -> bool {
        self.lock().fired
    }
}

/// Calls [`StartingPistol::finish`] on drop.
#[must_use = "the worker is reported finished as soon as the guard is dropped"]
pub struct FinishGuard<'a> {
    pistol: &'a StartingPistol,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.pistol.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_no_worker_starts_before_fire() {
        let parties = 4;
        let pistol = StartingPistol::new(parties);
        let started = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..parties {
                s.spawn(|| {
                    pistol.arrive();
                    started.fetch_add(1, Ordering::SeqCst);
                    pistol.finish();
                });
            }

            pistol.wait_ready();
            assert_eq!(pistol.ready_count(), parties);
            // Everyone is parked at the gate.
            thread::sleep(Duration::from_millis(20));
            assert_eq!(started.load(Ordering::SeqCst), 0);
            assert!(!pistol.has_fired());

            pistol.fire();
            pistol.wait_done();
            assert_eq!(started.load(Ordering::SeqCst), parties);
            assert_eq!(pistol.done_count(), parties);
        });
    }

    #[test]
    fn test_late_arrival_after_fire_passes_through() {
        let pistol = StartingPistol::new(1);
        pistol.fire();
        pistol.arrive();
        pistol.finish();
        pistol.wait_ready();
        pistol.wait_done();
        assert_eq!(pistol.done_count(), 1);
    }

    #[test]
    fn test_guard_reports_finish_on_panic() {
        let pistol = StartingPistol::new(2);
        thread::scope(|s| {
            let ok = s.spawn(|| {
                pistol.arrive();
                let _done = pistol.finish_guard();
            });
            let bad = s.spawn(|| {
                pistol.arrive();
                let _done = pistol.finish_guard();
                panic!("worker failure");
            });

            pistol.wait_ready();
            pistol.fire();
            pistol.wait_done();

            assert!(ok.join().is_ok());
            assert!(bad.join().is_err());
        });
        assert_eq!(pistol.done_count(), 2);
    }
}
