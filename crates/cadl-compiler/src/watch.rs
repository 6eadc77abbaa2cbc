//! Recompile loop for watch mode.
//!
//! File watching itself belongs to the caller. Each change notification goes
//! to a [`WatchDriver`], which runs the compile closure unless a run is already
//! in flight. Notifications that arrive mid-run coalesce into one rerun, and
//! the result of a run that had a rerun queued behind it is dropped.
//!
//! ```text
//!            notify                 complete
//!   Idle ───────────▶ Compiling ───────────────▶ Idle        (deliver)
//!                       │   ▲
//!               notify  │   │ complete (rerun, discard)
//!                       ▼   │
//!                    PendingRerun ◀── notify (coalesced)
//! ```
//!
//! A compile closure that panics puts the loop back to `Idle`; changes that
//! were queued behind the panicking run are dropped with it.

use std::sync::{Mutex, MutexGuard};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Compiling,
    /// Compiling, with at least one change seen since the run started.
    PendingRerun,
}

/// What to do with the result of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Nothing changed during the run: hand the result to the caller.
    Deliver,
    /// Sources changed during the run: drop the result and compile again.
    Rerun,
}

/// The coalescing state machine, free of any threading.
#[derive(Debug, Default)]
pub struct RecompileLoop {
    state: LoopState,
    runs_started: u64,
    results_discarded: u64,
}

impl RecompileLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    pub fn results_discarded(&self) -> u64 {
        self.results_discarded
    }

    /// Record a change. Returns true when the caller should start a run now.
    pub fn notify(&mut self) -> bool {
        match self.state {
            LoopState::Idle => {
                self.state = LoopState::Compiling;
                self.runs_started += 1;
                true
            }
            LoopState::Compiling | LoopState::PendingRerun => {
                self.state = LoopState::PendingRerun;
                false
            }
        }
    }

    /// Record the end of a run.
    ///
    /// On [`Completion::Rerun`] the loop stays in `Compiling` and the caller
    /// must start the next run immediately.
    pub fn complete(&mut self) -> Completion {
        match self.state {
            LoopState::PendingRerun => {
                self.state = LoopState::Compiling;
                self.runs_started += 1;
                self.results_discarded += 1;
                Completion::Rerun
            }
            LoopState::Compiling | LoopState::Idle => {
                self.state = LoopState::Idle;
                Completion::Deliver
            }
        }
    }

    /// Record a run that ended without a result.
    pub fn abort(&mut self) {
        self.state = LoopState::Idle;
    }
}

/// Puts the loop back to `Idle` if the compile closure unwinds.
struct RunGuard<'d> {
    state: &'d Mutex<RecompileLoop>,
}

impl RunGuard<'_> {
    fn complete(&self) -> Completion {
        lock(self.state).complete()
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::warn!("compilation panicked; watch loop reset to idle");
            lock(self.state).abort();
        }
    }
}

fn lock(state: &Mutex<RecompileLoop>) -> MutexGuard<'_, RecompileLoop> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Thread-safe front end of [`RecompileLoop`] around a compile closure.
pub struct WatchDriver<F> {
    compile: F,
    state: Mutex<RecompileLoop>,
}

impl<F> WatchDriver<F> {
    pub fn new(compile: F) -> Self {
        Self {
            compile,
            state: Mutex::new(RecompileLoop::new()),
        }
    }

    /// Handle one change notification.
    ///
    /// Returns the result of the run this call drove, or `None` when a run was
    /// already in flight; that run picks the change up.
    pub fn notify<T>(&self) -> Option<T>
    where
        F: Fn() -> T,
    {
        if !self.lock().notify() {
            tracing::debug!("change coalesced into the pending rerun");
            return None;
        }

        let guard = RunGuard { state: &self.state };
        loop {
            let result = (self.compile)();
            match guard.complete() {
                Completion::Deliver => return Some(result),
                Completion::Rerun => {
                    tracing::debug!("sources changed during compilation; recompiling");
                }
            }
        }
    }

    pub fn state(&self) -> LoopState {
        self.lock().state()
    }

    pub fn runs_started(&self) -> u64 {
        self.lock().runs_started()
    }

    fn lock(&self) -> MutexGuard<'_, RecompileLoop> {
        lock(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, mpsc};
    use std::thread;

    #[test]
    fn idle_notify_starts_a_run() {
        let mut lp = RecompileLoop::new();
        assert!(lp.notify());
        assert_eq!(lp.state(), LoopState::Compiling);
        assert_eq!(lp.complete(), Completion::Deliver);
        assert_eq!(lp.state(), LoopState::Idle);
    }

    #[test]
    fn notifications_during_a_run_coalesce() {
        let mut lp = RecompileLoop::new();
        assert!(lp.notify());
        assert!(!lp.notify());
        assert!(!lp.notify());
        assert!(!lp.notify());
        assert_eq!(lp.state(), LoopState::PendingRerun);

        assert_eq!(lp.complete(), Completion::Rerun);
        assert_eq!(lp.state(), LoopState::Compiling);
        assert_eq!(lp.complete(), Completion::Deliver);

        assert_eq!(lp.runs_started(), 2);
        assert_eq!(lp.results_discarded(), 1);
    }

    #[test]
    fn panicking_run_leaves_the_driver_idle() {
        let runs = AtomicU32::new(0);
        let driver = WatchDriver::new(|| {
            if runs.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("compiler bug");
            }
            "ok"
        });

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| driver.notify()));
        assert!(outcome.is_err());
        assert_eq!(driver.state(), LoopState::Idle);

        assert_eq!(driver.notify(), Some("ok"));
        assert_eq!(driver.runs_started(), 2);
    }

    #[test]
    fn driver_delivers_when_idle() {
        let driver = WatchDriver::new(|| 7);
        assert_eq!(driver.notify(), Some(7));
        assert_eq!(driver.state(), LoopState::Idle);
    }

    #[test]
    fn driver_discards_superseded_results() {
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let runs = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&runs);
        let driver = Arc::new(WatchDriver::new(move || {
            let run = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if run == 1 {
                started_tx.send(()).expect("signal start");
                release_rx.lock().expect("lock").recv().expect("release");
            }
            run
        }));

        let background = {
            let driver = Arc::clone(&driver);
            thread::spawn(move || driver.notify())
        };

        started_rx.recv().expect("first run started");
        assert_eq!(driver.notify(), None);
        assert_eq!(driver.notify(), None);
        assert_eq!(driver.state(), LoopState::PendingRerun);
        release_tx.send(()).expect("release first run");

        let delivered = background.join().expect("driver thread");
        assert_eq!(delivered, Some(2));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(driver.runs_started(), 2);
    }
}
