//! Cooperative run/pause tokens shared between the engine and its worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Inner {
    running: AtomicBool,
    paused: AtomicBool,
    gate: Mutex<()>,
    wake: Condvar,
}

/// The *running* and *paused* flags.
///
/// `paused` is only ever true while `running` is true: [`RunSignals::stop`]
/// clears both, so a worker blocked in [`RunSignals::wait_while_paused`]
/// always gets released. Sleeps are woken early by `stop` and by resuming.
#[derive(Debug, Clone, Default)]
pub struct RunSignals {
    inner: Arc<Inner>,
}

impl RunSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.is_running() && self.inner.paused.load(Ordering::SeqCst)
    }

    pub(crate) fn arm(&self) {
        self.inner.paused.store(false, Ordering::SeqCst);
        self.inner.running.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
        self.inner.paused.store(false, Ordering::SeqCst);
        self.notify();
    }

    /// Returns false (and changes nothing) when not running.
    pub fn set_paused(&self, paused: bool) -> bool {
        if !self.is_running() {
            return false;
        }
        self.inner.paused.store(paused, Ordering::SeqCst);
        self.notify();
        true
    }

    /// Sleep for up to `duration`. Returns whether still running.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.lock();
        loop {
            if !self.is_running() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            guard = self
                .inner
                .wake
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Block while paused, re-checking at least every `poll`. Returns how long
    /// it blocked.
    pub fn wait_while_paused(&self, poll: Duration) -> Duration {
        let started = Instant::now();
        let mut guard = self.lock();
        while self.is_paused() {
            guard = self
                .inner
                .wake
                .wait_timeout(guard, poll)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        started.elapsed()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.inner.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Flags are stored before taking the gate, so a sleeper that checked them
    // under the gate cannot miss this notification.
    fn notify(&self) {
        let _guard = self.lock();
        self.inner.wake.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn idle_signals_cannot_pause() {
        let signals = RunSignals::new();
        assert!(!signals.is_running());
        assert!(!signals.set_paused(true));
        assert!(!signals.is_paused());
    }

    #[test]
    fn stop_clears_pause() {
        let signals = RunSignals::new();
        signals.arm();
        assert!(signals.set_paused(true));
        assert!(signals.is_paused());
        signals.stop();
        assert!(!signals.is_running());
        assert!(!signals.is_paused());
    }

    #[test]
    fn stop_wakes_sleeper() {
        let signals = RunSignals::new();
        signals.arm();
        let sleeper = signals.clone();
        let handle = thread::spawn(move || {
            let started = Instant::now();
            let still_running = sleeper.sleep(Duration::from_secs(30));
            (still_running, started.elapsed())
        });
        thread::sleep(Duration::from_millis(20));
        signals.stop();
        let (still_running, slept) = handle.join().unwrap();
        assert!(!still_running);
        assert!(slept < Duration::from_secs(5));
    }

    #[test]
    fn stop_releases_pause_wait() {
        let signals = RunSignals::new();
        signals.arm();
        signals.set_paused(true);
        let waiter = signals.clone();
        let handle = thread::spawn(move || waiter.wait_while_paused(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        signals.stop();
        let waited = handle.join().unwrap();
        assert!(waited < Duration::from_secs(5));
    }

    #[test]
    fn sleep_runs_full_duration_when_undisturbed() {
        let signals = RunSignals::new();
        signals.arm();
        let started = Instant::now();
        assert!(signals.sleep(Duration::from_millis(15)));
        assert!(started.elapsed() >= Duration::from_millis(15));
    }
}
