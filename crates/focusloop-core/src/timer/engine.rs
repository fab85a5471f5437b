//! Timer engine: owns the run signals and at most one worker thread.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^        |          |
//!   +------ stop -------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let (tx, rx) = std::sync::mpsc::channel();
//! let mut engine = TimerEngine::new(tx.clone(), Arc::new(SoundAlert::new(dir, tx)));
//! engine.start(&config)?;
//! // Drain `rx` on the UI thread.
//! engine.stop();
//! ```

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

use super::signals::RunSignals;
use super::timescale::Timescale;
use super::worker::Worker;
use crate::alert::Alert;
use crate::error::{Result, TimerError};
use crate::events::Event;
use crate::storage::Config;

/// How long `stop()` waits for the worker to exit.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// There was no worker to stop.
    Idle,
    /// The worker exited within the timeout.
    Joined,
    /// The worker is still winding down; `start()` stays rejected until it
    /// has exited.
    TimedOut,
}

struct WorkerHandle {
    handle: JoinHandle<()>,
    /// Disconnects when the worker thread ends, however it ends.
    exited: Receiver<()>,
}

pub struct TimerEngine {
    signals: RunSignals,
    events: Sender<Event>,
    alert: Arc<dyn Alert>,
    timescale: Timescale,
    seed: Option<u64>,
    stop_timeout: Duration,
    worker: Option<WorkerHandle>,
}

impl TimerEngine {
    pub fn new(events: Sender<Event>, alert: Arc<dyn Alert>) -> Self {
        Self {
            signals: RunSignals::new(),
            events,
            alert,
            timescale: Timescale::default(),
            seed: None,
            stop_timeout: STOP_TIMEOUT,
            worker: None,
        }
    }

    pub fn with_timescale(mut self, timescale: Timescale) -> Self {
        self.timescale = timescale;
        self
    }

    /// Fix the micro-interval draws. `None` seeds from entropy.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.signals.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.signals.is_paused()
    }

    /// Whether a worker thread (current or lingering after a timed-out stop)
    /// has not exited yet.
    pub fn worker_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.handle.is_finished())
    }

    pub fn signals(&self) -> &RunSignals {
        &self.signals
    }

    pub fn timescale(&self) -> Timescale {
        self.timescale
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Spawn the worker with a snapshot of `config`. Returns immediately.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` if a cycle is active, `WorkerStillRunning` if a
    /// previous worker has not exited, or `InvalidValue` if `config` is
    /// invalid. A rejected start changes nothing and emits nothing.
    pub fn start(&mut self, config: &Config) -> Result<()> {
        if self.signals.is_running() {
            if self.worker_alive() {
                return Err(TimerError::AlreadyRunning.into());
            }
            tracing::warn!("timer worker ended without a stop; clearing run state");
            self.signals.stop();
        }
        if self.worker_alive() {
            return Err(TimerError::WorkerStillRunning.into());
        }
        self.reap();
        config.validate()?;

        let rng = match self.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        let worker = Worker::new(
            config.clone(),
            self.signals.clone(),
            self.events.clone(),
            Arc::clone(&self.alert),
            self.timescale,
            rng,
        );
        let (exited_tx, exited) = mpsc::channel::<()>();

        self.alert.reset();
        self.signals.arm();
        let spawned = thread::Builder::new()
            .name("focusloop-timer".into())
            .spawn(move || {
                let _exited = exited_tx;
                worker.run();
            });
        match spawned {
            Ok(handle) => {
                self.worker = Some(WorkerHandle { handle, exited });
                tracing::info!(
                    focus_minutes = config.focus_minutes,
                    break_minutes = config.break_minutes,
                    "timer started"
                );
                Ok(())
            }
            Err(e) => {
                self.signals.stop();
                Err(TimerError::SpawnFailed(e.to_string()).into())
            }
        }
    }

    /// # Errors
    ///
    /// `NotRunning` or `AlreadyPaused`.
    pub fn pause(&self) -> Result<(), TimerError> {
        if !self.signals.is_running() {
            return Err(TimerError::NotRunning);
        }
        if self.signals.is_paused() {
            return Err(TimerError::AlreadyPaused);
        }
        if !self.signals.set_paused(true) {
            return Err(TimerError::NotRunning);
        }
        tracing::info!("timer paused");
        Ok(())
    }

    /// # Errors
    ///
    /// `NotRunning` or `NotPaused`.
    pub fn resume(&self) -> Result<(), TimerError> {
        if !self.signals.is_running() {
            return Err(TimerError::NotRunning);
        }
        if !self.signals.is_paused() {
            return Err(TimerError::NotPaused);
        }
        if !self.signals.set_paused(false) {
            return Err(TimerError::NotRunning);
        }
        tracing::info!("timer resumed");
        Ok(())
    }

    /// Pause if running, resume if paused. Returns the new paused state.
    ///
    /// # Errors
    ///
    /// `NotRunning`.
    pub fn toggle_pause(&self) -> Result<bool, TimerError> {
        if self.signals.is_paused() {
            self.resume().map(|()| false)
        } else {
            self.pause().map(|()| true)
        }
    }

    /// Clear the run signal (which also clears pause) and wait up to the stop
    /// timeout for the worker to exit.
    pub fn stop(&mut self) -> StopOutcome {
        self.signals.stop();
        let Some(worker) = self.worker.take() else {
            return StopOutcome::Idle;
        };

        match worker.exited.recv_timeout(self.stop_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    tracing::warn!("timer worker panicked");
                }
                tracing::info!("timer stopped");
                StopOutcome::Joined
            }
            Err(RecvTimeoutError::Timeout) => {
                let timeout_ms = u64::try_from(self.stop_timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(timeout_ms, "timer worker did not exit in time");
                self.worker = Some(worker);
                StopOutcome::TimedOut
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Join a worker that has already finished.
    fn reap(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.handle.join().is_err() {
                tracing::warn!("timer worker panicked");
            }
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.signals.stop();
    }
}
