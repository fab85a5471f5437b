//! Command surface for front ends.
//!
//! Owns the configuration store, the timer engine, the receiving end of the
//! event channel and the dashboard. Every command returns success or failure;
//! everything else a front end sees comes from [`Controller::poll`].

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use crate::alert::{Alert, PlaybackMode, SoundAlert};
use crate::dashboard::Dashboard;
use crate::error::{Result, TimerError};
use crate::events::Event;
use crate::storage::{resource_dir, Config, ConfigStore};
use crate::timer::{StopOutcome, TimerEngine, Timescale, STOP_TIMEOUT};

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Base directory for relative sound references.
    pub resources: PathBuf,
    pub playback: PlaybackMode,
    pub timescale: Timescale,
    pub seed: Option<u64>,
    pub stop_timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            resources: resource_dir(),
            playback: PlaybackMode::System,
            timescale: Timescale::REAL,
            seed: None,
            stop_timeout: STOP_TIMEOUT,
        }
    }
}

pub struct Controller {
    store: ConfigStore,
    engine: TimerEngine,
    events: Receiver<Event>,
    dashboard: Dashboard,
}

impl Controller {
    /// Controller with a [`SoundAlert`] reporting into the event channel.
    pub fn new(store: ConfigStore, options: ControllerOptions) -> Self {
        let resources = options.resources.clone();
        let playback = options.playback;
        Self::with_alert(store, options, move |events| {
            let alert: Arc<dyn Alert> =
                Arc::new(SoundAlert::new(resources, events).with_playback_mode(playback));
            alert
        })
    }

    /// Controller with a custom alert built from the event sender.
    pub fn with_alert<F>(store: ConfigStore, options: ControllerOptions, make_alert: F) -> Self
    where
        F: FnOnce(Sender<Event>) -> Arc<dyn Alert>,
    {
        let (tx, rx) = mpsc::channel();
        let alert = make_alert(tx.clone());
        let engine = TimerEngine::new(tx, alert)
            .with_timescale(options.timescale)
            .with_seed(options.seed)
            .with_stop_timeout(options.stop_timeout);
        let dashboard = Dashboard::new(store.config());
        Self {
            store,
            engine,
            events: rx,
            dashboard,
        }
    }

    pub fn config(&self) -> &Config {
        self.store.config()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    pub fn worker_alive(&self) -> bool {
        self.engine.worker_alive()
    }

    /// Drain and apply every pending event. Returns them in order.
    pub fn poll(&mut self) -> Vec<Event> {
        self.dashboard.drain(&self.events)
    }

    /// # Errors
    ///
    /// See [`TimerEngine::start`].
    pub fn start(&mut self) -> Result<()> {
        // Anything left from a previous run (its final Reset included) must
        // land before this run's controls are shown.
        self.poll();
        self.engine.start(self.store.config())?;
        self.dashboard.show_running(false);
        Ok(())
    }

    /// # Errors
    ///
    /// `NotRunning` or `AlreadyPaused`.
    pub fn pause(&mut self) -> Result<()> {
        self.engine.pause()?;
        self.dashboard.show_running(true);
        Ok(())
    }

    /// # Errors
    ///
    /// `NotRunning` or `NotPaused`.
    pub fn resume(&mut self) -> Result<()> {
        self.engine.resume()?;
        self.dashboard.show_running(false);
        Ok(())
    }

    /// Returns the new paused state.
    ///
    /// # Errors
    ///
    /// `NotRunning`.
    pub fn toggle_pause(&mut self) -> Result<bool> {
        let paused = self.engine.toggle_pause()?;
        self.dashboard.show_running(paused);
        Ok(paused)
    }

    /// Stop the worker; the dashboard goes idle whether or not the worker
    /// exited in time.
    pub fn stop(&mut self) -> StopOutcome {
        let outcome = self.engine.stop();
        self.dashboard.show_idle();
        outcome
    }

    /// Replace the whole configuration.
    ///
    /// # Errors
    ///
    /// `SettingsLocked` while a worker is alive, otherwise any error from
    /// [`ConfigStore::apply`]. The active configuration is unchanged on error.
    pub fn apply_settings(&mut self, config: Config) -> Result<()> {
        self.ensure_idle()?;
        self.store.apply(config)?;
        self.dashboard.refresh_idle(self.store.config());
        Ok(())
    }

    /// Set one key by name.
    ///
    /// # Errors
    ///
    /// Same as [`Controller::apply_settings`], plus unknown key/parse errors.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_idle()?;
        self.store.set(key, value)?;
        self.dashboard.refresh_idle(self.store.config());
        Ok(())
    }

    /// Stop any live worker before the front end exits.
    pub fn shutdown(&mut self) -> StopOutcome {
        if self.engine.is_running() || self.engine.worker_alive() {
            self.stop()
        } else {
            StopOutcome::Idle
        }
    }

    fn ensure_idle(&self) -> Result<(), TimerError> {
        if self.engine.is_running() || self.engine.worker_alive() {
            Err(TimerError::SettingsLocked)
        } else {
            Ok(())
        }
    }
}
