//! Core error types for focusloop-core.
//!
//! None of these are fatal to the process: configuration errors are rejected
//! at the apply boundary, playback errors are reported as events, and timer
//! errors reject a command without changing state.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Timer command rejected
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Sound playback errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Commands rejected because of the current run state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Timer already running")]
    AlreadyRunning,

    #[error("Previous timer worker has not exited yet")]
    WorkerStillRunning,

    #[error("Timer not running")]
    NotRunning,

    #[error("Timer already paused")]
    AlreadyPaused,

    #[error("Timer not paused")]
    NotPaused,

    /// Settings may only change while the timer is idle.
    #[error("Settings cannot be changed while the timer is running")]
    SettingsLocked,

    #[error("Failed to spawn timer worker: {0}")]
    SpawnFailed(String),
}

/// Sound playback errors. Reported as [`crate::Event::Error`], never raised
/// into the timer.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("sound file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no audio player available on this platform")]
    NoPlayer,

    #[error("failed to launch {player}: {source}")]
    Spawn {
        player: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{player} exited with {status}")]
    Failed { player: String, status: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
