//! # focusloop Core Library
//!
//! Core logic for the focusloop focus timer: a long focus session broken up by
//! short randomized micro-breaks, followed by a long break, repeated until
//! stopped. The CLI front end is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a single background worker running the phase state
//!   machine. It only talks to the outside world through an [`Event`] channel
//!   and the run/pause signals.
//! - **Storage**: TOML-based configuration with defaults on missing or corrupt
//!   files.
//! - **Alert**: fire-and-forget sound playback; failures become
//!   [`Event::Error`].
//! - **Dashboard / Controller**: toolkit-independent presentation model and the
//!   command surface (`start`, `pause`/`resume`, `stop`, `apply_settings`).
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: spawns and stops the worker
//! - [`ConfigStore`]: configuration load/apply/persist
//! - [`Dashboard`]: displayed status, timer text and control affordances
//! - [`Controller`]: wires the above together for a front end

pub mod alert;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use alert::{Alert, Chime, PlaybackMode, SoundAlert};
pub use controller::{Controller, ControllerOptions};
pub use dashboard::{Controls, Dashboard, PauseLabel};
pub use error::{ConfigError, CoreError, PlaybackError, TimerError};
pub use events::Event;
pub use storage::{Config, ConfigStore, LoadSource};
pub use timer::{StopOutcome, TimerEngine, Timescale};
