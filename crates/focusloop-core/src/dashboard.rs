//! Toolkit-independent presentation model.
//!
//! The dashboard is the only thing that mutates displayed state. It is fed by
//! draining the event channel once per poll tick and by the controller when a
//! command changes which controls are available.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;

use crate::events::Event;
use crate::storage::Config;

/// Status text shown while idle.
pub const IDLE_STATUS: &str = "Ready";

/// Recommended interval between drains.
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseLabel {
    Pause,
    Resume,
}

impl PauseLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            PauseLabel::Pause => "Pause",
            PauseLabel::Resume => "Resume",
        }
    }
}

/// Which controls are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub pause_label: PauseLabel,
    pub stop_enabled: bool,
}

impl Controls {
    pub fn idle() -> Self {
        Self {
            start_enabled: true,
            pause_enabled: false,
            pause_label: PauseLabel::Pause,
            stop_enabled: false,
        }
    }

    pub fn running(paused: bool) -> Self {
        Self {
            start_enabled: false,
            pause_enabled: true,
            pause_label: if paused { PauseLabel::Resume } else { PauseLabel::Pause },
            stop_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    status: String,
    timer: String,
    idle_timer: String,
    controls: Controls,
    errors: VecDeque<String>,
}

impl Dashboard {
    pub fn new(config: &Config) -> Self {
        let idle_timer = config.idle_timer_text();
        Self {
            status: IDLE_STATUS.to_string(),
            timer: idle_timer.clone(),
            idle_timer,
            controls: Controls::idle(),
            errors: VecDeque::new(),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn timer(&self) -> &str {
        &self.timer
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn is_idle(&self) -> bool {
        self.controls.start_enabled
    }

    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Status(text) => self.status.clone_from(text),
            Event::Timer(text) => self.timer.clone_from(text),
            Event::Reset => self.show_idle(),
            Event::Error(text) => self.errors.push_back(text.clone()),
        }
    }

    /// Apply every pending event in order without blocking. Returns them.
    pub fn drain(&mut self, events: &Receiver<Event>) -> Vec<Event> {
        let drained: Vec<Event> = events.try_iter().collect();
        for event in &drained {
            self.apply(event);
        }
        drained
    }

    pub fn show_running(&mut self, paused: bool) {
        self.controls = Controls::running(paused);
    }

    pub fn show_idle(&mut self) {
        self.status = IDLE_STATUS.to_string();
        self.timer.clone_from(&self.idle_timer);
        self.controls = Controls::idle();
    }

    /// Pick up a new focus duration; refreshes the display when idle.
    pub fn refresh_idle(&mut self, config: &Config) {
        self.idle_timer = config.idle_timer_text();
        if self.is_idle() {
            self.timer.clone_from(&self.idle_timer);
        }
    }

    /// Errors not yet shown to the user, oldest first.
    pub fn take_errors(&mut self) -> Vec<String> {
        self.errors.drain(..).collect()
    }
}
