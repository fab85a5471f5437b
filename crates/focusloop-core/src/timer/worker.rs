//! The phase state machine run on the worker thread.
//!
//! ```text
//! Cycle N: Focus -> [micro-interval -> Micro-break]* -> Long Break -> Cycle N+1
//! ```
//!
//! Every loop boundary is a checkpoint: the worker bails out as soon as the
//! run signal is cleared, and blocks there while paused. Time spent paused is
//! added to every active deadline so remaining time is frozen.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use rand_pcg::Mcg128Xsl64;

use super::format::{format_clock, format_seconds};
use super::signals::RunSignals;
use super::timescale::Timescale;
use crate::alert::{Alert, Chime};
use crate::events::Event;
use crate::storage::Config;

pub(crate) const PAUSED_STATUS: &str = "Paused";
pub(crate) const FOCUSING_STATUS: &str = "Focusing...";
pub(crate) const LONG_BREAK_STATUS: &str = "Long Break";

/// The run signal was cleared.
#[derive(Debug)]
struct Stopped;

type Phase<T = ()> = Result<T, Stopped>;

#[derive(Debug, Clone, Copy)]
enum Readout {
    Clock,
    Seconds,
}

impl Readout {
    fn render(self, secs: u64) -> String {
        match self {
            Readout::Clock => format_clock(secs),
            Readout::Seconds => format_seconds(secs),
        }
    }
}

pub(crate) struct Worker {
    config: Config,
    signals: RunSignals,
    events: Sender<Event>,
    alert: Arc<dyn Alert>,
    timescale: Timescale,
    rng: Mcg128Xsl64,
    /// Last phase status, restored after a pause.
    status: String,
}

impl Worker {
    pub(crate) fn new(
        config: Config,
        signals: RunSignals,
        events: Sender<Event>,
        alert: Arc<dyn Alert>,
        timescale: Timescale,
        rng: Mcg128Xsl64,
    ) -> Self {
        Self {
            config,
            signals,
            events,
            alert,
            timescale,
            rng,
            status: String::new(),
        }
    }

    /// Run cycles until stopped, then emit `Reset`.
    pub(crate) fn run(mut self) {
        let mut cycle: u32 = 1;
        while self.signals.is_running() {
            if self.cycle(cycle).is_err() {
                break;
            }
            cycle = cycle.saturating_add(1);
        }
        tracing::debug!(cycle, "timer worker exiting");
        self.emit(Event::Reset);
    }

    fn cycle(&mut self, number: u32) -> Phase {
        self.set_status(format!("Cycle {number}: Focus"));
        self.focus_session()?;

        self.set_status(LONG_BREAK_STATUS);
        let break_secs = u64::from(self.config.break_minutes).saturating_mul(60);
        self.countdown(break_secs, Readout::Clock, Some(Chime::Twice))?;
        Ok(())
    }

    fn focus_session(&mut self) -> Phase {
        let ts = self.timescale;
        let lo = u64::from(self.config.random_interval_min).saturating_mul(60);
        let hi = u64::from(self.config.random_interval_max)
            .saturating_mul(60)
            .max(lo);
        let mut session_end = Instant::now() + ts.minutes(u64::from(self.config.focus_minutes));

        while Instant::now() < session_end {
            session_end += self.checkpoint()?;

            let interval = self.rng.gen_range(lo..=hi);
            let mut micro_end = Instant::now() + ts.seconds(interval);
            tracing::debug!(interval_secs = interval, "micro-interval");

            while Instant::now() < micro_end.min(session_end) {
                let paused = self.checkpoint()?;
                session_end += paused;
                micro_end += paused;

                let remaining = session_end.saturating_duration_since(Instant::now());
                self.emit(Event::Timer(format_clock(ts.whole_seconds(remaining))));
                self.nap_until(micro_end.min(session_end))?;
            }

            if Instant::now() < session_end {
                session_end += self.checkpoint()?;
                self.alert.chime(&self.config.sound_file, Chime::Once);
                let micro_secs = self.config.micro_break_seconds;
                self.set_status(format!("Micro-break ({micro_secs}s)"));
                session_end += self.countdown(u64::from(micro_secs), Readout::Seconds, None)?;
                self.set_status(FOCUSING_STATUS);
            }
        }
        self.checkpoint()?;
        Ok(())
    }

    /// Fixed-length countdown. Returns the time spent paused.
    fn countdown(&mut self, secs: u64, readout: Readout, chime: Option<Chime>) -> Phase<Duration> {
        let mut end = Instant::now() + self.timescale.seconds(secs);
        let mut paused_total = Duration::ZERO;

        while Instant::now() < end {
            let paused = self.checkpoint()?;
            end += paused;
            paused_total += paused;

            let remaining = end.saturating_duration_since(Instant::now());
            self.emit(Event::Timer(readout.render(self.timescale.whole_seconds(remaining))));
            self.nap_until(end)?;
        }

        // A pause requested on the last tick holds the chime until resume.
        paused_total += self.checkpoint()?;
        if let Some(chime) = chime {
            self.alert.chime(&self.config.sound_file, chime);
        }
        Ok(paused_total)
    }

    /// Stop check plus pause wait. Returns how long the worker was paused.
    fn checkpoint(&mut self) -> Phase<Duration> {
        self.ensure_running()?;
        if !self.signals.is_paused() {
            return Ok(Duration::ZERO);
        }

        self.emit(Event::status(PAUSED_STATUS));
        let paused = self.signals.wait_while_paused(self.timescale.pause_poll());
        self.ensure_running()?;
        self.emit(Event::Status(self.status.clone()));
        let paused_ms = u64::try_from(paused.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(paused_ms, "resumed");
        Ok(paused)
    }

    /// Sleep one tick, or less if `deadline` comes first.
    fn nap_until(&self, deadline: Instant) -> Phase {
        let left = deadline.saturating_duration_since(Instant::now());
        if self.signals.sleep(left.min(self.timescale.tick())) {
            Ok(())
        } else {
            Err(Stopped)
        }
    }

    fn ensure_running(&self) -> Phase {
        if self.signals.is_running() {
            Ok(())
        } else {
            Err(Stopped)
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        tracing::debug!(status = %self.status, "phase");
        self.emit(Event::Status(self.status.clone()));
    }

    fn emit(&self, event: Event) {
        // A closed channel means the front end is gone; keep honoring the
        // run signal regardless.
        let _ = self.events.send(event);
    }
}
