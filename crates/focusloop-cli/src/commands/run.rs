//! Interactive terminal front end.
//!
//! The main thread is the event consumer: every poll tick it applies queued
//! stdin commands, drains the event channel into the dashboard and redraws.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use chrono::{DateTime, Local};
use clap::Args;
use focusloop_core::dashboard::POLL_INTERVAL;
use focusloop_core::{Controller, ControllerOptions, Dashboard, Event, PlaybackMode, StopOutcome};
use serde::Serialize;

use super::Context;

#[derive(Args)]
pub struct RunArgs {
    /// Print every event as a JSON line instead of redrawing a status line
    #[arg(long)]
    json: bool,
    /// Check the alert sound but never play it
    #[arg(long)]
    mute: bool,
    /// Seed for the micro-interval lengths
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    TogglePause,
    Stop,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "start" | "r" => Some(Command::Start),
        "" | "p" | "pause" | "resume" => Some(Command::TogglePause),
        "s" | "stop" => Some(Command::Stop),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Forward stdin lines as commands. At EOF the reader just ends and the timer
/// keeps running.
fn spawn_stdin_reader() -> Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("focusloop-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    None => eprintln!("unknown command: {}", line.trim()),
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "stdin reader unavailable; use Ctrl-C to quit");
    }
    rx
}

#[derive(Serialize)]
struct EventLine<'a> {
    at: DateTime<Local>,
    #[serde(flatten)]
    event: &'a Event,
}

enum View {
    Json,
    Line { last: String },
}

impl View {
    fn new(json: bool) -> Self {
        if json {
            View::Json
        } else {
            View::Line { last: String::new() }
        }
    }

    fn render(&mut self, events: &[Event], dashboard: &Dashboard) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        match self {
            View::Json => {
                for event in events {
                    let line = EventLine { at: Local::now(), event };
                    let json = serde_json::to_string(&line).map_err(std::io::Error::other)?;
                    writeln!(out, "{json}")?;
                }
            }
            View::Line { last } => {
                let line = status_line(dashboard);
                if line != *last {
                    write!(out, "\r\x1b[2K{line}")?;
                    *last = line;
                }
            }
        }
        out.flush()
    }

    fn notice(&mut self, message: &str) {
        if let View::Line { last } = self {
            // Force a redraw below the notice.
            last.clear();
            eprintln!();
        }
        eprintln!("{message}");
    }

    fn finish(&mut self) {
        if let View::Line { .. } = self {
            println!();
        }
    }
}

fn status_line(dashboard: &Dashboard) -> String {
    let controls = dashboard.controls();
    let mut hints = Vec::new();
    if controls.start_enabled {
        hints.push("start".to_string());
    }
    if controls.pause_enabled {
        hints.push(format!("p: {}", controls.pause_label.as_str()));
    }
    if controls.stop_enabled {
        hints.push("s: Stop".to_string());
    }
    hints.push("q: Quit".to_string());
    format!("{:<22} {:>8}   [{}]", dashboard.status(), dashboard.timer(), hints.join("  "))
}

pub fn run(ctx: &Context, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.open_store()?;
    let options = ControllerOptions {
        resources: ctx.resources(),
        playback: if args.mute {
            PlaybackMode::Disabled
        } else {
            PlaybackMode::System
        },
        seed: args.seed,
        ..ControllerOptions::default()
    };
    let mut ctrl = Controller::new(store, options);
    let mut view = View::new(args.json);
    let commands = spawn_stdin_reader();

    if !args.json {
        eprintln!("Enter toggles pause, 's' stops, 'start' restarts, 'q' quits.");
    }
    ctrl.start()?;

    loop {
        let mut quit = false;
        for cmd in commands.try_iter() {
            let result = match cmd {
                Command::Start => ctrl.start(),
                Command::TogglePause => ctrl.toggle_pause().map(|_| ()),
                Command::Stop => {
                    if ctrl.stop() == StopOutcome::TimedOut {
                        view.notice("timer is still winding down");
                    }
                    Ok(())
                }
                Command::Quit => {
                    quit = true;
                    break;
                }
            };
            if let Err(e) = result {
                view.notice(&format!("{e}"));
            }
        }
        if quit {
            ctrl.shutdown();
        }

        let events = ctrl.poll();
        view.render(&events, ctrl.dashboard())?;
        for error in ctrl.dashboard_mut().take_errors() {
            view.notice(&format!("warning: {error}"));
        }

        if quit {
            view.finish();
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
}
