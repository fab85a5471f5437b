//! Fire-and-forget alert sounds.
//!
//! Playback shells out to the platform's command-line player on a detached
//! thread, so the timer worker never waits on audio. Failures are reported as
//! [`Event::Error`] on the event channel.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::error::PlaybackError;
use crate::events::Event;

/// How many times a sound is played for one alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chime {
    Once,
    /// Two plays back to back, separated by a short gap.
    Twice,
}

impl Chime {
    pub fn count(self) -> u32 {
        match self {
            Chime::Once => 1,
            Chime::Twice => 2,
        }
    }
}

/// Something that can sound an alert.
///
/// Implementations must return immediately and must not panic on failure.
pub trait Alert: Send + Sync {
    fn chime(&self, reference: &str, chime: Chime);

    /// Called when a new run starts.
    fn reset(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    System,
    /// Resolve and check the sound file, but never launch a player.
    Disabled,
}

struct Player {
    program: &'static str,
    args: &'static [&'static str],
}

#[cfg(target_os = "macos")]
const PLAYERS: &[Player] = &[Player {
    program: "afplay",
    args: &[],
}];

#[cfg(all(unix, not(target_os = "macos")))]
const PLAYERS: &[Player] = &[
    Player {
        program: "paplay",
        args: &[],
    },
    Player {
        program: "aplay",
        args: &["-q"],
    },
    Player {
        program: "ffplay",
        args: &["-nodisp", "-autoexit", "-loglevel", "quiet"],
    },
];

#[cfg(windows)]
const PLAYERS: &[Player] = &[Player {
    program: "powershell",
    args: &["-NoProfile", "-NonInteractive", "-Command"],
}];

#[cfg(not(any(unix, windows)))]
const PLAYERS: &[Player] = &[];

#[cfg(windows)]
fn player_arg(path: &Path) -> OsString {
    let quoted = path.display().to_string().replace('\'', "''");
    format!("(New-Object Media.SoundPlayer '{quoted}').PlaySync()").into()
}

#[cfg(not(windows))]
fn player_arg(path: &Path) -> OsString {
    path.as_os_str().to_owned()
}

/// Play `path` once, blocking until the player exits.
///
/// Tries each known player in turn, skipping ones that are not installed.
///
/// # Errors
///
/// Returns `NoPlayer` when none is installed, otherwise the first launch or
/// exit failure.
pub fn play_file(path: &Path) -> Result<(), PlaybackError> {
    for player in PLAYERS {
        let status = Command::new(player.program)
            .args(player.args)
            .arg(player_arg(path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => {
                return Err(PlaybackError::Failed {
                    player: player.program.to_string(),
                    status: status.to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(PlaybackError::Spawn {
                    player: player.program.to_string(),
                    source,
                })
            }
        }
    }
    Err(PlaybackError::NoPlayer)
}

/// Alert backed by a sound file.
///
/// A failing path is reported once per run. A different path, a successful
/// playback or [`Alert::reset`] re-arms reporting.
pub struct SoundAlert {
    resources: PathBuf,
    events: Sender<Event>,
    mode: PlaybackMode,
    gap: Duration,
    last_failure: Arc<Mutex<Option<PathBuf>>>,
}

impl SoundAlert {
    pub fn new(resources: impl Into<PathBuf>, events: Sender<Event>) -> Self {
        Self {
            resources: resources.into(),
            events,
            mode: PlaybackMode::System,
            gap: Duration::from_millis(300),
            last_failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_playback_mode(mut self, mode: PlaybackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Relative references resolve against the resource directory; absolute
    /// ones are used as-is.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.resources.join(path)
        }
    }

    /// Resolve `reference` and check that the file exists.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` with the resolved path.
    pub fn locate(&self, reference: &str) -> Result<PathBuf, PlaybackError> {
        let path = self.resolve(reference);
        if path.is_file() {
            Ok(path)
        } else {
            Err(PlaybackError::NotFound(path))
        }
    }

    fn report(&self, path: &Path, error: &PlaybackError) {
        report_failure(&self.events, &self.last_failure, path, error);
    }
}

fn report_failure(
    events: &Sender<Event>,
    last_failure: &Mutex<Option<PathBuf>>,
    path: &Path,
    error: &PlaybackError,
) {
    tracing::warn!(%error, "alert playback failed");
    let mut last = last_failure.lock().unwrap_or_else(PoisonError::into_inner);
    if last.as_deref() != Some(path) {
        *last = Some(path.to_path_buf());
        // The receiver is gone only when the front end has shut down.
        let _ = events.send(Event::error(format!("Unable to play sound: {error}")));
    }
}

fn clear_failure(last_failure: &Mutex<Option<PathBuf>>) {
    *last_failure.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

impl Alert for SoundAlert {
    fn chime(&self, reference: &str, chime: Chime) {
        let path = match self.locate(reference) {
            Ok(path) => path,
            Err(e) => {
                self.report(&self.resolve(reference), &e);
                return;
            }
        };
        if self.mode == PlaybackMode::Disabled {
            tracing::debug!(path = %path.display(), ?chime, "playback disabled");
            return;
        }

        let events = self.events.clone();
        let last_failure = Arc::clone(&self.last_failure);
        let gap = self.gap;
        let played = path.clone();
        let spawned = thread::Builder::new()
            .name("focusloop-alert".into())
            .spawn(move || {
                for i in 0..chime.count() {
                    if i > 0 {
                        thread::sleep(gap);
                    }
                    if let Err(e) = play_file(&played) {
                        report_failure(&events, &last_failure, &played, &e);
                        return;
                    }
                }
                clear_failure(&last_failure);
            });
        if let Err(source) = spawned {
            self.report(
                &path,
                &PlaybackError::Spawn {
                    player: "alert thread".into(),
                    source,
                },
            );
        }
    }

    fn reset(&self) {
        clear_failure(&self.last_failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    #[test]
    fn resolve_relative_against_resources() {
        let (tx, _rx) = mpsc::channel();
        let alert = SoundAlert::new("/opt/focusloop", tx);
        assert_eq!(alert.resolve("alert.mp3"), PathBuf::from("/opt/focusloop/alert.mp3"));
    }

    #[test]
    fn resolve_absolute_unchanged() {
        let dir = TempDir::new().unwrap();
        let absolute = dir.path().join("bell.wav");
        let (tx, _rx) = mpsc::channel();
        let alert = SoundAlert::new("/opt/focusloop", tx);
        assert_eq!(alert.resolve(absolute.to_str().unwrap()), absolute);
    }

    #[test]
    fn missing_sound_reports_error_event() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let alert = SoundAlert::new(dir.path(), tx).with_playback_mode(PlaybackMode::Disabled);

        alert.chime("x.mp3", Chime::Once);

        match rx.try_recv() {
            Ok(Event::Error(text)) => {
                assert!(text.starts_with("Unable to play sound:"));
                assert!(text.contains("x.mp3"));
            }
            other => panic!("expected error event, got {other:?}"),
        }
    }

    #[test]
    fn repeated_failures_are_reported_once() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let alert = SoundAlert::new(dir.path(), tx).with_playback_mode(PlaybackMode::Disabled);

        alert.chime("x.mp3", Chime::Once);
        alert.chime("x.mp3", Chime::Twice);

        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn reset_and_new_path_report_again() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let alert = SoundAlert::new(dir.path(), tx).with_playback_mode(PlaybackMode::Disabled);

        alert.chime("x.mp3", Chime::Once);
        alert.reset();
        alert.chime("x.mp3", Chime::Once);
        alert.chime("y.mp3", Chime::Once);
        alert.chime("y.mp3", Chime::Twice);

        let errors: Vec<Event> = rx.try_iter().collect();
        assert_eq!(errors.len(), 3);
        assert!(matches!(&errors[2], Event::Error(text) if text.contains("y.mp3")));
    }

    #[test]
    fn disabled_mode_with_existing_file_is_silent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bell.wav"), b"RIFF").unwrap();
        let (tx, rx) = mpsc::channel();
        let alert = SoundAlert::new(dir.path(), tx).with_playback_mode(PlaybackMode::Disabled);

        alert.chime("bell.wav", Chime::Twice);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn chime_counts() {
        assert_eq!(Chime::Once.count(), 1);
        assert_eq!(Chime::Twice.count(), 2);
    }
}
