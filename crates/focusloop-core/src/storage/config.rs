//! TOML-based timer configuration.
//!
//! Stores the durations driving a cycle and the alert sound reference.
//! Configuration is stored at `~/.config/focusloop/config.toml` unless an
//! explicit path is given.
//!
//! Loading never fails: a missing file is created with defaults, and an
//! unreadable, malformed or invalid file is replaced by defaults in memory only.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Timer configuration.
///
/// Every duration is a positive integer and
/// `random_interval_min < random_interval_max`; [`Config::validate`] enforces
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Length of a focus session, in minutes.
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    /// Length of the long break, in minutes.
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    /// Length of each micro-break, in seconds.
    #[serde(default = "default_micro_break_seconds")]
    pub micro_break_seconds: u32,
    /// Lower bound of a micro-interval, in minutes.
    #[serde(default = "default_random_interval_min")]
    pub random_interval_min: u32,
    /// Upper bound of a micro-interval, in minutes.
    #[serde(default = "default_random_interval_max")]
    pub random_interval_max: u32,
    /// Alert sound. Relative paths resolve against the resource directory.
    #[serde(default = "default_sound_file")]
    pub sound_file: String,
}

// Default functions
fn default_focus_minutes() -> u32 {
    90
}
fn default_break_minutes() -> u32 {
    20
}
fn default_micro_break_seconds() -> u32 {
    10
}
fn default_random_interval_min() -> u32 {
    3
}
fn default_random_interval_max() -> u32 {
    5
}
fn default_sound_file() -> String {
    "alert.mp3".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            break_minutes: default_break_minutes(),
            micro_break_seconds: default_micro_break_seconds(),
            random_interval_min: default_random_interval_min(),
            random_interval_max: default_random_interval_max(),
            sound_file: default_sound_file(),
        }
    }
}

impl Config {
    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("focus_minutes", self.focus_minutes),
            ("break_minutes", self.break_minutes),
            ("micro_break_seconds", self.micro_break_seconds),
            ("random_interval_min", self.random_interval_min),
            ("random_interval_max", self.random_interval_max),
        ];
        if let Some((key, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::InvalidValue {
                key: (*key).to_string(),
                message: "must be a positive integer".into(),
            });
        }
        if self.random_interval_min >= self.random_interval_max {
            return Err(ConfigError::InvalidValue {
                key: "random_interval_min".into(),
                message: format!(
                    "must be less than random_interval_max ({} >= {})",
                    self.random_interval_min, self.random_interval_max
                ),
            });
        }
        Ok(())
    }

    /// Idle timer text: the full focus duration.
    pub fn idle_timer_text(&self) -> String {
        format!("{:02}:00", self.focus_minutes)
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Return a copy with `key` set to `value`, parsed according to the key's
    /// type. The result is not validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self, ConfigError> {
        let mut json =
            serde_json::to_value(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ConfigError::ParseFailed("config is not a table".into()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Number(_) => {
                let n = value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{value}' as a non-negative integer"),
                })?;
                serde_json::Value::Number(n.into())
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(key.to_string(), new_value);

        serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// How the in-memory configuration was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Read from the file.
    File,
    /// The file did not exist and was created with defaults.
    Created,
    /// The file was unreadable or invalid; defaults are used and the file is
    /// left untouched.
    Defaulted,
}

/// Owned configuration store backed by a TOML file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
    source: LoadSource,
}

impl ConfigStore {
    /// Default config file location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Open the store at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> Result<Self, ConfigError> {
        Ok(Self::open_at(Self::default_path()?))
    }

    /// Load from `path`, falling back to defaults. Never fails.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (config, source) = match fs::read_to_string(&path) {
            Ok(content) => match Config::from_toml(&content) {
                Ok(cfg) => (cfg, LoadSource::File),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "config invalid, using defaults"
                    );
                    (Config::default(), LoadSource::Defaulted)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Config::default();
                if let Err(e) = write_config(&path, &cfg) {
                    tracing::warn!(error = %e, "could not create default config");
                }
                (cfg, LoadSource::Created)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "config unreadable, using defaults"
                );
                (Config::default(), LoadSource::Defaulted)
            }
        };
        tracing::debug!(path = %path.display(), ?source, "configuration loaded");
        Self { path, config, source }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn load_source(&self) -> LoadSource {
        self.source
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key)
    }

    /// Validate, persist, then replace the in-memory configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if the configuration breaks an invariant, or
    /// `SaveFailed` if it cannot be written. In both cases the current
    /// configuration stays active.
    pub fn apply(&mut self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        write_config(&self.path, &config)?;
        tracing::info!(path = %self.path.display(), "configuration applied");
        self.config = config;
        self.source = LoadSource::File;
        Ok(())
    }

    /// Set a single key by name and apply the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed, the
    /// result is invalid, or it cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let updated = self.config.with_value(key, value)?;
        self.apply(updated)
    }

    /// Apply the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be saved.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.apply(Config::default())
    }
}

/// Write through a sibling temp file so readers never see a partial file.
fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let save_failed = |message: String| ConfigError::SaveFailed {
        path: path.to_path_buf(),
        message,
    };
    let content = toml::to_string_pretty(config).map_err(|e| save_failed(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
    }
    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, content).map_err(|e| save_failed(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| save_failed(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::open_at(dir.path().join("config.toml"))
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.focus_minutes, 90);
        assert_eq!(cfg.break_minutes, 20);
        assert_eq!(cfg.micro_break_seconds, 10);
        assert_eq!(cfg.random_interval_min, 3);
        assert_eq!(cfg.random_interval_max, 5);
        assert_eq!(cfg.sound_file, "alert.mp3");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load_source(), LoadSource::Created);
        assert_eq!(store.config(), &Config::default());
        assert!(store.path().exists());
    }

    #[test]
    fn corrupt_file_uses_defaults_without_overwriting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "focus_minutes = [oops").unwrap();

        let store = ConfigStore::open_at(&path);
        assert_eq!(store.load_source(), LoadSource::Defaulted);
        assert_eq!(store.config(), &Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "focus_minutes = [oops");
    }

    #[test]
    fn invalid_values_on_disk_are_treated_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "random_interval_min = 6\nrandom_interval_max = 4\n").unwrap();

        let store = ConfigStore::open_at(&path);
        assert_eq!(store.load_source(), LoadSource::Defaulted);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "focus_minutes = 45\n").unwrap();

        let store = ConfigStore::open_at(&path);
        assert_eq!(store.load_source(), LoadSource::File);
        assert_eq!(store.config().focus_minutes, 45);
        assert_eq!(store.config().break_minutes, 20);
    }

    #[test]
    fn apply_then_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let cfg = Config {
            focus_minutes: 50,
            break_minutes: 10,
            micro_break_seconds: 15,
            random_interval_min: 2,
            random_interval_max: 7,
            sound_file: "/tmp/bell.wav".into(),
        };
        store.apply(cfg.clone()).unwrap();

        let reloaded = ConfigStore::open_at(store.path());
        assert_eq!(reloaded.config(), &cfg);
        assert_eq!(reloaded.load_source(), LoadSource::File);
    }

    #[test]
    fn apply_rejects_inverted_interval_and_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let bad = Config {
            random_interval_min: 5,
            random_interval_max: 3,
            ..Config::default()
        };
        let err = store.apply(bad).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "random_interval_min"
        ));
        assert_eq!(store.config(), &Config::default());
        assert_eq!(ConfigStore::open_at(store.path()).config(), &Config::default());
    }

    #[test]
    fn get_returns_string_for_all_types() {
        let cfg = Config::default();
        assert_eq!(cfg.get("focus_minutes").as_deref(), Some("90"));
        assert_eq!(cfg.get("sound_file").as_deref(), Some("alert.mp3"));
        assert!(cfg.get("missing_key").is_none());
    }

    #[test]
    fn set_parses_by_key_type() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set("break_minutes", "15").unwrap();
        store.set("sound_file", "chime.wav").unwrap();
        assert_eq!(store.config().break_minutes, 15);
        assert_eq!(store.config().sound_file, "chime.wav");

        assert!(matches!(store.set("nope", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            store.set("focus_minutes", "-3"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            store.set("focus_minutes", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(store.config().focus_minutes, 90);
    }

    #[test]
    fn idle_timer_text_pads_minutes() {
        let cfg = Config {
            focus_minutes: 5,
            ..Config::default()
        };
        assert_eq!(cfg.idle_timer_text(), "05:00");
    }

    proptest! {
        #[test]
        fn validate_matches_invariants(
            focus in 0u32..200,
            brk in 0u32..60,
            micro in 0u32..120,
            min in 0u32..20,
            max in 0u32..20,
        ) {
            let cfg = Config {
                focus_minutes: focus,
                break_minutes: brk,
                micro_break_seconds: micro,
                random_interval_min: min,
                random_interval_max: max,
                sound_file: "x.mp3".into(),
            };
            let expected = focus > 0 && brk > 0 && micro > 0 && min > 0 && max > 0 && min < max;
            prop_assert_eq!(cfg.validate().is_ok(), expected);
        }
    }
}
