mod config;

pub use config::{Config, ConfigStore, LoadSource};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/focusloop[-dev]/` based on FOCUSLOOP_ENV.
///
/// Set FOCUSLOOP_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusloop-dev")
    } else {
        base_dir.join("focusloop")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Directory that relative sound references are resolved against: the
/// directory holding the running executable, falling back to the working
/// directory.
pub fn resource_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
