pub mod config;
pub mod run;
pub mod sound;

use std::path::PathBuf;

use focusloop_core::storage::resource_dir;
use focusloop_core::ConfigStore;

/// Options shared by every subcommand.
pub struct Context {
    config: Option<PathBuf>,
    resources: Option<PathBuf>,
}

impl Context {
    pub fn new(config: Option<PathBuf>, resources: Option<PathBuf>) -> Self {
        Self { config, resources }
    }

    pub fn open_store(&self) -> Result<ConfigStore, Box<dyn std::error::Error>> {
        match &self.config {
            Some(path) => Ok(ConfigStore::open_at(path)),
            None => Ok(ConfigStore::open()?),
        }
    }

    pub fn resources(&self) -> PathBuf {
        self.resources.clone().unwrap_or_else(resource_dir)
    }
}
