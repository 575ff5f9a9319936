//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::Settings;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from the global config file (if present) and environment.
    pub fn load() -> Result<Settings, ConfigError> {
        MergeService::load()
    }

    /// Load settings from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default settings.
    pub fn default() -> Settings {
        Settings::default()
    }
}
