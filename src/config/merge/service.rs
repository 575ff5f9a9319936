//! MergeService: orchestrates sources, applies precedence, deserializes to Settings.

use crate::config::sources::{environment, global_file};
use crate::config::Settings;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load settings from standard sources.
    /// Precedence: defaults (lowest) -> global file -> environment (highest).
    pub fn load() -> Result<Settings, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load settings from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
        Self::load_from_file_with_env(path, environment::environment())
    }

    fn load_from_file_with_env(path: &Path, env: Environment) -> Result<Settings, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).required(true));
        let builder = builder.add_source(env);

        let config = builder.build()?;
        config.try_deserialize()
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("digest.remote_treatment", "unchanged")?
        .set_default("digest.download_remote", false)
}
