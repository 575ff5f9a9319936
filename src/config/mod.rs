//! Configuration
//!
//! Settings are layered by [`ConfigLoader`]: built-in defaults, then an optional TOML
//! file, then `RECIPE_DIGEST_*` environment variables.

mod facade;
mod merge;
pub mod paths;
mod sources;

pub use facade::ConfigLoader;

use crate::error::DigestError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// How remote (URL) references contribute to the digest
///
/// Remote content is never fetched. `Unchanged` fingerprints the URL text, so the
/// digest is stable across runs. `AlwaysChanged` fingerprints the current wall-clock
/// time, so every run produces a new digest and the build always looks stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteTreatment {
    #[default]
    Unchanged,
    AlwaysChanged,
}

/// Largest resolver pool accepted
pub const MAX_WORKERS: usize = 1024;

/// Largest channel capacity accepted; tokio's bounded channels cannot hold more permits
pub const MAX_BUFFER_CAPACITY: usize = tokio::sync::Semaphore::MAX_PERMITS;

fn default_workers() -> usize {
    4
}

fn default_buffer_capacity() -> usize {
    1024
}

/// Per-invocation digest settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Fetch remote content instead of fingerprinting it symbolically (unsupported)
    #[serde(default)]
    pub download_remote: bool,

    #[serde(default)]
    pub remote_treatment: RemoteTreatment,

    /// Resolver worker pool size
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of each bounded pipeline channel
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            download_remote: false,
            remote_treatment: RemoteTreatment::default(),
            workers: default_workers(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl DigestConfig {
    pub fn with_remote_treatment(mut self, treatment: RemoteTreatment) -> Self {
        self.remote_treatment = treatment;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn validate(&self) -> Result<(), DigestError> {
        if self.download_remote {
            return Err(DigestError::Config(
                "downloading remote sources is not supported".to_string(),
            ));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(DigestError::Config(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if self.buffer_capacity == 0 || self.buffer_capacity > MAX_BUFFER_CAPACITY {
            return Err(DigestError::Config(format!(
                "buffer_capacity must be between 1 and {}, got {}",
                MAX_BUFFER_CAPACITY, self.buffer_capacity
            )));
        }
        Ok(())
    }
}

/// Complete settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
