//! Command-line interface
//!
//! Argument parsing and command execution for the `recipe-digest` binary. Kept in the
//! library so the output contracts can be tested without spawning a process.

use crate::config::{ConfigLoader, RemoteTreatment, Settings};
use crate::engine;
use crate::error::DigestError;
use crate::logging::LoggingConfig;
use crate::staleness::{self, Staleness};
use crate::types::Digest;
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Exit code when the inputs are unchanged or a digest was printed
pub const EXIT_OK: i32 = 0;
/// Exit code for stale or unknown inputs and for digest failures
pub const EXIT_STALE: i32 = 1;
/// Exit code for invalid usage or configuration
pub const EXIT_USAGE: i32 = 2;

/// recipe-digest - fingerprint a build recipe and every file it references
#[derive(Debug, Parser)]
#[command(name = "recipe-digest")]
#[command(about = "Deterministic fingerprint of a build recipe and every file it references")]
#[command(version)]
pub struct Cli {
    /// Path to the recipe; its directory is the build context
    pub recipe: PathBuf,

    /// How remote (URL) sources contribute to the digest
    #[arg(long, value_enum)]
    pub remote: Option<RemoteArg>,

    /// Number of resolver workers
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Previously recorded digest (hex); prints fresh, stale or unknown instead
    #[arg(long, value_name = "HEX")]
    pub compare: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoteArg {
    Unchanged,
    AlwaysChanged,
}

impl From<RemoteArg> for RemoteTreatment {
    fn from(arg: RemoteArg) -> Self {
        match arg {
            RemoteArg::Unchanged => RemoteTreatment::Unchanged,
            RemoteArg::AlwaysChanged => RemoteTreatment::AlwaysChanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Load layered settings, then apply flag overrides
    pub fn settings(&self) -> Result<Settings, DigestError> {
        let loaded = match &self.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        };
        let mut settings = loaded.map_err(|e| DigestError::Config(e.to_string()))?;

        if let Some(remote) = self.remote {
            settings.digest.remote_treatment = remote.into();
        }
        if let Some(workers) = self.workers {
            settings.digest.workers = usize::from(workers);
        }
        self.apply_logging_overrides(&mut settings.logging);
        settings.digest.validate()?;
        Ok(settings)
    }

    fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }

    /// The `--compare` digest, if given
    pub fn previous_digest(&self) -> Result<Option<Digest>, DigestError> {
        self.compare
            .as_deref()
            .map(|hex| {
                Digest::from_hex(hex)
                    .map_err(|e| DigestError::Config(format!("Invalid --compare digest: {}", e)))
            })
            .transpose()
    }
}

/// Result of one CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliOutcome {
    Digest(Digest),
    Checked {
        status: Staleness,
        previous: Digest,
    },
}

impl CliOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliOutcome::Digest(_) => EXIT_OK,
            CliOutcome::Checked { status, .. } if !status.needs_rebuild() => EXIT_OK,
            CliOutcome::Checked { .. } => EXIT_STALE,
        }
    }

    /// Render for stdout
    pub fn render(&self, recipe: &Path, format: OutputFormat) -> String {
        match (self, format) {
            (CliOutcome::Digest(digest), OutputFormat::Text) => digest.to_hex(),
            (CliOutcome::Digest(digest), OutputFormat::Json) => json!({
                "recipe": recipe.display().to_string(),
                "digest": digest.to_hex(),
            })
            .to_string(),
            (CliOutcome::Checked { status, .. }, OutputFormat::Text) => match status {
                Staleness::Fresh => status.as_str().green().to_string(),
                Staleness::Stale { .. } => status.as_str().yellow().to_string(),
                Staleness::Unknown => status.as_str().red().to_string(),
            },
            (CliOutcome::Checked { status, previous }, OutputFormat::Json) => {
                let digest = match status {
                    Staleness::Fresh => Some(previous.to_hex()),
                    Staleness::Stale { current } => Some(current.to_hex()),
                    Staleness::Unknown => None,
                };
                json!({
                    "recipe": recipe.display().to_string(),
                    "status": status.as_str(),
                    "digest": digest,
                })
                .to_string()
            }
        }
    }
}

/// Execution context for one invocation: resolved settings plus the parsed flags
pub struct CliContext {
    settings: Settings,
}

impl CliContext {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Compute the digest, or compare it with `previous` when given
    pub async fn execute(
        &self,
        recipe: &Path,
        previous: Option<Digest>,
    ) -> Result<CliOutcome, DigestError> {
        let config = &self.settings.digest;
        match previous {
            Some(previous) => {
                let status = staleness::check_staleness(recipe, config, Some(&previous)).await;
                Ok(CliOutcome::Checked { status, previous })
            }
            None => Ok(CliOutcome::Digest(engine::compute_digest(recipe, config).await?)),
        }
    }
}
