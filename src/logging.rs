//! Logging
//!
//! Installs a `tracing` subscriber for the binary. Library code only emits events;
//! embedders that bring their own subscriber never call [`init_logging`].

use crate::error::DigestError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const ENV_FILTER: &str = "RECIPE_DIGEST_LOG";
const ENV_FORMAT: &str = "RECIPE_DIGEST_LOG_FORMAT";
const ENV_OUTPUT: &str = "RECIPE_DIGEST_LOG_OUTPUT";
const ENV_FILE: &str = "RECIPE_DIGEST_LOG_FILE";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
}

impl FromStr for LogOutput {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            other => Err(DigestError::Config(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
                other
            ))),
        }
    }
}

impl fmt::Display for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogOutput::Stdout => "stdout",
            LogOutput::Stderr => "stderr",
            LogOutput::File => "file",
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Level for every target without a `modules` entry
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` or `json`
    #[serde(default = "default_format")]
    pub format: String,

    /// `stdout`, `stderr` or `file`
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file for `file` output; the platform state directory when unset
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// ANSI colors for text output to a terminal stream
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-target levels, e.g. `recipe_digest::resolve = "trace"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    LogOutput::default().to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Install the global subscriber.
///
/// `RECIPE_DIGEST_LOG*` environment variables win over `config`, which already carries
/// any CLI flags.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), DigestError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    if !config.enabled {
        return Registry::default()
            .with(EnvFilter::new("off"))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::sink))
            .try_init()
            .map_err(|e| DigestError::Config(format!("Failed to install logger: {}", e)));
    }

    let filter = build_env_filter(config)?;
    let json = determine_format(config)? == "json";
    let output = determine_output(config)?;
    let writer = make_writer(output, || log_file_path(config.file.clone()))?;
    let use_color = config.color && output != LogOutput::File;

    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let installed = if json {
        Registry::default()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else {
        Registry::default()
            .with(filter)
            .with(layer.with_ansi(use_color))
            .try_init()
    };

    installed.map_err(|e| DigestError::Config(format!("Failed to install logger: {}", e)))
}

/// `RECIPE_DIGEST_LOG` replaces the whole filter; otherwise the level plus `modules`
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, DigestError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, level) in &config.modules {
        let directive = format!("{}={}", module, level)
            .parse()
            .map_err(|e| DigestError::Config(format!("Invalid log directive: {}", e)))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

fn determine_format(config: &LoggingConfig) -> Result<String, DigestError> {
    if let Ok(format) = std::env::var(ENV_FORMAT) {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }
    match config.format.as_str() {
        "json" | "text" => Ok(config.format.clone()),
        other => Err(DigestError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

fn determine_output(config: &LoggingConfig) -> Result<LogOutput, DigestError> {
    match std::env::var(ENV_OUTPUT) {
        Ok(output) => output.parse(),
        Err(_) => config.output.parse(),
    }
}

/// Log file path: `RECIPE_DIGEST_LOG_FILE`, then the configured path, then the default
pub fn log_file_path(configured: Option<PathBuf>) -> Result<PathBuf, DigestError> {
    if let Ok(env_path) = std::env::var(ENV_FILE) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    match configured {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => default_log_file_path(),
    }
}

fn default_log_file_path() -> Result<PathBuf, DigestError> {
    let project_dirs = directories::ProjectDirs::from("", "recipe-digest", "recipe-digest")
        .ok_or_else(|| {
            DigestError::Config(
                "Could not determine platform state directory for log file".to_string(),
            )
        })?;
    // macOS and Windows have no state dir
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir());
    Ok(dir.join("recipe-digest.log"))
}

fn make_writer(
    output: LogOutput,
    file_path: impl FnOnce() -> Result<PathBuf, DigestError>,
) -> Result<BoxMakeWriter, DigestError> {
    Ok(match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => BoxMakeWriter::new(open_log_file(&file_path()?)?),
    })
}

fn open_log_file(log_file: &Path) -> Result<std::sync::Mutex<std::fs::File>, DigestError> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DigestError::Config(format!("Failed to create log directory: {}", e))
        })?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| {
            DigestError::Config(format!("Failed to open log file {:?}: {}", log_file, e))
        })?;
    Ok(std::sync::Mutex::new(file))
}
