//! Environment variable source: RECIPE_DIGEST_* prefix with __ between nested keys

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "RECIPE_DIGEST";

/// Add environment variable overlay to builder.
///
/// `RECIPE_DIGEST_DIGEST__REMOTE_TREATMENT=always_changed` sets `digest.remote_treatment`.
/// The prefix is joined with a single `_`; only nested keys use `__`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(environment()))
}

/// The `RECIPE_DIGEST_*` source; reads the process environment unless a map is supplied
/// through [`Environment::source`].
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
