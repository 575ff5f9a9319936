//! Staleness check for build orchestrators
//!
//! Compares a freshly computed digest with the one recorded at the last build. A
//! digest failure never aborts the caller: it is logged and reported as
//! [`Staleness::Unknown`], which callers should treat as "rebuild".

use crate::config::DigestConfig;
use crate::engine;
use crate::types::Digest;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of comparing the current digest with a stored one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Staleness {
    /// Inputs are unchanged since the stored digest was taken
    Fresh,
    /// Inputs changed, or no previous digest exists
    Stale { current: Digest },
    /// The digest could not be computed
    Unknown,
}

impl Staleness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Staleness::Fresh => "fresh",
            Staleness::Stale { .. } => "stale",
            Staleness::Unknown => "unknown",
        }
    }

    pub fn needs_rebuild(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }

    /// Compare an already computed digest with the stored one
    pub fn classify(current: Digest, previous: Option<&Digest>) -> Self {
        match previous {
            Some(prev) if *prev == current => Staleness::Fresh,
            _ => Staleness::Stale { current },
        }
    }
}

/// Compute the recipe's digest and compare it with `previous`
pub async fn check_staleness(
    recipe_path: &Path,
    config: &DigestConfig,
    previous: Option<&Digest>,
) -> Staleness {
    match engine::compute_digest(recipe_path, config).await {
        Ok(current) => {
            let status = Staleness::classify(current, previous);
            debug!(
                recipe = %recipe_path.display(),
                status = status.as_str(),
                "Checked recipe staleness"
            );
            status
        }
        Err(err) => {
            warn!(
                recipe = %recipe_path.display(),
                error_kind = err.kind(),
                error = %err,
                "Recipe digest failed; treating inputs as unknown"
            );
            Staleness::Unknown
        }
    }
}
