//! Recipe Digest: Deterministic Build-Input Fingerprints
//!
//! Computes a single 512-bit digest over a Dockerfile-style build recipe and every
//! file its COPY and ADD instructions reference, so a build orchestrator can tell
//! whether an image needs rebuilding. Equal inputs always produce an equal digest,
//! whatever the worker count or scheduling.

pub mod accumulator;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod recipe;
pub mod resolve;
pub mod sequence;
pub mod staleness;
pub mod types;

pub use config::{DigestConfig, RemoteTreatment, Settings};
pub use engine::{
    compute_digest, compute_digest_blocking, compute_digest_from_bytes, resolve_entries,
    PipelineStage,
};
pub use error::{DigestError, HashError, ParseError, ParseErrorKind, ResolveError};
pub use staleness::{check_staleness, Staleness};
pub use types::{Digest, SourceReference, DIGEST_LEN};
