//! Error types for recipe fingerprinting
//!
//! Every failure aborts the whole computation. There is no partial digest.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by a digest computation
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Reading recipe {path:?} failed: {source}")]
    RecipeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl DigestError {
    /// Short machine-readable kind, used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            DigestError::RecipeRead { .. } => "recipe_read",
            DigestError::Parse(_) => "parse",
            DigestError::Resolve(_) => "resolve",
            DigestError::Hash(_) => "hash",
            DigestError::Config(_) => "config",
            DigestError::Runtime(_) => "runtime",
        }
    }
}

/// Malformed recipe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parsing recipe failed at line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line where the offending instruction starts
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("file with no instructions")]
    Empty,

    #[error("unknown instruction: {0}")]
    UnknownInstruction(String),

    #[error("{0} requires at least two arguments")]
    MissingArguments(&'static str),

    #[error("FROM requires an image argument")]
    MissingImage,

    #[error("FROM has a malformed stage name clause: {0}")]
    MalformedStageName(String),

    #[error("{0} is not allowed before the first FROM")]
    NoBuildStage(String),

    #[error("unknown flag for {instruction}: --{flag}")]
    UnknownFlag {
        instruction: &'static str,
        flag: String,
    },

    #[error("invalid escape directive value: {0:?}")]
    InvalidEscape(String),

    #[error("parser directive {0:?} specified twice")]
    DuplicateDirective(String),

    #[error("unterminated heredoc, expected terminator {0:?}")]
    UnterminatedHeredoc(String),
}

/// A declared source path could not be expanded into file entries
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Referenced path {reference:?} does not exist")]
    NotFound { reference: String },

    #[error("Referenced path {reference:?} is outside the build context")]
    OutsideContext { reference: String },

    #[error("Walking {reference:?} failed: {source}")]
    Walk {
        reference: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("Resolver worker failed: {0}")]
    WorkerFailed(String),
}

impl ResolveError {
    /// Classify a walk failure, preserving `NotFound` for missing roots
    pub fn from_walk(reference: &str, source: walkdir::Error) -> Self {
        let missing = source
            .io_error()
            .map(|e| e.kind() == std::io::ErrorKind::NotFound)
            .unwrap_or(false);
        if missing && source.depth() == 0 {
            ResolveError::NotFound {
                reference: reference.to_string(),
            }
        } else {
            ResolveError::Walk {
                reference: reference.to_string(),
                source,
            }
        }
    }
}

/// Reading referenced content failed while hashing
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Opening {filename:?} for hashing failed: {source}")]
    Open {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Reading {filename:?} while hashing failed: {source}")]
    Read {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Hashing task failed: {0}")]
    TaskFailed(String),
}
