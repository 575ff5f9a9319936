//! Digest Engine
//!
//! Runs one digest computation end to end:
//!
//! 1. **Extracting**: parse the recipe and collect its source references
//! 2. **Resolving**: a producer task feeds references into a bounded queue, drained by
//!    the [`ResolverPool`]; resolved entries flow through a second bounded queue into
//!    the [`Sequencer`]
//! 3. **Sequencing**: once every worker has exited, sort the entries by filename
//! 4. **Hashing**: stream the recipe and every entry through the [`Accumulator`] on
//!    the blocking pool
//!
//! Any failure moves the pipeline to `Failed` and no digest is produced.

use crate::accumulator::Accumulator;
use crate::config::DigestConfig;
use crate::error::{DigestError, HashError, ResolveError};
use crate::recipe;
use crate::resolve::{BuildContext, CancelToken, FirstError, OpenedFileEntry, ResolverPool};
use crate::sequence::Sequencer;
use crate::types::{Digest, SourceReference};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Lifecycle of a single digest computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    Extracting,
    Resolving,
    Sequencing,
    Hashing,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Init => "init",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Resolving => "resolving",
            PipelineStage::Sequencing => "sequencing",
            PipelineStage::Hashing => "hashing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records stage transitions and logs each one
#[derive(Debug)]
struct StageTracker {
    stage: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        debug!(stage = %PipelineStage::Init, "Digest pipeline started");
        Self {
            stage: PipelineStage::Init,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!(from = %self.stage, to = %next, "Digest pipeline stage");
        self.stage = next;
    }

    fn fail(&mut self, err: &DigestError) {
        debug!(
            from = %self.stage,
            to = %PipelineStage::Failed,
            error_kind = err.kind(),
            error = %err,
            "Digest pipeline stage"
        );
        self.stage = PipelineStage::Failed;
    }
}

struct HashSummary {
    digest: Digest,
    files: usize,
    content_bytes: u64,
}

/// Compute the digest of a recipe file and every file it references
///
/// The build context is the directory containing the recipe.
pub async fn compute_digest(recipe_path: &Path, config: &DigestConfig) -> Result<Digest, DigestError> {
    config.validate()?;

    let bytes = std::fs::read(recipe_path).map_err(|source| DigestError::RecipeRead {
        path: recipe_path.to_path_buf(),
        source,
    })?;
    let context_root = context_root_for(recipe_path)?;
    debug!(
        recipe = %recipe_path.display(),
        context = %context_root.display(),
        recipe_bytes = bytes.len(),
        "Loaded recipe"
    );

    compute_digest_from_bytes(&bytes, &context_root, config).await
}

/// Same pipeline as [`compute_digest`] for a recipe already held in memory
pub async fn compute_digest_from_bytes(
    recipe: &[u8],
    context_root: &Path,
    config: &DigestConfig,
) -> Result<Digest, DigestError> {
    config.validate()?;

    let start = Instant::now();
    let mut tracker = StageTracker::new();
    match run_pipeline(recipe, context_root, config, &mut tracker).await {
        Ok(summary) => {
            tracker.advance(PipelineStage::Done);
            info!(
                file_count = summary.files,
                content_bytes = summary.content_bytes,
                duration_ms = start.elapsed().as_millis() as u64,
                digest = %summary.digest,
                "Computed recipe digest"
            );
            Ok(summary.digest)
        }
        Err(err) => {
            tracker.fail(&err);
            Err(err)
        }
    }
}

/// Blocking wrapper around [`compute_digest`] for callers without a runtime
///
/// Builds a fresh runtime. Returns [`DigestError::Runtime`] when called from inside
/// an async context, where blocking would stall a runtime thread.
pub fn compute_digest_blocking(recipe_path: &Path, config: &DigestConfig) -> Result<Digest, DigestError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(DigestError::Runtime(
            "Cannot compute a blocking digest from within an async runtime; await compute_digest instead"
                .to_string(),
        ));
    }
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| DigestError::Runtime(format!("Failed to create runtime: {}", e)))?;
    runtime.block_on(compute_digest(recipe_path, config))
}

fn context_root_for(recipe_path: &Path) -> Result<PathBuf, DigestError> {
    let parent = match recipe_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    dunce::canonicalize(parent).map_err(|source| DigestError::RecipeRead {
        path: parent.to_path_buf(),
        source,
    })
}

/// Run extraction, resolution and sequencing without hashing
///
/// Returns the entries in the exact order the accumulator would consume them.
pub async fn resolve_entries(
    recipe: &[u8],
    context_root: &Path,
    config: &DigestConfig,
) -> Result<Vec<OpenedFileEntry>, DigestError> {
    config.validate()?;
    let mut tracker = StageTracker::new();
    sequenced_entries(recipe, context_root, config, &mut tracker)
        .await
        .map_err(|err| {
            tracker.fail(&err);
            err
        })
}

async fn run_pipeline(
    recipe: &[u8],
    context_root: &Path,
    config: &DigestConfig,
    tracker: &mut StageTracker,
) -> Result<HashSummary, DigestError> {
    let entries = sequenced_entries(recipe, context_root, config, tracker).await?;

    tracker.advance(PipelineStage::Hashing);
    let base = recipe.to_vec();
    let summary = tokio::task::spawn_blocking(move || hash_entries(&base, &entries))
        .await
        .map_err(|e| HashError::TaskFailed(e.to_string()))??;
    Ok(summary)
}

async fn sequenced_entries(
    recipe: &[u8],
    context_root: &Path,
    config: &DigestConfig,
    tracker: &mut StageTracker,
) -> Result<Vec<OpenedFileEntry>, DigestError> {
    tracker.advance(PipelineStage::Extracting);
    let parsed = recipe::parse(recipe)?;
    let references = parsed.source_references();
    debug!(
        stages = parsed.stages.len(),
        references = references.len(),
        "Extracted source references"
    );

    tracker.advance(PipelineStage::Resolving);
    let cancel = CancelToken::new();
    let failure = FirstError::new(cancel.clone());
    let (ref_tx, ref_rx) = mpsc::channel(config.buffer_capacity);
    let (entry_tx, entry_rx) = mpsc::channel(config.buffer_capacity);

    let pool = ResolverPool::new(config, BuildContext::new(context_root));
    let producer = spawn_extractor(references, ref_tx, cancel.clone());
    let workers = pool.spawn(ref_rx, entry_tx, failure.clone(), cancel.clone());

    let mut sequencer = Sequencer::new();
    sequencer.collect(entry_rx).await;

    for handle in workers {
        if let Err(e) = handle.await {
            failure.record(ResolveError::WorkerFailed(e.to_string()));
        }
    }
    if let Err(e) = producer.await {
        failure.record(ResolveError::WorkerFailed(format!("extractor task failed: {}", e)));
    }
    if let Some(err) = failure.take() {
        return Err(err.into());
    }

    tracker.advance(PipelineStage::Sequencing);
    debug!(entries = sequencer.len(), "Sequencing resolved entries");
    Ok(sequencer.finish())
}

/// Feed references to the resolver queue, stopping early on cancellation
fn spawn_extractor(
    references: Vec<SourceReference>,
    tx: mpsc::Sender<SourceReference>,
    cancel: CancelToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for reference in references {
            if cancel.is_cancelled() {
                break;
            }
            // Every worker gone means they all stopped on an error
            if tx.send(reference).await.is_err() {
                break;
            }
        }
    })
}

fn hash_entries(recipe: &[u8], entries: &[OpenedFileEntry]) -> Result<HashSummary, HashError> {
    let mut accumulator = Accumulator::new(recipe);
    for entry in entries {
        accumulator.add_entry(entry)?;
    }
    Ok(HashSummary {
        files: accumulator.entries(),
        content_bytes: accumulator.content_bytes(),
        digest: accumulator.finalize(),
    })
}
