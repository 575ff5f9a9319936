//! Path Resolver
//!
//! A fixed pool of workers pulls source references off a shared bounded queue and
//! expands each one into file entries. Remote references become one synthesized entry;
//! local references are walked on the blocking pool. Entries only carry the capability
//! to open their content, so nothing here holds a file descriptor.
//!
//! The first failure is stored in a [`FirstError`] cell, which also fires the shared
//! [`CancelToken`] so the remaining workers stop taking new work.

pub mod cancel;
pub mod entry;
pub mod local;
pub mod remote;

pub use cancel::{CancelToken, FirstError};
pub use entry::{ContentStream, LateOpen, OpenedFileEntry};
pub use local::{BuildContext, LocatedPath};

use crate::config::{DigestConfig, RemoteTreatment};
use crate::error::ResolveError;
use crate::types::SourceReference;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Pool of resolver workers sharing one reference queue
pub struct ResolverPool {
    workers: usize,
    treatment: RemoteTreatment,
    context: Arc<BuildContext>,
}

impl ResolverPool {
    pub fn new(config: &DigestConfig, context: BuildContext) -> Self {
        Self {
            workers: config.workers.max(1),
            treatment: config.remote_treatment,
            context: Arc::new(context),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Start the workers
    ///
    /// The entry channel closes once every worker has exited, which is how the
    /// consumer knows resolution is complete.
    pub fn spawn(
        &self,
        references: mpsc::Receiver<SourceReference>,
        entries: mpsc::Sender<OpenedFileEntry>,
        failure: FirstError,
        cancel: CancelToken,
    ) -> Vec<JoinHandle<()>> {
        let queue = Arc::new(Mutex::new(references));
        (0..self.workers)
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    queue: Arc::clone(&queue),
                    entries: entries.clone(),
                    context: Arc::clone(&self.context),
                    treatment: self.treatment,
                    failure: failure.clone(),
                    cancel: cancel.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect()
    }
}

struct Worker {
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<SourceReference>>>,
    entries: mpsc::Sender<OpenedFileEntry>,
    context: Arc<BuildContext>,
    treatment: RemoteTreatment,
    failure: FirstError,
    cancel: CancelToken,
}

impl Worker {
    async fn run(self) {
        debug!(worker_id = self.id, "Resolver worker started");
        let mut resolved = 0usize;

        while !self.cancel.is_cancelled() {
            let next = {
                let mut queue = self.queue.lock().await;
                queue.recv().await
            };
            let Some(reference) = next else {
                break;
            };
            if self.cancel.is_cancelled() {
                break;
            }

            match self.resolve(&reference).await {
                Ok(count) => {
                    resolved += count;
                    debug!(
                        worker_id = self.id,
                        reference = %reference,
                        line = reference.line,
                        entries = count,
                        "Resolved reference"
                    );
                }
                Err(err) => {
                    warn!(
                        worker_id = self.id,
                        reference = %reference,
                        line = reference.line,
                        error = %err,
                        "Resolving reference failed"
                    );
                    self.failure.record(err);
                    break;
                }
            }
        }

        debug!(worker_id = self.id, entries = resolved, "Resolver worker stopped");
    }

    async fn resolve(&self, reference: &SourceReference) -> Result<usize, ResolveError> {
        if reference.is_remote() {
            let entry = remote::remote_entry(&reference.path, self.treatment);
            // A closed channel means the pipeline already gave up
            let sent = self.entries.send(entry).await.is_ok();
            return Ok(usize::from(sent));
        }

        let context = Arc::clone(&self.context);
        let cancel = self.cancel.clone();
        let entries = self.entries.clone();
        let path = reference.path.clone();
        tokio::task::spawn_blocking(move || {
            local::walk_local(&context, &path, &cancel, |entry| {
                entries.blocking_send(entry).is_ok()
            })
        })
        .await
        .map_err(|e| ResolveError::WorkerFailed(e.to_string()))?
    }
}
