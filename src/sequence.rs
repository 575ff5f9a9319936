//! Deterministic Sequencer
//!
//! Resolver workers finish in whatever order the scheduler allows. The sequencer
//! buffers every entry until resolution is complete, then sorts by filename so the
//! hashing order depends only on the set of entries.

use crate::resolve::OpenedFileEntry;
use tokio::sync::mpsc;

/// Collects unordered entries and re-emits them in canonical order
#[derive(Debug, Default)]
pub struct Sequencer {
    entries: Vec<OpenedFileEntry>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: OpenedFileEntry) {
        self.entries.push(entry);
    }

    /// Drain `rx` until every sender is gone
    pub async fn collect(&mut self, mut rx: mpsc::Receiver<OpenedFileEntry>) {
        while let Some(entry) = rx.recv().await {
            self.entries.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort by filename (byte-wise, ascending) and hand the sequence over
    ///
    /// The sort is stable, so duplicate filenames keep a fixed relative order.
    pub fn finish(mut self) -> Vec<OpenedFileEntry> {
        self.entries
            .sort_by(|a, b| a.filename().as_bytes().cmp(b.filename().as_bytes()));
        self.entries
    }
}
