//! File entries carrying a deferred open capability

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// A readable content stream produced by [`OpenedFileEntry::open`]
pub type ContentStream = Box<dyn Read + Send>;

/// Deferred content access, invoked only when the content is actually hashed
pub type LateOpen = Box<dyn Fn() -> io::Result<ContentStream> + Send + Sync>;

/// A file (or synthesized remote content) to be fed into the digest
///
/// Holds the capability to open its content, never an open handle, so any number of
/// entries can be queued without consuming file descriptors.
pub struct OpenedFileEntry {
    filename: String,
    late_open: LateOpen,
}

impl OpenedFileEntry {
    pub fn new(filename: impl Into<String>, late_open: LateOpen) -> Self {
        Self {
            filename: filename.into(),
            late_open,
        }
    }

    /// Entry backed by a file on disk, opened lazily
    pub fn local(filename: impl Into<String>, path: PathBuf) -> Self {
        Self::new(
            filename,
            Box::new(move || -> io::Result<ContentStream> { Ok(Box::new(File::open(&path)?)) }),
        )
    }

    /// Entry whose content is fixed bytes held in memory
    pub fn synthetic(filename: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        let content: Arc<[u8]> = content.into();
        Self::new(
            filename,
            Box::new(move || -> io::Result<ContentStream> {
                Ok(Box::new(Cursor::new(Arc::clone(&content))))
            }),
        )
    }

    /// Canonical identifier; the sort key for hashing order
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Produce a fresh stream over the entry's content
    pub fn open(&self) -> io::Result<ContentStream> {
        (self.late_open)()
    }
}

impl fmt::Debug for OpenedFileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedFileEntry")
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}
