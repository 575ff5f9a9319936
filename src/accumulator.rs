//! Digest Accumulator
//!
//! Streams the recipe bytes and then every sorted entry through a single BLAKE3 state,
//! finalized in extendable-output mode to a 64-byte [`Digest`].
//!
//! Layout fed to the hasher:
//!
//! ```text
//! recipe bytes || u64le(recipe len)
//! for each entry: u64le(name len) || name || content || u64le(content len)
//! ```
//!
//! Each entry's stream is opened right before it is copied and dropped right after, so
//! at most one content stream is open at a time.

use crate::error::HashError;
use crate::resolve::OpenedFileEntry;
use crate::types::{Digest, DIGEST_LEN};
use std::io;

/// Incremental digest over a recipe and its referenced entries
pub struct Accumulator {
    hasher: blake3::Hasher,
    entries: usize,
    content_bytes: u64,
}

impl Accumulator {
    /// Start a digest seeded with the recipe's own bytes
    pub fn new(recipe: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(recipe);
        hasher.update(&(recipe.len() as u64).to_le_bytes());
        Self {
            hasher,
            entries: 0,
            content_bytes: 0,
        }
    }

    /// Open, copy and close one entry
    pub fn add_entry(&mut self, entry: &OpenedFileEntry) -> Result<(), HashError> {
        let name = entry.filename().as_bytes();
        self.hasher.update(&(name.len() as u64).to_le_bytes());
        self.hasher.update(name);

        let mut stream = entry.open().map_err(|source| HashError::Open {
            filename: entry.filename().to_string(),
            source,
        })?;
        let copied = io::copy(&mut stream, &mut self.hasher).map_err(|source| HashError::Read {
            filename: entry.filename().to_string(),
            source,
        })?;
        drop(stream);

        self.hasher.update(&copied.to_le_bytes());
        self.entries += 1;
        self.content_bytes += copied;
        Ok(())
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn content_bytes(&self) -> u64 {
        self.content_bytes
    }

    pub fn finalize(self) -> Digest {
        let mut out = [0u8; DIGEST_LEN];
        self.hasher.finalize_xof().fill(&mut out);
        Digest::from_bytes(out)
    }
}

/// Digest a recipe followed by an already sorted entry sequence
pub fn digest_sequence<I>(recipe: &[u8], entries: I) -> Result<Digest, HashError>
where
    I: IntoIterator<Item = OpenedFileEntry>,
{
    let mut accumulator = Accumulator::new(recipe);
    for entry in entries {
        accumulator.add_entry(&entry)?;
    }
    Ok(accumulator.finalize())
}
