//! Expansion of local references into file entries

use super::cancel::CancelToken;
use super::entry::OpenedFileEntry;
use crate::error::ResolveError;
use std::path::{Component, Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// Root directory that local references are resolved against
#[derive(Debug, Clone)]
pub struct BuildContext {
    root: PathBuf,
}

/// A local reference located inside the build context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedPath {
    /// Absolute (or root-joined) filesystem path
    pub path: PathBuf,
    /// `/`-separated path relative to the context root; empty for the root itself
    pub name: String,
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lexically resolve a reference inside the context
    ///
    /// A leading `/` is relative to the context root. `..` may not climb above the root.
    pub fn locate(&self, reference: &str) -> Result<LocatedPath, ResolveError> {
        let mut parts: Vec<String> = Vec::new();
        for component in Path::new(reference).components() {
            match component {
                Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(ResolveError::OutsideContext {
                            reference: reference.to_string(),
                        });
                    }
                }
                Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            }
        }

        let path = parts.iter().fold(self.root.clone(), |acc, p| acc.join(p));
        Ok(LocatedPath {
            path,
            name: parts.join("/"),
        })
    }
}

/// Walk a local reference, handing one entry per regular file to `emit`
///
/// `emit` returns false when the consumer is gone, which ends the walk quietly. The
/// walk also stops as soon as `cancel` fires. Returns the number of entries emitted.
pub fn walk_local(
    context: &BuildContext,
    reference: &str,
    cancel: &CancelToken,
    mut emit: impl FnMut(OpenedFileEntry) -> bool,
) -> Result<usize, ResolveError> {
    let located = context.locate(reference)?;
    let mut emitted = 0;

    for entry in WalkDir::new(&located.path) {
        if cancel.is_cancelled() {
            break;
        }
        let entry = entry.map_err(|e| ResolveError::from_walk(reference, e))?;
        let file_type = entry.file_type();
        let is_file = if file_type.is_symlink() {
            std::fs::metadata(entry.path())
                .map(|m| m.is_file())
                .unwrap_or(false)
        } else {
            file_type.is_file()
        };
        if !is_file {
            continue;
        }

        let suffix = entry.path().strip_prefix(&located.path).unwrap_or(Path::new(""));
        let name = join_name(&located.name, suffix);
        trace!(reference, filename = %name, "Resolved local file");
        if !emit(OpenedFileEntry::local(name, entry.into_path())) {
            break;
        }
        emitted += 1;
    }

    Ok(emitted)
}

fn join_name(base: &str, suffix: &Path) -> String {
    let mut name = base.to_string();
    for component in suffix.components() {
        if let Component::Normal(part) = component {
            if !name.is_empty() {
                name.push('/');
            }
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}
