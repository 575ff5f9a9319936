//! Source extraction: the build-context references a recipe declares

use super::instructions::{Command, CopyCommand, Stage};
use crate::types::SourceReference;

/// Collect source references from all stages
///
/// Flags, including `--from`, do not affect which sources are emitted. Heredoc sources
/// carry inline content that is already part of the recipe bytes, so they yield none.
pub fn collect_source_references(stages: &[Stage]) -> Vec<SourceReference> {
    let mut references = Vec::new();
    for stage in stages {
        collect_stage(stage, &mut references);
    }
    references
}

fn collect_stage(stage: &Stage, references: &mut Vec<SourceReference>) {
    for command in &stage.commands {
        match command {
            Command::Copy(copy) | Command::Add(copy) => push_sources(copy, references),
            Command::Other { .. } => {}
        }
    }
}

fn push_sources(copy: &CopyCommand, references: &mut Vec<SourceReference>) {
    references.extend(
        copy.sources
            .iter()
            .filter(|s| !copy.is_heredoc_source(s))
            .map(|s| SourceReference::new(s.clone(), copy.line)),
    );
}
