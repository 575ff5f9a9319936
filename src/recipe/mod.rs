//! Recipe parsing and source extraction
//!
//! Parses a Dockerfile-style build recipe into stages and commands, then pulls out every
//! source path declared by COPY and ADD. Only the parts of the grammar needed to find
//! build inputs are interpreted; everything else is kept as opaque instruction text.

pub mod extract;
pub mod instructions;
pub mod lexer;

use crate::error::{ParseError, ParseErrorKind};
use crate::types::SourceReference;

pub use instructions::{Command, CopyCommand, Flag, Keyword, Stage};
pub use lexer::{Directives, Heredoc};

/// A parsed build recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub directives: Directives,
    /// ARG instructions preceding the first FROM
    pub meta_args: Vec<String>,
    pub stages: Vec<Stage>,
}

impl Recipe {
    /// Every build-context reference declared by the recipe
    pub fn source_references(&self) -> Vec<SourceReference> {
        extract::collect_source_references(&self.stages)
    }
}

/// Parse raw recipe bytes
pub fn parse(bytes: &[u8]) -> Result<Recipe, ParseError> {
    let text = String::from_utf8_lossy(bytes);
    let (directives, lines) = lexer::split_lines(&text)?;
    if lines.is_empty() {
        return Err(ParseError::new(1, ParseErrorKind::Empty));
    }

    let mut meta_args = Vec::new();
    let mut stages = Vec::new();
    for line in lines {
        instructions::apply_line(line, &mut meta_args, &mut stages)?;
    }

    // Only ARGs, no FROM at all
    if stages.is_empty() {
        return Err(ParseError::new(1, ParseErrorKind::MissingImage));
    }

    Ok(Recipe {
        directives,
        meta_args,
        stages,
    })
}
