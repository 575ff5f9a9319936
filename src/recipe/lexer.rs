//! Physical-to-logical line splitting
//!
//! Handles parser directives, comments, line continuations and heredoc bodies, so the
//! instruction parser only ever sees one complete instruction per [`LogicalLine`].

use crate::error::{ParseError, ParseErrorKind};

const DEFAULT_ESCAPE: char = '\\';

/// Parser directives from the leading comment block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives {
    pub escape: char,
    pub syntax: Option<String>,
    pub check: Option<String>,
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            escape: DEFAULT_ESCAPE,
            syntax: None,
            check: None,
        }
    }
}

/// Inline document attached to a RUN/COPY/ADD instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heredoc {
    pub name: String,
    pub content: String,
}

/// One complete instruction with continuations joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based line where the instruction starts
    pub line: usize,
    pub text: String,
    pub heredocs: Vec<Heredoc>,
}

/// Split recipe text into parser directives and logical instruction lines
pub fn split_lines(input: &str) -> Result<(Directives, Vec<LogicalLine>), ParseError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let physical: Vec<&str> = input
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    let (directives, mut idx) = parse_directives(&physical)?;
    let escape = directives.escape;
    let mut lines = Vec::new();

    while idx < physical.len() {
        let raw = physical[idx];
        if is_blank_or_comment(raw) {
            idx += 1;
            continue;
        }

        let start = idx + 1;
        let mut text = String::new();
        let mut current = raw;
        idx += 1;
        loop {
            match strip_continuation(current, escape) {
                Some(head) => {
                    text.push_str(head);
                    // Comments and blank lines inside a continuation are dropped
                    while idx < physical.len() && is_blank_or_comment(physical[idx]) {
                        idx += 1;
                    }
                    if idx >= physical.len() {
                        break;
                    }
                    current = physical[idx];
                    idx += 1;
                }
                None => {
                    text.push_str(current);
                    break;
                }
            }
        }

        let mut heredocs = Vec::new();
        if allows_heredocs(&text) {
            for (name, chomp) in heredoc_markers(&text) {
                let (content, next) = read_heredoc(&physical, idx, &name, chomp)
                    .ok_or_else(|| {
                        ParseError::new(start, ParseErrorKind::UnterminatedHeredoc(name.clone()))
                    })?;
                idx = next;
                heredocs.push(Heredoc { name, content });
            }
        }

        lines.push(LogicalLine {
            line: start,
            text: text.trim().to_string(),
            heredocs,
        });
    }

    Ok((directives, lines))
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Returns the line without its trailing escape character, if it continues
fn strip_continuation(line: &str, escape: char) -> Option<&str> {
    let trimmed = line.trim_end();
    trimmed.strip_suffix(escape)
}

fn parse_directives(lines: &[&str]) -> Result<(Directives, usize), ParseError> {
    let mut directives = Directives::default();
    let mut seen: Vec<String> = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let Some((key, value)) = directive(lines[idx]) else {
            break;
        };
        if !matches!(key.as_str(), "escape" | "syntax" | "check") {
            break;
        }
        if seen.contains(&key) {
            return Err(ParseError::new(
                idx + 1,
                ParseErrorKind::DuplicateDirective(key),
            ));
        }
        match key.as_str() {
            "escape" => {
                directives.escape = match value.as_str() {
                    "\\" => '\\',
                    "`" => '`',
                    _ => {
                        return Err(ParseError::new(idx + 1, ParseErrorKind::InvalidEscape(value)))
                    }
                };
            }
            "syntax" => directives.syntax = Some(value),
            _ => directives.check = Some(value),
        }
        seen.push(key);
        idx += 1;
    }

    Ok((directives, idx))
}

/// Match `# key=value`, returning the lowercased key and trimmed value
fn directive(line: &str) -> Option<(String, String)> {
    let body = line.trim_start().strip_prefix('#')?;
    let (key, value) = body.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((key.to_ascii_lowercase(), value.trim().to_string()))
}

fn allows_heredocs(text: &str) -> bool {
    let keyword = text.split_whitespace().next().unwrap_or_default();
    ["RUN", "COPY", "ADD"]
        .iter()
        .any(|k| keyword.eq_ignore_ascii_case(k))
}

/// Heredoc markers (`<<EOF`, `<<-EOF`, `<<"EOF"`) in the order they appear
fn heredoc_markers(text: &str) -> Vec<(String, bool)> {
    text.split_whitespace().filter_map(parse_marker).collect()
}

/// Parse a single `<<[-]NAME` token into its terminator name and chomp flag
pub(crate) fn parse_marker(token: &str) -> Option<(String, bool)> {
    let rest = token.strip_prefix("<<")?;
    let (chomp, rest) = match rest.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, rest),
    };
    let name = ['"', '\'']
        .iter()
        .find_map(|q| rest.strip_prefix(*q).and_then(|r| r.strip_suffix(*q)))
        .unwrap_or(rest);
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((name.to_string(), chomp))
}

fn read_heredoc(lines: &[&str], start: usize, name: &str, chomp: bool) -> Option<(String, usize)> {
    let mut content = String::new();
    for (offset, line) in lines[start.min(lines.len())..].iter().enumerate() {
        let candidate = if chomp { line.trim_start_matches('\t') } else { line };
        if candidate == name {
            return Some((content, start + offset + 1));
        }
        content.push_str(candidate);
        content.push('\n');
    }
    None
}
