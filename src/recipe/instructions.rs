//! Typed recipe instructions and stages

use super::lexer::{parse_marker, Heredoc, LogicalLine};
use crate::error::{ParseError, ParseErrorKind};
use std::fmt;
use std::str::FromStr;

/// Instruction keywords understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Add,
    Arg,
    Cmd,
    Copy,
    Entrypoint,
    Env,
    Expose,
    From,
    Healthcheck,
    Label,
    Maintainer,
    Onbuild,
    Run,
    Shell,
    Stopsignal,
    User,
    Volume,
    Workdir,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Add => "ADD",
            Keyword::Arg => "ARG",
            Keyword::Cmd => "CMD",
            Keyword::Copy => "COPY",
            Keyword::Entrypoint => "ENTRYPOINT",
            Keyword::Env => "ENV",
            Keyword::Expose => "EXPOSE",
            Keyword::From => "FROM",
            Keyword::Healthcheck => "HEALTHCHECK",
            Keyword::Label => "LABEL",
            Keyword::Maintainer => "MAINTAINER",
            Keyword::Onbuild => "ONBUILD",
            Keyword::Run => "RUN",
            Keyword::Shell => "SHELL",
            Keyword::Stopsignal => "STOPSIGNAL",
            Keyword::User => "USER",
            Keyword::Volume => "VOLUME",
            Keyword::Workdir => "WORKDIR",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = match s.to_ascii_uppercase().as_str() {
            "ADD" => Keyword::Add,
            "ARG" => Keyword::Arg,
            "CMD" => Keyword::Cmd,
            "COPY" => Keyword::Copy,
            "ENTRYPOINT" => Keyword::Entrypoint,
            "ENV" => Keyword::Env,
            "EXPOSE" => Keyword::Expose,
            "FROM" => Keyword::From,
            "HEALTHCHECK" => Keyword::Healthcheck,
            "LABEL" => Keyword::Label,
            "MAINTAINER" => Keyword::Maintainer,
            "ONBUILD" => Keyword::Onbuild,
            "RUN" => Keyword::Run,
            "SHELL" => Keyword::Shell,
            "STOPSIGNAL" => Keyword::Stopsignal,
            "USER" => Keyword::User,
            "VOLUME" => Keyword::Volume,
            "WORKDIR" => Keyword::Workdir,
            _ => return Err(()),
        };
        Ok(keyword)
    }
}

/// A `--name[=value]` flag on an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub name: String,
    pub value: Option<String>,
}

const COPY_FLAGS: &[&str] = &["from", "chown", "chmod", "link", "parents", "exclude"];
const ADD_FLAGS: &[&str] = &["chown", "chmod", "link", "keep-git-dir", "checksum", "exclude"];

/// COPY or ADD: sources into a destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyCommand {
    pub line: usize,
    pub flags: Vec<Flag>,
    pub sources: Vec<String>,
    pub dest: String,
    pub heredocs: Vec<Heredoc>,
}

impl CopyCommand {
    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Whether a source names one of this command's inline heredocs
    pub fn is_heredoc_source(&self, source: &str) -> bool {
        parse_marker(source)
            .map(|(name, _)| self.heredocs.iter().any(|h| h.name == name))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Copy(CopyCommand),
    Add(CopyCommand),
    /// Any instruction that declares no build inputs
    Other {
        line: usize,
        keyword: Keyword,
        args: String,
    },
}

impl Command {
    pub fn line(&self) -> usize {
        match self {
            Command::Copy(c) | Command::Add(c) => c.line,
            Command::Other { line, .. } => *line,
        }
    }
}

/// A build stage opened by FROM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub line: usize,
    pub base: String,
    pub name: Option<String>,
    pub commands: Vec<Command>,
}

/// Parse one logical line into the stage list
pub(super) fn apply_line(
    line: LogicalLine,
    meta_args: &mut Vec<String>,
    stages: &mut Vec<Stage>,
) -> Result<(), ParseError> {
    let (word, rest) = match line.text.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line.text.as_str(), ""),
    };
    let keyword: Keyword = word.parse().map_err(|_| {
        ParseError::new(
            line.line,
            ParseErrorKind::UnknownInstruction(word.to_ascii_uppercase()),
        )
    })?;

    if keyword == Keyword::From {
        stages.push(parse_from(line.line, rest)?);
        return Ok(());
    }

    let Some(stage) = stages.last_mut() else {
        if keyword == Keyword::Arg {
            meta_args.push(rest.to_string());
            return Ok(());
        }
        return Err(ParseError::new(
            line.line,
            ParseErrorKind::NoBuildStage(keyword.to_string()),
        ));
    };

    let command = match keyword {
        Keyword::Copy => Command::Copy(parse_copy(line, keyword, COPY_FLAGS)?),
        Keyword::Add => Command::Add(parse_copy(line, keyword, ADD_FLAGS)?),
        _ => Command::Other {
            line: line.line,
            keyword,
            args: rest.to_string(),
        },
    };
    stage.commands.push(command);
    Ok(())
}

fn parse_from(line: usize, rest: &str) -> Result<Stage, ParseError> {
    let tokens: Vec<&str> = rest
        .split_whitespace()
        .filter(|t| !t.starts_with("--"))
        .collect();
    let (base, name) = match tokens.as_slice() {
        [] => return Err(ParseError::new(line, ParseErrorKind::MissingImage)),
        [base] => (*base, None),
        [base, as_kw, name] if as_kw.eq_ignore_ascii_case("as") => (*base, Some(name.to_string())),
        _ => {
            return Err(ParseError::new(
                line,
                ParseErrorKind::MalformedStageName(rest.to_string()),
            ))
        }
    };
    Ok(Stage {
        line,
        base: base.to_string(),
        name,
        commands: Vec::new(),
    })
}

fn parse_copy(
    line: LogicalLine,
    keyword: Keyword,
    allowed: &[&str],
) -> Result<CopyCommand, ParseError> {
    let instruction = keyword.as_str();
    let mut rest = line
        .text
        .split_once(char::is_whitespace)
        .map(|(_, r)| r.trim_start())
        .unwrap_or("");

    let mut flags = Vec::new();
    while let Some(body) = rest.strip_prefix("--") {
        let (token, tail) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));
        let (name, value) = match token.split_once('=') {
            Some((n, v)) => (n, Some(v.to_string())),
            None => (token, None),
        };
        if !allowed.contains(&name) {
            return Err(ParseError::new(
                line.line,
                ParseErrorKind::UnknownFlag {
                    instruction,
                    flag: name.to_string(),
                },
            ));
        }
        flags.push(Flag {
            name: name.to_string(),
            value,
        });
        rest = tail.trim_start();
    }

    let mut args = split_arguments(rest);
    if args.len() < 2 {
        return Err(ParseError::new(
            line.line,
            ParseErrorKind::MissingArguments(instruction),
        ));
    }
    let dest = args.pop().unwrap_or_default();

    Ok(CopyCommand {
        line: line.line,
        flags,
        sources: args,
        dest,
        heredocs: line.heredocs,
    })
}

/// Exec form (JSON string array) when it parses as one, whitespace separated otherwise
fn split_arguments(rest: &str) -> Vec<String> {
    if rest.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(rest) {
            return list;
        }
    }
    rest.split_whitespace().map(str::to_string).collect()
}
