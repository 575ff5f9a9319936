use super::support::Fixture;
use recipe_digest::recipe::{self, Command};
use recipe_digest::{DigestConfig, DigestError, ParseErrorKind};

fn reference_paths(text: &str) -> Vec<String> {
    recipe::parse(text.as_bytes())
        .unwrap()
        .source_references()
        .into_iter()
        .map(|r| r.path)
        .collect()
}

fn parse_error(text: &str) -> (usize, ParseErrorKind) {
    let err = recipe::parse(text.as_bytes()).unwrap_err();
    (err.line, err.kind)
}

#[test]
fn realistic_multi_stage_recipe() {
    let text = "\
# syntax=docker/dockerfile:1.7
ARG GO_VERSION=1.22

FROM golang:${GO_VERSION} AS build
WORKDIR /src
COPY go.mod go.sum ./
RUN go mod download
COPY --chown=1000:1000 cmd/ ./cmd/
COPY [\"internal dir\", \"./internal/\"]
RUN <<EOF
set -e
go build -o /out/app ./cmd/app
EOF

from alpine:3.20
copy --from=build /out/app /usr/local/bin/app
ADD --chmod=755 https://example.com/healthcheck.sh \\
    scripts/entry.sh \\
    /usr/local/bin/
ENTRYPOINT [\"/usr/local/bin/entry.sh\"]
";
    let parsed = recipe::parse(text.as_bytes()).unwrap();
    assert_eq!(parsed.directives.syntax.as_deref(), Some("docker/dockerfile:1.7"));
    assert_eq!(parsed.meta_args, vec!["GO_VERSION=1.22"]);
    assert_eq!(parsed.stages.len(), 2);
    assert_eq!(parsed.stages[0].name.as_deref(), Some("build"));

    assert_eq!(
        reference_paths(text),
        vec![
            "go.mod",
            "go.sum",
            "cmd/",
            "internal dir",
            "/out/app",
            "https://example.com/healthcheck.sh",
            "scripts/entry.sh",
        ]
    );

    let add_line = parsed.stages[1]
        .commands
        .iter()
        .find_map(|c| match c {
            Command::Add(add) => Some(add.line),
            _ => None,
        })
        .unwrap();
    assert_eq!(add_line, 17);
}

#[test]
fn heredoc_copy_contributes_no_reference() {
    let text = "FROM alpine\nCOPY <<-EOT /etc/motd\n\thello\n\tEOT\nCOPY motd.extra /etc/\n";
    assert_eq!(reference_paths(text), vec!["motd.extra"]);
}

#[test]
fn escape_directive_changes_continuation() {
    let text = "# escape=`\nFROM mcr.microsoft.com/windows/servercore\nCOPY app.ps1 `\n    C:\\app\\\n";
    assert_eq!(reference_paths(text), vec!["app.ps1"]);
}

#[test]
fn parse_error_cases() {
    assert!(matches!(
        parse_error("FROM alpine\nFETCH x y\n"),
        (2, ParseErrorKind::UnknownInstruction(_))
    ));
    assert_eq!(
        parse_error("FROM alpine\nCOPY single\n"),
        (2, ParseErrorKind::MissingArguments("COPY"))
    );
    assert!(matches!(
        parse_error("COPY a b\nFROM alpine\n"),
        (1, ParseErrorKind::NoBuildStage(_))
    ));
    assert!(matches!(
        parse_error("FROM alpine\nRUN <<EOF\necho unterminated\n"),
        (_, ParseErrorKind::UnterminatedHeredoc(_))
    ));
    assert!(matches!(
        parse_error("FROM alpine\nCOPY --bogus=1 a b\n"),
        (2, ParseErrorKind::UnknownFlag { .. })
    ));
    assert_eq!(parse_error("\n# nothing\n").1, ParseErrorKind::Empty);
}

#[tokio::test]
async fn copy_from_sources_are_fingerprinted() {
    let fixture = Fixture::new();
    fixture.write("main.go", "package main");
    fixture.write("out/app", "binary v1");
    fixture.write(
        "Dockerfile",
        "FROM golang AS build\nCOPY main.go .\nFROM alpine\nCOPY --from=build /out/app /app\n",
    );
    let config = DigestConfig::default();
    let before = fixture.digest(&config).await.unwrap();

    fixture.write("out/app", "binary v2");
    assert_ne!(fixture.digest(&config).await.unwrap(), before);

    std::fs::remove_file(fixture.path("out/app")).unwrap();
    assert!(matches!(
        fixture.digest(&config).await,
        Err(DigestError::Resolve(_))
    ));
}

#[tokio::test]
async fn parse_failure_surfaces_through_digest() {
    let fixture = Fixture::new();
    fixture.write("Dockerfile", "FROM alpine\nRUN <<EOF\necho\n");
    assert!(matches!(
        fixture.digest(&DigestConfig::default()).await,
        Err(DigestError::Parse(_))
    ));
}
