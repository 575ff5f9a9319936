use clap::{CommandFactory, Parser};
use recipe_digest::cli::{Cli, OutputFormat, RemoteArg};

#[test]
fn parse_valid_argument_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["recipe-digest", "Dockerfile"],
        vec!["recipe-digest", "build/Dockerfile", "--format", "json"],
        vec!["recipe-digest", "Dockerfile", "--remote", "unchanged"],
        vec!["recipe-digest", "Dockerfile", "--remote", "always-changed", "--workers", "16"],
        vec!["recipe-digest", "Dockerfile", "--config", "/etc/recipe-digest.toml"],
        vec!["recipe-digest", "Dockerfile", "--compare", "abcd"],
        vec![
            "recipe-digest",
            "Dockerfile",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--log-output",
            "file",
            "--log-file",
            "/tmp/rd.log",
        ],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_arguments() {
    let invalid: Vec<Vec<&str>> = vec![
        vec!["recipe-digest"],
        vec!["recipe-digest", "Dockerfile", "--remote", "sometimes"],
        vec!["recipe-digest", "Dockerfile", "--workers", "0"],
        vec!["recipe-digest", "Dockerfile", "--workers", "many"],
        vec!["recipe-digest", "Dockerfile", "--format", "yaml"],
    ];
    for args in invalid {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}

#[test]
fn parse_defaults() {
    let cli = Cli::try_parse_from(["recipe-digest", "Dockerfile"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Text);
    assert_eq!(cli.remote, None);
    assert_eq!(cli.workers, None);
    assert!(cli.compare.is_none());

    let cli = Cli::try_parse_from(["recipe-digest", "Dockerfile", "--remote", "always-changed"]).unwrap();
    assert_eq!(cli.remote, Some(RemoteArg::AlwaysChanged));
}

#[test]
fn help_mentions_every_flag() {
    let help = Cli::command().render_long_help().to_string();
    for flag in [
        "--remote",
        "--workers",
        "--config",
        "--format",
        "--compare",
        "--log-level",
        "--log-format",
        "--log-output",
        "--log-file",
    ] {
        assert!(help.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}
