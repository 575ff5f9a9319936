use clap::Parser;
use recipe_digest::cli::{Cli, CliContext, CliOutcome, OutputFormat, EXIT_OK, EXIT_STALE};
use recipe_digest::{Digest, DigestError, Settings, Staleness};
use std::fs;
use tempfile::TempDir;

fn context_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("app.py"), "print('hello')\n").unwrap();
    fs::write(
        temp.path().join("Dockerfile"),
        "FROM python:3.12-slim\nCOPY app.py /app/\nCMD [\"python\", \"/app/app.py\"]\n",
    )
    .unwrap();
    temp
}

#[tokio::test]
async fn digest_json_contract_has_required_fields() {
    let temp = context_dir();
    let recipe = temp.path().join("Dockerfile");
    let context = CliContext::new(Settings::default());

    let outcome = context.execute(&recipe, None).await.unwrap();
    assert_eq!(outcome.exit_code(), EXIT_OK);

    let parsed: serde_json::Value =
        serde_json::from_str(&outcome.render(&recipe, OutputFormat::Json)).unwrap();
    assert!(parsed.get("recipe").and_then(|v| v.as_str()).is_some());
    let digest = parsed.get("digest").and_then(|v| v.as_str()).unwrap();
    assert_eq!(digest.len(), 128);
    assert!(digest.parse::<Digest>().is_ok());
}

#[tokio::test]
async fn digest_text_is_bare_hex() {
    let temp = context_dir();
    let recipe = temp.path().join("Dockerfile");
    let outcome = CliContext::new(Settings::default())
        .execute(&recipe, None)
        .await
        .unwrap();
    let text = outcome.render(&recipe, OutputFormat::Text);
    assert_eq!(text.len(), 128);
    assert!(text.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[tokio::test]
async fn compare_reports_fresh_then_stale() {
    let temp = context_dir();
    let recipe = temp.path().join("Dockerfile");
    let context = CliContext::new(Settings::default());

    let CliOutcome::Digest(recorded) = context.execute(&recipe, None).await.unwrap() else {
        panic!("expected a digest");
    };

    let fresh = context.execute(&recipe, Some(recorded)).await.unwrap();
    assert_eq!(fresh.exit_code(), EXIT_OK);
    let parsed: serde_json::Value =
        serde_json::from_str(&fresh.render(&recipe, OutputFormat::Json)).unwrap();
    assert_eq!(parsed["status"], "fresh");
    assert_eq!(parsed["digest"], recorded.to_hex());

    fs::write(temp.path().join("app.py"), "print('changed')\n").unwrap();
    let stale = context.execute(&recipe, Some(recorded)).await.unwrap();
    assert_eq!(stale.exit_code(), EXIT_STALE);
    assert!(matches!(
        stale,
        CliOutcome::Checked { status: Staleness::Stale { .. }, .. }
    ));
}

#[tokio::test]
async fn compare_degrades_failures_to_unknown() {
    let temp = context_dir();
    let recipe = temp.path().join("Dockerfile");
    fs::remove_file(temp.path().join("app.py")).unwrap();

    let outcome = CliContext::new(Settings::default())
        .execute(&recipe, Some(Digest::from_bytes([0; 64])))
        .await
        .unwrap();
    assert_eq!(outcome.exit_code(), EXIT_STALE);
    let parsed: serde_json::Value =
        serde_json::from_str(&outcome.render(&recipe, OutputFormat::Json)).unwrap();
    assert_eq!(parsed["status"], "unknown");
    assert!(parsed["digest"].is_null());
}

#[tokio::test]
async fn digest_failure_is_an_error_without_compare() {
    let temp = context_dir();
    fs::remove_file(temp.path().join("app.py")).unwrap();
    let err = CliContext::new(Settings::default())
        .execute(&temp.path().join("Dockerfile"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "resolve");
}

#[test]
fn settings_from_config_file_and_flags() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(
        &config,
        "[digest]\nremote_treatment = \"always_changed\"\nworkers = 2\n",
    )
    .unwrap();
    let config_arg = config.to_string_lossy().into_owned();

    let cli = Cli::try_parse_from(["recipe-digest", "Dockerfile", "--config", &config_arg]).unwrap();
    let settings = cli.settings().unwrap();
    assert_eq!(settings.digest.workers, 2);

    let cli = Cli::try_parse_from([
        "recipe-digest",
        "Dockerfile",
        "--config",
        &config_arg,
        "--remote",
        "unchanged",
        "--workers",
        "6",
    ])
    .unwrap();
    let settings = cli.settings().unwrap();
    assert_eq!(settings.digest.workers, 6);
    assert_eq!(settings.digest.remote_treatment, recipe_digest::RemoteTreatment::Unchanged);
}

#[test]
fn invalid_config_file_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "[digest]\ndownload_remote = true\n").unwrap();
    let config_arg = config.to_string_lossy().into_owned();

    let cli = Cli::try_parse_from(["recipe-digest", "Dockerfile", "--config", &config_arg]).unwrap();
    assert!(matches!(cli.settings(), Err(DigestError::Config(_))));
}
