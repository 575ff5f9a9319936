//! recipe-digest binary
//!
//! Prints the digest of a build recipe, or with `--compare` whether the recipe's inputs
//! changed since a recorded digest.

use anyhow::Context;
use clap::Parser;
use recipe_digest::cli::{Cli, CliContext, EXIT_STALE, EXIT_USAGE};
use recipe_digest::logging::init_logging;
use std::process;

fn main() {
    let cli = Cli::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(EXIT_USAGE);
        }
    };
    if let Err(e) = init_logging(Some(&settings.logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(EXIT_USAGE);
    }
    let previous = match cli.previous_digest() {
        Ok(previous) => previous,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    let context = CliContext::new(settings);
    match run(&context, &cli, previous) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(EXIT_STALE);
        }
    }
}

fn run(
    context: &CliContext,
    cli: &Cli,
    previous: Option<recipe_digest::Digest>,
) -> anyhow::Result<i32> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
    let outcome = runtime
        .block_on(context.execute(&cli.recipe, previous))
        .with_context(|| format!("Computing digest of {}", cli.recipe.display()))?;
    println!("{}", outcome.render(&cli.recipe, cli.format));
    Ok(outcome.exit_code())
}
