//! `hsdeps` — extract a normalized dependency graph from a Haskell project.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]).
//! 3. Pick the strategy: `--strategy`, then config, then [`detector::detect_strategy`].
//! 4. Read the package manager's solved plan ([`analyzer`]), running
//!    `cabal` or `stack` through [`exec::SystemRunner`] when needed.
//! 5. Render the requested report ([`report`]).
//! 6. Exit `0` on success or `1` when extraction fails.

mod analyzer;
mod cli;
mod config;
mod detector;
mod error;
mod exec;
mod models;
mod report;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use analyzer::Strategy;
use cli::{Cli, ReportFormat};
use config::load_config;
use detector::detect_strategy;
use exec::SystemRunner;

fn main() {
    init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// The spinner draws on stderr, so it never mixes with a report on stdout.
fn shows_spinner(cli: &Cli) -> bool {
    !cli.quiet
}

fn run(cli: Cli) -> Result<()> {
    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;

    let strategy = match cli.strategy.as_deref() {
        Some(name) => name.parse::<Strategy>()?,
        None => match config.strategy()? {
            Some(strategy) => strategy,
            None => detect_strategy(&path).with_context(|| {
                format!(
                    "no Haskell project found in {} (expected stack.yaml, cabal.project or a .cabal file)",
                    path.display()
                )
            })?,
        },
    };
    tracing::debug!(%strategy, path = %path.display(), "selected strategy");

    let spinner = shows_spinner(&cli).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Reading {} dependency plan...", strategy));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = analyzer::analyze(strategy, &path, &SystemRunner);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let deps = result?;

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&deps, strategy, &path, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            report::json::render(&deps, strategy)?;
        }
    }

    Ok(())
}
