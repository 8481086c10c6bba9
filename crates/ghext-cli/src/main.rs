//! ghext - install extensions from any reference of the add-on repository.
//!
//! Installs from the primary branch and removals are delegated to the
//! package manager directly. Any other branch, tag, or commit is fetched
//! through the hosting service's contents API into a scratch directory,
//! which the package manager then installs from.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ghext_config::Config;
use ghext_install::{InstallError, Operation, RunOutcome, RunRequest, RunScope};
use ghext_telemetry::LogFormat;

mod config_bridge;
mod theme;

use theme::Theme;

/// ghext - fetch and install an extension at a given reference
#[derive(Parser, Debug)]
#[command(name = "ghext")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extension name, e.g. i.sentinel
    extension: String,

    /// Operation to perform
    #[arg(long, default_value = "add")]
    operation: Operation,

    /// Branch, tag, or commit hash to install from (default: the primary branch)
    #[arg(long)]
    reference: Option<String>,

    /// Install for all users
    #[arg(short = 's', long)]
    system_wide: bool,

    /// Force removal
    #[arg(short = 'f', long)]
    force: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a configuration file, replacing the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log format: pretty, compact, json or full
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Write logs to daily-rotated files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("Invalid configuration: {e}")));
            return ExitCode::FAILURE;
        },
    };

    let log_config = config_bridge::to_log_config(
        &config,
        cli.verbose,
        cli.log_format,
        cli.log_dir.as_deref(),
    );
    if let Err(e) = ghext_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    // The scope must be gone before the exit status is returned.
    let mut scope = RunScope::new();
    let result = run(&cli, &config, &mut scope);
    drop(scope);

    match result {
        Ok(outcome) => {
            report_success(&outcome);
            ExitCode::SUCCESS
        },
        Err(e) => report_failure(&e),
    }
}

fn run(cli: &Cli, config: &Config, scope: &mut RunScope) -> Result<RunOutcome> {
    let pipeline =
        config_bridge::build_pipeline(config).context("failed to set up the API client")?;

    let request = RunRequest {
        extension: cli.extension.clone(),
        operation: cli.operation,
        reference: cli
            .reference
            .clone()
            .unwrap_or_else(|| config.remote.default_reference.clone()),
        system_wide: cli.system_wide,
        force_remove: cli.force,
    };
    tracing::debug!(?request, "starting run");

    Ok(pipeline.execute(&request, scope)?)
}

fn report_success(outcome: &RunOutcome) {
    let install = &outcome.install;
    if let Some(summary) = &outcome.fetched {
        println!(
            "{}",
            Theme::info(&format!(
                "Fetched {} files for {}",
                summary.files, install.extension
            ))
        );
    }
    let verb = match install.operation {
        Operation::Add => "Installed",
        Operation::Remove => "Removed",
    };
    println!("{}", Theme::success(&format!("{verb} {}", install.extension)));
}

fn report_failure(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<InstallError>() {
        Some(InstallError::Fetch {
            repo_path,
            reference,
            source,
        }) => {
            eprintln!(
                "{}",
                Theme::error(&format!(
                    "Could not find extension in repository. Searching in repo path {repo_path} for reference {reference}"
                ))
            );
            eprintln!("{}", Theme::dimmed(&format!("  caused by: {source}")));
            ExitCode::FAILURE
        },
        Some(install_error) => {
            eprintln!("{}", Theme::error(&install_error.to_string()));
            ExitCode::from(install_error.exit_code())
        },
        None => {
            eprintln!("{}", Theme::error(&format!("{error:#}")));
            ExitCode::FAILURE
        },
    }
}
