mod cli;
mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use pedibus_core::config::load_dotenv;
use pedibus_core::{Config, SchedulingEngine};

use crate::cli::CliArgs;
use crate::commands::StderrReporter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let mut config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    if let Some(ref path) = args.guides {
        config.storage.guides_file = absolute(&cwd, path);
    }
    if let Some(ref path) = args.history {
        config.storage.history_file = absolute(&cwd, path);
    }
    config.log_summary();

    let reporter = StderrReporter;
    let today = chrono::Local::now().date_naive();
    let mut engine = SchedulingEngine::open(&config, today, &reporter);

    commands::run(args.command, &mut engine, &config, today, &reporter).await
}

/// Paths given on the command line are relative to the working directory,
/// not to the data directory.
fn absolute(cwd: &Path, path: &Path) -> String {
    let path: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    path.to_string_lossy().into_owned()
}
