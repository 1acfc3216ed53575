use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use lrtag::util::config_path;
use lrtag::{Action, Config, Runner};

/// Inject or remove Dynatrace header calls in LoadRunner scripts
#[derive(Parser, Debug)]
#[command(name = "lrtag", version, about)]
struct Cli {
    /// Root directory to scan for script folders
    #[arg(required_unless_present = "init_config")]
    directory: Option<PathBuf>,

    /// INSERT to add header calls, DELETE to remove them
    #[arg(value_enum, ignore_case = true, required_unless_present = "init_config")]
    action: Option<Action>,

    /// Config file (defaults to ~/.lrtag/config.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Additional file names to leave untouched
    #[arg(long = "exclude", value_name = "NAME")]
    excluded: Vec<String>,

    /// Write the example config to the config path and exit
    #[arg(long, conflicts_with_all = ["directory", "action"])]
    init_config: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.init_config {
        let path = cli.config.clone().unwrap_or_else(config_path);
        Config::write_example(&path)?;
        tracing::info!(path = %path.display(), "Wrote example config");
        return Ok(ExitCode::SUCCESS);
    }

    let (Some(directory), Some(action)) = (cli.directory, cli.action) else {
        // clap enforces both unless --init-config is given
        return Ok(ExitCode::from(2));
    };

    if !directory.is_dir() {
        eprintln!("error: not a directory: {}", directory.display());
        return Ok(ExitCode::from(2));
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?
    .with_excluded(cli.excluded);

    let report = Runner::new(&config, action)
        .context("Invalid configuration")?
        .dry_run(cli.dry_run)
        .run(&directory)?;

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        for failure in &report.failures {
            eprintln!("failed: {}: {}", failure.path.display(), failure.message);
        }
        Ok(ExitCode::FAILURE)
    }
}
