//! CHS Studio schema host
//!
//! Runs the content schema against JSON document snapshots so editors and
//! CI jobs can check content without the hosted studio:
//!
//!   chs-studio validate role roles/operations-lead.json
//!   chs-studio visible role communication.workingHours roles/operations-lead.json
//!   chs-studio preview chapter chapters/robinson.json
//!
//! Output is JSON on stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chs_studio::{Command, StudioConfig, build_registry, run};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "chs-studio")]
#[command(about = "Validate and preview CHS Studio content documents")]
struct Args {
    /// Path to studio.toml (default: ~/.chs-studio/studio.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = match &args.config {
        Some(path) => StudioConfig::load_from(path),
        None => StudioConfig::load(),
    };
    debug!(?config, "Studio config");

    let registry = build_registry(&config).context("Failed to build document type registry")?;
    info!(types = registry.list_types().len(), "Registry ready");

    let report = run(&args.command, &registry, &config)?;
    println!("{}", report.output);

    Ok(if report.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
