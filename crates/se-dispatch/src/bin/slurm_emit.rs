//! slurm-emit - expand a parameter sweep and submit this host's share of it

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use se_dispatch::ExperimentRunner;
use se_types::RunConfig;

#[derive(Parser, Debug)]
#[command(name = "slurm-emit", version, about, long_about = None)]
struct Cli {
    /// Path to the JSON run configuration
    #[arg(short = 'f', long = "config")]
    config_file: PathBuf,

    /// Print the submission commands instead of running them
    #[arg(long)]
    mock: bool,

    /// Override the shuffle seed (every host of a sweep must agree on it)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    // Progress lines go to stdout; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = RunConfig::from_json_file(&cli.config_file)
        .with_context(|| format!("Failed to load run config {:?}", cli.config_file))?;
    if cli.mock {
        config.mock_send = true;
    }
    if let Some(seed) = cli.seed {
        config.shuffle_seed = seed;
    }

    let report = ExperimentRunner::new(config)
        .run()
        .context("Run aborted")?;

    tracing::info!(report = %report.to_json(), "Done");
    Ok(())
}
