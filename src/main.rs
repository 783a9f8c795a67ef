use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use pathrank::{CliArgs, Config};

#[derive(Parser)]
#[command(name = "pathrank")]
#[command(about = "URL path hit counter with a ranked leaderboard and a load generator")]
struct Cli {
    #[arg(short, long, help = "Path to a TOML or JSON config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Socket address to bind, e.g. 127.0.0.1:5000")]
    bind: Option<String>,

    #[arg(long, help = "Base URL the load generator probes")]
    base_url: Option<String>,

    #[arg(long, help = "Maximum probes in flight at once (0 = unbounded)")]
    probe_concurrency: Option<usize>,

    #[arg(long, help = "Seed for the path sampler")]
    sample_seed: Option<u64>,

    #[arg(short, long, help = "Increase verbosity")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        bind: cli.bind.clone(),
        base_url: cli.base_url.clone(),
        config_file: cli.config.clone(),
        probe_concurrency: cli.probe_concurrency,
        sample_seed: cli.sample_seed,
    };

    let config = match &args.config_file {
        Some(path) => Config::from_file(path)?
            .merge_from_env()?
            .merge_from_cli(&args),
        None => Config::load_with_cli(&args)?,
    };
    config.validate()?;

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    };
    let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    pathrank::run(config).await
}
