//! `login-probe` binary entry point.

use anyhow::Result;
use clap::Parser;
use login_probe::{Cli, load_config, run};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli.config)?;
    run(cli, &config, &mut std::io::stdout().lock()).await
}
