//! vanity - go-import metadata server

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vanity_server::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Cli::parse().into_settings()?;
    vanity_server::run(settings).await?;
    Ok(())
}
