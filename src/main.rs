mod artifacts;
mod cli;
mod config;
mod fetch;
mod llm;
mod markdown;
mod research;
mod serp;

pub const USER_AGENT: &str = concat!("gleaner/", env!("CARGO_PKG_VERSION"));

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Before the subscriber, so RUST_LOG may come from .env too.
    let dotenv = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    let directive = if cli.verbose {
        "gleaner=debug"
    } else {
        "gleaner=info"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    cli.run()
        .await
        .inspect_err(|e| tracing::error!("{e}"))
}
