//! setenv CLI entry point.

use clap::Parser;
use setenv_cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse first so -v can pick the default log level
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "setenv=info",
        1 => "setenv=debug",
        _ => "setenv=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli).await
}
