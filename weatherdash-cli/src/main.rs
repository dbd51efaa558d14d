//! Binary crate for the `weatherdash` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive city selection and configuration
//! - Rendering the dashboard as text panels

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weatherdash_core::Config;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    let config = Config::load()?;

    init_tracing(cmd.debug || config.debug);

    cmd.run(config).await
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output for our crates.
fn init_tracing(debug: bool) {
    let default = if debug { "warn,weatherdash_core=debug,weatherdash=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}
