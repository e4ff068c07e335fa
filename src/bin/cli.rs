use clap::Parser;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[path = "../cli/mod.rs"]
mod cli;

use cli::commands::Args;
use cli::handlers::handle_command;

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default so log lines don't interleave with the prompts
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    handle_command(args).await
}
