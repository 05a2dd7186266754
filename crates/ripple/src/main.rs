//! Ripple CLI binary.

use anyhow::Result;
use ripple::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the ripple CLI.
///
/// Uses tokio's current_thread runtime: every command is a short sequence
/// of file reads followed by an in-memory traversal.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=ripple=debug to trace every rule reached
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ripple=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting ripple CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Ripple CLI completed successfully");
    Ok(())
}
