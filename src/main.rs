//! CLI entry point for marc-miner.

use marc_miner::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // WARN by default, overridable through RUST_LOG; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
