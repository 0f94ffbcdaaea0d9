//! catalog-snap binary: one snapshot run, then exit.
//!
//! Reads `catalog-snap.json` from the working directory when present, otherwise
//! runs with the built-in defaults. Exits with status 1 on any fatal error.

use std::path::Path;
use std::process::ExitCode;

use catalog_snap::{Config, Orchestrator};

const CONFIG_FILE: &str = "catalog-snap.json";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_snap=info".into()),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> catalog_snap::Result<()> {
    let config = Config::load(Path::new(CONFIG_FILE))?;
    Orchestrator::with_http(config)?.run().await
}
