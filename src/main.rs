use anyhow::{bail, Result};
use csvpg::{pipeline, Config, SourceResolver};
use reqwest::Client;
use tracing::info;

/// Single-table import: the fixed chrFactions dump.
#[tokio::main]
async fn main() -> Result<()> {
    csvpg::init_tracing();

    let cfg = Config::from_env()?;
    info!(db = %cfg.db, "startup");

    let client = Client::new();
    let report = pipeline::run(&client, &cfg, &SourceResolver::default()).await?;

    if !report.is_success() {
        bail!("{} import(s) failed", report.failed.len());
    }
    Ok(())
}
