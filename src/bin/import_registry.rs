use anyhow::{bail, Result};
use csvpg::{pipeline, Config, SourceResolver};
use reqwest::Client;
use tracing::{error, info};

/// Table-driven import: every (url, tablename) row of the registry table.
#[tokio::main]
async fn main() -> Result<()> {
    csvpg::init_tracing();

    let cfg = Config::from_env()?;
    info!(db = %cfg.db, registry = %cfg.registry_table, "startup");

    let client = Client::new();
    let resolver = SourceResolver::registry(cfg.registry_table.clone());
    let report = pipeline::run(&client, &cfg, &resolver).await?;

    for (source, e) in &report.failed {
        error!(url = %source.url, table = %source.table, kind = e.kind(), error = ?e, "import failed");
    }
    info!(
        imported = report.imported.len(),
        failed = report.failed.len(),
        "done"
    );

    if !report.is_success() {
        bail!(
            "{} of {} import(s) failed",
            report.failed.len(),
            report.failed.len() + report.imported.len()
        );
    }
    Ok(())
}
