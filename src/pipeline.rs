// src/pipeline.rs

use crate::config::{Config, DbConfig, FailurePolicy};
use crate::db;
use crate::error::{ImportError, Result};
use crate::fetch::fetch_csv;
use crate::schema::Table;
use crate::sink::replace_table;
use crate::source::{CsvSource, SourceResolver};
use reqwest::Client;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Outcome of one successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub table: String,
    pub columns: usize,
    pub rows: u64,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub imported: Vec<ImportReport>,
    pub failed: Vec<(CsvSource, ImportError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetch, parse and load one source. The fetch and parse both finish
/// before a database connection is opened, so a bad response or bad CSV
/// never touches the existing table.
#[instrument(level = "info", skip(http, db_cfg, source), fields(url = %source.url, table = %source.table))]
pub async fn import_source(
    http: &Client,
    db_cfg: &DbConfig,
    source: &CsvSource,
) -> Result<ImportReport> {
    let start = Instant::now();

    let body = fetch_csv(http, &source.url).await?;
    let table = Table::parse(&body)?;

    let rows = {
        let mut client = db::connect(db_cfg).await?;
        replace_table(&mut client, &source.table, &table).await?
    };

    println!(
        "Data imported successfully into table '{}'.",
        source.table
    );
    info!(
        rows,
        columns = table.columns.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "import complete"
    );
    Ok(ImportReport {
        table: source.table.clone(),
        columns: table.columns.len(),
        rows,
    })
}

/// Resolve sources, then import them one after another.
///
/// With [`FailurePolicy::Abort`] the first failure is returned and later
/// sources are skipped. With [`FailurePolicy::Continue`] every source is
/// attempted and failures are collected in the report. A resolution
/// failure is always returned directly.
pub async fn run(
    http: &Client,
    cfg: &Config,
    resolver: &SourceResolver,
) -> Result<BatchReport> {
    let sources = resolver.resolve(&cfg.db).await?;
    info!(count = sources.len(), policy = ?cfg.on_error, "starting batch");

    let mut report = BatchReport::default();
    for source in sources {
        println!("Processing {}...", source);
        match import_source(http, &cfg.db, &source).await {
            Ok(done) => report.imported.push(done),
            Err(e) if cfg.on_error == FailurePolicy::Continue => {
                warn!(url = %source.url, table = %source.table, kind = e.kind(), error = %e, "import failed, continuing");
                report.failed.push((source, e));
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        imported = report.imported.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    Ok(report)
}
