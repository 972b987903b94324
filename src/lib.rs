//! Fetch CSV files over HTTP and load each one into a PostgreSQL table,
//! replacing whatever table had that name before.

pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod sink;
pub mod source;

pub use config::{Config, DbConfig, FailurePolicy};
pub use error::{ImportError, Result};
pub use pipeline::{import_source, run, BatchReport, ImportReport};
pub use source::{CsvSource, SourceResolver};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
}
