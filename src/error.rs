// src/error.rs

use thiserror::Error;

/// Every way an import can fail. Nothing is retried; each variant is
/// surfaced to the caller as-is.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot connect to database {target}")]
    Connection {
        target: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("query failed: {context}")]
    Query {
        context: String,
        #[source]
        source: Option<tokio_postgres::Error>,
    },

    #[error("GET {url} failed{}", .status.map(|s| format!(" with status {}", s)).unwrap_or_default())]
    Http {
        url: String,
        status: Option<reqwest::StatusCode>,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("malformed CSV: {0}")]
    Parse(String),

    #[error("writing table `{table}` failed")]
    DatabaseWrite {
        table: String,
        #[source]
        source: tokio_postgres::Error,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;

impl ImportError {
    /// Short kind label, used in log fields and batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::Config(_) => "ConfigError",
            ImportError::Connection { .. } => "ConnectionError",
            ImportError::Query { .. } => "QueryError",
            ImportError::Http { .. } => "HttpError",
            ImportError::Parse(_) => "ParseError",
            ImportError::DatabaseWrite { .. } => "DatabaseWriteError",
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line());
        match (e.kind(), line) {
            (csv::ErrorKind::UnequalLengths { expected_len, len, .. }, Some(line)) => {
                ImportError::Parse(format!(
                    "line {} has {} fields, header has {}",
                    line, len, expected_len
                ))
            }
            (_, Some(line)) => ImportError::Parse(format!("line {}: {}", line, e)),
            (_, None) => ImportError::Parse(e.to_string()),
        }
    }
}
