// src/source.rs

use crate::config::DbConfig;
use crate::db;
use crate::error::{ImportError, Result};
use std::fmt;
use tracing::{info, instrument};

/// URL of the single-table import.
pub const DEFAULT_URL: &str = "https://www.fuzzwork.co.uk/dump/latest/chrFactions.csv";
/// Destination table of the single-table import.
pub const DEFAULT_TABLE: &str = "chrFactions";

/// One CSV to import and the table it lands in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CsvSource {
    pub url: String,
    pub table: String,
}

impl CsvSource {
    pub fn new(url: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for CsvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} into {}", self.url, self.table)
    }
}

/// Where the list of sources comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceResolver {
    /// Exactly one known pair.
    Fixed(CsvSource),
    /// One pair per row of a registry relation with `url` and `tablename`
    /// columns, in whatever order the database returns them.
    Registry { relation: String },
}

impl Default for SourceResolver {
    fn default() -> Self {
        SourceResolver::Fixed(CsvSource::new(DEFAULT_URL, DEFAULT_TABLE))
    }
}

impl SourceResolver {
    pub fn registry(relation: impl Into<String>) -> Self {
        SourceResolver::Registry {
            relation: relation.into(),
        }
    }

    /// `SELECT url, tablename FROM <relation>`. The relation may be
    /// schema-qualified; each part is quoted separately.
    pub fn registry_query(relation: &str) -> String {
        let qualified = relation
            .split('.')
            .map(db::quote_ident)
            .collect::<Vec<_>>()
            .join(".");
        format!("SELECT url, tablename FROM {}", qualified)
    }

    /// Produce the sources. The registry variant opens its own connection
    /// and drops it before returning.
    #[instrument(level = "info", skip(self, cfg))]
    pub async fn resolve(&self, cfg: &DbConfig) -> Result<Vec<CsvSource>> {
        match self {
            SourceResolver::Fixed(source) => Ok(vec![source.clone()]),
            SourceResolver::Registry { relation } => {
                let client = db::connect(cfg).await?;
                let query = Self::registry_query(relation);
                let rows = client
                    .query(query.as_str(), &[])
                    .await
                    .map_err(|source| ImportError::Query {
                        context: query.clone(),
                        source: Some(source),
                    })?;

                let sources = rows
                    .iter()
                    .enumerate()
                    .map(|(idx, row)| {
                        let get = |col: &str| -> Result<String> {
                            row.try_get::<_, Option<String>>(col)
                                .map_err(|source| ImportError::Query {
                                    context: format!("reading `{}` of row {}", col, idx),
                                    source: Some(source),
                                })?
                                .ok_or_else(|| ImportError::Query {
                                    context: format!("`{}` is NULL in row {}", col, idx),
                                    source: None,
                                })
                        };
                        Ok(CsvSource::new(get("url")?, get("tablename")?))
                    })
                    .collect::<Result<Vec<_>>>()?;

                info!(count = sources.len(), relation = %relation, "resolved sources");
                Ok(sources)
            }
        }
    }
}
