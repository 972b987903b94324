// src/db.rs

use crate::config::DbConfig;
use crate::error::{ImportError, Result};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, instrument};

/// Open a fresh connection. The connection task ends when the returned
/// client is dropped, so callers scope the client to one unit of work.
#[instrument(level = "debug", skip(cfg), fields(db = %cfg))]
pub async fn connect(cfg: &DbConfig) -> Result<Client> {
    let (client, connection) = cfg
        .pg_config()
        .connect(NoTls)
        .await
        .map_err(|source| ImportError::Connection {
            target: cfg.to_string(),
            source,
        })?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!(error = %e, "connection closed with error");
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await
        .map_err(|source| ImportError::Connection {
            target: cfg.to_string(),
            source,
        })?;
    debug!("connected");
    Ok(client)
}

/// Double-quote an identifier so PostgreSQL keeps it verbatim.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
