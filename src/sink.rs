// src/sink.rs

use crate::db::quote_ident;
use crate::error::{ImportError, Result};
use crate::schema::{Column, Table};
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::Client;
use tracing::{debug, info, instrument};

/// SQL for one destination table, derived from the inferred columns.
/// No I/O happens here; [`replace_table`] runs the statements.
pub struct TableSchema<'a> {
    name: &'a str,
    columns: &'a [Column],
}

impl<'a> TableSchema<'a> {
    pub fn new(name: &'a str, columns: &'a [Column]) -> Self {
        Self { name, columns }
    }

    pub fn drops(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(self.name))
    }

    /// Plain table: no primary key, no index, every column nullable.
    pub fn creates(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.ty.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({})", quote_ident(self.name), cols)
    }

    pub fn copy(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "COPY {} ({}) FROM STDIN BINARY",
            quote_ident(self.name),
            cols
        )
    }

    pub fn types(&self) -> Vec<Type> {
        self.columns.iter().map(|c| c.ty.pg_type()).collect()
    }
}

/// Drop `name`, recreate it from `table`'s columns and stream every row in
/// through binary COPY, all inside one transaction. On failure nothing is
/// committed and the previous table stays as it was.
#[instrument(level = "info", skip(client, table), fields(columns = table.columns.len(), rows = table.len()))]
pub async fn replace_table(client: &mut Client, name: &str, table: &Table) -> Result<u64> {
    let write_err = |source| ImportError::DatabaseWrite {
        table: name.to_string(),
        source,
    };
    let schema = TableSchema::new(name, &table.columns);

    let tx = client.transaction().await.map_err(write_err)?;

    debug!(sql = %schema.drops());
    tx.batch_execute(&schema.drops()).await.map_err(write_err)?;
    debug!(sql = %schema.creates());
    tx.batch_execute(&schema.creates()).await.map_err(write_err)?;

    let sink = tx.copy_in(&schema.copy()).await.map_err(write_err)?;
    let writer = BinaryCopyInWriter::new(sink, &schema.types());
    futures::pin_mut!(writer);
    for row in &table.rows {
        let values: Vec<&(dyn ToSql + Sync)> =
            row.iter().map(|c| c as &(dyn ToSql + Sync)).collect();
        writer.as_mut().write(&values).await.map_err(write_err)?;
    }
    let written = writer.finish().await.map_err(write_err)?;

    tx.commit().await.map_err(write_err)?;
    info!(table = name, rows = written, "table replaced");
    Ok(written)
}
