// src/process/mod.rs
use crate::error::{ImportError, Result};
use crate::schema::{derive, Table};
use csv::ReaderBuilder;
use tracing::{debug, instrument};

/// CSV as read, before typing.
#[derive(Debug)]
pub struct RawTable {
    /// Column names from the header record, deduplicated.
    pub headers: Vec<String>,
    /// Each data record as a Vec of Strings (one per field).
    pub rows: Vec<Vec<String>>,
}

/// Line on which a quoted field opens and never closes, if any.
///
/// A quote only opens a field when it is the field's first character; a
/// doubled quote inside a quoted field is an escaped quote.
fn unterminated_quote_line(text: &str) -> Option<usize> {
    let mut line = 1;
    let mut opened_on = 0;
    let mut in_quotes = false;
    let mut field_start = true;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => {
                    in_quotes = false;
                    field_start = false;
                }
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if field_start => {
                in_quotes = true;
                opened_on = line;
                field_start = false;
            }
            ',' | '\r' => field_start = true,
            '\n' => {
                line += 1;
                field_start = true;
            }
            _ => field_start = false,
        }
    }

    in_quotes.then_some(opened_on)
}

/// Read header and records. Every record must have the header's width.
pub fn read_csv(text: &str) -> Result<RawTable> {
    if let Some(line) = unterminated_quote_line(text) {
        return Err(ImportError::Parse(format!(
            "unterminated quoted field starting on line {}",
            line
        )));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let header = rdr.headers()?.clone();
    if header.is_empty() {
        return Err(ImportError::Parse("no header line".into()));
    }
    let raw_headers: Vec<String> = header.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable {
        headers: derive::dedupe_headers(&raw_headers),
        rows,
    })
}

impl Table {
    /// Parse CSV text: the first record names the columns, each column's
    /// type is inferred from all of its values.
    #[instrument(level = "debug", skip(text), fields(bytes = text.len()))]
    pub fn parse(text: &str) -> Result<Table> {
        let raw = read_csv(text)?;
        let columns = derive::derive_types(&raw.headers, &raw.rows);
        let rows = raw
            .rows
            .iter()
            .map(|r| {
                r.iter()
                    .zip(&columns)
                    .map(|(cell, col)| derive::to_cell(cell, col.ty))
                    .collect()
            })
            .collect();
        debug!(
            columns = columns.len(),
            rows = raw.rows.len(),
            "parsed CSV"
        );
        Ok(Table { columns, rows })
    }
}
