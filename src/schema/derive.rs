use tracing::debug;

use super::types::{Cell, Column, ColumnType};

/// Cell texts read as missing values. They become NULL and never take
/// part in type inference.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["True", "TRUE", "true"];
const FALSE_VALUES: &[&str] = &["False", "FALSE", "false"];

pub fn is_na(raw: &str) -> bool {
    NA_VALUES.contains(&raw)
}

/// Narrowest type a single non-missing cell fits. Surrounding spaces are
/// ignored for numbers and booleans.
fn infer_type(raw: &str) -> ColumnType {
    let raw = raw.trim();
    if raw.parse::<i64>().is_ok() {
        ColumnType::BigInt
    } else if raw.parse::<f64>().is_ok() {
        ColumnType::Double
    } else if TRUE_VALUES.contains(&raw) || FALSE_VALUES.contains(&raw) {
        ColumnType::Boolean
    } else {
        ColumnType::Text
    }
}

/// Widen `a` so it also holds `b`. Integers widen to doubles; every other
/// mismatch falls back to text.
fn unify(a: ColumnType, b: ColumnType) -> ColumnType {
    use ColumnType::*;
    match (a, b) {
        (x, y) if x == y => x,
        (BigInt, Double) | (Double, BigInt) => Double,
        _ => Text,
    }
}

/// For each column, scan every row:
///  - Ignore missing cells
///  - Widen the running type with each remaining cell
///  - A column with no non-missing cells defaults to text
pub fn derive_types(headers: &[String], rows: &[Vec<String>]) -> Vec<Column> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let ty = rows
                .iter()
                .filter_map(|r| r.get(idx))
                .map(String::as_str)
                .filter(|cell| !is_na(cell))
                .map(infer_type)
                .try_fold(None, |acc: Option<ColumnType>, ty| {
                    let next = acc.map_or(ty, |prev| unify(prev, ty));
                    // text absorbs everything; stop scanning
                    if next == ColumnType::Text {
                        Err(next)
                    } else {
                        Ok(Some(next))
                    }
                })
                .unwrap_or_else(Some)
                .unwrap_or_else(|| {
                    debug!(column = %name, "no values, defaulting to text");
                    ColumnType::Text
                });
            debug!(column = %name, ty = ty.sql(), "derived column type");
            Column {
                name: name.clone(),
                ty,
            }
        })
        .collect()
}

/// Convert one raw cell to its column's type. Text columns keep the
/// original spelling.
pub fn to_cell(raw: &str, ty: ColumnType) -> Cell {
    if is_na(raw) {
        return Cell::Null;
    }
    let trimmed = raw.trim();
    match ty {
        ColumnType::BigInt => trimmed.parse().ok().map(Cell::Int),
        ColumnType::Double => trimmed.parse().ok().map(Cell::Float),
        ColumnType::Boolean => Some(Cell::Bool(TRUE_VALUES.contains(&trimmed))),
        ColumnType::Text => None,
    }
    .unwrap_or_else(|| Cell::Text(raw.to_string()))
}

/// Make header names usable as column names: blanks become
/// `Unnamed: <index>`, repeats get `.1`, `.2`, … suffixes.
pub fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, name) in raw.iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name.clone()
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, n);
            n += 1;
        }
        seen.push(candidate);
    }
    seen
}
