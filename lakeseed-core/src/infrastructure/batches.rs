// lakeseed-core/src/infrastructure/batches.rs

// Pre-generated table batches on disk: one CSV per table, header row first.

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::table::{Column, ColumnType, TableBatch, Value};
use crate::infrastructure::error::InfrastructureError;

/// Every `*.csv` directly under `dir`, ordered by file name.
pub fn load_batches(dir: &Path) -> Result<Vec<TableBatch>, InfrastructureError> {
    if !dir.exists() {
        warn!(path = ?dir, "No data directory, nothing to ingest");
        return Ok(Vec::new());
    }

    let mut batches = Vec::new();
    let walker = WalkDir::new(dir).max_depth(1).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| InfrastructureError::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "csv") {
            continue;
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = std::fs::File::open(path)?;
        let batch = read_batch(&name, file)?;
        debug!(table = %name, rows = batch.row_count(), "Batch read");
        batches.push(batch);
    }

    info!(count = batches.len(), "Table batches loaded");
    Ok(batches)
}

pub fn read_batch<R: Read>(name: &str, source: R) -> Result<TableBatch, InfrastructureError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        raw_rows.push(record?.iter().map(str::to_string).collect());
    }

    let types: Vec<ColumnType> = (0..headers.len())
        .map(|i| infer_type(raw_rows.iter().filter_map(|r| r.get(i)).map(String::as_str)))
        .collect();

    let rows: Vec<Vec<Value>> = raw_rows
        .iter()
        .map(|raw| {
            raw.iter()
                .zip(&types)
                .map(|(cell, ty)| convert(cell, *ty))
                .collect()
        })
        .collect();

    let columns: Vec<Column> = headers
        .iter()
        .zip(&types)
        .map(|(h, ty)| Column::new(h, *ty))
        .collect();

    Ok(TableBatch::new(name, columns).with_rows(rows))
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_timestamp(cell: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(cell)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Narrowest type that fits every non-empty cell.
fn infer_type<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let present: Vec<&str> = cells.map(str::trim).filter(|c| !c.is_empty()).collect();
    if present.is_empty() {
        return ColumnType::Varchar;
    }

    if present.iter().all(|c| c.parse::<i64>().is_ok()) {
        ColumnType::BigInt
    } else if present
        .iter()
        .all(|c| c.parse::<f64>().is_ok_and(f64::is_finite))
    {
        ColumnType::Double
    } else if present.iter().all(|c| parse_bool(c).is_some()) {
        ColumnType::Boolean
    } else if present.iter().all(|c| parse_timestamp(c).is_some()) {
        ColumnType::Timestamp
    } else {
        ColumnType::Varchar
    }
}

fn convert(cell: &str, data_type: ColumnType) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    let parsed = match data_type {
        ColumnType::BigInt => trimmed.parse().ok().map(Value::Int),
        ColumnType::Double => trimmed.parse().ok().map(Value::Float),
        ColumnType::Boolean => parse_bool(trimmed).map(Value::Bool),
        ColumnType::Timestamp => parse_timestamp(trimmed).map(Value::Timestamp),
        ColumnType::Varchar => None,
    };
    parsed.unwrap_or_else(|| Value::Text(cell.to_string()))
}
