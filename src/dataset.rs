//! Dataset loading for tabletalk.
//!
//! Reads a CSV file, infers a SQLite column type per column, and
//! materializes the data into the single `data_table` the pipeline queries.
//! The resulting `SchemaInfo` is shared read-only with every SQL-generation
//! call.

use crate::config::DATA_TABLE;
use crate::error::{Result, TabletalkError};
use crate::store::SqliteStore;
use std::path::Path;
use tracing::info;

/// Declared SQLite type of a loaded column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Returns the SQLite type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

/// A loaded column: sanitized name plus inferred type.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Sanitized column name, valid as a SQL identifier.
    pub name: String,
    /// Inferred SQLite type.
    pub data_type: ColumnType,
}

/// Static description of the loaded table.
///
/// Computed once when the dataset is loaded; every SQL-generation prompt
/// embeds it.
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    /// Columns in dataset order.
    pub columns: Vec<ColumnSpec>,
    /// Number of data rows loaded.
    pub row_count: usize,
}

impl SchemaInfo {
    /// Formats the column list for the SQL-generation prompt, e.g.
    /// `[id, name, age]`.
    pub fn format_columns(&self) -> String {
        let names = self
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{}]", names)
    }

    /// Formats the column-to-type mapping for the SQL-generation prompt,
    /// e.g. `{id: INTEGER, name: TEXT, age: INTEGER}`.
    pub fn format_types(&self) -> String {
        let pairs = self
            .columns
            .iter()
            .map(|c| format!("{}: {}", c.name, c.data_type.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", pairs)
    }
}

/// Loads a dataset file into the store, replacing any previous `data_table`.
///
/// Only CSV files are supported; any other extension is a dataset error.
pub async fn load(path: &Path, store: &SqliteStore) -> Result<SchemaInfo> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => load_csv(path, store).await,
        _ => Err(TabletalkError::dataset(format!(
            "Unsupported file format: {}",
            path.display()
        ))),
    }
}

/// Loads a CSV file into the store.
async fn load_csv(path: &Path, store: &SqliteStore) -> Result<SchemaInfo> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| TabletalkError::dataset(format!("Failed to read {}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| TabletalkError::dataset(format!("Failed to read CSV headers: {}", e)))?
        .clone();

    if headers.is_empty() {
        return Err(TabletalkError::dataset("CSV file has no columns"));
    }

    let names: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| sanitize_identifier(h, idx))
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| TabletalkError::dataset(format!("Failed to read CSV record: {}", e)))?;
        records.push(record);
    }

    let types = infer_column_types(names.len(), &records);
    let columns: Vec<ColumnSpec> = names
        .into_iter()
        .zip(types)
        .map(|(name, data_type)| ColumnSpec { name, data_type })
        .collect();

    materialize(store, &columns, &records).await?;

    let schema = SchemaInfo {
        columns,
        row_count: records.len(),
    };

    info!(
        rows = schema.row_count,
        columns = schema.columns.len(),
        path = %path.display(),
        "Dataset loaded into {}",
        DATA_TABLE
    );

    Ok(schema)
}

/// Infers a SQLite type per column.
///
/// A column whose non-empty cells all parse as integers is INTEGER; all
/// parse as numbers, REAL; otherwise TEXT. Empty cells do not veto a
/// numeric type. A column with no non-empty cells is TEXT.
fn infer_column_types(column_count: usize, records: &[csv::StringRecord]) -> Vec<ColumnType> {
    (0..column_count)
        .map(|idx| {
            let mut saw_value = false;
            let mut all_int = true;
            let mut all_real = true;

            for record in records {
                let cell = record.get(idx).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                saw_value = true;
                if cell.parse::<i64>().is_err() {
                    all_int = false;
                }
                if cell.parse::<f64>().is_err() {
                    all_real = false;
                }
            }

            if !saw_value {
                ColumnType::Text
            } else if all_int {
                ColumnType::Integer
            } else if all_real {
                ColumnType::Real
            } else {
                ColumnType::Text
            }
        })
        .collect()
}

/// Sanitizes a header into a valid SQL identifier.
fn sanitize_identifier(header: &str, idx: usize) -> String {
    let mut name: String = header
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if name.is_empty() {
        name = format!("column_{}", idx + 1);
    } else if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }

    name
}

/// Creates `data_table` and inserts all records.
///
/// The table is dropped and recreated so reloading a dataset replaces the
/// previous contents.
async fn materialize(
    store: &SqliteStore,
    columns: &[ColumnSpec],
    records: &[csv::StringRecord],
) -> Result<()> {
    let pool = store.pool();

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", DATA_TABLE))
        .execute(pool)
        .await
        .map_err(|e| TabletalkError::dataset(format!("Failed to reset table: {}", e)))?;

    let column_defs = columns
        .iter()
        .map(|c| format!("\"{}\" {}", c.name, c.data_type.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let create = format!("CREATE TABLE {} ({})", DATA_TABLE, column_defs);

    sqlx::query(&create)
        .execute(pool)
        .await
        .map_err(|e| TabletalkError::dataset(format!("Failed to create table: {}", e)))?;

    let placeholders = columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let column_names = columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let insert = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        DATA_TABLE, column_names, placeholders
    );

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| TabletalkError::dataset(format!("Failed to start transaction: {}", e)))?;

    for record in records {
        let mut query = sqlx::query(&insert);
        for (idx, column) in columns.iter().enumerate() {
            let cell = record.get(idx).unwrap_or("").trim();
            if cell.is_empty() {
                query = query.bind(None::<String>);
                continue;
            }
            query = match column.data_type {
                ColumnType::Integer => query.bind(cell.parse::<i64>().ok()),
                ColumnType::Real => query.bind(cell.parse::<f64>().ok()),
                ColumnType::Text => query.bind(cell.to_string()),
            };
        }
        query
            .execute(&mut *tx)
            .await
            .map_err(|e| TabletalkError::dataset(format!("Failed to insert row: {}", e)))?;
    }

    tx.commit()
        .await
        .map_err(|e| TabletalkError::dataset(format!("Failed to commit load: {}", e)))?;

    Ok(())
}
