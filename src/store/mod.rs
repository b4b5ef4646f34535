//! Query execution layer for tabletalk.
//!
//! Provides a trait-based interface over the SQLite store holding the loaded
//! dataset, so the pipeline can be tested against mock backends.

mod mock;
mod types;

pub use mock::{FailingStore, MockStore};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::{Result, TabletalkError};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as SqlxRow, SqlitePool, TypeInfo, ValueRef};
use std::path::Path;

/// Trait defining the query execution capability.
///
/// The pipeline treats this as a black box: given a SQL string, return row
/// data or fail. No dialect validation happens before execution.
#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Executes a SQL query and returns the results.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;
}

/// SQLite-backed query store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens an in-memory SQLite database.
    ///
    /// The pool is capped at one connection so every query sees the same
    /// in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                TabletalkError::dataset(format!("Failed to open in-memory database: {}", e))
            })?;

        Ok(Self { pool })
    }

    /// Opens (or creates) a SQLite database file.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| {
                TabletalkError::dataset(format!("Failed to open {}: {}", path.display(), e))
            })?;

        Ok(Self { pool })
    }

    /// Returns the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Decodes a single value from a result row.
    fn decode_value(row: &SqliteRow, idx: usize) -> Value {
        let raw = match row.try_get_raw(idx) {
            Ok(raw) => raw,
            Err(_) => return Value::Null,
        };

        if raw.is_null() {
            return Value::Null;
        }

        match raw.type_info().name() {
            "INTEGER" | "BOOLEAN" => row
                .try_get::<i64, _>(idx)
                .map(Value::Int)
                .unwrap_or(Value::Null),
            "REAL" => row
                .try_get::<f64, _>(idx)
                .map(Value::Float)
                .unwrap_or(Value::Null),
            _ => row
                .try_get::<String, _>(idx)
                .map(Value::Text)
                .unwrap_or(Value::Null),
        }
    }
}

#[async_trait]
impl QueryStore for SqliteStore {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TabletalkError::query(e.to_string()))?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| ColumnInfo::new(c.name(), c.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let data = rows
            .iter()
            .map(|row| {
                (0..row.columns().len())
                    .map(|idx| Self::decode_value(row, idx))
                    .collect()
            })
            .collect();

        Ok(QueryResult::with_data(columns, data))
    }
}
