//! Mock query stores for testing.

use super::{ColumnInfo, QueryResult, QueryStore, Value};
use crate::error::{Result, TabletalkError};
use async_trait::async_trait;

/// A mock store that returns a single canned row for any SELECT.
#[derive(Debug, Clone, Default)]
pub struct MockStore;

impl MockStore {
    /// Creates a new mock store.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryStore for MockStore {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        Ok(QueryResult::with_data(
            vec![ColumnInfo::new("result", "TEXT")],
            vec![vec![Value::Text(format!("Mock result for: {}", sql))]],
        ))
    }
}

/// A mock store whose every query fails.
#[derive(Debug, Clone)]
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    /// Creates a failing store with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new("simulated query failure")
    }
}

#[async_trait]
impl QueryStore for FailingStore {
    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(TabletalkError::query(self.message.clone()))
    }
}
