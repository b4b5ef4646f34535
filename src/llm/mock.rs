//! Mock LLM clients for testing.
//!
//! Provide deterministic structured responses based on input patterns, so
//! the pipeline can be exercised without real API calls.

use async_trait::async_trait;
use serde_json::json;

use crate::error::{Result, TabletalkError};
use crate::llm::responses::ResponseSchema;
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned structured responses.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom SQL mappings (question pattern -> SQL).
    custom_sql: Vec<(String, String)>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom SQL mapping.
    ///
    /// When the question contains `pattern`, the mock generates `sql`.
    pub fn with_sql(mut self, pattern: impl Into<String>, sql: impl Into<String>) -> Self {
        self.custom_sql.push((pattern.into(), sql.into()));
        self
    }

    /// Generates mock SQL based on the question.
    fn mock_sql(&self, question: &str) -> String {
        let question_lower = question.to_lowercase();

        for (pattern, sql) in &self.custom_sql {
            if question_lower.contains(&pattern.to_lowercase()) {
                return sql.clone();
            }
        }

        if question_lower.contains("how many rows") || question_lower.contains("row count") {
            return "SELECT COUNT(*) FROM data_table;".to_string();
        }

        if question_lower.contains("first") {
            return "SELECT * FROM data_table LIMIT 5;".to_string();
        }

        if let Some(column) = Self::extract_quoted(&question_lower, "average of column") {
            return format!("SELECT AVG({}) FROM data_table;", column);
        }

        "SELECT * FROM data_table LIMIT 100;".to_string()
    }

    /// Pulls a backtick-quoted identifier following `marker`, if present.
    fn extract_quoted(question: &str, marker: &str) -> Option<String> {
        let rest = question.split(marker).nth(1)?;
        let start = rest.find('`')? + 1;
        let end = rest[start..].find('`')? + start;
        Some(rest[start..end].to_string())
    }

    /// Generates a mock answer echoing the serialized query results from
    /// the prompt.
    fn mock_answer(messages: &[Message]) -> String {
        for message in messages {
            for line in message.content.lines() {
                if let Some(results) = line.strip_prefix("Query Results: ") {
                    return format!(
                        "Based on the query results, the data shows: {}",
                        results.trim()
                    );
                }
            }
        }
        "Based on the query results, the data shows no matching information.".to_string()
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(
        &self,
        messages: &[Message],
        schema: &ResponseSchema,
    ) -> Result<serde_json::Value> {
        let input = Self::extract_user_input(messages);

        match schema.name {
            "sql_generation" => Ok(json!({ "sql_query": self.mock_sql(&input) })),
            "answer" => Ok(json!({ "final_answer": Self::mock_answer(messages) })),
            other => Err(TabletalkError::llm(format!(
                "Mock has no responses for schema: {}",
                other
            ))),
        }
    }
}

/// Mock LLM client whose every call fails.
///
/// Used to test the pipeline's error propagation.
#[derive(Debug, Clone)]
pub struct FailingLlmClient {
    message: String,
}

impl FailingLlmClient {
    /// Creates a failing client with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingLlmClient {
    fn default() -> Self {
        Self::new("simulated LLM failure")
    }
}

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn generate(
        &self,
        _messages: &[Message],
        _schema: &ResponseSchema,
    ) -> Result<serde_json::Value> {
        Err(TabletalkError::llm(self.message.clone()))
    }
}
