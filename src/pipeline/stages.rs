//! The three pipeline stages.
//!
//! Each stage is a transformation from state to state. A stage that sees an
//! earlier error passes the state through untouched instead of making model
//! or database calls; every failure is caught locally and recorded on the
//! state, so no error crosses a stage boundary.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error};

use crate::dataset::SchemaInfo;
use crate::llm::{generate_structured, AnswerResponse, LlmClient, ResponseSchema, SqlGenerationResponse};
use crate::pipeline::prompts;
use crate::pipeline::state::PipelineState;
use crate::store::QueryStore;

/// The stage functions, sharing the long-lived LLM client, store, and
/// schema handles.
pub struct Stages {
    llm: Arc<dyn LlmClient>,
    store: Option<Arc<dyn QueryStore>>,
    schema: Arc<SchemaInfo>,
}

impl Stages {
    /// Creates the stage collection.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Option<Arc<dyn QueryStore>>,
        schema: Arc<SchemaInfo>,
    ) -> Self {
        Self { llm, store, schema }
    }

    /// Stage 1: generate SQL from the user's question.
    pub async fn generate_sql(&self, state: PipelineState) -> PipelineState {
        if state.has_error() {
            return state;
        }

        let start = Instant::now();
        let messages = prompts::sql_generation_messages(&self.schema, &state.user_question);
        let schema = ResponseSchema::sql_generation();

        match generate_structured::<SqlGenerationResponse>(self.llm.as_ref(), &messages, &schema)
            .await
        {
            Ok(response) => {
                let sql_query = response.sql_query.trim().to_string();
                debug!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    sql_len = sql_query.len(),
                    "SQL generation complete"
                );
                state.with_sql_query(sql_query)
            }
            Err(e) => {
                error!("Error generating SQL: {}", e);
                state.with_error(format!("Error generating SQL query: {}", e))
            }
        }
    }

    /// Stage 2: execute the generated SQL against the store.
    pub async fn execute_query(&self, state: PipelineState) -> PipelineState {
        let Some(store) = &self.store else {
            return state;
        };
        if state.has_error() {
            return state;
        }

        let start = Instant::now();
        match store.execute_query(&state.sql_query).await {
            Ok(result) => {
                debug!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    row_count = result.row_count,
                    "Query execution complete"
                );
                let serialized = result.to_display_string();
                state.with_query_result(serialized)
            }
            Err(e) => {
                error!("Error executing query: {}", e);
                state.with_error(format!("Error executing query: {}", e))
            }
        }
    }

    /// Stage 3: generate the final answer, or the fallback message on error.
    pub async fn generate_answer(&self, state: PipelineState) -> PipelineState {
        if state.has_error() {
            return Self::handle_error(state);
        }

        let start = Instant::now();
        let messages =
            prompts::answer_messages(&state.user_question, &state.sql_query, &state.query_result);
        let schema = ResponseSchema::answer();

        match generate_structured::<AnswerResponse>(self.llm.as_ref(), &messages, &schema).await {
            Ok(response) => {
                debug!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    answer_len = response.final_answer.len(),
                    "Answer generation complete"
                );
                state.with_final_answer(response.final_answer)
            }
            Err(e) => {
                // A failure here still gets the fallback template, so the
                // caller always receives a user-facing answer.
                error!("Error generating answer: {}", e);
                Self::handle_error(state.with_error(format!("Error generating answer: {}", e)))
            }
        }
    }

    /// Produces the user-facing fallback answer for a failed state.
    ///
    /// The recorded error is preserved so callers can distinguish a
    /// recovered error from a genuine answer.
    fn handle_error(state: PipelineState) -> PipelineState {
        let error = state
            .error_message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string());

        let answer = format!(
            r#"I encountered an error while processing your question: "{question}"

Error: {error}

Please try rephrasing your question or asking something simpler like:
- "How many rows are in the data?"
- "What columns are available?"
- "Show me the first 5 rows""#,
            question = state.user_question,
            error = error,
        );

        state.with_final_answer(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ColumnSpec, ColumnType};
    use crate::llm::{FailingLlmClient, MockLlmClient};
    use crate::store::{FailingStore, MockStore};

    fn sample_schema() -> Arc<SchemaInfo> {
        Arc::new(SchemaInfo {
            columns: vec![
                ColumnSpec {
                    name: "id".to_string(),
                    data_type: ColumnType::Integer,
                },
                ColumnSpec {
                    name: "name".to_string(),
                    data_type: ColumnType::Text,
                },
                ColumnSpec {
                    name: "age".to_string(),
                    data_type: ColumnType::Integer,
                },
            ],
            row_count: 3,
        })
    }

    fn stages(llm: Arc<dyn LlmClient>, store: Option<Arc<dyn QueryStore>>) -> Stages {
        Stages::new(llm, store, sample_schema())
    }

    #[tokio::test]
    async fn test_generate_sql_fills_query() {
        let stages = stages(Arc::new(MockLlmClient::new()), None);
        let state = PipelineState::new("How many rows are in the data?");

        let state = stages.generate_sql(state).await;

        assert_eq!(state.sql_query, "SELECT COUNT(*) FROM data_table;");
        assert!(!state.has_error());
    }

    #[tokio::test]
    async fn test_generate_sql_short_circuits_on_error() {
        let stages = stages(Arc::new(MockLlmClient::new()), None);
        let state = PipelineState::new("q").with_error("earlier failure");

        let state = stages.generate_sql(state).await;

        assert!(state.sql_query.is_empty());
        assert_eq!(state.error_message.as_deref(), Some("earlier failure"));
    }

    #[tokio::test]
    async fn test_generate_sql_converts_failure_to_error() {
        let stages = stages(Arc::new(FailingLlmClient::new("model offline")), None);
        let state = PipelineState::new("q");

        let state = stages.generate_sql(state).await;

        assert!(state.sql_query.is_empty());
        let error = state.error_message.unwrap();
        assert!(error.starts_with("Error generating SQL query:"));
        assert!(error.contains("model offline"));
    }

    #[tokio::test]
    async fn test_execute_query_serializes_rows() {
        let stages = stages(
            Arc::new(MockLlmClient::new()),
            Some(Arc::new(MockStore::new())),
        );
        let state = PipelineState::new("q").with_sql_query("SELECT 1");

        let state = stages.execute_query(state).await;

        assert!(state.query_result.contains("SELECT 1"));
        assert!(!state.has_error());
    }

    #[tokio::test]
    async fn test_execute_query_without_store_passes_through() {
        let stages = stages(Arc::new(MockLlmClient::new()), None);
        let state = PipelineState::new("q").with_sql_query("SELECT 1");

        let state = stages.execute_query(state).await;

        assert!(state.query_result.is_empty());
        assert!(!state.has_error());
    }

    #[tokio::test]
    async fn test_execute_query_converts_failure_to_error() {
        let stages = stages(
            Arc::new(MockLlmClient::new()),
            Some(Arc::new(FailingStore::new("no such column: revenue"))),
        );
        let state = PipelineState::new("q").with_sql_query("SELECT revenue FROM data_table");

        let state = stages.execute_query(state).await;

        assert!(state.query_result.is_empty());
        let error = state.error_message.unwrap();
        assert!(error.starts_with("Error executing query:"));
        assert!(error.contains("no such column: revenue"));
    }

    #[tokio::test]
    async fn test_generate_answer_success() {
        let stages = stages(Arc::new(MockLlmClient::new()), None);
        let state = PipelineState::new("q")
            .with_sql_query("SELECT COUNT(*) FROM data_table;")
            .with_query_result("[(3,)]");

        let state = stages.generate_answer(state).await;

        assert!(!state.final_answer.is_empty());
        assert!(!state.has_error());
    }

    #[tokio::test]
    async fn test_generate_answer_error_path_uses_template() {
        let stages = stages(Arc::new(MockLlmClient::new()), None);
        let state = PipelineState::new("What is the average of column `revenue`?")
            .with_error("Error executing query: no such column: revenue");

        let state = stages.generate_answer(state).await;

        assert!(state
            .final_answer
            .contains("What is the average of column `revenue`?"));
        assert!(state.final_answer.contains("no such column: revenue"));
        assert!(state.final_answer.contains("How many rows are in the data?"));
        // Error is preserved, not cleared.
        assert!(state.has_error());
    }

    #[tokio::test]
    async fn test_generate_answer_failure_still_produces_fallback() {
        let stages = stages(Arc::new(FailingLlmClient::new("model offline")), None);
        let state = PipelineState::new("q")
            .with_sql_query("SELECT 1")
            .with_query_result("[(1,)]");

        let state = stages.generate_answer(state).await;

        assert!(state.has_error());
        assert!(state.final_answer.contains("I encountered an error"));
        assert!(state
            .error_message
            .unwrap()
            .starts_with("Error generating answer:"));
    }
}
