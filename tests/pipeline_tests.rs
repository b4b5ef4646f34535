//! End-to-end pipeline tests over a real in-memory SQLite store and mock
//! LLM clients.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use tabletalk::assistant::Assistant;
use tabletalk::dataset::SchemaInfo;
use tabletalk::error::{Result, TabletalkError};
use tabletalk::llm::{FailingLlmClient, LlmClient, Message, MockLlmClient, ResponseSchema};
use tabletalk::pipeline::{PipelineState, QuestionOutcome};
use tabletalk::store::{QueryStore, SqliteStore};

/// Writes the standard [id, name, age] fixture dataset.
fn csv_fixture() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(file, "id,name,age\n1,Alice,30\n2,Bob,25\n3,Carol,41\n").unwrap();
    file
}

async fn fixture_handles() -> (Arc<SqliteStore>, Arc<SchemaInfo>) {
    let file = csv_fixture();
    Assistant::load_dataset(file.path()).await.unwrap()
}

fn assistant_with(
    llm: Arc<dyn LlmClient>,
    store: Arc<SqliteStore>,
    schema: Arc<SchemaInfo>,
) -> Assistant {
    let store: Arc<dyn QueryStore> = store;
    Assistant::from_parts(llm, Some(store), schema)
}

#[tokio::test]
async fn happy_path_produces_full_state() {
    let (store, schema) = fixture_handles().await;
    let assistant = assistant_with(Arc::new(MockLlmClient::new()), store, schema);

    let state = assistant.ask_question("How many rows are in the data?").await;

    assert!(state.error_message.is_none());
    assert!(!state.sql_query.is_empty());
    assert!(!state.query_result.is_empty());
    assert!(!state.final_answer.is_empty());
}

#[tokio::test]
async fn row_count_scenario() {
    let (store, schema) = fixture_handles().await;
    let assistant = assistant_with(Arc::new(MockLlmClient::new()), store, schema);

    let state = assistant.ask_question("How many rows are in the data?").await;

    assert_eq!(state.sql_query, "SELECT COUNT(*) FROM data_table;");
    assert_eq!(state.query_result, "[(3,)]");
    assert!(state.final_answer.contains("(3,)"));
    assert!(matches!(state.outcome(), QuestionOutcome::Answered(_)));
}

#[tokio::test]
async fn generation_failure_yields_fallback_template() {
    let (store, schema) = fixture_handles().await;
    let assistant = assistant_with(
        Arc::new(FailingLlmClient::new("provider unavailable")),
        store,
        schema,
    );

    let state = assistant.ask_question("How many rows are in the data?").await;

    assert_eq!(state.sql_query, "");
    assert!(state.error_message.is_some());
    assert!(state.final_answer.contains("How many rows are in the data?"));
    assert!(state.final_answer.contains("What columns are available?"));
    assert!(matches!(state.outcome(), QuestionOutcome::Recovered { .. }));
}

#[tokio::test]
async fn nonexistent_column_yields_fallback_not_a_number() {
    let (store, schema) = fixture_handles().await;
    let assistant = assistant_with(Arc::new(MockLlmClient::new()), store, schema);

    let state = assistant
        .ask_question("What is the average of column `revenue`?")
        .await;

    // Stage 1 succeeded, stage 2 failed against the real store.
    assert_eq!(state.sql_query, "SELECT AVG(revenue) FROM data_table;");
    assert_eq!(state.query_result, "");
    let error = state.error_message.as_deref().unwrap();
    assert!(error.starts_with("Error executing query:"));
    assert!(state.final_answer.contains("I encountered an error"));
    assert!(state.final_answer.contains("average of column `revenue`"));
}

#[tokio::test]
async fn identical_question_is_deterministic_against_unchanged_store() {
    let (store, schema) = fixture_handles().await;
    let assistant = assistant_with(
        Arc::new(MockLlmClient::new()),
        store,
        schema,
    );

    let first = assistant.ask_question("How many rows are in the data?").await;
    let second = assistant.ask_question("How many rows are in the data?").await;

    assert_eq!(first.sql_query, second.sql_query);
    assert_eq!(first.query_result, second.query_result);
}

#[tokio::test]
async fn empty_question_flows_through_all_stages() {
    let (store, schema) = fixture_handles().await;
    let assistant = assistant_with(Arc::new(MockLlmClient::new()), store, schema);

    let state = assistant.ask_question("").await;

    assert_eq!(state.user_question, "");
    assert!(!state.sql_query.is_empty());
    assert!(!state.final_answer.is_empty());
}

#[tokio::test]
async fn questions_are_independent_across_calls() {
    let (store, schema) = fixture_handles().await;
    let assistant = assistant_with(Arc::new(MockLlmClient::new()), store, schema);

    let failed = assistant
        .ask_question("What is the average of column `revenue`?")
        .await;
    assert!(failed.error_message.is_some());

    // A fresh state is constructed per question, so the earlier error does
    // not leak into the next one.
    let ok = assistant.ask_question("How many rows are in the data?").await;
    assert!(ok.error_message.is_none());
    assert_eq!(ok.query_result, "[(3,)]");
}

/// Client that generates SQL successfully but fails on answer synthesis,
/// exercising the stage-3 failure path.
struct AnswerFailingClient;

#[async_trait]
impl LlmClient for AnswerFailingClient {
    async fn generate(
        &self,
        _messages: &[Message],
        schema: &ResponseSchema,
    ) -> Result<serde_json::Value> {
        match schema.name {
            "sql_generation" => Ok(json!({ "sql_query": "SELECT COUNT(*) FROM data_table;" })),
            _ => Err(TabletalkError::llm("answer synthesis failed")),
        }
    }
}

#[tokio::test]
async fn answer_synthesis_failure_still_recovers() {
    let (store, schema) = fixture_handles().await;
    let assistant = assistant_with(Arc::new(AnswerFailingClient), store, schema);

    let state = assistant.ask_question("How many rows are in the data?").await;

    // SQL and execution succeeded before the stage-3 failure.
    assert_eq!(state.sql_query, "SELECT COUNT(*) FROM data_table;");
    assert_eq!(state.query_result, "[(3,)]");
    let error = state.error_message.as_deref().unwrap();
    assert!(error.starts_with("Error generating answer:"));
    assert!(state.final_answer.contains("I encountered an error"));
    assert!(matches!(state.outcome(), QuestionOutcome::Recovered { .. }));
}

#[tokio::test]
async fn executing_without_store_skips_stage_two() {
    let (_, schema) = fixture_handles().await;
    let assistant = Assistant::from_parts(Arc::new(MockLlmClient::new()), None, schema);

    let state: PipelineState = assistant.ask_question("How many rows are in the data?").await;

    assert!(!state.sql_query.is_empty());
    assert_eq!(state.query_result, "");
    assert!(state.error_message.is_none());
}
