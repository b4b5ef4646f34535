//! Caller-facing assistant wiring.
//!
//! Builds the long-lived handles (store, schema, LLM client) once at setup
//! and runs the pipeline for each question. The assistant is stateless
//! across questions; history is the caller's concern.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::dataset::{self, SchemaInfo};
use crate::error::{Result, TabletalkError};
use crate::llm::{self, LlmClient, LlmProvider};
use crate::pipeline::{Pipeline, PipelineState};
use crate::store::{QueryStore, SqliteStore};

/// Assistant answering natural-language questions about a loaded dataset.
pub struct Assistant {
    schema: Arc<SchemaInfo>,
    pipeline: Pipeline,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    /// Creates an assistant from configuration: loads the dataset, sets up
    /// the store, and builds the LLM client.
    pub async fn new(config: &Config) -> Result<Self> {
        let dataset_path = config
            .dataset
            .path
            .as_deref()
            .ok_or_else(|| TabletalkError::config("No dataset path configured"))?;

        let provider: LlmProvider = config
            .llm
            .provider
            .parse()
            .map_err(TabletalkError::Config)?;
        let client = llm::create_client(provider, &config.llm.model)?;

        let store = match config.dataset.db_path.as_deref() {
            Some(path) => SqliteStore::open(path).await?,
            None => SqliteStore::in_memory().await?,
        };

        let schema = dataset::load(dataset_path, &store).await?;

        info!(
            provider = %provider,
            model = %config.llm.model,
            dataset = %dataset_path.display(),
            "Assistant initialized"
        );

        Ok(Self::from_parts(
            Arc::from(client),
            Some(Arc::new(store)),
            Arc::new(schema),
        ))
    }

    /// Creates an assistant from pre-built handles.
    ///
    /// Used by tests to inject mock clients and stores.
    pub fn from_parts(
        llm: Arc<dyn LlmClient>,
        store: Option<Arc<dyn QueryStore>>,
        schema: Arc<SchemaInfo>,
    ) -> Self {
        let pipeline = Pipeline::new(llm, store, Arc::clone(&schema));
        Self { schema, pipeline }
    }

    /// Loads a dataset into a fresh in-memory store, returning the handles.
    ///
    /// Convenience for callers that build the LLM client themselves.
    pub async fn load_dataset(path: &Path) -> Result<(Arc<SqliteStore>, Arc<SchemaInfo>)> {
        let store = SqliteStore::in_memory().await?;
        let schema = dataset::load(path, &store).await?;
        Ok((Arc::new(store), Arc::new(schema)))
    }

    /// Asks a question and returns the terminal pipeline state.
    ///
    /// Never fails: errors are recorded on the returned state.
    pub async fn ask_question(&self, question: &str) -> PipelineState {
        self.pipeline.run(question).await
    }

    /// Returns the loaded dataset schema.
    pub fn schema(&self) -> &SchemaInfo {
        &self.schema
    }
}
