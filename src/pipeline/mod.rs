//! The three-stage question-answering pipeline.
//!
//! One linear sequence per question: generate SQL, execute it, generate the
//! answer. There is no branching, looping, or parallelism here; error
//! short-circuiting happens inside each stage, so the orchestrator always
//! runs all three in order.

pub mod prompts;
pub mod stages;
pub mod state;

pub use stages::Stages;
pub use state::{PipelineState, QuestionOutcome};

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::dataset::SchemaInfo;
use crate::llm::LlmClient;
use crate::store::QueryStore;

/// Pipeline orchestrator.
pub struct Pipeline {
    stages: Stages,
}

impl Pipeline {
    /// Creates a pipeline over the given LLM client, store, and schema.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Option<Arc<dyn QueryStore>>,
        schema: Arc<SchemaInfo>,
    ) -> Self {
        Self {
            stages: Stages::new(llm, store, schema),
        }
    }

    /// Runs the full pipeline for one question.
    ///
    /// Always executes the fixed stage order regardless of intermediate
    /// errors; every terminal state carries a `final_answer`.
    pub async fn run(&self, question: &str) -> PipelineState {
        let start = Instant::now();
        let state = PipelineState::new(question);

        let state = self.stages.generate_sql(state).await;
        let state = self.stages.execute_query(state).await;
        let state = self.stages.generate_answer(state).await;

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            had_error = state.has_error(),
            "Pipeline complete"
        );

        state
    }
}
