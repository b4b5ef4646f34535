//! Pipeline state.
//!
//! The single record threaded through all three stages. Stages never mutate
//! the incoming state; each returns a new value built with the consuming
//! `with_*` methods below, so the field list lives in one place.

use serde::{Deserialize, Serialize};

/// State flowing through the question-answering pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineState {
    /// The user's question, set once at entry.
    pub user_question: String,

    /// Generated SQL query, empty until SQL generation succeeds.
    pub sql_query: String,

    /// String serialization of the result rows, empty until execution
    /// succeeds.
    pub query_result: String,

    /// Final natural-language answer.
    pub final_answer: String,

    /// Error recorded by a failed stage. Once set, later stages pass the
    /// state through unchanged except for the terminal fallback answer.
    pub error_message: Option<String>,
}

impl PipelineState {
    /// Creates the initial state for a question.
    pub fn new(user_question: impl Into<String>) -> Self {
        Self {
            user_question: user_question.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with the SQL query filled in.
    pub fn with_sql_query(self, sql_query: impl Into<String>) -> Self {
        Self {
            sql_query: sql_query.into(),
            ..self
        }
    }

    /// Returns a copy with the serialized query result filled in.
    pub fn with_query_result(self, query_result: impl Into<String>) -> Self {
        Self {
            query_result: query_result.into(),
            ..self
        }
    }

    /// Returns a copy with the final answer filled in.
    pub fn with_final_answer(self, final_answer: impl Into<String>) -> Self {
        Self {
            final_answer: final_answer.into(),
            ..self
        }
    }

    /// Returns a copy with an error recorded.
    pub fn with_error(self, error_message: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_message.into()),
            ..self
        }
    }

    /// Returns true if an earlier stage recorded an error.
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Returns the caller-facing view of the terminal state.
    pub fn outcome(&self) -> QuestionOutcome<'_> {
        match (&self.error_message, self.final_answer.is_empty()) {
            (None, _) => QuestionOutcome::Answered(&self.final_answer),
            (Some(error), false) => QuestionOutcome::Recovered {
                answer: &self.final_answer,
                error,
            },
            (Some(error), true) => QuestionOutcome::Failed(error),
        }
    }
}

/// Tagged view of a terminal pipeline state.
///
/// Removes the ambiguity of interpreting the error flag and answer fields by
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionOutcome<'a> {
    /// All stages succeeded; the answer is genuine.
    Answered(&'a str),
    /// A stage failed but the fallback template produced a user-facing
    /// answer.
    Recovered { answer: &'a str, error: &'a str },
    /// A stage failed and no answer was produced.
    Failed(&'a str),
}
