//! Structured-output response types.
//!
//! Each pipeline stage that talks to the LLM requests a response constrained
//! to a fixed set of named string fields. The `ResponseSchema` carries the
//! JSON schema sent to the provider; the structs deserialize the result.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A named JSON schema describing the structured output the LLM must produce.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    /// Schema name (providers use this to label the response format).
    pub name: &'static str,
    /// The JSON schema itself.
    pub schema: Value,
}

impl ResponseSchema {
    /// Schema for SQL generation: one required string field `sql_query`.
    pub fn sql_generation() -> Self {
        Self {
            name: "sql_generation",
            schema: json!({
                "type": "object",
                "properties": {
                    "sql_query": {
                        "type": "string",
                        "description": "Generated SQL query"
                    }
                },
                "required": ["sql_query"],
                "additionalProperties": false
            }),
        }
    }

    /// Schema for answer generation: one required string field `final_answer`.
    pub fn answer() -> Self {
        Self {
            name: "answer",
            schema: json!({
                "type": "object",
                "properties": {
                    "final_answer": {
                        "type": "string",
                        "description": "Direct answer to the user's question"
                    }
                },
                "required": ["final_answer"],
                "additionalProperties": false
            }),
        }
    }
}

/// Structured response from the SQL-generation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlGenerationResponse {
    /// Generated SQL query.
    pub sql_query: String,
}

/// Structured response from the answer-generation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Direct answer to the user's question.
    pub final_answer: String,
}
